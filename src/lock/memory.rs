// src/lock/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::errors::{CadenceError, Result};
use crate::lock::{LockStore, expiry_after};

/// Process-local lock store: a mutex-guarded map of key to expiry.
#[derive(Debug)]
pub struct MemoryLockStore {
    clock: Arc<dyn Clock>,
    grants: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryLockStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            grants: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `key` is currently held and unexpired.
    pub fn is_held(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.grants
            .lock()
            .map(|grants| grants.get(key).is_some_and(|expiry| *expiry > now))
            .unwrap_or(false)
    }

    fn poisoned(key: &str) -> CadenceError {
        CadenceError::Lock {
            key: key.to_string(),
            reason: "memory lock table poisoned".to_string(),
        }
    }
}

impl Default for MemoryLockStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl LockStore for MemoryLockStore {
    fn acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = self.clock.now();
        let mut grants = self.grants.lock().map_err(|_| Self::poisoned(key))?;

        if let Some(expiry) = grants.get(key) {
            if *expiry > now {
                return Ok(false);
            }
        }

        grants.insert(key.to_string(), expiry_after(now, ttl));
        Ok(true)
    }

    fn release(&self, key: &str) -> Result<()> {
        let mut grants = self.grants.lock().map_err(|_| Self::poisoned(key))?;
        grants.remove(key);
        Ok(())
    }
}
