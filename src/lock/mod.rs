// src/lock/mod.rs

//! Overlap-prevention locks.
//!
//! A [`LockStore`] is a non-blocking, TTL-bounded mutual-exclusion contract
//! keyed by a task's unique key:
//!
//! - `acquire` returns `false` immediately when the key is held and
//!   unexpired; it never waits.
//! - `release` is idempotent; releasing an unheld or expired key is a no-op.
//! - A holder that dies without releasing blocks the key only until its TTL
//!   elapses.
//!
//! Stores:
//! - [`memory`] keeps grants in a process-local map.
//! - [`file`] keeps one marker file per key, shared by all processes that
//!   point at the same directory.
//!
//! Hosts can plug in any other backend (a database row, a key-value server)
//! by implementing [`LockStore`].

pub mod file;
pub mod memory;

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::errors::Result;
use crate::types::LockStoreKind;

pub use file::FileLockStore;
pub use memory::MemoryLockStore;

/// Default lock lifetime when neither the task nor the config sets one.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub trait LockStore: Send + Sync + Debug {
    /// Try to take `key` for `ttl`. Never blocks.
    fn acquire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Give `key` back. No-op when not held.
    fn release(&self, key: &str) -> Result<()>;
}

/// Create the store selected by configuration.
pub fn store_for(kind: LockStoreKind, dir: PathBuf, clock: Arc<dyn Clock>) -> Arc<dyn LockStore> {
    match kind {
        LockStoreKind::File => Arc::new(FileLockStore::new(dir, clock)),
        LockStoreKind::Memory => Arc::new(MemoryLockStore::new(clock)),
    }
}

/// A task's binding to a lock store.
#[derive(Debug, Clone)]
pub struct OverlapGuard {
    store: Arc<dyn LockStore>,
    ttl: Duration,
}

impl OverlapGuard {
    pub fn new(store: Arc<dyn LockStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// `true` when the lock was granted. Store failures count as "not
    /// granted" so a broken store never lets two instances run at once.
    pub fn try_acquire(&self, key: &str) -> bool {
        match self.store.acquire(key, self.ttl) {
            Ok(true) => {
                debug!(key, ttl = ?self.ttl, "overlap lock acquired");
                true
            }
            Ok(false) => {
                debug!(key, "overlap lock held elsewhere; task is not due");
                false
            }
            Err(err) => {
                warn!(key, error = %err, "overlap lock store failed; treating task as not due");
                false
            }
        }
    }

    pub fn release(&self, key: &str) {
        if let Err(err) = self.store.release(key) {
            warn!(key, error = %err, "failed to release overlap lock; it will expire after its TTL");
        } else {
            debug!(key, "overlap lock released");
        }
    }
}

/// Instant at which a grant taken at `now` for `ttl` stops counting.
pub(crate) fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
