// src/lock/file.rs

//! Marker-file lock store.
//!
//! Each key maps to `<dir>/<key>.lock`. The file is created with
//! `create_new`, which the OS guarantees only one process can win. Its body
//! records who holds it and until when:
//!
//! ```text
//! 2024-05-01T12:00:00+00:00
//! 4242-1714564800000000000-0
//! ```
//!
//! An expired marker is removed and acquisition retried once.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::errors::{CadenceError, Result};
use crate::lock::{LockStore, expiry_after};

/// How long an unreadable marker (e.g. a holder that crashed between
/// creating and writing it) is respected before being treated as stale.
const UNREADABLE_MARKER_GRACE_SECS: i64 = 60;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct FileLockStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    /// Holder tokens for markers this instance created, so `release` never
    /// deletes a marker another holder took over after expiry.
    held: Mutex<HashMap<String, String>>,
}

impl FileLockStore {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
            held: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn marker_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.lock"))
    }

    fn lock_error(key: &str, reason: impl std::fmt::Display) -> CadenceError {
        CadenceError::Lock {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    fn new_token() -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}-{}", std::process::id(), nanos, seq)
    }

    fn is_stale(&self, path: &Path, now: DateTime<Utc>) -> Result<bool> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };

        let expiry = contents
            .lines()
            .next()
            .and_then(|line| DateTime::parse_from_rfc3339(line.trim()).ok());

        match expiry {
            Some(expiry) => Ok(expiry.with_timezone(&Utc) <= now),
            None => {
                let modified: DateTime<Utc> = fs::metadata(path)?.modified()?.into();
                Ok(modified + TimeDelta::seconds(UNREADABLE_MARKER_GRACE_SECS) <= now)
            }
        }
    }

    fn remove_marker(path: &Path) -> std::io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

impl LockStore for FileLockStore {
    fn acquire(&self, key: &str, ttl: Duration) -> Result<bool> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Self::lock_error(key, format!("creating {:?}: {e}", self.dir)))?;

        let path = self.marker_path(key);
        let now = self.clock.now();

        for attempt in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let token = Self::new_token();
                    writeln!(file, "{}", expiry_after(now, ttl).to_rfc3339())
                        .and_then(|_| writeln!(file, "{token}"))
                        .map_err(|e| Self::lock_error(key, format!("writing {path:?}: {e}")))?;

                    self.held
                        .lock()
                        .map_err(|_| Self::lock_error(key, "holder table poisoned"))?
                        .insert(key.to_string(), token);
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if attempt == 0 && self.is_stale(&path, now)? {
                        debug!(key, ?path, "removing expired lock marker");
                        Self::remove_marker(&path)
                            .map_err(|e| Self::lock_error(key, format!("removing {path:?}: {e}")))?;
                        continue;
                    }
                    return Ok(false);
                }
                Err(e) => {
                    return Err(Self::lock_error(key, format!("creating {path:?}: {e}")));
                }
            }
        }

        Ok(false)
    }

    fn release(&self, key: &str) -> Result<()> {
        let token = self
            .held
            .lock()
            .map_err(|_| Self::lock_error(key, "holder table poisoned"))?
            .remove(key);

        let Some(token) = token else {
            return Ok(());
        };

        let path = self.marker_path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Self::lock_error(key, format!("reading {path:?}: {e}"))),
        };

        if contents.lines().nth(1).map(str::trim) == Some(token.as_str()) {
            Self::remove_marker(&path)
                .map_err(|e| Self::lock_error(key, format!("removing {path:?}: {e}")))?;
        } else {
            debug!(key, "lock marker taken over by another holder; leaving it");
        }
        Ok(())
    }
}
