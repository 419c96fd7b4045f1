use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cadence::engine::{Mailer, Pinger};
use cadence::errors::{CadenceError, Result};
use cadence::lock::LockStore;

/// A pinger that records every URL instead of sending a request.
///
/// URLs listed in `failing` produce an error after being recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingPinger {
    pinged: Arc<Mutex<Vec<String>>>,
    failing: Vec<String>,
}

impl RecordingPinger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(url: &str) -> Self {
        Self {
            pinged: Arc::default(),
            failing: vec![url.to_string()],
        }
    }

    pub fn pinged(&self) -> Vec<String> {
        self.pinged.lock().unwrap().clone()
    }
}

impl Pinger for RecordingPinger {
    fn ping<'a>(&'a self, url: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.pinged.lock().unwrap().push(url.to_string());
            if self.failing.iter().any(|u| u == url) {
                return Err(CadenceError::Other(anyhow::anyhow!("ping to {url} refused")));
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
}

/// A mailer that keeps every message in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, recipient: Option<&str>, subject: &str, body: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.map(str::to_string),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// A lock store whose every operation fails, as an unreachable backend would.
#[derive(Debug, Clone, Default)]
pub struct BrokenLockStore;

impl LockStore for BrokenLockStore {
    fn acquire(&self, key: &str, _ttl: Duration) -> Result<bool> {
        Err(CadenceError::Lock {
            key: key.to_string(),
            reason: "backend unavailable".to_string(),
        })
    }

    fn release(&self, key: &str) -> Result<()> {
        Err(CadenceError::Lock {
            key: key.to_string(),
            reason: "backend unavailable".to_string(),
        })
    }
}
