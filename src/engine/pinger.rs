// src/engine/pinger.rs

//! URL pings for `ping_before` / `ping_after` hooks.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Context;

use crate::errors::Result;

const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one ping. Implementations must not retry; the runner treats any
/// error as a logged, non-fatal hook failure.
pub trait Pinger: Send + Sync + Debug {
    fn ping<'a>(&'a self, url: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// HTTP GET, success on any 2xx response.
#[derive(Debug, Clone)]
pub struct HttpPinger {
    client: reqwest::Client,
}

impl HttpPinger {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PING_TIMEOUT)
            .build()
            .context("building HTTP client for pings")?;
        Ok(Self { client })
    }
}

impl Pinger for HttpPinger {
    fn ping<'a>(&'a self, url: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .get(url)
                .send()
                .await
                .with_context(|| format!("pinging {url}"))?
                .error_for_status()
                .with_context(|| format!("pinging {url}"))?;
            Ok(())
        })
    }
}
