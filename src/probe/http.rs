//! HTTP probe implementation.

use std::time::{Duration, Instant};

use reqwest::redirect::Policy;

use super::{ProbeError, ProbeOutcome};

/// Reusable HTTP prober sharing one connection pool across targets.
#[derive(Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProber {
    /// Build a prober whose requests are bounded by `timeout` end to end.
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Probe a URL once. Never fails; errors are classified as offline.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let result = self.fetch(url).await;
        if let Err(e) = &result {
            match e {
                ProbeError::Timeout(_) => tracing::warn!("Timeout checking {}", url),
                other => tracing::warn!("Error checking {}: {}", url, other),
            }
        }
        ProbeOutcome::from_result(result)
    }

    /// Issue the GET and return the final status code with elapsed milliseconds.
    async fn fetch(&self, url: &str) -> Result<(u16, u64), ProbeError> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status_code = response.status().as_u16();

        // Read the full body to measure complete transfer time
        if let Err(e) = response.bytes().await {
            if e.is_timeout() {
                return Err(ProbeError::Timeout(self.timeout));
            }
            tracing::debug!("Body of {} ended early: {}", url, e);
        }

        Ok((status_code, start.elapsed().as_millis() as u64))
    }

    fn map_error(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else if e.is_builder() {
            ProbeError::Config(e.to_string())
        } else {
            ProbeError::Network(e.to_string())
        }
    }
}
