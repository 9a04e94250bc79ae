//! Probe module for endpoint monitoring.
//!
//! A probe performs one bounded-time HTTP GET and folds every failure into an
//! `offline` outcome, so callers never see an error.

mod http;

pub use http::*;

use crate::db::Classification;
use std::time::Duration;
use thiserror::Error;

/// Probe error types. Internal to the probe; see [`ProbeOutcome::from_result`].
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Classified result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: Classification,
    pub response_time_ms: u64,
    /// 0 when no response was obtained.
    pub status_code: u16,
}

impl ProbeOutcome {
    /// Outcome for a received response.
    pub fn from_response(status_code: u16, response_time_ms: u64) -> Self {
        Self {
            status: Classification::from_status_code(status_code),
            response_time_ms,
            status_code,
        }
    }

    /// Offline with no measurable latency.
    pub fn unreachable() -> Self {
        Self {
            status: Classification::Offline,
            response_time_ms: 0,
            status_code: 0,
        }
    }

    /// Convert a raw probe result into an outcome.
    ///
    /// Timeouts report the full timeout as latency; every other error is
    /// offline with zero latency.
    pub fn from_result(result: Result<(u16, u64), ProbeError>) -> Self {
        match result {
            Ok((code, elapsed_ms)) => Self::from_response(code, elapsed_ms),
            Err(ProbeError::Timeout(timeout)) => Self {
                status: Classification::Offline,
                response_time_ms: timeout.as_millis() as u64,
                status_code: 0,
            },
            Err(_) => Self::unreachable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok = ProbeOutcome::from_result(Ok((200, 42)));
        assert_eq!(ok.status, Classification::Online);
        assert_eq!(ok.response_time_ms, 42);
        assert_eq!(ok.status_code, 200);

        let not_found = ProbeOutcome::from_result(Ok((404, 7)));
        assert_eq!(not_found.status, Classification::Degraded);
        assert_eq!(not_found.status_code, 404);

        let server_error = ProbeOutcome::from_result(Ok((503, 9)));
        assert_eq!(server_error.status, Classification::Offline);
        assert_eq!(server_error.response_time_ms, 9);

        let timeout = ProbeOutcome::from_result(Err(ProbeError::Timeout(Duration::from_secs(5))));
        assert_eq!(
            timeout,
            ProbeOutcome {
                status: Classification::Offline,
                response_time_ms: 5000,
                status_code: 0,
            }
        );

        let refused = ProbeOutcome::from_result(Err(ProbeError::Network("refused".into())));
        assert_eq!(refused, ProbeOutcome::unreachable());

        let bad = ProbeOutcome::from_result(Err(ProbeError::Config("bad url".into())));
        assert_eq!(bad, ProbeOutcome::unreachable());
    }
}
