//! Database model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health label of a single check or a derived per-target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Online,
    Degraded,
    Offline,
    /// No check has been recorded yet. Never persisted.
    Checking,
}

impl Classification {
    /// Classify an HTTP response code.
    pub fn from_status_code(code: u16) -> Self {
        match code {
            200 => Self::Online,
            400..=499 => Self::Degraded,
            _ => Self::Offline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Degraded => "degraded",
            Self::Offline => "offline",
            Self::Checking => "checking",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "degraded" => Ok(Self::Degraded),
            "offline" => Ok(Self::Offline),
            "checking" => Ok(Self::Checking),
            other => Err(format!("unknown classification: {}", other)),
        }
    }
}

/// One persisted probe outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Row ID, 0 until persisted.
    pub id: i64,
    pub target: String,
    pub status: Classification,
    /// Elapsed milliseconds; 0 on transport failure, the timeout on timeout.
    pub response_time_ms: u64,
    /// HTTP status code, or 0 when no response was obtained.
    pub status_code: u16,
    pub checked_at: DateTime<Utc>,
    /// Used by the retention sweep.
    pub created_at: DateTime<Utc>,
}

impl CheckResult {
    /// Create an unsaved result stamped with the given time.
    pub fn new(
        target: &str,
        status: Classification,
        response_time_ms: u64,
        status_code: u16,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            target: target.to_string(),
            status,
            response_time_ms,
            status_code,
            checked_at: at,
            created_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_from_status_code() {
        assert_eq!(Classification::from_status_code(200), Classification::Online);
        for code in 400..500 {
            assert_eq!(Classification::from_status_code(code), Classification::Degraded);
        }
        for code in [0, 100, 201, 204, 301, 302, 399, 500, 503, 599] {
            assert_eq!(Classification::from_status_code(code), Classification::Offline);
        }
    }

    #[test]
    fn test_classification_str_roundtrip() {
        for c in [
            Classification::Online,
            Classification::Degraded,
            Classification::Offline,
            Classification::Checking,
        ] {
            assert_eq!(c.as_str().parse::<Classification>().unwrap(), c);
        }
        assert!("up".parse::<Classification>().is_err());
    }

    #[test]
    fn test_classification_serializes_lowercase() {
        let json = serde_json::to_string(&Classification::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }
}
