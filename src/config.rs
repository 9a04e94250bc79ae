//! Configuration module for Siteward.
//!
//! Loads configuration from environment variables with sensible defaults.

use chrono::Duration as ChronoDuration;
use std::env;
use std::time::Duration;

/// Targets monitored when `SITEWARD_TARGETS` is not set.
const DEFAULT_TARGETS: [&str; 3] = [
    "https://loyalhood.xyz",
    "https://host.loyalhood.xyz",
    "https://pm.loyalhood.xyz",
];

/// One monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Stable identifier: the URL without its scheme.
    pub name: String,
    /// Full URL probed with GET.
    pub url: String,
}

impl Target {
    /// Build a target from a URL or a bare host name.
    pub fn from_url(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let url = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let name = url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();

        if name.is_empty() {
            return None;
        }

        Some(Self { name, url })
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the API server (default: 8001)
    pub http_port: u16,
    /// Path to the SQLite database file (default: "siteward.db")
    pub db_path: String,
    /// Ordered list of monitored targets
    pub targets: Vec<Target>,
    /// Pause between two probe cycles (default: 30s)
    pub check_interval: Duration,
    /// Total time budget of a single probe (default: 5s)
    pub probe_timeout: Duration,
    /// Age after which check results are swept (default: 30 days)
    pub retention_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8001,
            db_path: "siteward.db".to_string(),
            targets: parse_targets(&DEFAULT_TARGETS.join(",")),
            check_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            retention_days: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SITEWARD_HTTP_PORT`: HTTP port (default: 8001)
    /// - `SITEWARD_DB_PATH`: Database file path (default: "siteward.db")
    /// - `SITEWARD_TARGETS`: comma-separated target URLs
    /// - `SITEWARD_CHECK_INTERVAL_SECS`: seconds between cycles (default: 30)
    /// - `SITEWARD_PROBE_TIMEOUT_SECS`: probe timeout in seconds (default: 5)
    /// - `SITEWARD_RETENTION_DAYS`: retention threshold in days (default: 30)
    pub fn load() -> Self {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Unparseable, zero or out-of-range values keep the default.
    pub fn load_from<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port) = lookup("SITEWARD_HTTP_PORT").and_then(|v| v.trim().parse().ok()) {
            cfg.http_port = port;
        }

        if let Some(db_path) = lookup("SITEWARD_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Some(targets) = lookup("SITEWARD_TARGETS") {
            let parsed = parse_targets(&targets);
            if !parsed.is_empty() {
                cfg.targets = parsed;
            }
        }

        if let Some(secs) = positive_var(&lookup, "SITEWARD_CHECK_INTERVAL_SECS") {
            cfg.check_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = positive_var(&lookup, "SITEWARD_PROBE_TIMEOUT_SECS") {
            cfg.probe_timeout = Duration::from_secs(secs);
        }

        if let Some(days) = positive_var(&lookup, "SITEWARD_RETENTION_DAYS")
            .and_then(|d| i64::try_from(d).ok())
            .filter(|d| ChronoDuration::try_days(*d).is_some())
        {
            cfg.retention_days = days;
        }

        cfg
    }
}

fn positive_var<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)?.trim().parse().ok().filter(|v| *v > 0)
}

/// Parse a comma-separated list of URLs, keeping the first of any duplicates.
pub fn parse_targets(raw: &str) -> Vec<Target> {
    let mut targets: Vec<Target> = Vec::new();
    for target in raw.split(',').filter_map(Target::from_url) {
        if !targets.iter().any(|t| t.name == target.name) {
            targets.push(target);
        }
    }
    targets
}
