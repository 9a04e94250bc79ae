//! Shared test fixtures: a local HTTP server and store doubles.

use crate::db::{CheckResult, CheckStore, DbError, Store};

use axum::{
    extract::Path,
    http::StatusCode,
    response::Redirect,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

/// Start a server on an ephemeral port and return its base URL.
///
/// Routes: `/ok` (200), `/missing` (404), `/boom` (500), `/redirect` (to `/ok`)
/// and `/sleep/{ms}` (200 after a delay).
pub async fn spawn_test_server() -> String {
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "missing") }))
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/redirect", get(|| async { Redirect::temporary("/ok") }))
        .route(
            "/sleep/{ms}",
            get(|Path(ms): Path<u64>| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                "slept"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A URL on a local port nothing listens on.
pub async fn unused_local_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/ok", addr)
}

/// Wraps a real store but rejects appends for selected targets.
pub struct FailingStore {
    inner: Store,
    reject: HashSet<String>,
}

impl FailingStore {
    pub fn rejecting(targets: &[&str]) -> Self {
        Self {
            inner: Store::new(":memory:").unwrap(),
            reject: targets.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn inner(&self) -> &Store {
        &self.inner
    }
}

impl CheckStore for FailingStore {
    fn append(&self, result: &CheckResult) -> Result<i64, DbError> {
        if self.reject.contains(&result.target) {
            return Err(DbError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
                Some("database or disk is full".to_string()),
            )));
        }
        self.inner.append(result)
    }

    fn query_latest(&self, target: &str) -> Result<Option<CheckResult>, DbError> {
        self.inner.query_latest(target)
    }

    fn query_range(
        &self,
        target: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CheckResult>, DbError> {
        self.inner.query_range(target, start, end)
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DbError> {
        self.inner.delete_older_than(cutoff)
    }

    fn ping(&self) -> Result<(), DbError> {
        Err(DbError::Poisoned)
    }
}
