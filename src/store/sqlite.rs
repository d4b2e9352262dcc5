// src/store/sqlite.rs
//! SQLite-backed report store: `reports(report_id TEXT PRIMARY KEY, report_json TEXT)`.
//!
//! rusqlite is blocking, so every call hops onto the blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::{new_report_id, ReportStore};
use crate::error::StoreError;
use crate::model::Report;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS reports (
    report_id TEXT PRIMARY KEY,
    report_json TEXT NOT NULL
)";

pub struct SqliteReportStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReportStore {
    /// Open (or create) the database at `path` and make sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!("creating {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn, path)
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, Path::new(":memory:"))
    }

    fn init(conn: Connection, path: &Path) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        tracing::info!(target: "store", path = %path.display(), "sqlite report store ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn put(&self, report: &Report) -> Result<String, StoreError> {
        let id = new_report_id();
        let json = serde_json::to_string(report)?;
        let key = id.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO reports (report_id, report_json) VALUES (?1, ?2)",
                params![key, json],
            )?;
            Ok(())
        })
        .await?;
        Ok(id)
    }

    async fn get(&self, report_id: &str) -> Result<Option<Report>, StoreError> {
        let key = report_id.to_string();
        let row: Option<String> = self
            .with_conn(move |conn| {
                let json = conn
                    .query_row(
                        "SELECT report_json FROM reports WHERE report_id = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(json)
            })
            .await?;

        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trip() {
        let store = SqliteReportStore::open_in_memory().unwrap();
        let report = Report {
            summary: "s".into(),
            sources: vec!["https://a".into(), "https://a".into()],
            ..Default::default()
        };
        let id = store.put(&report).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Some(report));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reports.db");
        let report = Report {
            summary: "persisted".into(),
            ..Default::default()
        };

        let id = {
            let store = SqliteReportStore::open(&path).unwrap();
            store.put(&report).await.unwrap()
        };
        let reopened = SqliteReportStore::open(&path).unwrap();
        assert_eq!(reopened.get(&id).await.unwrap(), Some(report));
    }
}
