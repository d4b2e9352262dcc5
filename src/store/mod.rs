// src/store/mod.rs
//! Report persistence: one record per report, keyed by an opaque id.
//!
//! Records are written once at the end of a successful run and never
//! updated or deleted.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::Report;

pub use memory::MemoryReportStore;
pub use sqlite::SqliteReportStore;

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist `report` under a fresh id and return the id.
    async fn put(&self, report: &Report) -> Result<String, StoreError>;
    /// Exact-key lookup.
    async fn get(&self, report_id: &str) -> Result<Option<Report>, StoreError>;
    fn backend(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn ReportStore>;

/// 128-bit random id, hyphenated UUID v4 text.
pub fn new_report_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
