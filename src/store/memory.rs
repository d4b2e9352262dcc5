// src/store/memory.rs
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{new_report_id, ReportStore};
use crate::error::StoreError;
use crate::model::Report;

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    inner: RwLock<HashMap<String, Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("report store lock poisoned".to_string())
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn put(&self, report: &Report) -> Result<String, StoreError> {
        let id = new_report_id();
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(id.clone(), report.clone());
        Ok(id)
    }

    async fn get(&self, report_id: &str) -> Result<Option<Report>, StoreError> {
        Ok(self.inner.read().map_err(poisoned)?.get(report_id).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
