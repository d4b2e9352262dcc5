// tests/common/mod.rs
// Shared test helpers: a tool set that fails one chosen tool.
#![allow(dead_code)]

use async_trait::async_trait;
use market_intel::model::{Entities, ImpactResult, Item, Report, ReportPayload};
use market_intel::tools::{LocalTools, ToolResult, ToolSet};
use market_intel::ToolUnavailable;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Behaves like `LocalTools` except `broken` always fails.
pub struct BrokenTool {
    pub broken: &'static str,
    pub inner: LocalTools,
    pub report_calls: AtomicUsize,
}

impl BrokenTool {
    pub fn new(broken: &'static str) -> Self {
        Self {
            broken,
            inner: LocalTools::new(),
            report_calls: AtomicUsize::new(0),
        }
    }

    fn check(&self, tool: &'static str) -> ToolResult<()> {
        if tool == self.broken {
            Err(ToolUnavailable::new(tool, "simulated outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ToolSet for BrokenTool {
    async fn search_web(&self, query: &str) -> ToolResult<Vec<Item>> {
        self.check("search_web")?;
        self.inner.search_web(query).await
    }
    async fn fetch_url(&self, url: &str) -> ToolResult<String> {
        self.check("fetch_url")?;
        self.inner.fetch_url(url).await
    }
    async fn clean_extract(&self, raw_text: &str) -> ToolResult<String> {
        self.check("clean_extract")?;
        self.inner.clean_extract(raw_text).await
    }
    async fn extract_entities(&self, text: &str) -> ToolResult<Entities> {
        self.check("extract_entities")?;
        self.inner.extract_entities(text).await
    }
    async fn dedupe_items(&self, items: &[Item]) -> ToolResult<Vec<Item>> {
        self.check("dedupe_items")?;
        self.inner.dedupe_items(items).await
    }
    async fn impact_score(&self, item: &Item, context: &str) -> ToolResult<ImpactResult> {
        self.check("impact_score")?;
        self.inner.impact_score(item, context).await
    }
    async fn generate_market_report(&self, data: &ReportPayload) -> ToolResult<Report> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        self.check("generate_market_report")?;
        self.inner.generate_market_report(data).await
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

pub fn nbfc_input() -> market_intel::PipelineInput {
    market_intel::PipelineInput {
        industry: "NBFC".into(),
        from_date: "2024-01-01".into(),
        to_date: "2024-03-31".into(),
    }
}
