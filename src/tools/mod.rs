// src/tools/mod.rs
//! Tool collaborator boundary.
//!
//! Stages never talk to the outside world directly; they go through a
//! [`ToolSet`]. Implementations:
//! - [`local::LocalTools`]: deterministic in-process stand-ins.
//! - [`remote::HttpTools`]: calls a tool server over HTTP.
//! - [`guarded::GuardedTools`]: timeout + retry wrapper around any of the above.
//!
//! [`server::router`] exposes any `ToolSet` as a tool server.

pub mod guarded;
pub mod local;
pub mod remote;
pub mod server;

use std::sync::Arc;

use async_trait::async_trait;
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::error::ToolUnavailable;
use crate::model::{Entities, ImpactResult, Item, Report, ReportPayload};

pub use guarded::GuardedTools;
pub use local::LocalTools;
pub use remote::HttpTools;

pub type ToolResult<T> = Result<T, ToolUnavailable>;

/// The capability set the pipeline stages call into.
#[async_trait]
pub trait ToolSet: Send + Sync {
    async fn search_web(&self, query: &str) -> ToolResult<Vec<Item>>;
    async fn fetch_url(&self, url: &str) -> ToolResult<String>;
    async fn clean_extract(&self, raw_text: &str) -> ToolResult<String>;
    async fn extract_entities(&self, text: &str) -> ToolResult<Entities>;
    /// Not invoked by any stage; kept on the boundary for callers and the tool server.
    async fn dedupe_items(&self, items: &[Item]) -> ToolResult<Vec<Item>>;
    async fn impact_score(&self, item: &Item, context: &str) -> ToolResult<ImpactResult>;
    async fn generate_market_report(&self, data: &ReportPayload) -> ToolResult<Report>;

    /// Implementation name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by the engine and handlers.
pub type SharedTools = Arc<dyn ToolSet>;

/// One-time metrics registration for the tool boundary.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("tool_calls_total", "Tool collaborator attempts, by tool.");
        describe_counter!(
            "tool_retries_total",
            "Tool calls retried after a failure or timeout."
        );
        describe_counter!(
            "tool_failures_total",
            "Tool calls that failed after all attempts."
        );
        describe_histogram!("tool_call_ms", "Tool call latency in milliseconds.");
    });
}
