// src/tools/guarded.rs
//! Timeout + retry policy around any [`ToolSet`].
//!
//! Every call gets `timeout` per attempt and up to `retries` extra attempts.
//! Whatever still fails is reported as [`ToolUnavailable`]; stage semantics
//! are unchanged.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};

use super::{SharedTools, ToolResult, ToolSet};
use crate::error::ToolUnavailable;
use crate::model::{Entities, ImpactResult, Item, Report, ReportPayload};

pub struct GuardedTools {
    inner: SharedTools,
    timeout: Duration,
    retries: u32,
}

impl GuardedTools {
    pub fn with_policy(inner: SharedTools, timeout: Duration, retries: u32) -> Self {
        super::ensure_metrics_described();
        Self {
            inner,
            timeout,
            retries,
        }
    }

    async fn call<T, F, Fut>(&self, tool: &'static str, mut attempt: F) -> ToolResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ToolResult<T>>,
    {
        let mut last_err = ToolUnavailable::new(tool, "no attempt made");
        for n in 0..=self.retries {
            if n > 0 {
                counter!("tool_retries_total", "tool" => tool).increment(1);
                tracing::warn!(
                    target: "tools",
                    tool,
                    attempt = n + 1,
                    error = %last_err,
                    "retrying tool call"
                );
            }
            counter!("tool_calls_total", "tool" => tool).increment(1);

            let t0 = Instant::now();
            let outcome = tokio::time::timeout(self.timeout, attempt()).await;
            let ms = t0.elapsed().as_secs_f64() * 1_000.0;
            histogram!("tool_call_ms", "tool" => tool).record(ms);

            match outcome {
                Ok(Ok(v)) => return Ok(v),
                Ok(Err(e)) => last_err = e,
                Err(_) => {
                    last_err = ToolUnavailable::new(
                        tool,
                        format!("timed out after {}ms", self.timeout.as_millis()),
                    )
                }
            }
        }

        counter!("tool_failures_total", "tool" => tool).increment(1);
        tracing::error!(target: "tools", tool, error = %last_err, "tool call gave up");
        Err(last_err)
    }
}

#[async_trait]
impl ToolSet for GuardedTools {
    async fn search_web(&self, query: &str) -> ToolResult<Vec<Item>> {
        self.call("search_web", || self.inner.search_web(query)).await
    }

    async fn fetch_url(&self, url: &str) -> ToolResult<String> {
        self.call("fetch_url", || self.inner.fetch_url(url)).await
    }

    async fn clean_extract(&self, raw_text: &str) -> ToolResult<String> {
        self.call("clean_extract", || self.inner.clean_extract(raw_text)).await
    }

    async fn extract_entities(&self, text: &str) -> ToolResult<Entities> {
        self.call("extract_entities", || self.inner.extract_entities(text)).await
    }

    async fn dedupe_items(&self, items: &[Item]) -> ToolResult<Vec<Item>> {
        self.call("dedupe_items", || self.inner.dedupe_items(items)).await
    }

    async fn impact_score(&self, item: &Item, context: &str) -> ToolResult<ImpactResult> {
        self.call("impact_score", || self.inner.impact_score(item, context)).await
    }

    async fn generate_market_report(&self, data: &ReportPayload) -> ToolResult<Report> {
        self.call("generate_market_report", || self.inner.generate_market_report(data)).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::LocalTools;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails `fail_first` times, then behaves like `LocalTools`.
    struct Flaky {
        fail_first: u32,
        calls: AtomicU32,
        hang: bool,
    }

    #[async_trait]
    impl ToolSet for Flaky {
        async fn search_web(&self, query: &str) -> ToolResult<Vec<Item>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                if self.hang {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
                return Err(ToolUnavailable::new("search_web", "connection refused"));
            }
            LocalTools::new().search_web(query).await
        }
        async fn fetch_url(&self, url: &str) -> ToolResult<String> {
            LocalTools::new().fetch_url(url).await
        }
        async fn clean_extract(&self, raw_text: &str) -> ToolResult<String> {
            LocalTools::new().clean_extract(raw_text).await
        }
        async fn extract_entities(&self, text: &str) -> ToolResult<Entities> {
            LocalTools::new().extract_entities(text).await
        }
        async fn dedupe_items(&self, items: &[Item]) -> ToolResult<Vec<Item>> {
            LocalTools::new().dedupe_items(items).await
        }
        async fn impact_score(&self, item: &Item, context: &str) -> ToolResult<ImpactResult> {
            LocalTools::new().impact_score(item, context).await
        }
        async fn generate_market_report(&self, data: &ReportPayload) -> ToolResult<Report> {
            LocalTools::new().generate_market_report(data).await
        }
        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn flaky(fail_first: u32, hang: bool) -> Arc<Flaky> {
        Arc::new(Flaky {
            fail_first,
            calls: AtomicU32::new(0),
            hang,
        })
    }

    #[tokio::test]
    async fn single_failure_is_retried() {
        let inner = flaky(1, false);
        let guarded = GuardedTools::with_policy(inner.clone(), Duration::from_secs(1), 1);
        let items = guarded.search_web("q").await.expect("second attempt succeeds");
        assert_eq!(items.len(), 3);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_failure_surfaces_last_error() {
        let inner = flaky(5, false);
        let guarded = GuardedTools::with_policy(inner.clone(), Duration::from_secs(1), 1);
        let err = guarded.search_web("q").await.unwrap_err();
        assert_eq!(err.tool, "search_web");
        assert_eq!(err.reason, "connection refused");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_call_times_out_as_unavailable() {
        let inner = flaky(5, true);
        let guarded = GuardedTools::with_policy(inner.clone(), Duration::from_millis(50), 0);
        let err = guarded.search_web("q").await.unwrap_err();
        assert_eq!(err.tool, "search_web");
        assert!(err.reason.contains("timed out after 50ms"), "{err}");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
