// src/tools/remote.rs
//! HTTP client for a remote tool server (`POST {base}/tool/<name>`).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{ToolResult, ToolSet};
use crate::error::ToolUnavailable;
use crate::model::{Entities, ImpactResult, Item, Report, ReportPayload};

pub struct HttpTools {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTools {
    /// `base_url` without the `/tool` suffix, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> ToolResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("market-intel/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .build()
            .map_err(|e| ToolUnavailable::new("http_client", e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(&self, tool: &'static str, body: &Value) -> ToolResult<T> {
        let url = format!("{}/tool/{}", self.base_url, tool);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ToolUnavailable::new(tool, format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ToolUnavailable::new(
                tool,
                format!("tool server answered {status}: {detail}"),
            ));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ToolUnavailable::new(tool, format!("undecodable response: {e}")))
    }
}

#[async_trait]
impl ToolSet for HttpTools {
    async fn search_web(&self, query: &str) -> ToolResult<Vec<Item>> {
        self.post("search_web", &json!({ "query": query })).await
    }

    async fn fetch_url(&self, url: &str) -> ToolResult<String> {
        self.post("fetch_url", &json!({ "url": url })).await
    }

    async fn clean_extract(&self, raw_text: &str) -> ToolResult<String> {
        self.post("clean_extract", &json!({ "raw_text": raw_text })).await
    }

    async fn extract_entities(&self, text: &str) -> ToolResult<Entities> {
        self.post("extract_entities", &json!({ "text": text })).await
    }

    async fn dedupe_items(&self, items: &[Item]) -> ToolResult<Vec<Item>> {
        self.post("dedupe_items", &json!({ "items": items })).await
    }

    async fn impact_score(&self, item: &Item, context: &str) -> ToolResult<ImpactResult> {
        self.post("impact_score", &json!({ "item": item, "context": context })).await
    }

    async fn generate_market_report(&self, data: &ReportPayload) -> ToolResult<Report> {
        self.post("generate_market_report", &json!({ "data": data })).await
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
