// src/tools/server.rs
//! Tool server: exposes a [`ToolSet`] over HTTP so pipelines elsewhere can use
//! [`super::HttpTools`] against it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::SharedTools;
use crate::error::ToolUnavailable;
use crate::model::{Entities, ImpactResult, Item, Report, ReportPayload};

#[derive(Clone)]
struct ToolServerState {
    tools: SharedTools,
}

pub fn router(tools: SharedTools) -> Router {
    Router::new()
        .route("/tool/search_web", post(search_web))
        .route("/tool/fetch_url", post(fetch_url))
        .route("/tool/clean_extract", post(clean_extract))
        .route("/tool/extract_entities", post(extract_entities))
        .route("/tool/dedupe_items", post(dedupe_items))
        .route("/tool/impact_score", post(impact_score))
        .route("/tool/generate_market_report", post(generate_market_report))
        .route("/tool/health", get(health))
        .with_state(ToolServerState { tools })
}

struct ToolFailure(ToolUnavailable);

impl IntoResponse for ToolFailure {
    fn into_response(self) -> Response {
        tracing::warn!(
            target: "tools",
            tool = self.0.tool,
            error = %self.0,
            "tool server call failed"
        );
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<ToolUnavailable> for ToolFailure {
    fn from(e: ToolUnavailable) -> Self {
        ToolFailure(e)
    }
}

type ToolReply<T> = Result<Json<T>, ToolFailure>;

fn log_call(tool: &'static str) {
    tracing::info!(target: "tools", tool, "tool server call");
}

#[derive(Deserialize)]
struct SearchReq {
    query: String,
}

async fn search_web(
    State(st): State<ToolServerState>,
    Json(req): Json<SearchReq>,
) -> ToolReply<Vec<Item>> {
    log_call("search_web");
    Ok(Json(st.tools.search_web(&req.query).await?))
}

#[derive(Deserialize)]
struct FetchReq {
    url: String,
}

async fn fetch_url(
    State(st): State<ToolServerState>,
    Json(req): Json<FetchReq>,
) -> ToolReply<String> {
    log_call("fetch_url");
    Ok(Json(st.tools.fetch_url(&req.url).await?))
}

#[derive(Deserialize)]
struct CleanReq {
    raw_text: String,
}

async fn clean_extract(
    State(st): State<ToolServerState>,
    Json(req): Json<CleanReq>,
) -> ToolReply<String> {
    log_call("clean_extract");
    Ok(Json(st.tools.clean_extract(&req.raw_text).await?))
}

#[derive(Deserialize)]
struct EntityReq {
    text: String,
}

async fn extract_entities(
    State(st): State<ToolServerState>,
    Json(req): Json<EntityReq>,
) -> ToolReply<Entities> {
    log_call("extract_entities");
    Ok(Json(st.tools.extract_entities(&req.text).await?))
}

#[derive(Deserialize)]
struct DedupeReq {
    items: Vec<Item>,
}

async fn dedupe_items(
    State(st): State<ToolServerState>,
    Json(req): Json<DedupeReq>,
) -> ToolReply<Vec<Item>> {
    log_call("dedupe_items");
    Ok(Json(st.tools.dedupe_items(&req.items).await?))
}

#[derive(Deserialize)]
struct ImpactReq {
    item: Item,
    context: String,
}

async fn impact_score(
    State(st): State<ToolServerState>,
    Json(req): Json<ImpactReq>,
) -> ToolReply<ImpactResult> {
    log_call("impact_score");
    Ok(Json(st.tools.impact_score(&req.item, &req.context).await?))
}

#[derive(Deserialize)]
struct ReportReq {
    data: ReportPayload,
}

async fn generate_market_report(
    State(st): State<ToolServerState>,
    Json(req): Json<ReportReq>,
) -> ToolReply<Report> {
    log_call("generate_market_report");
    Ok(Json(st.tools.generate_market_report(&req.data).await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "Tool server is running" }))
}
