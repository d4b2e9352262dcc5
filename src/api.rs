// src/api.rs
//! HTTP surface: `/health`, `/analyze`, `/chat`.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use metrics::counter;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::chat::{self, ChatReply};
use crate::error::ApiError;
use crate::model::StoredReport;
use crate::pipeline::{PipelineEngine, PipelineInput};
use crate::store::{MemoryReportStore, SharedStore};
use crate::tools::LocalTools;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PipelineEngine>,
    pub store: SharedStore,
}

impl AppState {
    pub fn new(engine: PipelineEngine, store: SharedStore) -> Self {
        Self {
            engine: Arc::new(engine),
            store,
        }
    }

    /// Local stand-in tools + in-memory store. Handy for tests and demos.
    pub fn local() -> Self {
        Self::new(
            PipelineEngine::new(Arc::new(LocalTools::new())),
            Arc::new(MemoryReportStore::new()),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/chat", post(chat_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub industry: String,
    pub from_date: String,
    pub to_date: String,
    /// Accepted for compatibility; the pipeline does not use it.
    #[serde(default)]
    pub focus: Option<String>,
}

impl AnalyzeRequest {
    /// Boundary validation: non-blank industry, ISO dates, ordered window.
    pub fn validate(self) -> Result<PipelineInput, ApiError> {
        let industry = self.industry.trim().to_string();
        if industry.is_empty() {
            return Err(ApiError::MalformedInput(
                "industry must not be empty".to_string(),
            ));
        }
        let from = parse_date("from_date", &self.from_date)?;
        let to = parse_date("to_date", &self.to_date)?;
        if from > to {
            return Err(ApiError::MalformedInput(format!(
                "from_date {from} is after to_date {to}"
            )));
        }
        Ok(PipelineInput {
            industry,
            from_date: from.to_string(),
            to_date: to.to_string(),
        })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::MalformedInput(format!("{field} must be a YYYY-MM-DD date, got `{raw}`"))
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub report_id: String,
    pub question: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "Market Intelligence API is running" }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<StoredReport>, ApiError> {
    if let Some(focus) = body.focus.as_deref() {
        tracing::debug!(target: "api", %focus, "focus is not used by the pipeline");
    }
    let input = body.validate()?;

    // Persist only after the whole run succeeded.
    let report = state.engine.run_report(input).await?;
    let report_id = state.store.put(&report).await?;
    counter!("reports_stored_total").increment(1);
    tracing::info!(
        target: "api",
        %report_id,
        backend = state.store.backend(),
        "report stored"
    );

    Ok(Json(StoredReport { report_id, report }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = chat::answer(state.store.as_ref(), &body.report_id, &body.question).await?;
    Ok(Json(reply))
}
