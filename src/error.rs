// src/error.rs
//! Error taxonomy: tool failures, pipeline failures, store failures, and the
//! HTTP boundary error that maps all of them onto status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// A tool collaborator call failed, timed out, or answered with garbage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("tool `{tool}` unavailable: {reason}")]
pub struct ToolUnavailable {
    pub tool: &'static str,
    pub reason: String,
}

impl ToolUnavailable {
    pub fn new(tool: &'static str, reason: impl Into<String>) -> Self {
        Self {
            tool,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    ToolUnavailable(#[from] ToolUnavailable),

    /// A stage asked for a field no earlier stage has written.
    #[error("stage `{stage}` needs `{field}`, which is not in the pipeline state yet")]
    MissingState {
        stage: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report store backend error: {0}")]
    Backend(String),

    #[error("report (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Error returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::ToolUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::MissingState { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::MalformedInput(msg) => msg.clone(),
            ApiError::Pipeline(e) => {
                tracing::error!(target: "api", error = %e, "pipeline run failed");
                e.to_string()
            }
            ApiError::Store(e) => {
                tracing::error!(target: "api", error = %e, "report store failed");
                "Internal server error".to_string()
            }
        };

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
