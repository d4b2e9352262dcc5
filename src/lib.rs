// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod api;
pub mod bootstrap;
pub mod chat;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod tools;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::bootstrap::ServiceRuntime;
pub use crate::error::{ApiError, PipelineError, StoreError, ToolUnavailable};
pub use crate::pipeline::{PipelineEngine, PipelineInput, PipelineState};
