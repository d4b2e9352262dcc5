// src/pipeline/mod.rs
//! Market intelligence pipeline: Collector → Extractor → Impact → Writer.

pub mod engine;
pub mod stages;
pub mod state;

use std::fmt;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

pub use engine::{EngineOptions, PipelineEngine};
pub use state::{PipelineInput, PipelineState, StateDelta};

/// The four stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Collector,
    Extractor,
    Impact,
    Writer,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [
        Stage::Collector,
        Stage::Extractor,
        Stage::Impact,
        Stage::Writer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Collector => "collector",
            Stage::Extractor => "extractor",
            Stage::Impact => "impact",
            Stage::Writer => "writer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Pipeline runs started.");
        describe_counter!(
            "pipeline_failures_total",
            "Pipeline runs that ended in an error."
        );
        describe_histogram!(
            "pipeline_stage_ms",
            "Stage wall time in milliseconds, by stage."
        );
    });
}
