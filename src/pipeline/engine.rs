// src/pipeline/engine.rs
//! # Pipeline Engine
//! Runs Collector → Extractor → Impact → Writer over a typed accumulator.
//!
//! Each stage gets a read-only view of the state, returns a delta, and the
//! engine merges it. The engine is the only writer of the accumulator. With
//! `concurrent_fanout`, Extractor and Impact run side by side on the same
//! snapshot and both deltas are merged (Extractor first) before Writer runs.
//!
//! Any stage error aborts the run; nothing partial is returned.

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};

use super::stages::{collector, extractor, impact, writer};
use super::state::{PipelineInput, PipelineState, StateDelta};
use super::Stage;
use crate::error::PipelineError;
use crate::model::Report;
use crate::tools::{SharedTools, ToolSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Run Extractor and Impact concurrently (fan-out/fan-in before Writer).
    pub concurrent_fanout: bool,
    /// Max in-flight items inside Extractor; 1 means sequential.
    pub extractor_parallelism: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            concurrent_fanout: false,
            extractor_parallelism: 1,
        }
    }
}

pub struct PipelineEngine {
    tools: SharedTools,
    opts: EngineOptions,
}

impl PipelineEngine {
    pub fn new(tools: SharedTools) -> Self {
        Self::with_options(tools, EngineOptions::default())
    }

    pub fn with_options(tools: SharedTools, opts: EngineOptions) -> Self {
        super::ensure_metrics_described();
        Self { tools, opts }
    }

    /// Run all four stages and return the terminal state.
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineState, PipelineError> {
        counter!("pipeline_runs_total").increment(1);
        let t0 = Instant::now();
        let industry = input.industry.clone();

        let res = self.run_stages(PipelineState::from(input)).await;

        let ms = t0.elapsed().as_millis() as u64;
        match &res {
            Ok(st) => tracing::info!(
                target: "pipeline",
                %industry,
                items = st.collected_items.as_ref().map_or(0, Vec::len),
                competitors = st.competitors.as_ref().map_or(0, Vec::len),
                ms,
                "pipeline run finished"
            ),
            Err(e) => {
                counter!("pipeline_failures_total").increment(1);
                tracing::warn!(
                    target: "pipeline",
                    %industry,
                    error = %e,
                    ms,
                    "pipeline run failed"
                );
            }
        }
        res
    }

    /// Run the pipeline and hand back only the report.
    pub async fn run_report(&self, input: PipelineInput) -> Result<Report, PipelineError> {
        let state = self.run(input).await?;
        state.final_report.ok_or(PipelineError::MissingState {
            stage: Stage::Writer.as_str(),
            field: "final_report",
        })
    }

    async fn run_stages(&self, state: PipelineState) -> Result<PipelineState, PipelineError> {
        let tools = self.tools.as_ref();

        let collected = timed(Stage::Collector, collect(tools, &state)).await?;
        let state = state.merge(collected);

        let state = if self.opts.concurrent_fanout {
            let (extracted, scored) = tokio::try_join!(
                timed(Stage::Extractor, self.extract(&state)),
                timed(Stage::Impact, score(tools, &state)),
            )?;
            state.merge(extracted).merge(scored)
        } else {
            let extracted = timed(Stage::Extractor, self.extract(&state)).await?;
            let state = state.merge(extracted);
            let scored = timed(Stage::Impact, score(tools, &state)).await?;
            state.merge(scored)
        };

        let written = timed(Stage::Writer, write(tools, &state)).await?;
        Ok(state.merge(written))
    }

    async fn extract(&self, state: &PipelineState) -> Result<StateDelta, PipelineError> {
        let input = state.extractor_input()?;
        let out = extractor::run(&self.tools, input, self.opts.extractor_parallelism).await?;
        Ok(out.into())
    }
}

async fn collect(tools: &dyn ToolSet, state: &PipelineState) -> Result<StateDelta, PipelineError> {
    let out = collector::run(tools, state.collector_input()).await?;
    Ok(out.into())
}

async fn score(tools: &dyn ToolSet, state: &PipelineState) -> Result<StateDelta, PipelineError> {
    let out = impact::run(tools, state.impact_input()?).await?;
    Ok(out.into())
}

async fn write(tools: &dyn ToolSet, state: &PipelineState) -> Result<StateDelta, PipelineError> {
    let out = writer::run(tools, state.writer_input()?).await?;
    Ok(out.into())
}

/// Time a stage, record it, and check the delta belongs to that stage.
async fn timed<F>(stage: Stage, fut: F) -> Result<StateDelta, PipelineError>
where
    F: Future<Output = Result<StateDelta, PipelineError>>,
{
    let t0 = Instant::now();
    let res = fut.await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("pipeline_stage_ms", "stage" => stage.as_str()).record(ms);

    match &res {
        Ok(delta) => {
            debug_assert_eq!(delta.stage(), stage, "stage wrote fields it does not own");
            tracing::debug!(target: "pipeline", %stage, ms, "stage done");
        }
        Err(e) => tracing::warn!(target: "pipeline", %stage, error = %e, "stage failed"),
    }
    res
}
