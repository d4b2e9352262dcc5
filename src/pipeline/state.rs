// src/pipeline/state.rs
//! Typed pipeline state.
//!
//! The accumulator is a plain value. Stages never see it whole: the engine
//! hands each stage a borrowed input view holding only the fields it depends
//! on, and folds the stage's output back in with [`PipelineState::merge`],
//! which consumes the old state and returns the new one.
//!
//! Field ownership:
//! - `collected_items`            ← Collector
//! - `competitors`, `sources`     ← Extractor
//! - `impact_radar`               ← Impact
//! - `final_report`               ← Writer

use serde::{Deserialize, Serialize};

use super::Stage;
use crate::error::PipelineError;
use crate::model::{ImpactResult, Item, Report};

/// Fields the caller provides before any stage runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineInput {
    pub industry: String,
    pub from_date: String,
    pub to_date: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PipelineState {
    pub industry: String,
    pub from_date: String,
    pub to_date: String,
    pub collected_items: Option<Vec<Item>>,
    pub competitors: Option<Vec<String>>,
    pub sources: Option<Vec<String>>,
    pub impact_radar: Option<Vec<ImpactResult>>,
    pub final_report: Option<Report>,
}

impl From<PipelineInput> for PipelineState {
    fn from(input: PipelineInput) -> Self {
        Self {
            industry: input.industry,
            from_date: input.from_date,
            to_date: input.to_date,
            ..Default::default()
        }
    }
}

// ---- Stage input views ----

#[derive(Debug, Clone, Copy)]
pub struct CollectorInput<'a> {
    pub industry: &'a str,
    pub from_date: &'a str,
    pub to_date: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractorInput<'a> {
    pub collected_items: &'a [Item],
}

#[derive(Debug, Clone, Copy)]
pub struct ImpactInput<'a> {
    pub collected_items: &'a [Item],
    /// The industry, passed to the scoring tool as context.
    pub context: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct WriterInput<'a> {
    pub competitors: &'a [String],
    pub impact_radar: &'a [ImpactResult],
    pub sources: &'a [String],
}

// ---- Stage outputs ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorOutput {
    pub collected_items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOutput {
    pub competitors: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactOutput {
    pub impact_radar: Vec<ImpactResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOutput {
    pub final_report: Report,
}

/// A partial update produced by exactly one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateDelta {
    Collected(CollectorOutput),
    Extracted(ExtractorOutput),
    Scored(ImpactOutput),
    Written(WriterOutput),
}

impl StateDelta {
    /// The stage that owns the fields in this delta.
    pub fn stage(&self) -> Stage {
        match self {
            StateDelta::Collected(_) => Stage::Collector,
            StateDelta::Extracted(_) => Stage::Extractor,
            StateDelta::Scored(_) => Stage::Impact,
            StateDelta::Written(_) => Stage::Writer,
        }
    }
}

impl From<CollectorOutput> for StateDelta {
    fn from(o: CollectorOutput) -> Self {
        StateDelta::Collected(o)
    }
}

impl From<ExtractorOutput> for StateDelta {
    fn from(o: ExtractorOutput) -> Self {
        StateDelta::Extracted(o)
    }
}

impl From<ImpactOutput> for StateDelta {
    fn from(o: ImpactOutput) -> Self {
        StateDelta::Scored(o)
    }
}

impl From<WriterOutput> for StateDelta {
    fn from(o: WriterOutput) -> Self {
        StateDelta::Written(o)
    }
}

fn require<'a, T>(
    field: &'a Option<T>,
    stage: Stage,
    name: &'static str,
) -> Result<&'a T, PipelineError> {
    field.as_ref().ok_or(PipelineError::MissingState {
        stage: stage.as_str(),
        field: name,
    })
}

impl PipelineState {
    pub fn collector_input(&self) -> CollectorInput<'_> {
        CollectorInput {
            industry: &self.industry,
            from_date: &self.from_date,
            to_date: &self.to_date,
        }
    }

    pub fn extractor_input(&self) -> Result<ExtractorInput<'_>, PipelineError> {
        let items = require(&self.collected_items, Stage::Extractor, "collected_items")?;
        Ok(ExtractorInput {
            collected_items: items,
        })
    }

    pub fn impact_input(&self) -> Result<ImpactInput<'_>, PipelineError> {
        let items = require(&self.collected_items, Stage::Impact, "collected_items")?;
        Ok(ImpactInput {
            collected_items: items,
            context: &self.industry,
        })
    }

    pub fn writer_input(&self) -> Result<WriterInput<'_>, PipelineError> {
        Ok(WriterInput {
            competitors: require(&self.competitors, Stage::Writer, "competitors")?,
            impact_radar: require(&self.impact_radar, Stage::Writer, "impact_radar")?,
            sources: require(&self.sources, Stage::Writer, "sources")?,
        })
    }

    /// Fold a stage's delta into the state. New fields are added, existing
    /// ones overwritten; nothing is deep-merged.
    pub fn merge(mut self, delta: StateDelta) -> Self {
        match delta {
            StateDelta::Collected(o) => self.collected_items = Some(o.collected_items),
            StateDelta::Extracted(o) => {
                self.competitors = Some(o.competitors);
                self.sources = Some(o.sources);
            }
            StateDelta::Scored(o) => self.impact_radar = Some(o.impact_radar),
            StateDelta::Written(o) => self.final_report = Some(o.final_report),
        }
        self
    }
}
