// src/pipeline/stages/writer.rs
//! Writer: hands competitors, impact radar and sources to the report tool and
//! returns its report as-is.

use crate::model::ReportPayload;
use crate::pipeline::state::{WriterInput, WriterOutput};
use crate::tools::{ToolResult, ToolSet};

pub async fn run(tools: &dyn ToolSet, input: WriterInput<'_>) -> ToolResult<WriterOutput> {
    let payload = ReportPayload {
        competitors: input.competitors.to_vec(),
        impact_radar: input.impact_radar.to_vec(),
        sources: input.sources.to_vec(),
    };
    let final_report = tools.generate_market_report(&payload).await?;
    Ok(WriterOutput { final_report })
}
