// src/pipeline/stages/impact.rs
//! Impact: score every collected item (raw list, not the extractor's output),
//! keeping input order.

use crate::pipeline::state::{ImpactInput, ImpactOutput};
use crate::tools::{ToolResult, ToolSet};

pub async fn run(tools: &dyn ToolSet, input: ImpactInput<'_>) -> ToolResult<ImpactOutput> {
    let mut impact_radar = Vec::with_capacity(input.collected_items.len());
    for item in input.collected_items {
        impact_radar.push(tools.impact_score(item, input.context).await?);
    }
    Ok(ImpactOutput { impact_radar })
}
