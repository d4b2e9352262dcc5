// src/pipeline/stages/extractor.rs
//! Extractor: fetch → clean → extract entities for every item with a url.
//!
//! `competitors` is a set union, so completion order never matters.
//! `sources` lists every processed url in item order, duplicates included.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::ToolUnavailable;
use crate::model::Entities;
use crate::pipeline::state::{ExtractorInput, ExtractorOutput};
use crate::tools::{SharedTools, ToolResult, ToolSet};

async fn process_url(tools: &dyn ToolSet, url: &str) -> ToolResult<Entities> {
    let raw = tools.fetch_url(url).await?;
    let cleaned = tools.clean_extract(&raw).await?;
    tools.extract_entities(&cleaned).await
}

/// Run the extractor. `parallelism <= 1` processes items one after another.
pub async fn run(
    tools: &SharedTools,
    input: ExtractorInput<'_>,
    parallelism: usize,
) -> ToolResult<ExtractorOutput> {
    let sources: Vec<String> = input
        .collected_items
        .iter()
        .filter(|it| !it.url.is_empty())
        .map(|it| it.url.clone())
        .collect();

    let skipped = input.collected_items.len() - sources.len();
    if skipped > 0 {
        tracing::debug!(target: "pipeline", skipped, "items without url skipped");
    }

    let mut competitors = BTreeSet::new();
    if parallelism <= 1 {
        for url in &sources {
            let ents = process_url(tools.as_ref(), url).await?;
            competitors.extend(ents.competitors);
        }
    } else {
        let permits = Arc::new(Semaphore::new(parallelism));
        let mut set = JoinSet::new();
        for url in sources.iter().cloned() {
            let tools = Arc::clone(tools);
            let permits = Arc::clone(&permits);
            set.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ToolUnavailable::new("extractor", e.to_string()))?;
                process_url(tools.as_ref(), &url).await
            });
        }
        // Returning early drops the set, which aborts the remaining tasks.
        while let Some(joined) = set.join_next().await {
            let ents = joined
                .map_err(|e| ToolUnavailable::new("extractor", format!("worker failed: {e}")))??;
            competitors.extend(ents.competitors);
        }
    }

    Ok(ExtractorOutput {
        competitors: competitors.into_iter().collect(),
        sources,
    })
}
