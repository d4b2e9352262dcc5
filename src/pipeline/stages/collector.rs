// src/pipeline/stages/collector.rs
//! Collector: turns the request into a search query and returns what the
//! search tool found.

use crate::pipeline::state::{CollectorInput, CollectorOutput};
use crate::tools::{ToolResult, ToolSet};

pub fn build_query(input: CollectorInput<'_>) -> String {
    format!(
        "{} regulatory updates between {} and {}",
        input.industry, input.from_date, input.to_date
    )
}

pub async fn run(tools: &dyn ToolSet, input: CollectorInput<'_>) -> ToolResult<CollectorOutput> {
    let query = build_query(input);
    tracing::debug!(target: "pipeline", %query, "collector search");
    let collected_items = tools.search_web(&query).await?;
    Ok(CollectorOutput { collected_items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::LocalTools;

    fn input() -> CollectorInput<'static> {
        CollectorInput {
            industry: "NBFC",
            from_date: "2024-01-01",
            to_date: "2024-03-31",
        }
    }

    #[test]
    fn query_names_industry_and_window() {
        assert_eq!(
            build_query(input()),
            "NBFC regulatory updates between 2024-01-01 and 2024-03-31"
        );
    }

    #[tokio::test]
    async fn returns_search_results_verbatim() {
        let out = run(&LocalTools::new(), input()).await.unwrap();
        assert_eq!(out.collected_items.len(), 3);
        assert!(out.collected_items[0]
            .title
            .starts_with("NBFC regulatory updates between"));
    }
}
