// tests/dedupe.rs
// dedupe_items is on the tool boundary but no stage calls it yet.

use market_intel::model::Item;
use market_intel::tools::{LocalTools, ToolSet};

fn sample() -> Vec<Item> {
    vec![
        Item::new("a1", "https://a"),
        Item::new("b1", "https://b"),
        Item::new("a2", "https://a"),
        Item::new("none", ""),
        Item::new("c1", "https://c"),
        Item::new("b2", "https://b"),
    ]
}

#[tokio::test]
async fn dedupe_is_idempotent() {
    let tools = LocalTools::new();
    let once = tools.dedupe_items(&sample()).await.unwrap();
    let twice = tools.dedupe_items(&once).await.unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn dedupe_keeps_first_seen_order_by_url() {
    let tools = LocalTools::new();
    let out = tools.dedupe_items(&sample()).await.unwrap();
    let titles: Vec<&str> = out.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["a1", "b1", "c1"]);
}

#[tokio::test]
async fn pipeline_does_not_dedupe_collected_items() {
    // Same url twice in search results still yields two sources.
    let tools = LocalTools::new();
    let items = vec![Item::new("x", "https://a"), Item::new("y", "https://a")];
    let deduped = tools.dedupe_items(&items).await.unwrap();
    assert_eq!(deduped.len(), 1);

    let shared: market_intel::tools::SharedTools = std::sync::Arc::new(tools);
    let out = market_intel::pipeline::stages::extractor::run(
        &shared,
        market_intel::pipeline::state::ExtractorInput {
            collected_items: &items,
        },
        1,
    )
    .await
    .unwrap();
    assert_eq!(out.sources.len(), 2);
}
