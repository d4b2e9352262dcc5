// tests/pipeline_e2e.rs
// End-to-end pipeline runs over the local stand-in tools.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use market_intel::model::ImpactLevel;
use market_intel::pipeline::EngineOptions;
use market_intel::tools::local::SEARCH_URLS;
use market_intel::tools::{LocalTools, SharedTools};
use market_intel::{PipelineEngine, PipelineError};

#[tokio::test]
async fn nbfc_scenario_runs_all_four_stages() {
    let engine = PipelineEngine::new(Arc::new(LocalTools::new()));
    let st = engine.run(common::nbfc_input()).await.expect("pipeline run");

    // Collector
    let items = st.collected_items.as_ref().expect("collected_items");
    assert_eq!(items.len(), 3);
    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, SEARCH_URLS.to_vec());

    // Extractor
    let competitors = st.competitors.as_ref().expect("competitors");
    assert!(competitors.iter().any(|c| c == "Bajaj Finserv"));
    let sources = st.sources.as_ref().expect("sources");
    assert_eq!(sources, &SEARCH_URLS.map(String::from).to_vec());

    // Impact
    let radar = st.impact_radar.as_ref().expect("impact_radar");
    assert_eq!(radar.len(), 3);
    for (r, it) in radar.iter().zip(items) {
        assert_eq!(r.impact_level, ImpactLevel::High);
        assert_eq!(r.score, 85);
        assert_eq!(r.event, it.title);
    }

    // Writer
    let report = st.final_report.as_ref().expect("final_report");
    assert_eq!(&report.competitors, competitors);
    assert_eq!(&report.sources, sources);
    assert_eq!(&report.impact_radar, radar);
    assert_eq!(report.risks.len(), 5);
}

#[tokio::test]
async fn quiet_pages_produce_no_competitors() {
    let mut tools = LocalTools::new();
    for url in SEARCH_URLS {
        tools = tools.with_page(url, "<html><p>Weather and sport only.</p></html>");
    }
    let engine = PipelineEngine::new(Arc::new(tools));
    let report = engine.run_report(common::nbfc_input()).await.unwrap();
    assert!(report.competitors.is_empty());
    assert_eq!(report.sources.len(), 3);
}

#[tokio::test]
async fn a_failing_stage_aborts_the_run_before_writer() {
    let tools = Arc::new(common::BrokenTool::new("fetch_url"));
    let engine = PipelineEngine::new(tools.clone());
    let err = engine.run(common::nbfc_input()).await.unwrap_err();
    match err {
        PipelineError::ToolUnavailable(e) => assert_eq!(e.tool, "fetch_url"),
        other => panic!("expected ToolUnavailable, got {other:?}"),
    }
    assert_eq!(tools.report_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fanout_failure_is_still_fatal() {
    let tools = Arc::new(common::BrokenTool::new("impact_score"));
    let engine = PipelineEngine::with_options(
        tools.clone(),
        EngineOptions {
            concurrent_fanout: true,
            extractor_parallelism: 2,
        },
    );
    assert!(engine.run(common::nbfc_input()).await.is_err());
    assert_eq!(tools.report_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn every_engine_mode_agrees() {
    let tools: SharedTools = Arc::new(LocalTools::new());
    let baseline = PipelineEngine::new(tools.clone())
        .run(common::nbfc_input())
        .await
        .unwrap();
    for (fanout, par) in [(false, 3), (true, 1), (true, 8)] {
        let st = PipelineEngine::with_options(
            tools.clone(),
            EngineOptions {
                concurrent_fanout: fanout,
                extractor_parallelism: par,
            },
        )
        .run(common::nbfc_input())
        .await
        .unwrap();
        assert_eq!(st, baseline, "fanout={fanout} parallelism={par}");
    }
}
