//! Market Intelligence Service: binary entrypoint.
//! Boots the Axum HTTP server: pipeline API, optional tool server, and metrics.

use market_intel::config::AppConfig;
use market_intel::metrics::Metrics;
use market_intel::ServiceRuntime;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_intel=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Shuttle may have installed a subscriber already; keep theirs if so.
    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already set");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Recorder first, so metric descriptions emitted while wiring are kept.
    let metrics = Metrics::init()?;
    let cfg = AppConfig::load_default()?;
    let runtime = ServiceRuntime::from_config(cfg)?;

    let router = runtime.router().merge(metrics.router());
    Ok(router.into())
}
