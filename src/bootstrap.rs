// src/bootstrap.rs
//! Builds the running service from an [`AppConfig`]: tool set, report store,
//! pipeline engine, and the merged router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::{AppConfig, StoreBackend, ToolsMode};
use crate::pipeline::PipelineEngine;
use crate::store::{MemoryReportStore, SharedStore, SqliteReportStore};
use crate::tools::{self, GuardedTools, HttpTools, LocalTools, SharedTools};

pub struct ServiceRuntime {
    pub cfg: AppConfig,
    /// Unguarded tools, as served on `/tool/*` when enabled.
    pub raw_tools: SharedTools,
    pub state: AppState,
}

impl ServiceRuntime {
    pub fn from_config(cfg: AppConfig) -> anyhow::Result<Self> {
        let raw_tools: SharedTools = match cfg.tools.mode {
            ToolsMode::Local => Arc::new(LocalTools::new()),
            ToolsMode::Remote => Arc::new(
                HttpTools::new(cfg.tools.base_url.clone())
                    .context("building remote tool client")?,
            ),
        };
        let guarded: SharedTools = Arc::new(GuardedTools::with_policy(
            Arc::clone(&raw_tools),
            cfg.tools.timeout(),
            cfg.tools.retries,
        ));

        let store: SharedStore = match cfg.store.backend {
            StoreBackend::Memory => Arc::new(MemoryReportStore::new()),
            StoreBackend::Sqlite => Arc::new(
                SqliteReportStore::open(&cfg.store.sqlite_path)
                    .context("opening sqlite report store")?,
            ),
        };

        let engine = PipelineEngine::with_options(guarded, cfg.pipeline.engine_options());

        info!(
            tools = raw_tools.name(),
            store = store.backend(),
            timeout_ms = cfg.tools.timeout_ms,
            retries = cfg.tools.retries,
            concurrent_fanout = cfg.pipeline.concurrent_fanout,
            "service runtime ready"
        );

        Ok(Self {
            cfg,
            raw_tools,
            state: AppState::new(engine, store),
        })
    }

    /// API routes, plus the tool server when configured.
    pub fn router(&self) -> Router {
        let app = api::router(self.state.clone());
        if !self.cfg.tools.expose_server {
            return app;
        }
        if self.cfg.tools.mode == ToolsMode::Remote {
            warn!("tools.expose_server ignored: tools are remote");
            return app;
        }
        app.merge(tools::server::router(Arc::clone(&self.raw_tools)))
    }
}
