// src/config.rs
//! Service configuration.
//!
//! Resolution order:
//! 1) `$MARKET_INTEL_CONFIG` (must point to an existing file)
//! 2) `config/market_intel.toml`
//! 3) built-in defaults
//!
//! Environment overrides are applied on top (see [`AppConfig::apply_env`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::pipeline::EngineOptions;

pub const ENV_CONFIG_PATH: &str = "MARKET_INTEL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/market_intel.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolsMode {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub mode: ToolsMode,
    /// Tool server base url, used when `mode = "remote"`.
    pub base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    /// Mount the `/tool/*` routes next to the API.
    pub expose_server: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mode: ToolsMode::Local,
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 10_000,
            retries: 1,
            expose_server: true,
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub concurrent_fanout: bool,
    pub extractor_parallelism: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let d = EngineOptions::default();
        Self {
            concurrent_fanout: d.concurrent_fanout,
            extractor_parallelism: d.extractor_parallelism,
        }
    }
}

impl PipelineConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            concurrent_fanout: self.concurrent_fanout,
            extractor_parallelism: self.extractor_parallelism.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sqlite_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            sqlite_path: PathBuf::from("storage/reports.db"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub pipeline: PipelineConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load from an explicit TOML file (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load using env var + fallbacks, then apply env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// Overrides: TOOLS_MODE, TOOLS_BASE_URL, TOOL_TIMEOUT_MS, TOOL_RETRIES,
    /// REPORT_STORE, REPORT_DB_PATH.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_nonempty("TOOLS_MODE") {
            self.tools.mode = match v.to_ascii_lowercase().as_str() {
                "local" => ToolsMode::Local,
                "remote" => ToolsMode::Remote,
                other => bail!("TOOLS_MODE must be `local` or `remote`, got `{other}`"),
            };
        }
        if let Some(v) = env_nonempty("TOOLS_BASE_URL") {
            self.tools.base_url = v;
        }
        if let Some(v) = env_nonempty("TOOL_TIMEOUT_MS") {
            self.tools.timeout_ms = v
                .parse()
                .with_context(|| format!("TOOL_TIMEOUT_MS is not a number: {v}"))?;
        }
        if let Some(v) = env_nonempty("TOOL_RETRIES") {
            self.tools.retries = v
                .parse()
                .with_context(|| format!("TOOL_RETRIES is not a number: {v}"))?;
        }
        if let Some(v) = env_nonempty("REPORT_STORE") {
            self.store.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "sqlite" => StoreBackend::Sqlite,
                other => bail!("REPORT_STORE must be `memory` or `sqlite`, got `{other}`"),
            };
        }
        if let Some(v) = env_nonempty("REPORT_DB_PATH") {
            self.store.sqlite_path = PathBuf::from(v);
        }
        Ok(())
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let cfg: AppConfig = toml::from_str(
            r#"
[tools]
mode = "remote"
timeout_ms = 2500

[store]
backend = "memory"
"#,
        )
        .unwrap();
        assert_eq!(cfg.tools.mode, ToolsMode::Remote);
        assert_eq!(cfg.tools.timeout(), Duration::from_millis(2500));
        assert_eq!(cfg.tools.retries, 1);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.sqlite_path, PathBuf::from("storage/reports.db"));
        assert_eq!(cfg.pipeline, PipelineConfig::default());
    }

    #[test]
    fn reports_persist_to_sqlite_by_default() {
        let store = AppConfig::default().store;
        assert_eq!(store.backend, StoreBackend::Sqlite);
        assert_eq!(store.sqlite_path, PathBuf::from("storage/reports.db"));
    }

    #[test]
    fn zero_parallelism_is_clamped_to_one() {
        let p = PipelineConfig {
            concurrent_fanout: true,
            extractor_parallelism: 0,
        };
        assert_eq!(p.engine_options().extractor_parallelism, 1);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let res: std::result::Result<AppConfig, _> =
            toml::from_str("[tools]\nmode = \"carrier-pigeon\"");
        assert!(res.is_err());
    }
}
