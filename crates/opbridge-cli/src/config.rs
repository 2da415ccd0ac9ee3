//! Host configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use opbridge_registry::HostConfig;
use opbridge_sandbox::BridgeConfig;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "OPBRIDGE_CONFIG";

/// Top-level layout of the TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: HostConfig,
    pub bridge: BridgeConfig,
}

impl AppConfig {
    /// Load from `explicit`, else from `$OPBRIDGE_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let Some(path) = path else {
            tracing::debug!("no configuration file, using defaults");
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.bridge.validate()?;
        Ok(config)
    }
}
