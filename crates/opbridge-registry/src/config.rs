//! Host configuration.
//!
//! [`HostConfig`] decides which capabilities the host grants and how the
//! default operation implementations behave.  Defaults mirror a trusted
//! local embedding: filesystem and network allowed, paths used as given.

use std::path::PathBuf;

use serde::Deserialize;

/// Capability grants and limits for the default host operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// When set, relative paths resolve against this directory and any path
    /// that escapes it is rejected.
    ///
    /// Default: **none** (paths are used exactly as the script supplies them).
    pub root_dir: Option<PathBuf>,

    /// Whether the file operations are registered at all.
    ///
    /// Default: **true**.
    pub allow_fs: bool,

    /// Whether `fetch` is registered at all.
    ///
    /// Default: **true**.
    pub allow_network: bool,

    /// Timeout applied to a single fetch, in seconds.
    ///
    /// Default: **30**.
    pub fetch_timeout_secs: u64,

    /// Maximum accepted response body size, in bytes.
    ///
    /// Default: **1 MiB**.
    pub max_body_bytes: usize,

    /// User agent sent with every fetch.
    pub user_agent: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            allow_fs: true,
            allow_network: true,
            fetch_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
            user_agent: format!("opbridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HostConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Confine file operations to `dir`.
    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(dir.into());
        self
    }

    /// Enable or disable the file operations.
    pub fn with_allow_fs(mut self, allow: bool) -> Self {
        self.allow_fs = allow;
        self
    }

    /// Enable or disable `fetch`.
    pub fn with_allow_network(mut self, allow: bool) -> Self {
        self.allow_network = allow;
        self
    }

    /// Set the fetch timeout (in seconds).
    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    /// Set the maximum accepted response body size (in bytes).
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HostConfig::default();
        assert!(cfg.root_dir.is_none());
        assert!(cfg.allow_fs);
        assert!(cfg.allow_network);
        assert_eq!(cfg.fetch_timeout_secs, 30);
        assert_eq!(cfg.max_body_bytes, 1024 * 1024);
        assert!(cfg.user_agent.starts_with("opbridge/"));
    }

    #[test]
    fn builder_chaining() {
        let cfg = HostConfig::new()
            .with_root_dir("/srv/scripts")
            .with_allow_fs(false)
            .with_allow_network(false)
            .with_fetch_timeout_secs(5)
            .with_max_body_bytes(512);
        assert_eq!(cfg.root_dir, Some(PathBuf::from("/srv/scripts")));
        assert!(!cfg.allow_fs);
        assert!(!cfg.allow_network);
        assert_eq!(cfg.fetch_timeout_secs, 5);
        assert_eq!(cfg.max_body_bytes, 512);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: HostConfig = toml::from_str("allow_network = false\n").unwrap();
        assert!(!cfg.allow_network);
        assert!(cfg.allow_fs);
        assert_eq!(cfg.fetch_timeout_secs, 30);
    }
}
