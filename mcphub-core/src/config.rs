//! Hub configuration (`config.yaml`)
//!
//! Looked up in the platform config directory unless a path is given.
//! Missing files fall back to defaults; command-line flags override both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::catalog::{DEFAULT_CATALOG_PATH, DEFAULT_SUBMISSION_REPOSITORY};

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Local catalog document maintained by `add` and `validate`
    pub catalog_path: PathBuf,

    /// Published catalog, used by `search --remote`
    pub catalog_url: Option<String>,

    /// Repository submissions are filed against
    pub submission_repository: String,

    /// Freshness window for fetched catalogs, in seconds
    pub cache_ttl_secs: u64,

    /// Where fetched catalogs are persisted; the platform cache dir when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            catalog_url: None,
            submission_repository: DEFAULT_SUBMISSION_REPOSITORY.to_string(),
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
            cache_dir: None,
        }
    }
}

impl HubConfig {
    /// Load from `path` if given, else from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match Self::default_config_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    tracing::debug!("No config directory available, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load from a specific path, using defaults when the file does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Invalid config YAML")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).context("Failed to serialize config")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Configured cache directory, else `<cache dir>/mcphub`
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(|| {
            directories::ProjectDirs::from("io", "network-mcp-hub", "mcphub")
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .or_else(|| dirs::cache_dir().map(|d| d.join("mcphub")))
        })
    }

    /// `<config dir>/mcphub/config.yaml`, if the platform has a config dir
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "network-mcp-hub", "mcphub")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("mcphub")))
            .map(|dir| dir.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = HubConfig::load(Some(&temp_dir.path().join("config.yaml"))).unwrap();
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = HubConfig::from_yaml(
            r#"
catalog_url: https://seefor.github.io/network-mcp-hub/data/servers.json
cache_ttl_secs: 60
"#,
        )
        .unwrap();

        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(config.cache_ttl_secs, 60);
        assert!(config.catalog_url.is_some());
    }

    #[test]
    fn test_configured_cache_dir_wins() {
        let config = HubConfig::from_yaml("cache_dir: /tmp/mcphub-cache\n").unwrap();
        assert_eq!(
            config.resolved_cache_dir(),
            Some(PathBuf::from("/tmp/mcphub-cache"))
        );
        assert_eq!(HubConfig::default().cache_dir, None);
    }

    #[test]
    fn test_roundtrip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let config = HubConfig {
            catalog_path: PathBuf::from("site/servers.json"),
            ..HubConfig::default()
        };
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        assert_eq!(HubConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "cache_ttl_secs: [not, a, number]").unwrap();

        let err = HubConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
