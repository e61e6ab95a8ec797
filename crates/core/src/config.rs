//! Application configuration handling.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the user config root holding our files.
pub const CONFIG_DIR: &str = "realtyxr";
/// Configuration file name.
pub const CONFIG_FILE: &str = "config.json";

/// Simulated backend latency per call kind, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatencyProfile {
    /// Latency of the property list call.
    pub list_ms: u64,
    /// Latency of point lookups and compliance checks.
    pub lookup_ms: u64,
    /// Latency of the network status call.
    pub status_ms: u64,
    /// Latency of the purchase call (simulated chain confirmation).
    pub purchase_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list_ms: 100,
            lookup_ms: 50,
            status_ms: 30,
            purchase_ms: 2_000,
        }
    }
}

impl LatencyProfile {
    /// Zero latency everywhere; used by tests.
    pub fn none() -> Self {
        Self {
            list_ms: 0,
            lookup_ms: 0,
            status_ms: 0,
            purchase_ms: 0,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Latency applied to simulated backend calls.
    #[serde(default)]
    pub latency: LatencyProfile,
    /// Upper bound on a purchase call before the invest flow gives up.
    #[serde(default = "default_purchase_timeout_secs")]
    pub purchase_timeout_secs: u64,
    /// Dwell time before the gaze reticle fuses into a selection.
    #[serde(default = "default_gaze_fuse_ms")]
    pub gaze_fuse_ms: u64,
    /// Poll interval of the background network monitor.
    #[serde(default = "default_network_poll_secs")]
    pub network_poll_secs: u64,
}

fn default_purchase_timeout_secs() -> u64 {
    30
}

fn default_gaze_fuse_ms() -> u64 {
    1_500
}

fn default_network_poll_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            latency: LatencyProfile::default(),
            purchase_timeout_secs: default_purchase_timeout_secs(),
            gaze_fuse_ms: default_gaze_fuse_ms(),
            network_poll_secs: default_network_poll_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location, overlaying
    /// `REALTYXR_*` environment variables.
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file_path() {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }
        let raw = builder
            .add_source(config::Environment::with_prefix("REALTYXR").separator("__"))
            .build()
            .context("failed to build configuration")?;
        raw.try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("failed to read {}", path.display()))?;
        raw.try_deserialize()
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Write a default configuration file when none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_file_path().context("could not determine config directory")?;
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(&path, serialized).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(path)
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_applied_for_missing_fields() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "purchase_timeout_secs": 5 }"#)?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.purchase_timeout_secs, 5);
        assert_eq!(config.gaze_fuse_ms, default_gaze_fuse_ms());
        assert_eq!(config.latency.purchase_ms, LatencyProfile::default().purchase_ms);
        Ok(())
    }

    #[test]
    fn full_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");

        let config = AppConfig {
            latency: LatencyProfile::none(),
            network_poll_secs: 3,
            ..AppConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;

        let loaded = AppConfig::load_from(&path)?;
        assert_eq!(loaded.network_poll_secs, 3);
        assert_eq!(loaded.latency.purchase_ms, 0);
        Ok(())
    }
}
