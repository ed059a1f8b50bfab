//! Session engine configuration

use crate::error::{TidewaveError, TidewaveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Product name, used for export file names
    pub product_name: String,

    /// Directory holding the persisted session keys
    pub data_dir: PathBuf,

    /// Simulated latency for search result pages
    pub search_latency_ms: u64,

    /// Simulated latency for external pages
    pub external_latency_ms: u64,

    /// Download progress tick interval
    pub download_tick_ms: u64,

    /// Ad-block counter tick interval
    pub adblock_tick_ms: u64,

    /// Network sample tick interval
    pub network_tick_ms: u64,

    /// Per-tick chance of a simulated block while loading
    pub block_probability: f64,

    /// Per-tick chance of a simulated block in strict mode
    pub strict_block_probability: f64,

    /// Smallest progress step a download makes per tick
    pub download_step_min: u32,

    /// Largest progress step a download makes per tick
    pub download_step_max: u32,

    /// Maximum number of visited-history entries kept
    pub history_limit: usize,

    /// Bookmarks created on first load
    pub seed_bookmarks: Vec<SeedBookmark>,
}

/// Bookmark seeded on first load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedBookmark {
    pub title: String,
    pub url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product_name: "tidewave".to_string(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tidewave"),
            search_latency_ms: 600,
            external_latency_ms: 1500,
            download_tick_ms: 500,
            adblock_tick_ms: 800,
            network_tick_ms: 1000,
            block_probability: 0.35,
            strict_block_probability: 0.6,
            download_step_min: 1,
            download_step_max: 12,
            history_limit: 1000,
            seed_bookmarks: vec![
                SeedBookmark {
                    title: "Wikipedia".to_string(),
                    url: "https://wikipedia.org".to_string(),
                },
                SeedBookmark {
                    title: "GitHub".to_string(),
                    url: "https://github.com".to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> TidewaveResult<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            TidewaveError::config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the simulators cannot work with
    pub fn validate(&self) -> TidewaveResult<()> {
        for (name, p) in [
            ("block_probability", self.block_probability),
            ("strict_block_probability", self.strict_block_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TidewaveError::config(format!(
                    "{} must be within 0..=1, got {}",
                    name, p
                )));
            }
        }

        if self.download_step_min == 0 || self.download_step_min > self.download_step_max {
            return Err(TidewaveError::config(format!(
                "download step range {}..={} is empty or zero",
                self.download_step_min, self.download_step_max
            )));
        }

        if self.download_tick_ms == 0 || self.adblock_tick_ms == 0 || self.network_tick_ms == 0 {
            return Err(TidewaveError::config("tick intervals must be positive"));
        }

        if self.history_limit == 0 {
            return Err(TidewaveError::config("history_limit must be positive"));
        }

        Ok(())
    }

    pub fn search_latency(&self) -> Duration {
        Duration::from_millis(self.search_latency_ms)
    }

    pub fn external_latency(&self) -> Duration {
        Duration::from_millis(self.external_latency_ms)
    }

    pub fn download_tick(&self) -> Duration {
        Duration::from_millis(self.download_tick_ms.max(1))
    }

    pub fn adblock_tick(&self) -> Duration {
        Duration::from_millis(self.adblock_tick_ms.max(1))
    }

    pub fn network_tick(&self) -> Duration {
        Duration::from_millis(self.network_tick_ms.max(1))
    }

    /// File name used when exporting bookmarks
    pub fn bookmark_export_file_name(&self) -> String {
        format!("{}_bookmarks.json", self.product_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.search_latency() < config.external_latency());
        assert_eq!(config.history_limit, 1000);
    }

    #[test]
    fn test_export_file_name() {
        let config = Config::default();
        assert_eq!(config.bookmark_export_file_name(), "tidewave_bookmarks.json");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.search_latency_ms, 600);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"search_latency_ms": 50, "product_name": "demo"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.search_latency_ms, 50);
        assert_eq!(config.external_latency_ms, 1500);
        assert_eq!(config.bookmark_export_file_name(), "demo_bookmarks.json");
    }

    #[test]
    fn test_load_rejects_bad_probability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"block_probability": 1.5}"#).unwrap();

        assert!(matches!(Config::load(&path), Err(TidewaveError::Config(_))));
    }
}
