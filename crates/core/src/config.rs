use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Minimum effective sampling interval.
pub const MIN_INTERVAL_MS: u64 = 100;

const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Sampler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sampling interval in milliseconds.
    pub interval_ms: u64,

    /// Mount points to monitor for disk usage.
    pub mounts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            mounts: vec!["/".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in order of preference:
    /// 1. CLI arguments override everything
    /// 2. JSON config file if specified
    /// 3. Default config file locations
    /// 4. Built-in defaults
    pub fn load(cli_config: Option<&CliConfig>, json_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(default_config) = Self::load_default_config() {
            config.merge(default_config);
        }

        if let Some(path) = json_path {
            config.merge(Self::load_from_file(path)?);
        }

        if let Some(cli) = cli_config {
            config.apply_cli_overrides(cli);
        }

        config.normalize();
        Ok(config)
    }

    /// Load configuration from a specific JSON file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            crate::error::CoreError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            crate::error::CoreError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load configuration from the first readable default location.
    fn load_default_config() -> Option<Self> {
        for path in Self::default_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Some(config),
                Err(e) => {
                    eprintln!("Warning: Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
        None
    }

    /// Default configuration file search paths.
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("telemon").join("config.json"));
        }
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".telemon.json"));
        }
        paths.push(PathBuf::from("telemon.json"));

        paths
    }

    /// Merge another configuration into this one, keeping non-default
    /// values from `other`.
    fn merge(&mut self, other: Self) {
        if other.interval_ms != DEFAULT_INTERVAL_MS {
            self.interval_ms = other.interval_ms;
        }
        if other.mounts != vec!["/".to_string()] {
            self.mounts = other.mounts;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliConfig) {
        if let Some(interval) = cli.interval_ms {
            self.interval_ms = interval;
        }
        if let Some(mounts) = &cli.mounts {
            if !mounts.is_empty() {
                self.mounts = mounts.clone();
            }
        }
    }

    /// Clamp values into their effective ranges rather than failing.
    fn normalize(&mut self) {
        if self.interval_ms < MIN_INTERVAL_MS {
            eprintln!(
                "Warning: interval too low, using {}ms minimum",
                MIN_INTERVAL_MS
            );
            self.interval_ms = MIN_INTERVAL_MS;
        }
        if self.mounts.is_empty() {
            self.mounts = vec!["/".to_string()];
        }
    }

    /// Sampling interval as a Duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// CLI overrides (temporary struct for argument parsing).
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub interval_ms: Option<u64>,
    pub mounts: Option<Vec<String>>,
}
