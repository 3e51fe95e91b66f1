use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::ignore_rules::DEFAULT_OUTPUT_FILE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Estimated tokens above which the status turns yellow.
    #[serde(default = "default_warn_tokens")]
    pub warn_tokens: u64,

    /// Estimated tokens above which the status turns red.
    #[serde(default = "default_danger_tokens")]
    pub danger_tokens: u64,

    #[serde(default = "default_status_debounce_ms")]
    pub status_debounce_ms: u64,

    /// Snapshot file name, written at the scan root.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            warn_tokens: default_warn_tokens(),
            danger_tokens: default_danger_tokens(),
            status_debounce_ms: default_status_debounce_ms(),
            output_file: default_output_file(),
        }
    }
}

impl Config {
    /// Output names that must be excluded from scans on top of the built-in floor.
    pub fn extra_excludes(&self) -> Vec<String> {
        if self.output_file == DEFAULT_OUTPUT_FILE {
            Vec::new()
        } else {
            vec![self.output_file.clone()]
        }
    }
}

fn default_warn_tokens() -> u64 {
    100_000
}

fn default_danger_tokens() -> u64 {
    200_000
}

fn default_status_debounce_ms() -> u64 {
    100
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let config_str = toml::to_string_pretty(config)?;
    std::fs::write(path, config_str)?;
    Ok(())
}

pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("d2f");
    Ok(config_dir.join("config.toml"))
}
