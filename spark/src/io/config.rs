//! Configuration stored in `spark.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::selection::StarterCount;
use crate::core::types::GenerationStrategy;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "spark.toml";

/// Top-level configuration (TOML).
///
/// Missing fields fall back to defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SparkConfig {
    /// Whether to ask for every starter in one call or one call per starter.
    pub strategy: GenerationStrategy,

    /// Starter count used when a caller does not ask for one.
    pub number_of_starters_default: u8,

    pub model: ModelConfig,
}

/// Remote generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Gemini REST API (without `/models`).
    pub base_url: String,

    pub model: String,

    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    pub api_key_env: String,

    /// Whole-request timeout enforced by the HTTP client.
    pub request_timeout_secs: u64,

    /// Sampling temperature; the backend default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: 60,
            temperature: Some(0.9),
        }
    }
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            strategy: GenerationStrategy::Batched,
            number_of_starters_default: StarterCount::DEFAULT.get(),
            model: ModelConfig::default(),
        }
    }
}

impl SparkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_count().is_none() {
            return Err(anyhow!(
                "number_of_starters_default must be between {} and {}",
                StarterCount::MIN,
                StarterCount::MAX
            ));
        }
        if self.model.base_url.trim().is_empty() {
            return Err(anyhow!("model.base_url must not be empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("model.model must not be empty"));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(anyhow!("model.api_key_env must not be empty"));
        }
        if self.model.request_timeout_secs == 0 {
            return Err(anyhow!("model.request_timeout_secs must be > 0"));
        }
        if let Some(temperature) = self.model.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("model.temperature must be between 0.0 and 2.0"));
            }
        }
        Ok(())
    }

    /// Configured default count, if in range.
    pub fn default_count(&self) -> Option<StarterCount> {
        StarterCount::new(i64::from(self.number_of_starters_default))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SparkConfig::default()`.
pub fn load_config(path: &Path) -> Result<SparkConfig> {
    if !path.exists() {
        let cfg = SparkConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SparkConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SparkConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
