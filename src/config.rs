//! Process configuration: TOML file with `${VAR}` environment substitution.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use farescout_sources::WizzairChallenge;
use farescout_worker::{ScrapeConfig, WorkerConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub coordinator: CoordinatorSection,
    pub worker: WorkerConfig,
    pub browser: ScrapeConfig,
    pub sources: SourcesSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoordinatorSection {
    pub base_url: String,
}

impl Default for CoordinatorSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Which airline backs the API job kinds.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Airline {
    #[default]
    Ryanair,
    Wizzair,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesSection {
    pub airline: Airline,
    pub wizzair: WizzairSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WizzairSection {
    #[serde(flatten)]
    pub challenge: WizzairChallenge,
    /// Overrides the version segment of the API URL path.
    pub api_version: Option<String>,
}

/// Load configuration from a TOML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_str(&content)
}

/// Load configuration from a string.
pub fn load_str(content: &str) -> Result<Config, ConfigError> {
    let expanded = expand_env_vars(content)?;
    Ok(toml::from_str(&expanded)?)
}

/// Expand environment variables in the format `${VAR}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let var_value =
            std::env::var(var_name).map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
        result = result.replace(&cap[0], &var_value);
    }

    Ok(result)
}
