use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consts::{DEFAULT_MODEL, MESSAGE_PLACEHOLDER};
use crate::error::ConfigError;

const API_KEY_ENV: &str = "XAI_API_KEY";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_stale_years() -> Vec<String> {
    vec!["2023".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) api_key: String,
    pub(crate) api_base_url: String,
    /// Seconds
    pub(crate) api_timeout: f64,
    #[serde(default = "default_model")]
    pub(crate) model: String,
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f64,
    pub(crate) max_search_results: u32,
    pub(crate) ignore_inputs: Vec<String>,
    pub(crate) system_prompt: String,
    #[serde(default)]
    pub(crate) run_startup_test: bool,
    /// Answers mentioning any of these are treated as stale
    #[serde(default = "default_stale_years")]
    pub(crate) stale_year_markers: Vec<String>,
    #[serde(default)]
    pub(crate) log_file: Option<PathBuf>,
}

impl Config {
    /// `explicit` if given, otherwise the first config file found in the
    /// standard locations
    pub(crate) fn locate(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(p) = explicit {
            return Ok(p.to_path_buf());
        }
        let candidates = Self::get_config_paths();
        candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| ConfigError::NotFound {
                tried: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Read, parse and validate. Any failure here is fatal for the process.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)?
            .with_api_key_override(std::env::var(API_KEY_ENV).ok())
            .validated()
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str::<Config>(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A non-empty environment key wins over the file
    fn with_api_key_override(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.system_prompt.is_empty() || !self.system_prompt.contains(MESSAGE_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder);
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if !self.api_timeout.is_finite() || self.api_timeout <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "api_timeout",
                reason: "must be a positive number of seconds",
            });
        }
        Ok(self)
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.api_timeout).unwrap_or(Duration::from_secs(30))
    }

    /// Whether a message is trivial filler that gets an empty reply
    pub(crate) fn is_ignored(&self, message: &str) -> bool {
        let normalized = message.trim().to_lowercase();
        self.ignore_inputs
            .iter()
            .any(|i| i.trim().to_lowercase() == normalized)
    }

    /// Config as JSON with the API key masked, for logs and `status`
    pub(crate) fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(key) = value.get_mut("api_key") {
            *key = serde_json::Value::String("****".to_string());
        }
        value
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/grokrelay/config.toml (Linux/cross-platform)
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("grokrelay").join("config.toml"));
        }

        // 2. Platform config dir (macOS Application Support, %APPDATA%)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("grokrelay").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.grokrelay.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".grokrelay.toml"));
        }

        paths
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        api_key: "test-key".to_string(),
        api_base_url: "http://127.0.0.1:9".to_string(),
        api_timeout: 5.0,
        model: default_model(),
        max_tokens: 150,
        temperature: 0.7,
        max_search_results: 5,
        ignore_inputs: vec!["lol".to_string(), "brb".to_string(), "Thanks".to_string()],
        system_prompt: "You are a bot. Session {session_id} at {current_time}. {message}".to_string(),
        run_startup_test: false,
        stale_year_markers: default_stale_years(),
        log_file: None,
    }
}
