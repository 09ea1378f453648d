// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Server configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! YAML file (`HEALTHAI_CONFIG`, else `config/healthai.yaml` when present),
//! and `HEALTHAI_*` environment variables.

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/healthai.yaml";
pub const DEFAULT_DATASET_PATH: &str = "data/patient_data.csv";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ai: AiConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Sessions untouched for this long are forgotten.
    pub session_idle_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Never written back out; normally supplied through the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub dataset_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            session_idle_secs: 60 * 60,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, AppError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let explicit = env.get("HEALTHAI_CONFIG").map(PathBuf::from);
        let path = match explicit {
            Some(path) => Some(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                default.exists().then_some(default)
            }
        };

        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_yaml_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(&env)?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, AppError> {
        serde_yaml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse configuration: {e}")))
    }

    /// Overlay `HEALTHAI_*` variables. `OPENROUTER_API_KEY` is accepted as a fallback key.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<(), AppError> {
        let non_empty = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

        if let Some(key) = non_empty("HEALTHAI_API_KEY").or_else(|| non_empty("OPENROUTER_API_KEY")) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = non_empty("HEALTHAI_MODEL") {
            self.ai.model = model;
        }
        if let Some(base_url) = non_empty("HEALTHAI_BASE_URL") {
            self.ai.base_url = base_url;
        }
        if let Some(host) = non_empty("HEALTHAI_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("HEALTHAI_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid HEALTHAI_PORT {port:?}: {e}")))?;
        }
        if let Some(dataset) = non_empty("HEALTHAI_DATASET") {
            self.analytics.dataset_path = PathBuf::from(dataset);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.analytics.dataset_path, PathBuf::from("data/patient_data.csv"));
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            "server:\n  port: 8080\nai:\n  model: meta-llama/llama-3-8b-instruct\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.session_idle_secs, 3600);
        assert_eq!(config.ai.model, "meta-llama/llama-3-8b-instruct");
        assert_eq!(config.ai.timeout_secs, 60);
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let err = AppConfig::from_yaml_str("server: [").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_env(&env(&[
                ("HEALTHAI_API_KEY", "sk-test"),
                ("HEALTHAI_PORT", "9000"),
                ("HEALTHAI_DATASET", "/tmp/vitals.csv"),
            ]))
            .unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.analytics.dataset_path, PathBuf::from("/tmp/vitals.csv"));
    }

    #[test]
    fn openrouter_key_is_fallback_only() {
        let mut config = AppConfig::default();
        config
            .apply_env(&env(&[("OPENROUTER_API_KEY", "sk-or")]))
            .unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-or"));

        config
            .apply_env(&env(&[("OPENROUTER_API_KEY", "sk-or"), ("HEALTHAI_API_KEY", "sk-hai")]))
            .unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-hai"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(&env(&[("HEALTHAI_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
