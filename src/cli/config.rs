//! Configuration management for medpredict
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.medpredict/config.toml

use crate::errors::{PredictError, Result};
use crate::model::VersionPolicy;
use crate::stress::processing::REPORT_DAYS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding `fitness.access_token`
pub const FIT_TOKEN_ENV: &str = "MEDPREDICT_FIT_TOKEN";

/// Complete configuration for medpredict
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub fitness: FitnessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Model artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub artifact_path: String,
    /// Optional external vocabulary; checked against the artifact at startup
    #[serde(default)]
    pub vocabulary_path: Option<String>,
    pub version_policy: String,
    /// Refuse to start when the model cannot be loaded
    pub fail_fast: bool,
    pub top_k: usize,
}

/// Fitness API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    pub lookback_days: i64,
    pub timeout_sec: u64,
    /// Fixed seed for demo data; random when unset
    #[serde(default)]
    pub demo_seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "model/disease_model.json".to_string(),
            vocabulary_path: None,
            version_policy: "strict".to_string(),
            fail_fast: true,
            top_k: 3,
        }
    }
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/fitness/v1/users/me".to_string(),
            access_token: None,
            lookback_days: REPORT_DAYS,
            timeout_sec: 15,
            demo_seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(&config_path)?
        } else {
            Self::load_default()?
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PredictError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| PredictError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".medpredict").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(FIT_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.fitness.access_token = Some(token);
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PredictError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.model.artifact_path.trim().is_empty() {
            return Err(PredictError::ConfigError(
                "model.artifact_path must not be empty".to_string(),
            ));
        }

        if self.model.top_k == 0 {
            return Err(PredictError::ConfigError(
                "model.top_k must be greater than 0".to_string(),
            ));
        }

        if VersionPolicy::parse(&self.model.version_policy).is_none() {
            return Err(PredictError::ConfigError(format!(
                "Invalid version policy: {}",
                self.model.version_policy
            )));
        }

        if self.fitness.lookback_days < REPORT_DAYS {
            return Err(PredictError::ConfigError(format!(
                "fitness.lookback_days must be at least {}",
                REPORT_DAYS
            )));
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(PredictError::ConfigError(format!(
                    "Invalid log level: {}",
                    self.logging.level
                )))
            }
        }

        Ok(())
    }

    /// Listener address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Parsed version policy (validated in `validate`)
    pub fn version_policy(&self) -> VersionPolicy {
        VersionPolicy::parse(&self.model.version_policy).unwrap_or_default()
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn artifact_path(&self) -> PathBuf {
        Self::expand_path(&self.model.artifact_path)
    }

    pub fn vocabulary_path(&self) -> Option<PathBuf> {
        self.model.vocabulary_path.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model.top_k, 3);
        assert_eq!(config.version_policy(), VersionPolicy::Strict);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_top_k() {
        let mut config = Config::default();
        config.model.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_policy() {
        let mut config = Config::default();
        config.model.version_policy = "lenient".to_string();
        assert!(config.validate().is_err());
        config.model.version_policy = "warn".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.version_policy(), VersionPolicy::Warn);
    }

    #[test]
    fn test_config_validation_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_lookback() {
        let mut config = Config::default();
        config.fitness.lookback_days = 0;
        assert!(config.validate().is_err());
        config.fitness.lookback_days = REPORT_DAYS - 1;
        assert!(config.validate().is_err());
        config.fitness.lookback_days = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [model]
            version_policy = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.version_policy(), VersionPolicy::Warn);
        assert!(config.model.fail_fast);
        assert_eq!(config.model.artifact_path, "model/disease_model.json");
        assert!(config.fitness.access_token.is_none());
    }

    #[test]
    fn test_written_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.fitness.demo_seed = Some(7);
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.fitness.demo_seed, Some(7));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path("~/.medpredict");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let expanded = Config::expand_path("/absolute/path");
        assert_eq!(expanded.to_string_lossy(), "/absolute/path");
    }
}
