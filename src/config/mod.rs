//! Runtime configuration.
//!
//! [`ForgeConfig`] is built once at startup and passed explicitly to the
//! adapters that need it. Sources are layered in this order, later sources
//! winning:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file ([`ForgeConfig::from_yaml_file`])
//! 3. Environment variables ([`ForgeConfig::apply_env`])
//! 4. CLI flags (applied by the command handlers)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::{LiteLlmClient, LlmProvider};
use crate::prompts::PromptSet;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is missing.
    #[error("Missing configuration value: {0}")]
    Missing(String),

    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML file did not match the expected shape.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration shared by the generation and evaluation commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    // Endpoint settings
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,
    /// API key, if the endpoint requires one.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Azure-style API version; enables deployment-path routing.
    pub api_version: Option<String>,

    // Model settings
    /// Model (or deployment) used for generation and rewriting.
    pub generation_model: String,
    /// Model (or deployment) used for judging.
    pub judge_model: String,
    /// Sampling temperature for batch generation.
    pub generation_temperature: f64,
    /// Sampling temperature for evaluation rewrites.
    pub rewrite_temperature: f64,

    // Execution settings
    /// Maximum generation calls in flight.
    pub concurrency: usize,
    /// Deadline for a single generation call, in seconds.
    pub call_timeout_secs: u64,
    /// Cap on successfully scored records per dataset.
    pub max_samples: usize,
    /// Directory for generated datasets.
    pub output_dir: PathBuf,

    /// Prompt text injected into the adapters.
    pub prompts: PromptSet,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: None,
            api_version: None,

            generation_model: "gpt-4.1".to_string(),
            judge_model: "gpt-4o-mini".to_string(),
            generation_temperature: 0.8,
            rewrite_temperature: 0.7,

            concurrency: 5,
            call_timeout_secs: 120,
            max_samples: 10,
            output_dir: PathBuf::from("synthetic_datasets"),

            prompts: PromptSet::default(),
        }
    }
}

impl ForgeConfig {
    /// Loads a YAML config file over the defaults.
    ///
    /// Fields absent from the file keep their default values.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlays environment variables onto this configuration.
    ///
    /// # Environment Variables
    ///
    /// - `LLM_API_BASE`: endpoint base URL
    /// - `LLM_API_KEY`: API key
    /// - `LLM_API_VERSION`: Azure-style API version
    /// - `LLM_GENERATION_MODEL`: generation model/deployment (default: gpt-4.1)
    /// - `LLM_JUDGE_MODEL`: judge model/deployment (default: gpt-4o-mini)
    /// - `FORGE_CONCURRENCY`: generation calls in flight (default: 5)
    /// - `FORGE_CALL_TIMEOUT_SECS`: per-call deadline (default: 120)
    /// - `FORGE_MAX_SAMPLES`: scored records per dataset (default: 10)
    /// - `FORGE_OUTPUT_DIR`: dataset output directory (default: synthetic_datasets)
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("LLM_API_BASE") {
            self.api_base = val;
        }

        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.api_key = Some(val);
        }

        if let Ok(val) = std::env::var("LLM_API_VERSION") {
            self.api_version = Some(val);
        }

        if let Ok(val) = std::env::var("LLM_GENERATION_MODEL") {
            self.generation_model = val;
        }

        if let Ok(val) = std::env::var("LLM_JUDGE_MODEL") {
            self.judge_model = val;
        }

        if let Ok(val) = std::env::var("FORGE_CONCURRENCY") {
            self.concurrency = parse_env_value(&val, "FORGE_CONCURRENCY")?;
        }

        if let Ok(val) = std::env::var("FORGE_CALL_TIMEOUT_SECS") {
            self.call_timeout_secs = parse_env_value(&val, "FORGE_CALL_TIMEOUT_SECS")?;
        }

        if let Ok(val) = std::env::var("FORGE_MAX_SAMPLES") {
            self.max_samples = parse_env_value(&val, "FORGE_MAX_SAMPLES")?;
        }

        if let Ok(val) = std::env::var("FORGE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        Ok(())
    }

    /// Per-call deadline as a `Duration`.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ValidationFailed(
                "concurrency must be greater than 0".to_string(),
            ));
        }

        if self.call_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "call_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation_model.trim().is_empty() || self.judge_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "generation_model and judge_model must be non-empty".to_string(),
            ));
        }

        for (name, temperature) in [
            ("generation_temperature", self.generation_temperature),
            ("rewrite_temperature", self.rewrite_temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be between 0.0 and 2.0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Builds the live LLM client for this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when no endpoint is configured.
    pub fn llm_client(&self) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Missing(
                "LLM endpoint (set LLM_API_BASE or api_base in the config file)".to_string(),
            ));
        }

        let mut client = LiteLlmClient::new(
            self.api_base.clone(),
            self.api_key.clone(),
            self.generation_model.clone(),
        )
        .with_timeout(self.call_timeout());

        if let Some(ref version) = self.api_version {
            client = client.with_api_version(version.clone());
        }

        Ok(Arc::new(client))
    }
}

/// Parses an environment variable value.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}
