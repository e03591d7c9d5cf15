//! Configuration management for Voyagent
//!
//! This module handles loading, parsing, and validating configuration
//! from YAML files, with environment-supplied credentials.

use crate::error::{Result, VoyagentError};
use crate::gateway::Traveler;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for Voyagent
///
/// Holds the chat endpoint settings, the reasoning-capability client
/// settings, the travel gateway settings, and the pre-populated default
/// traveler profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat endpoint server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reasoning capability (interpretation) settings
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Travel-data gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Default traveler profile, assumed pre-populated
    #[serde(default = "default_profile")]
    pub profile: Traveler,

    /// Orchestrator behavior settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Chat endpoint server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host for the chat endpoint
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the chat endpoint
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Reasoning capability configuration
///
/// The interpretation step runs against an OpenAI-compatible
/// chat-completions endpoint; `api_base` is overridable so tests can
/// point the interpreter at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Model used for turn interpretation
    #[serde(default = "default_reasoning_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_reasoning_api_base")]
    pub api_base: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_reasoning_model() -> String {
    "gpt-4o".to_string()
}

fn default_reasoning_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            model: default_reasoning_model(),
            api_base: default_reasoning_api_base(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Travel gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provider API base URL (test environment by default)
    #[serde(default = "default_gateway_api_base")]
    pub api_base: String,

    /// Shared location the external refresh process writes the bearer
    /// token to; read fresh on every gateway call
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Currency code for searches
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Search results surfaced per ranked list, bounding reply length
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum attempts for idempotent search calls
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_gateway_api_base() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_token_path() -> String {
    "config/gateway.token".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: default_gateway_api_base(),
            token_path: default_token_path(),
            currency: default_currency(),
            max_results: default_max_results(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Orchestrator behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Most recent transcript messages handed to the interpreter as context
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,
}

fn default_max_context_messages() -> usize {
    40
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_context_messages: default_max_context_messages(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            reasoning: ReasoningConfig::default(),
            gateway: GatewayConfig::default(),
            profile: default_profile(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

fn default_profile() -> Traveler {
    Traveler {
        first_name: "Alex".to_string(),
        last_name: "Traveler".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        email: "alex.traveler@example.com".to_string(),
        phone: "5550100".to_string(),
    }
}

impl Config {
    /// Loads configuration from a YAML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns `VoyagentError::Config` if the file cannot be read, and
    /// `VoyagentError::Yaml` if it cannot be parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            VoyagentError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(VoyagentError::Yaml)?;
        Ok(config)
    }

    /// Loads configuration from a file, falling back to defaults when the
    /// file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                "config file {} not found, using built-in defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validates the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `VoyagentError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.reasoning.api_base)
            .map_err(|e| VoyagentError::Config(format!("reasoning.api_base: {}", e)))?;
        Url::parse(&self.gateway.api_base)
            .map_err(|e| VoyagentError::Config(format!("gateway.api_base: {}", e)))?;

        if self.gateway.currency.len() != 3 {
            return Err(VoyagentError::Config(format!(
                "gateway.currency must be a 3-letter code, got '{}'",
                self.gateway.currency
            ))
            .into());
        }
        if self.gateway.max_results == 0 {
            return Err(
                VoyagentError::Config("gateway.max_results must be at least 1".to_string()).into(),
            );
        }
        if self.gateway.retry_max_attempts == 0 {
            return Err(VoyagentError::Config(
                "gateway.retry_max_attempts must be at least 1".to_string(),
            )
            .into());
        }
        if self.orchestrator.max_context_messages == 0 {
            return Err(VoyagentError::Config(
                "orchestrator.max_context_messages must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Reads the reasoning API key from the configured environment variable
    pub fn reasoning_api_key(&self) -> Result<String> {
        std::env::var(&self.reasoning.api_key_env).map_err(|_| {
            VoyagentError::Config(format!(
                "environment variable {} is not set",
                self.reasoning.api_key_env
            ))
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.max_results, 5);
        assert_eq!(config.gateway.retry_max_attempts, 3);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_partial_yaml_applies_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gateway:\n  currency: EUR\nserver:\n  port: 9100\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.gateway.currency, "EUR");
        assert_eq!(config.server.port, 9100);
        // Untouched sections keep defaults
        assert_eq!(config.gateway.max_results, 5);
        assert_eq!(config.reasoning.model, "gpt-4o");
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/voyagent.yaml").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/voyagent.yaml").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_currency_rejected() {
        let mut config = Config::default();
        config.gateway.currency = "DOLLARS".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let mut config = Config::default();
        config.gateway.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_api_base_rejected() {
        let mut config = Config::default();
        config.gateway.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_profile_populated() {
        let config = Config::default();
        assert!(!config.profile.first_name.is_empty());
        assert!(!config.profile.email.is_empty());
    }
}
