//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// OpenAI-compatible endpoint used when only a Gemini key is configured.
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub oracle_api_base: Option<String>,
    pub analysis_model: String,
    pub chat_model: String,
    /// Prior chat messages sent along with each question.
    pub chat_history_window: usize,
    pub seed_welcome_document: bool,
}

/// The API key and optional base URL the oracle client should use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleCredentials {
    pub api_key: String,
    pub api_base: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Server Settings ---
        let bind_address_str = get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = get("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            get("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Load API Keys (as optional) ---
        let openai_api_key = get("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let gemini_api_key = get("GEMINI_API_KEY").filter(|k| !k.is_empty());
        let oracle_api_base = get("ORACLE_API_BASE").filter(|b| !b.is_empty());

        // --- Load Oracle Settings ---
        let analysis_model =
            get("ANALYSIS_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let chat_model = get("CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let chat_history_window = match get("CHAT_HISTORY_WINDOW") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("CHAT_HISTORY_WINDOW".to_string(), e.to_string())
            })?,
            None => 6,
        };

        let seed_welcome_document = match get("SEED_WELCOME_DOCUMENT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SEED_WELCOME_DOCUMENT".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => true,
        };

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            openai_api_key,
            gemini_api_key,
            oracle_api_base,
            analysis_model,
            chat_model,
            chat_history_window,
            seed_welcome_document,
        })
    }

    /// Picks the oracle credentials. An OpenAI key wins; a lone Gemini key is
    /// pointed at Gemini's OpenAI-compatible endpoint unless a base is set.
    pub fn oracle_credentials(&self) -> Result<OracleCredentials, ConfigError> {
        if let Some(key) = &self.openai_api_key {
            return Ok(OracleCredentials {
                api_key: key.clone(),
                api_base: self.oracle_api_base.clone(),
            });
        }
        if let Some(key) = &self.gemini_api_key {
            return Ok(OracleCredentials {
                api_key: key.clone(),
                api_base: Some(
                    self.oracle_api_base
                        .clone()
                        .unwrap_or_else(|| GEMINI_OPENAI_BASE.to_string()),
                ),
            });
        }
        Err(ConfigError::MissingVar(
            "OPENAI_API_KEY or GEMINI_API_KEY".to_string(),
        ))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).expect("config");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.chat_history_window, 6);
        assert!(config.seed_welcome_document);
        assert!(config.oracle_credentials().is_err());
    }

    #[test]
    fn invalid_values_are_reported_by_name() {
        let err = config(&[("CHAT_HISTORY_WINDOW", "lots")]).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "CHAT_HISTORY_WINDOW"));

        let err = config(&[("BIND_ADDRESS", "nowhere")]).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "BIND_ADDRESS"));

        let err = config(&[("SEED_WELCOME_DOCUMENT", "maybe")]).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "SEED_WELCOME_DOCUMENT"));
    }

    #[test]
    fn openai_key_takes_precedence() {
        let config = config(&[("OPENAI_API_KEY", "sk-1"), ("GEMINI_API_KEY", "g-1")]).expect("config");
        let creds = config.oracle_credentials().expect("creds");
        assert_eq!(creds.api_key, "sk-1");
        assert_eq!(creds.api_base, None);
    }

    #[test]
    fn gemini_key_uses_compatible_endpoint() {
        let config = config(&[("GEMINI_API_KEY", "g-1")]).expect("config");
        let creds = config.oracle_credentials().expect("creds");
        assert_eq!(creds.api_key, "g-1");
        assert_eq!(creds.api_base.as_deref(), Some(GEMINI_OPENAI_BASE));
    }
}
