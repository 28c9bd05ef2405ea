use std::path::PathBuf;

use thiserror::Error;

use crate::config_env::{
    http_url_env, optional_trimmed_env, parse_u32_env, parse_u64_env, string_env_or,
};

pub const DEFAULT_RELAY_BIND_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_RELAY_API_URL: &str = "http://localhost:8787";
pub const DEFAULT_CHAT_STORE_PATH: &str = ".scoper-chat/store.json";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub environment: String,
    pub frontend_url: Option<String>,
    pub upstream: UpstreamConfig,
}

/// Settings for the external completion service. The credential is optional at startup;
/// the relay answers `/chat` with a configuration error while it is absent.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_api_url: String,
    pub store_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: string_env_or("RELAY_BIND_ADDR", DEFAULT_RELAY_BIND_ADDR),
            environment: string_env_or("ENVIRONMENT", DEFAULT_ENVIRONMENT),
            frontend_url: optional_trimmed_env("FRONTEND_URL"),
            upstream: UpstreamConfig::from_env()?,
        })
    }

    /// Origins accepted for CORS. The first entry is the fallback for unrecognized origins.
    pub fn allowed_origins(&self) -> Vec<String> {
        vec![
            "http://localhost:5173".to_string(),
            "https://localhost:5173".to_string(),
            self.frontend_url
                .clone()
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string()),
        ]
    }
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: optional_trimmed_env("ANTHROPIC_API_KEY"),
            api_url: http_url_env("ANTHROPIC_API_URL", DEFAULT_ANTHROPIC_API_URL)?,
            model: string_env_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
            max_tokens: parse_u32_env("ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?,
            timeout_ms: parse_u64_env("ANTHROPIC_TIMEOUT_MS", DEFAULT_UPSTREAM_TIMEOUT_MS)?,
        })
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            relay_api_url: http_url_env("RELAY_API_URL", DEFAULT_RELAY_API_URL)?,
            store_path: PathBuf::from(string_env_or("CHAT_STORE_PATH", DEFAULT_CHAT_STORE_PATH)),
        })
    }
}

/// Accepts absolute `http://` or `https://` URLs. `label` names the setting in the error.
pub fn validate_http_url(label: &str, raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|_| {
        ConfigError::InvalidConfiguration(format!("{label} is not a valid URL: {raw}"))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfiguration(format!(
            "{label} must start with http:// or https://"
        )));
    }

    Ok(raw.to_string())
}

/// Loads `.env` from the working directory when present. A missing file is not an error.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}
