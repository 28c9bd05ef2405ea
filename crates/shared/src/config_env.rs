use std::env;

use crate::config::{ConfigError, validate_http_url};

pub(crate) fn parse_u32_env(key: &str, default: u32) -> Result<u32, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn parse_u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    match optional_trimmed_env(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

pub(crate) fn http_url_env(key: &str, default: &str) -> Result<String, ConfigError> {
    let raw = optional_trimmed_env(key).unwrap_or_else(|| default.to_string());
    validate_http_url(key, &raw)
}

pub(crate) fn string_env_or(key: &str, default: &str) -> String {
    optional_trimmed_env(key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
