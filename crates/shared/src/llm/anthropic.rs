use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use super::gateway::{
    CompletionError, CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse,
};
use crate::config::UpstreamConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const EMPTY_REPLY_FALLBACK: &str = "No response generated";

#[derive(Debug, Clone)]
pub struct AnthropicGatewayConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl AnthropicGatewayConfig {
    /// Returns `None` when no credential is configured.
    pub fn from_upstream(upstream: &UpstreamConfig) -> Option<Self> {
        let api_key = upstream.api_key.as_deref()?;
        Some(Self {
            api_url: upstream.api_url.clone(),
            api_key: api_key.to_string(),
            model: upstream.model.clone(),
            max_tokens: upstream.max_tokens,
            timeout_ms: upstream.timeout_ms,
        })
    }
}

#[derive(Debug, Error)]
pub enum AnthropicGatewayError {
    #[error("failed to build Anthropic http client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct AnthropicGateway {
    client: reqwest::Client,
    config: AnthropicGatewayConfig,
}

impl AnthropicGateway {
    pub fn new(config: AnthropicGatewayConfig) -> Result<Self, AnthropicGatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| AnthropicGatewayError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_once(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let request_body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": request.system_prompt,
            "messages": request.messages,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Unavailable
                }
            })?;

        let status = response.status();
        let header_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(|_| {
            CompletionError::InvalidPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            let code = parse_provider_error_code(&body);
            warn!(
                status = status.as_u16(),
                provider_code = %code,
                provider_request_id = header_request_id.as_deref().unwrap_or("none"),
                "completion provider returned an error status"
            );
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                code,
            });
        }

        let parsed: AnthropicSuccessResponse = serde_json::from_str(&body)
            .map_err(|_| CompletionError::InvalidPayload("response_json_parse_failed".to_string()))?;

        let text = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());

        Ok(CompletionResponse {
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            provider_request_id: header_request_id.or(parsed.id),
            text,
        })
    }
}

impl CompletionGateway for AnthropicGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move { self.send_once(&request).await })
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicSuccessResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|details| details.kind)
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::{AnthropicGatewayConfig, parse_provider_error_code};
    use crate::config::UpstreamConfig;

    fn upstream(api_key: Option<&str>) -> UpstreamConfig {
        UpstreamConfig {
            api_key: api_key.map(ToString::to_string),
            api_url: "http://127.0.0.1:9/v1/messages".to_string(),
            model: "test-model".to_string(),
            max_tokens: 128,
            timeout_ms: 1000,
        }
    }

    #[test]
    fn gateway_config_requires_credential() {
        assert!(AnthropicGatewayConfig::from_upstream(&upstream(None)).is_none());

        let config = AnthropicGatewayConfig::from_upstream(&upstream(Some("sk-test")))
            .expect("credential should yield config");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.max_tokens, 128);
    }

    #[test]
    fn parses_provider_error_type() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#;
        assert_eq!(parse_provider_error_code(body), "rate_limit_error");
        assert_eq!(parse_provider_error_code("<html>"), "unknown");
        assert_eq!(parse_provider_error_code(r#"{"error":{}}"#), "unknown");
    }
}
