//! Anthropic API 기반 Claude 토큰 카운터
//!
//! `POST /v1/messages/count_tokens` 엔드포인트를 호출합니다.
//! 결과에는 메시지 포맷 오버헤드 몇 토큰이 포함됩니다.

use super::traits::ClaudeCounter;
use super::types::TokenizerError;
use crate::config::ClaudeConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Anthropic API 버전 헤더
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude API 설정 (해석 완료)
#[derive(Debug, Clone)]
pub struct ClaudeApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// 토큰 계산에 사용하는 모델 ID
    pub model: String,
    pub timeout_ms: u64,
}

impl ClaudeApiConfig {
    /// 설정에서 생성 (API 키가 없으면 None)
    pub fn from_config(config: &ClaudeConfig) -> Option<Self> {
        if !config.has_api_key() {
            return None;
        }

        Some(Self {
            api_key: config.api_key.clone()?,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            model: config.model().to_string(),
            timeout_ms: config.timeout_ms(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/messages/count_tokens", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct CountTokensResponse {
    input_tokens: usize,
}

/// Anthropic API 토큰 카운터
pub struct AnthropicApiCounter {
    config: ClaudeApiConfig,
    client: reqwest::Client,
}

impl AnthropicApiCounter {
    pub fn new(config: ClaudeApiConfig) -> Result<Self, TokenizerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TokenizerError::InitializationFailed(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ClaudeCounter for AnthropicApiCounter {
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": text
                }
            ]
        });

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| TokenizerError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TokenizerError::Api(format!("HTTP {}: {}", status, detail)));
        }

        let data: CountTokensResponse = response
            .json()
            .await
            .map_err(|e| TokenizerError::Api(format!("Invalid response: {}", e)))?;

        Ok(data.input_tokens)
    }

    fn is_exact(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_key() {
        assert!(ClaudeApiConfig::from_config(&ClaudeConfig::default()).is_none());

        let blank = ClaudeConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(ClaudeApiConfig::from_config(&blank).is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = ClaudeConfig {
            api_key: Some("sk-test".to_string()),
            base_url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };

        let api = ClaudeApiConfig::from_config(&config).unwrap();
        assert_eq!(api.endpoint(), "http://localhost:8080/v1/messages/count_tokens");
        assert_eq!(api.model, "claude-sonnet-4-20250514");
        assert_eq!(api.timeout_ms, 5000);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let config = ClaudeApiConfig {
            api_key: "sk-test".to_string(),
            // 포트 1은 열려 있지 않음
            base_url: "http://127.0.0.1:1".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            timeout_ms: 500,
        };

        let counter = AnthropicApiCounter::new(config).unwrap();
        assert!(counter.is_exact());
        let result = counter.count_tokens("Hello").await;
        assert!(matches!(result, Err(TokenizerError::Api(_))));
    }
}
