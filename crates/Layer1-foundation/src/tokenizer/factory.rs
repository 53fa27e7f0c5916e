//! Engine Factory - 설정 기반 엔진 생성

use super::anthropic::{AnthropicApiCounter, ClaudeApiConfig};
use super::engine::{HfTokenizerEngine, TiktokenEngine};
use super::estimator::{ClaudeEstimator, EstimateEngine};
use super::traits::{ClaudeCounter, Encoder, EngineFactory};
use super::types::{TokenFamily, TokenizerError};
use crate::config::{ClaudeConfig, GeminiConfig};
use std::sync::Arc;

/// 기본 엔진 팩토리
///
/// 캐싱하지 않습니다. 캐싱은 `EngineCache`가 담당합니다.
///
/// Gemini 엔진 선택 순서:
/// 1. `tokenizer_path` - 로컬 tokenizer.json
/// 2. `hf_repo` - HuggingFace Hub
/// 3. 추정 엔진
#[derive(Debug, Clone, Default)]
pub struct DefaultEngineFactory {
    gemini: GeminiConfig,
}

impl DefaultEngineFactory {
    pub fn new(gemini: GeminiConfig) -> Self {
        Self { gemini }
    }
}

impl EngineFactory for DefaultEngineFactory {
    fn openai(&self, model: &str) -> Result<Arc<dyn Encoder>, TokenizerError> {
        tracing::debug!("Building tiktoken encoder for {}", model);
        Ok(Arc::new(TiktokenEngine::for_model(model)?))
    }

    fn gemini(&self) -> Result<Arc<dyn Encoder>, TokenizerError> {
        if let Some(path) = &self.gemini.tokenizer_path {
            tracing::debug!("Loading Gemini tokenizer from {}", path.display());
            return Ok(Arc::new(HfTokenizerEngine::from_file(path)?));
        }

        if let Some(repo) = &self.gemini.hf_repo {
            tracing::debug!("Downloading Gemini tokenizer from hub repo {}", repo);
            return Ok(Arc::new(HfTokenizerEngine::from_hub(
                repo,
                self.gemini.hf_token.clone(),
            )?));
        }

        tracing::warn!(
            "No Gemini tokenizer configured (gemini.tokenizerPath or gemini.hfRepo), \
             Gemini counts are character-based estimates"
        );
        Ok(Arc::new(EstimateEngine::new(TokenFamily::Gemini)))
    }
}

/// 설정에서 Claude 카운터 생성
///
/// API 키가 있으면 Anthropic API, 없거나 클라이언트 생성 실패 시 추정.
pub fn claude_counter(config: &ClaudeConfig) -> Arc<dyn ClaudeCounter> {
    if let Some(api_config) = ClaudeApiConfig::from_config(config) {
        match AnthropicApiCounter::new(api_config) {
            Ok(counter) => return Arc::new(counter),
            Err(e) => {
                tracing::warn!("Anthropic client unavailable, falling back to estimate: {}", e);
            }
        }
    }

    tracing::debug!("No Anthropic API key, Claude counts are estimates");
    Arc::new(ClaudeEstimator::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_openai_engine() {
        let factory = DefaultEngineFactory::default();

        let engine = factory.openai("gpt-4o").unwrap();
        assert_eq!(engine.name(), "gpt-4o");
        assert!(engine.is_exact());

        assert!(factory.openai("not-a-real-model").is_err());
    }

    #[test]
    fn test_gemini_defaults_to_estimate() {
        let factory = DefaultEngineFactory::default();

        let engine = factory.gemini().unwrap();
        assert!(!engine.is_exact());
        assert!(engine.count("Hello, world!").unwrap() > 0);
    }

    #[test]
    fn test_gemini_bad_path_fails() {
        let factory = DefaultEngineFactory::new(GeminiConfig {
            tokenizer_path: Some(PathBuf::from("/nonexistent/tokenizer.json")),
            ..Default::default()
        });

        assert!(matches!(
            factory.gemini(),
            Err(TokenizerError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_claude_counter_without_key_is_estimate() {
        let counter = claude_counter(&ClaudeConfig::default());
        assert!(!counter.is_exact());

        let with_key = claude_counter(&ClaudeConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        });
        assert!(with_key.is_exact());
    }
}
