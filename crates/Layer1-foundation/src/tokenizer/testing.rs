//! 테스트용 대체 엔진

use super::traits::{ClaudeCounter, Encoder, EngineFactory};
use super::estimator::EstimateEngine;
use super::types::{TokenFamily, TokenizerError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 공백 기준으로 토큰을 나누는 인코더
pub struct WhitespaceEncoder {
    name: String,
}

impl WhitespaceEncoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Encoder for WhitespaceEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok((0..text.split_whitespace().count() as u32).collect())
    }
}

/// 항상 인코딩에 실패하는 인코더
pub struct BrokenEncoder;

impl Encoder for BrokenEncoder {
    fn name(&self) -> &str {
        "broken"
    }

    fn encode(&self, _text: &str) -> Result<Vec<u32>, TokenizerError> {
        Err(TokenizerError::EncodingFailed("vocabulary corrupted".to_string()))
    }
}

/// 호출 횟수를 세는 팩토리
#[derive(Default)]
pub struct CountingFactory {
    openai_calls: AtomicUsize,
    gemini_calls: AtomicUsize,
    failing_models: HashSet<String>,
    fail_gemini: bool,
    estimate_gemini: bool,
    broken_encoders: bool,
}

impl CountingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 해당 모델 생성 실패
    pub fn fail_openai(mut self, model: &str) -> Self {
        self.failing_models.insert(model.to_string());
        self
    }

    /// Gemini 생성 실패
    pub fn fail_gemini(mut self) -> Self {
        self.fail_gemini = true;
        self
    }

    /// Gemini로 추정 엔진 반환
    pub fn estimate_gemini(mut self) -> Self {
        self.estimate_gemini = true;
        self
    }

    /// 생성은 성공하지만 인코딩이 실패하는 엔진 반환
    pub fn broken_encoders(mut self) -> Self {
        self.broken_encoders = true;
        self
    }

    pub fn openai_calls(&self) -> usize {
        self.openai_calls.load(Ordering::SeqCst)
    }

    pub fn gemini_calls(&self) -> usize {
        self.gemini_calls.load(Ordering::SeqCst)
    }

    fn build(&self, name: &str) -> Arc<dyn Encoder> {
        if self.broken_encoders {
            Arc::new(BrokenEncoder)
        } else {
            Arc::new(WhitespaceEncoder::new(name))
        }
    }
}

impl EngineFactory for CountingFactory {
    fn openai(&self, model: &str) -> Result<Arc<dyn Encoder>, TokenizerError> {
        self.openai_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_models.contains(model) {
            return Err(TokenizerError::UnsupportedModel(model.to_string()));
        }
        Ok(self.build(model))
    }

    fn gemini(&self) -> Result<Arc<dyn Encoder>, TokenizerError> {
        self.gemini_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gemini {
            return Err(TokenizerError::InitializationFailed(
                "gemini vocabulary missing".to_string(),
            ));
        }
        if self.estimate_gemini {
            return Ok(Arc::new(EstimateEngine::new(TokenFamily::Gemini)));
        }
        Ok(self.build("gemini"))
    }
}

/// 고정 비율로 세는 Claude 카운터 (단어 수 × 2)
#[derive(Default)]
pub struct StubClaudeCounter {
    calls: AtomicUsize,
    fail: bool,
}

impl StubClaudeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClaudeCounter for StubClaudeCounter {
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TokenizerError::Api("HTTP 401 Unauthorized".to_string()));
        }
        Ok(text.split_whitespace().count() * 2)
    }
}
