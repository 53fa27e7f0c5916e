//! Tokenizer Module - LLM 패밀리별 토큰 계산
//!
//! 세 가지 토크나이저 패밀리를 하나의 파사드로 묶어 토큰 수를 계산합니다.
//!
//! ## 지원 패밀리
//!
//! | Family | 엔진 | 라이브러리 |
//! |--------|------|-----------|
//! | OpenAI | tiktoken (BPE), 모델별 | tiktoken-rs |
//! | Claude | Anthropic count_tokens API / 추정 | reqwest |
//! | Gemini | SentencePiece tokenizer.json / 추정 | tokenizers |
//!
//! ## 사용법
//!
//! ```ignore
//! use tokenmeter_foundation::config::TokenizerConfig;
//! use tokenmeter_foundation::tokenizer::{TokenCounter, TokenFamily};
//!
//! let counter = TokenCounter::new(&TokenizerConfig::load()?);
//!
//! // 단일 텍스트
//! let result = counter.count_tokens("Hello, world!", TokenFamily::OpenAi).await;
//! println!("Tokens: {} ({:.2}ms)", result.count, result.timing_ms);
//!
//! // 배치 (입력 순서 유지)
//! let results = counter.count_tokens_batch(&["a", "b"], TokenFamily::Gemini).await;
//!
//! // 벤치마크
//! let report = counter.benchmark_tokenizers("Hello, world!", 10).await;
//! ```

mod anthropic;
mod cache;
mod counter;
mod engine;
mod estimator;
mod factory;
mod traits;
mod types;

#[cfg(test)]
mod testing;

pub use anthropic::{AnthropicApiCounter, ClaudeApiConfig};
pub use cache::EngineCache;
pub use counter::{TokenCounter, INVALID_BATCH_MESSAGE, INVALID_INPUT_MESSAGE};
pub use engine::{HfTokenizerEngine, TiktokenEngine};
pub use estimator::{ClaudeEstimator, EstimateEngine, EstimateProfile};
pub use factory::{claude_counter, DefaultEngineFactory};
pub use traits::{ClaudeCounter, Encoder, EngineFactory};
pub use types::{
    BenchmarkReport, TimingStats, TokenCountResult, TokenFamily, TokenizerError, WarmUpReport,
    WarmUpStatus,
};
