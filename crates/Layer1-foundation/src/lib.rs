//! # tokenmeter-foundation
//!
//! Foundation layer for TokenMeter:
//! - Tokenizer: OpenAI / Claude / Gemini 토큰 카운트 파사드, 엔진 캐시, 벤치마크
//! - Config: TokenizerConfig (전역 + 프로젝트 + 환경 변수)
//! - Storage: JsonStore (설정 파일)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  TokenCounter (count / batch / benchmark)               │
//! │                     │                                   │
//! │       ┌─────────────┼─────────────┐                     │
//! │       ▼             ▼             ▼                     │
//! │    OpenAI         Claude        Gemini      (어댑터)     │
//! │       │             │             │                     │
//! │       ▼             ▼             ▼                     │
//! │  EngineCache   ClaudeCounter  EngineCache               │
//! │  (모델별 BPE)   (API / 추정)    (단일 엔진)               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod storage;
pub mod tokenizer;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{ClaudeConfig, GeminiConfig, TokenizerConfig, TOKENIZER_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, StoreScope};

// ============================================================================
// Tokenizer (패밀리별 토큰 계산)
// ============================================================================
pub use tokenizer::{
    // Types
    BenchmarkReport,
    TimingStats,
    TokenCountResult,
    TokenFamily,
    TokenizerError,
    WarmUpReport,
    WarmUpStatus,
    // Facade
    TokenCounter,
    // Cache & Factory
    DefaultEngineFactory,
    EngineCache,
    EngineFactory,
    // Traits
    ClaudeCounter,
    Encoder,
};
