//! Config - 설정 관리
//!
//! - `tokenizer.rs` - TokenizerConfig (모델, 워밍업, Claude/Gemini 엔진 설정)

mod tokenizer;

pub use tokenizer::{
    ClaudeConfig, GeminiConfig, TokenizerConfig, DEFAULT_BENCHMARK_ITERATIONS,
    DEFAULT_OPENAI_MODEL, DEFAULT_WARM_UP_MODELS, TOKENIZER_CONFIG_FILE,
};
