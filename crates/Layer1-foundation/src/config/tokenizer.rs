//! Tokenizer Config - 토크나이저 설정
//!
//! 글로벌 → 프로젝트 → 환경변수 순서로 병합됩니다 (뒤쪽이 우선).

use crate::storage::{read_json, JsonStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 설정 파일명
pub const TOKENIZER_CONFIG_FILE: &str = "config.json";

/// 기본 OpenAI 모델 (o200k_base)
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// 워밍업 시 미리 생성하는 OpenAI 모델
pub const DEFAULT_WARM_UP_MODELS: &[&str] = &["gpt-4o", "gpt-4", "gpt-3.5-turbo"];

/// 벤치마크 기본 반복 횟수
pub const DEFAULT_BENCHMARK_ITERATIONS: usize = 10;

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_CLAUDE_TIMEOUT_MS: u64 = 5000;

// 환경변수
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const ENV_GEMINI_TOKENIZER: &str = "TOKENMETER_GEMINI_TOKENIZER";
pub const ENV_HF_TOKEN: &str = "HF_TOKEN";

// ============================================================================
// Tokenizer Config
// ============================================================================

/// tokenmeter 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenizerConfig {
    /// OpenAI 기본 모델
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// 워밍업 대상 OpenAI 모델 목록
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warm_up_models: Option<Vec<String>>,

    /// 벤치마크 반복 횟수
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_iterations: Option<usize>,

    /// Claude (Anthropic) 설정
    #[serde(default)]
    pub claude: ClaudeConfig,

    /// Gemini 설정
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Claude 설정
///
/// `api_key`가 있으면 Anthropic `count_tokens` API를 사용하고,
/// 없으면 로컬 추정으로 동작합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Gemini 설정
///
/// 우선순위: `tokenizer_path` (로컬 tokenizer.json) → `hf_repo` (Hub) → 추정
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenizer_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hf_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hf_token: Option<String>,
}

impl TokenizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드 후 환경변수 적용
    pub fn load() -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::current_project().ok();

        let mut config = Self::from_stores(global.as_ref(), project.as_ref())?;
        config.apply_env();
        Ok(config)
    }

    /// 지정한 파일에서 로드 후 환경변수 적용
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config: Self = read_json(path)?;
        config.apply_env();
        Ok(config)
    }

    /// 저장소 목록에서 로드 (뒤쪽 저장소가 우선)
    pub fn from_stores(global: Option<&JsonStore>, project: Option<&JsonStore>) -> Result<Self> {
        let mut config = Self::new();

        for store in [global, project].into_iter().flatten() {
            if let Some(loaded) = store.load_optional::<TokenizerConfig>(TOKENIZER_CONFIG_FILE)? {
                config.merge(loaded);
            }
        }

        Ok(config)
    }

    /// 기본값이 채워진 설정 파일 생성
    ///
    /// 파일이 이미 있으면 `force` 없이는 덮어쓰지 않고 `false`를 반환합니다.
    /// API 키와 토큰은 기록하지 않습니다.
    pub fn init_store(store: &JsonStore, force: bool) -> Result<bool> {
        if store.exists(TOKENIZER_CONFIG_FILE) && !force {
            return Ok(false);
        }

        store.save(TOKENIZER_CONFIG_FILE, &Self::template())?;
        Ok(true)
    }

    /// 모든 기본값을 명시한 설정
    pub fn template() -> Self {
        Self {
            default_model: Some(DEFAULT_OPENAI_MODEL.to_string()),
            warm_up_models: Some(DEFAULT_WARM_UP_MODELS.iter().map(|m| m.to_string()).collect()),
            benchmark_iterations: Some(DEFAULT_BENCHMARK_ITERATIONS),
            claude: ClaudeConfig {
                api_key: None,
                base_url: Some(DEFAULT_ANTHROPIC_BASE_URL.to_string()),
                model: Some(DEFAULT_CLAUDE_MODEL.to_string()),
                timeout_ms: Some(DEFAULT_CLAUDE_TIMEOUT_MS),
            },
            gemini: GeminiConfig::default(),
        }
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: TokenizerConfig) {
        if other.default_model.is_some() {
            self.default_model = other.default_model;
        }
        if other.warm_up_models.is_some() {
            self.warm_up_models = other.warm_up_models;
        }
        if other.benchmark_iterations.is_some() {
            self.benchmark_iterations = other.benchmark_iterations;
        }

        let claude = other.claude;
        if claude.api_key.is_some() {
            self.claude.api_key = claude.api_key;
        }
        if claude.base_url.is_some() {
            self.claude.base_url = claude.base_url;
        }
        if claude.model.is_some() {
            self.claude.model = claude.model;
        }
        if claude.timeout_ms.is_some() {
            self.claude.timeout_ms = claude.timeout_ms;
        }

        let gemini = other.gemini;
        if gemini.tokenizer_path.is_some() {
            self.gemini.tokenizer_path = gemini.tokenizer_path;
        }
        if gemini.hf_repo.is_some() {
            self.gemini.hf_repo = gemini.hf_repo;
        }
        if gemini.hf_token.is_some() {
            self.gemini.hf_token = gemini.hf_token;
        }
    }

    /// 프로세스 환경변수 적용
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// 환경변수 조회 함수를 받아 적용 (빈 값은 무시)
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_ANTHROPIC_API_KEY) {
            self.claude.api_key = Some(key);
        }
        if let Some(url) = get(ENV_ANTHROPIC_BASE_URL) {
            self.claude.base_url = Some(url);
        }
        if let Some(path) = get(ENV_GEMINI_TOKENIZER) {
            self.gemini.tokenizer_path = Some(PathBuf::from(path));
        }
        if let Some(token) = get(ENV_HF_TOKEN) {
            self.gemini.hf_token = Some(token);
        }
    }

    // ========================================================================
    // Accessors (기본값 적용)
    // ========================================================================

    pub fn default_model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    pub fn warm_up_models(&self) -> Vec<String> {
        match &self.warm_up_models {
            Some(models) => models.clone(),
            None => DEFAULT_WARM_UP_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn benchmark_iterations(&self) -> usize {
        self.benchmark_iterations.unwrap_or(DEFAULT_BENCHMARK_ITERATIONS)
    }
}

impl ClaudeConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_CLAUDE_MODEL)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_CLAUDE_TIMEOUT_MS)
    }

    /// API 사용 가능 여부
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}
