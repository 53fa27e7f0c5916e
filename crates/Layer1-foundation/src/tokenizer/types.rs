//! Tokenizer 타입 정의

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Token Family
// ============================================================================

/// 토크나이저 패밀리
///
/// 어떤 외부 토크나이저 엔진을 사용할지 결정합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFamily {
    /// OpenAI tiktoken (BPE)
    #[default]
    OpenAi,
    /// Anthropic Claude
    Claude,
    /// Google Gemini
    Gemini,
}

impl TokenFamily {
    /// 벤치마크 실행 순서
    pub const BENCHMARK_ORDER: [TokenFamily; 3] =
        [TokenFamily::Claude, TokenFamily::OpenAi, TokenFamily::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for TokenFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenFamily {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            _ => Err(TokenizerError::UnsupportedFamily(s.to_string())),
        }
    }
}

// ============================================================================
// Token Count Result
// ============================================================================

/// 토큰 카운트 결과
///
/// `error`는 `success == false`일 때만 존재합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCountResult {
    /// 토큰 수
    pub count: usize,
    /// 소요 시간 (밀리초)
    pub timing_ms: f64,
    /// 요청한 패밀리 (이름으로 요청했는데 해석 실패 시 None)
    pub family: Option<TokenFamily>,
    /// 입력 텍스트
    pub text: String,
    pub success: bool,
    /// 정확한 토크나이저로 센 값인지 (추정/실패 시 false)
    pub exact: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenCountResult {
    pub fn succeeded(
        count: usize,
        timing_ms: f64,
        family: TokenFamily,
        text: impl Into<String>,
    ) -> Self {
        Self {
            count,
            timing_ms,
            family: Some(family),
            text: text.into(),
            success: true,
            exact: true,
            error: None,
        }
    }

    /// 추정 카운트 표시
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn failed(
        timing_ms: f64,
        family: Option<TokenFamily>,
        text: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            count: 0,
            timing_ms,
            family,
            text: text.into(),
            success: false,
            exact: false,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Benchmark
// ============================================================================

/// 패밀리별 시간 통계 (밀리초)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub samples: usize,
}

impl TimingStats {
    /// 샘플에서 통계 계산 (빈 샘플은 전부 0)
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let sum: f64 = samples.iter().sum();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            // 부동소수점 오차로 평균이 범위를 벗어나지 않도록 고정
            avg_ms: (sum / samples.len() as f64).clamp(min, max),
            min_ms: min,
            max_ms: max,
            samples: samples.len(),
        }
    }
}

/// 벤치마크 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub iterations: usize,
    pub stats: BTreeMap<TokenFamily, TimingStats>,
}

impl BenchmarkReport {
    pub fn get(&self, family: TokenFamily) -> Option<&TimingStats> {
        self.stats.get(&family)
    }
}

// ============================================================================
// Warm-up
// ============================================================================

/// 워밍업 결과 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmUpStatus {
    /// 모든 엔진 생성 성공
    Complete,
    /// 일부 엔진 생성 실패
    Partial,
    /// 이미 완료된 상태 (아무 작업 안 함)
    AlreadyWarm,
}

/// 워밍업 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmUpReport {
    pub status: WarmUpStatus,
    /// 캐시에 준비된 엔진 키 (`openai:<model>`, `gemini`)
    pub warmed: Vec<String>,
    /// 준비됐지만 추정 기반인 엔진 키
    pub estimated: Vec<String>,
    /// 실패한 엔진 키와 에러 메시지
    pub failures: Vec<(String, String)>,
}

impl WarmUpReport {
    pub fn already_warm() -> Self {
        Self {
            status: WarmUpStatus::AlreadyWarm,
            warmed: Vec::new(),
            estimated: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status != WarmUpStatus::Partial
    }
}

// ============================================================================
// Error
// ============================================================================

/// 토크나이저 에러
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizerError {
    /// 지원하지 않는 모델
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),
    /// 지원하지 않는 패밀리
    #[error("Unsupported token type: {0}")]
    UnsupportedFamily(String),
    /// 토크나이저 초기화 실패
    #[error("Tokenizer init failed: {0}")]
    InitializationFailed(String),
    /// 인코딩 실패
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// 외부 API 실패
    #[error("API error: {0}")]
    Api(String),
}
