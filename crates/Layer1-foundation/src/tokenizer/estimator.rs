//! 추정 기반 토크나이저
//!
//! - EstimateEngine: 로컬 토크나이저가 없을 때 쓰는 문자 기반 추정 (Gemini 폴백)
//! - ClaudeEstimator: API 키가 없을 때 쓰는 Claude 추정 카운터

use super::traits::{ClaudeCounter, Encoder};
use super::types::{TokenFamily, TokenizerError};
use async_trait::async_trait;

// ============================================================================
// 추정 비율
// ============================================================================

/// 패밀리별 문자/토큰 비율
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateProfile {
    /// ASCII 문자당 토큰 비율
    pub chars_per_token: f32,
    /// CJK 문자당 토큰 비율
    pub cjk_chars_per_token: f32,
}

impl EstimateProfile {
    pub fn for_family(family: TokenFamily) -> Self {
        match family {
            TokenFamily::OpenAi | TokenFamily::Gemini => Self {
                chars_per_token: 4.0,
                cjk_chars_per_token: 1.5,
            },
            TokenFamily::Claude => Self {
                chars_per_token: 3.5,
                cjk_chars_per_token: 1.3,
            },
        }
    }

    /// 텍스트의 언어 특성을 분석하여 토큰 수 추정
    ///
    /// Single-pass, no allocation.
    #[inline]
    pub fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        let mut ascii_count = 0u32;
        let mut cjk_count = 0u32;
        let mut other_count = 0u32;

        for c in text.chars() {
            if c.is_ascii() {
                ascii_count += 1;
            } else if is_cjk(c) {
                cjk_count += 1;
            } else {
                other_count += 1;
            }
        }

        let ascii_tokens = ascii_count as f32 / self.chars_per_token;
        let cjk_tokens = cjk_count as f32 / self.cjk_chars_per_token;
        let other_tokens = other_count as f32 / 2.0; // 기타 유니코드

        (ascii_tokens + cjk_tokens + other_tokens).ceil() as usize
    }
}

// ============================================================================
// 기본 추정 엔진
// ============================================================================

/// 문자 기반 추정 엔진 (fallback)
pub struct EstimateEngine {
    profile: EstimateProfile,
    name: String,
}

impl EstimateEngine {
    pub fn new(family: TokenFamily) -> Self {
        Self {
            profile: EstimateProfile::for_family(family),
            name: format!("{}-estimate", family),
        }
    }
}

impl Encoder for EstimateEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, _text: &str) -> Result<Vec<u32>, TokenizerError> {
        // 추정 기반이므로 실제 인코딩은 지원하지 않음
        Err(TokenizerError::EncodingFailed(
            "Estimate tokenizer does not support encoding".to_string(),
        ))
    }

    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.profile.estimate(text))
    }

    fn is_exact(&self) -> bool {
        false
    }
}

// ============================================================================
// Claude 추정
// ============================================================================

/// Claude 추정 카운터
///
/// ## 언어별 토큰 효율 (Claude 특성)
///
/// - 영어: ~3.5 chars/token
/// - 한국어: ~1.3 chars/token
/// - 코드: 기본 추정보다 토큰이 조금 더 많음
pub struct ClaudeEstimator {
    profile: EstimateProfile,
}

impl ClaudeEstimator {
    pub fn new() -> Self {
        Self {
            profile: EstimateProfile::for_family(TokenFamily::Claude),
        }
    }

    /// 코드 블록 비율을 반영한 추정
    pub fn estimate(&self, text: &str) -> usize {
        let base_count = self.profile.estimate(text);

        let code_ratio = detect_code_ratio(text);
        if code_ratio > 0.3 {
            let adjustment = (base_count as f32 * code_ratio * 0.1) as usize;
            return base_count + adjustment;
        }

        base_count
    }
}

impl Default for ClaudeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaudeCounter for ClaudeEstimator {
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.estimate(text))
    }
}

// ============================================================================
// 헬퍼 함수
// ============================================================================

/// CJK (한중일) 문자인지 확인
///
/// Performance optimized:
/// - Fast-path for ASCII (most common case)
/// - Ordered checks by frequency (Korean > CJK > Japanese)
#[inline]
pub(crate) fn is_cjk(c: char) -> bool {
    let code = c as u32;

    if code < 0x1100 {
        return false;
    }

    // Korean syllables
    if (0xAC00..=0xD7AF).contains(&code) {
        return true;
    }

    // CJK Unified Ideographs
    if (0x4E00..=0x9FFF).contains(&code) {
        return true;
    }

    // Hiragana/Katakana
    if (0x3040..=0x30FF).contains(&code) {
        return true;
    }

    // Korean Jamo, compatibility
    (0x1100..=0x11FF).contains(&code) || (0x3130..=0x318F).contains(&code)
}

/// 코드 라인 비율 추정
#[inline]
pub(crate) fn detect_code_ratio(text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }

    const CODE_INDICATORS: &[&str] = &[
        "fn ", "def ", "class ", "import ", "from ", "const ", "let ", "var ", "pub ", "func ",
        "function ", "return ", "if ", "else ", "for ", "while ", "match ", "->", "=>", "::",
        "//", "/*", "*/", "# ", "```",
    ];

    let mut total_lines = 0u32;
    let mut code_lines = 0u32;

    for line in text.lines() {
        total_lines += 1;
        let trimmed = line.trim();

        if trimmed.starts_with('{')
            || trimmed.starts_with('}')
            || trimmed.ends_with(';')
            || trimmed.ends_with(':')
        {
            code_lines += 1;
            continue;
        }

        if CODE_INDICATORS.iter().any(|ind| trimmed.contains(ind)) {
            code_lines += 1;
        }
    }

    if total_lines == 0 {
        return 0.0;
    }

    code_lines as f32 / total_lines as f32
}
