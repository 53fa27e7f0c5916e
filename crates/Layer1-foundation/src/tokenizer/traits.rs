//! Tokenizer Trait 정의
//!
//! 외부 토크나이저 엔진을 추상화하는 경계입니다. 테스트에서는 이 trait들을
//! 직접 구현한 대체 엔진을 주입합니다.

use super::types::TokenizerError;
use async_trait::async_trait;
use std::sync::Arc;

/// 로컬 인코더 (OpenAI BPE, Gemini 등)
///
/// 한 번 생성하면 재사용 가능한 엔진입니다.
pub trait Encoder: Send + Sync {
    /// 엔진 이름 (로그용)
    fn name(&self) -> &str;

    /// 텍스트를 토큰 ID로 인코딩
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError>;

    /// 토큰 수 계산
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        self.encode(text).map(|ids| ids.len())
    }

    /// 정확한 토큰 계산 지원 여부
    fn is_exact(&self) -> bool {
        true
    }
}

/// 엔진 팩토리
///
/// 엔진 생성은 비용이 크므로 (어휘 테이블 로드) 호출자는 결과를 캐싱해야 합니다.
pub trait EngineFactory: Send + Sync {
    /// OpenAI 모델 ID로 BPE 인코더 생성
    fn openai(&self, model: &str) -> Result<Arc<dyn Encoder>, TokenizerError>;

    /// Gemini 인코더 생성
    fn gemini(&self) -> Result<Arc<dyn Encoder>, TokenizerError>;
}

/// Claude 토큰 카운터
///
/// 재사용 가능한 로컬 엔진이 없으므로 요청마다 비동기 호출합니다.
#[async_trait]
pub trait ClaudeCounter: Send + Sync {
    async fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError>;

    /// 정확한 토큰 계산 지원 여부
    fn is_exact(&self) -> bool {
        false
    }
}
