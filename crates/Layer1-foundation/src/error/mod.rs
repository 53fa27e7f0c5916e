//! Error types for tokenmeter
//!
//! 카운트 자체의 실패는 `TokenCountResult`에 담기므로 여기에는
//! 호출 전에 드러나는 에러(설정, 입력 형태)만 있습니다.
//! 토크나이저 엔진 에러는 `tokenizer::TokenizerError`를 보세요.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// tokenmeter 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 입력 관련
    // ========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::InvalidInput("Input must be an array of strings".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: Input must be an array of strings"
        );

        let err = Error::Config("Cannot find config directory".to_string());
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
