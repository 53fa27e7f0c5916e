//! 로컬 토크나이저 엔진
//!
//! - TiktokenEngine: OpenAI 모델용 (tiktoken-rs)
//! - HfTokenizerEngine: Gemini용 (HuggingFace tokenizers, Gemma 어휘)

use super::traits::Encoder;
use super::types::TokenizerError;
use std::path::Path;
use tiktoken_rs::CoreBPE;
use tokenizers::Tokenizer as HfTokenizer;

// ============================================================================
// Tiktoken (OpenAI)
// ============================================================================

/// OpenAI tiktoken 기반 인코더
///
/// 모델 ID로 인코딩(o200k_base, cl100k_base 등)을 결정합니다.
/// 생성 시 어휘 테이블을 로드하므로 비용이 큽니다.
pub struct TiktokenEngine {
    model: String,
    bpe: CoreBPE,
}

impl TiktokenEngine {
    pub fn for_model(model: &str) -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| TokenizerError::UnsupportedModel(format!("{}: {}", model, e)))?;

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Encoder for TiktokenEngine {
    fn name(&self) -> &str {
        &self.model
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        Ok(self.bpe.encode_ordinary(text))
    }
}

// ============================================================================
// HuggingFace tokenizers (Gemini)
// ============================================================================

/// HuggingFace tokenizer.json 기반 인코더
pub struct HfTokenizerEngine {
    name: String,
    tokenizer: HfTokenizer,
}

impl HfTokenizerEngine {
    /// 로컬 tokenizer.json에서 로드
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let tokenizer = HfTokenizer::from_file(path).map_err(|e| {
            TokenizerError::InitializationFailed(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self {
            name: path.display().to_string(),
            tokenizer,
        })
    }

    /// HuggingFace Hub 저장소에서 로드 (네트워크, blocking)
    pub fn from_hub(repo: &str, token: Option<String>) -> Result<Self, TokenizerError> {
        let params = tokenizers::FromPretrainedParameters {
            token,
            ..Default::default()
        };

        let tokenizer = HfTokenizer::from_pretrained(repo, Some(params))
            .map_err(|e| TokenizerError::InitializationFailed(format!("{}: {}", repo, e)))?;

        Ok(Self {
            name: repo.to_string(),
            tokenizer,
        })
    }
}

impl Encoder for HfTokenizerEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TokenizerError::EncodingFailed(e.to_string()))?;

        Ok(encoding.get_ids().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiktoken_hello_world() {
        let engine = TiktokenEngine::for_model("gpt-4o").unwrap();

        // o200k_base: "Hello" "," " world" "!"
        assert_eq!(engine.count("Hello, world!").unwrap(), 4);
        assert_eq!(engine.model(), "gpt-4o");
        assert!(engine.is_exact());
    }

    #[test]
    fn test_tiktoken_cl100k_model() {
        let engine = TiktokenEngine::for_model("gpt-3.5-turbo").unwrap();
        assert_eq!(engine.encode("Hello, world!").unwrap().len(), 4);
    }

    #[test]
    fn test_tiktoken_unknown_model() {
        let result = TiktokenEngine::for_model("definitely-not-a-model");
        assert!(matches!(result, Err(TokenizerError::UnsupportedModel(_))));
    }

    #[test]
    fn test_hf_missing_file() {
        let result = HfTokenizerEngine::from_file(Path::new("/nonexistent/tokenizer.json"));
        assert!(matches!(
            result,
            Err(TokenizerError::InitializationFailed(_))
        ));
    }
}
