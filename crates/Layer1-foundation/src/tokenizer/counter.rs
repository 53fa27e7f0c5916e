//! Token Counter - 패밀리 통합 토큰 카운트 파사드
//!
//! ## 실패 정책
//!
//! | 계층 | 정책 |
//! |------|------|
//! | 어댑터 (패밀리별) | 엔진 에러를 로그로 남기고 0 반환 (fail-soft) |
//! | 파사드 (`count_tokens`) | 모든 실패를 `success = false` 결과로 반환, 에러를 던지지 않음 |
//! | 배치 | 입력 형태 오류만 즉시 `Err`, 항목별 실패는 결과에 포함 |
//!
//! 어댑터의 fail-soft 때문에 엔진 내부 실패는 `success = true, count = 0`으로
//! 보입니다. 이때와 추정 엔진으로 센 경우 결과의 `exact`는 `false`입니다.

use super::cache::EngineCache;
use super::factory::{claude_counter, DefaultEngineFactory};
use super::traits::{ClaudeCounter, Encoder};
use super::types::{
    BenchmarkReport, TimingStats, TokenCountResult, TokenFamily, TokenizerError, WarmUpReport,
};
use crate::config::TokenizerConfig;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// 입력 검증 실패 메시지
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input: text must be a non-empty string";

/// 배치 입력이 배열이 아닐 때 메시지
pub const INVALID_BATCH_MESSAGE: &str = "Input must be an array of strings";

/// 카운트 대상
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Family(TokenFamily),
    /// 이름으로 요청된 패밀리 (해석 전)
    Named(&'a str),
    /// 모델을 지정한 OpenAI
    OpenAiModel(&'a str),
}

impl Target<'_> {
    fn family(&self) -> Option<TokenFamily> {
        match *self {
            Target::Family(family) => Some(family),
            Target::Named(name) => name.parse().ok(),
            Target::OpenAiModel(_) => Some(TokenFamily::OpenAi),
        }
    }
}

/// 어댑터 결과
#[derive(Debug, Clone, Copy)]
struct Counted {
    count: usize,
    exact: bool,
}

impl Counted {
    /// 어댑터 실패 시 값
    const ZERO: Counted = Counted {
        count: 0,
        exact: false,
    };

    fn with_encoder(encoder: &dyn Encoder, text: &str) -> std::result::Result<Self, TokenizerError> {
        Ok(Self {
            count: encoder.count(text)?,
            exact: encoder.is_exact(),
        })
    }
}

/// 토큰 카운터
pub struct TokenCounter {
    cache: EngineCache,
    claude: Arc<dyn ClaudeCounter>,
}

impl TokenCounter {
    /// 설정으로 기본 엔진 구성
    pub fn new(config: &TokenizerConfig) -> Self {
        let factory = Arc::new(DefaultEngineFactory::new(config.gemini.clone()));
        Self::with_engines(
            EngineCache::with_config(factory, config),
            claude_counter(&config.claude),
        )
    }

    /// 엔진 직접 주입
    pub fn with_engines(cache: EngineCache, claude: Arc<dyn ClaudeCounter>) -> Self {
        Self { cache, claude }
    }

    pub fn cache(&self) -> &EngineCache {
        &self.cache
    }

    pub async fn warm_up(&self) -> WarmUpReport {
        self.cache.warm_up().await
    }

    // ========================================================================
    // 단일 텍스트
    // ========================================================================

    /// 텍스트의 토큰 수 계산
    ///
    /// 항상 결과를 반환합니다. 실패는 `success = false`와 `error`로 표현됩니다.
    pub async fn count_tokens<'a>(
        &self,
        text: impl Into<Option<&'a str>>,
        family: TokenFamily,
    ) -> TokenCountResult {
        self.run(text.into(), Target::Family(family)).await
    }

    /// 패밀리 이름(`openai`, `claude`, `gemini`)으로 계산
    pub async fn count_tokens_named<'a>(
        &self,
        text: impl Into<Option<&'a str>>,
        family: &str,
    ) -> TokenCountResult {
        self.run(text.into(), Target::Named(family)).await
    }

    /// 특정 OpenAI 모델로 계산
    pub async fn count_tokens_with_model<'a>(
        &self,
        text: impl Into<Option<&'a str>>,
        model: &str,
    ) -> TokenCountResult {
        self.run(text.into(), Target::OpenAiModel(model)).await
    }

    async fn run(&self, text: Option<&str>, target: Target<'_>) -> TokenCountResult {
        let text = match text {
            Some(text) if !text.is_empty() => text,
            other => {
                return TokenCountResult::failed(
                    0.0,
                    target.family(),
                    other.unwrap_or_default(),
                    INVALID_INPUT_MESSAGE,
                );
            }
        };

        let start = Instant::now();
        match self.dispatch(text, target).await {
            Ok((family, counted)) => {
                TokenCountResult::succeeded(counted.count, elapsed_ms(start), family, text)
                    .with_exact(counted.exact)
            }
            Err(e) => TokenCountResult::failed(
                elapsed_ms(start),
                target.family(),
                text,
                format!("Token counting failed: {}", e),
            ),
        }
    }

    async fn dispatch(
        &self,
        text: &str,
        target: Target<'_>,
    ) -> std::result::Result<(TokenFamily, Counted), TokenizerError> {
        let (family, model) = match target {
            Target::Family(family) => (family, None),
            Target::Named(name) => (name.parse::<TokenFamily>()?, None),
            Target::OpenAiModel(model) => (TokenFamily::OpenAi, Some(model)),
        };

        let counted = match family {
            TokenFamily::OpenAi => self.count_openai(text, model).await,
            TokenFamily::Claude => self.count_claude(text).await,
            TokenFamily::Gemini => self.count_gemini(text).await,
        };

        Ok((family, counted))
    }

    // ========================================================================
    // 패밀리별 어댑터 (fail-soft)
    // ========================================================================

    async fn count_openai(&self, text: &str, model: Option<&str>) -> Counted {
        let counted = self
            .cache
            .openai_engine(model)
            .await
            .and_then(|engine| Counted::with_encoder(engine.as_ref(), text));

        counted.unwrap_or_else(|e| {
            tracing::error!("OpenAI counting error: {}", e);
            Counted::ZERO
        })
    }

    async fn count_claude(&self, text: &str) -> Counted {
        match self.claude.count_tokens(text).await {
            Ok(count) => Counted {
                count,
                exact: self.claude.is_exact(),
            },
            Err(e) => {
                tracing::error!("Claude counting error: {}", e);
                Counted::ZERO
            }
        }
    }

    async fn count_gemini(&self, text: &str) -> Counted {
        let counted = self
            .cache
            .gemini_engine()
            .await
            .and_then(|engine| Counted::with_encoder(engine.as_ref(), text));

        counted.unwrap_or_else(|e| {
            tracing::error!("Gemini local counting error: {}", e);
            Counted::ZERO
        })
    }

    // ========================================================================
    // 배치
    // ========================================================================

    /// 여러 텍스트를 입력 순서대로 순차 계산
    pub async fn count_tokens_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        family: TokenFamily,
    ) -> Vec<TokenCountResult> {
        let items: Vec<Option<&str>> = texts.iter().map(|t| Some(t.as_ref())).collect();
        self.run_batch(&items, family).await
    }

    /// JSON 값으로 배치 계산
    ///
    /// 배열이 아니면 워밍업 전에 즉시 `Error::InvalidInput`을 반환합니다.
    /// 문자열이 아닌 항목은 입력 없음으로 취급되어 해당 결과만 실패합니다.
    pub async fn count_tokens_batch_value(
        &self,
        texts: &Value,
        family: TokenFamily,
    ) -> Result<Vec<TokenCountResult>> {
        let items = batch_items(texts)?;
        Ok(self.run_batch(&items, family).await)
    }

    async fn run_batch(&self, items: &[Option<&str>], family: TokenFamily) -> Vec<TokenCountResult> {
        self.cache.warm_up().await;

        let start = Instant::now();
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.count_tokens(*item, family).await);
        }

        let total_ms = elapsed_ms(start);
        let avg_ms = if items.is_empty() {
            0.0
        } else {
            total_ms / items.len() as f64
        };
        tracing::info!(
            "Batch processed {} texts in {:.2}ms (avg: {:.2}ms per text)",
            items.len(),
            total_ms,
            avg_ms
        );

        results
    }

    // ========================================================================
    // 벤치마크
    // ========================================================================

    /// 패밀리별 `count_tokens` 소요 시간 측정
    ///
    /// 각 라운드마다 Claude → OpenAI → Gemini 순서로 한 번씩 호출합니다.
    pub async fn benchmark_tokenizers(&self, text: &str, iterations: usize) -> BenchmarkReport {
        tracing::info!(
            "Running {} iterations for each tokenizer (timings in ms)...",
            iterations
        );

        self.cache.warm_up().await;

        let mut samples: BTreeMap<TokenFamily, Vec<f64>> = TokenFamily::BENCHMARK_ORDER
            .iter()
            .map(|family| (*family, Vec::with_capacity(iterations)))
            .collect();

        for _ in 0..iterations {
            for family in TokenFamily::BENCHMARK_ORDER {
                let start = Instant::now();
                self.count_tokens(text, family).await;
                samples.entry(family).or_default().push(elapsed_ms(start));
            }
        }

        let stats = samples
            .into_iter()
            .map(|(family, times)| (family, TimingStats::from_samples(&times)))
            .collect();

        BenchmarkReport { iterations, stats }
    }
}

/// 배치 입력 해석
fn batch_items(value: &Value) -> Result<Vec<Option<&str>>> {
    let array = value
        .as_array()
        .ok_or_else(|| Error::InvalidInput(INVALID_BATCH_MESSAGE.to_string()))?;

    Ok(array.iter().map(Value::as_str).collect())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
