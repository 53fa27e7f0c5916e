//! Engine Cache - 토크나이저 엔진 캐시
//!
//! 엔진 생성(어휘 테이블 로드)은 비용이 크므로 한 번 만든 엔진을 재사용합니다.
//!
//! - OpenAI: 모델 ID별 인코더
//! - Gemini: 단일 인코더
//! - Claude: 캐시 없음 (요청마다 상태 없는 비동기 호출)
//!
//! 엔트리는 제거되지 않으며, 삽입은 insert-if-absent 입니다.

use super::traits::{Encoder, EngineFactory};
use super::types::{TokenizerError, WarmUpReport, WarmUpStatus};
use crate::config::TokenizerConfig;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Gemini 엔진 캐시 키 (워밍업 리포트용)
const GEMINI_KEY: &str = "gemini";

/// 토크나이저 엔진 캐시
pub struct EngineCache {
    factory: Arc<dyn EngineFactory>,
    /// 모델 미지정 시 사용할 OpenAI 모델
    default_model: String,
    /// 워밍업 대상 OpenAI 모델
    warm_up_models: Vec<String>,
    openai: RwLock<HashMap<String, Arc<dyn Encoder>>>,
    gemini: RwLock<Option<Arc<dyn Encoder>>>,
    /// 워밍업 완료 플래그 (전부 성공했을 때만 true)
    initialized: AtomicBool,
}

impl EngineCache {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        default_model: impl Into<String>,
        warm_up_models: Vec<String>,
    ) -> Self {
        Self {
            factory,
            default_model: default_model.into(),
            warm_up_models,
            openai: RwLock::new(HashMap::new()),
            gemini: RwLock::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// 설정의 기본 모델/워밍업 목록으로 생성
    pub fn with_config(factory: Arc<dyn EngineFactory>, config: &TokenizerConfig) -> Self {
        Self::new(factory, config.default_model(), config.warm_up_models())
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    // ========================================================================
    // 엔진 접근
    // ========================================================================

    /// OpenAI 인코더 가져오기 (없으면 생성 후 캐싱)
    ///
    /// `None`이면 기본 모델을 사용합니다.
    pub async fn openai_engine(
        &self,
        model: Option<&str>,
    ) -> Result<Arc<dyn Encoder>, TokenizerError> {
        let model = model.unwrap_or(&self.default_model);

        let cached = self.openai.read().get(model).cloned();
        if let Some(engine) = cached {
            return Ok(engine);
        }

        let owned = model.to_string();
        let engine = self.build(move |factory| factory.openai(&owned)).await?;

        // 동시에 생성된 경우 먼저 들어간 엔진 유지
        let mut cache = self.openai.write();
        let entry = cache.entry(model.to_string()).or_insert(engine);
        Ok(Arc::clone(entry))
    }

    /// Gemini 인코더 가져오기 (없으면 생성 후 캐싱)
    pub async fn gemini_engine(&self) -> Result<Arc<dyn Encoder>, TokenizerError> {
        let cached = self.gemini.read().clone();
        if let Some(engine) = cached {
            return Ok(engine);
        }

        let engine = self.build(|factory| factory.gemini()).await?;

        let mut slot = self.gemini.write();
        let entry = slot.get_or_insert(engine);
        Ok(Arc::clone(entry))
    }

    /// 엔진 생성은 어휘 로드/다운로드가 있으므로 blocking 스레드에서 실행
    async fn build<F>(&self, build: F) -> Result<Arc<dyn Encoder>, TokenizerError>
    where
        F: FnOnce(&dyn EngineFactory) -> Result<Arc<dyn Encoder>, TokenizerError>
            + Send
            + 'static,
    {
        let factory = Arc::clone(&self.factory);
        tokio::task::spawn_blocking(move || build(factory.as_ref()))
            .await
            .map_err(|e| {
                TokenizerError::InitializationFailed(format!("Engine build task failed: {}", e))
            })?
    }

    // ========================================================================
    // 워밍업
    // ========================================================================

    /// 자주 쓰는 엔진을 미리 생성 (best-effort)
    ///
    /// 에러를 반환하지 않습니다. 실패는 경고 로그와 리포트로만 드러나며,
    /// 실패가 있으면 완료 플래그를 세우지 않으므로 다음 호출에서 재시도합니다.
    pub async fn warm_up(&self) -> WarmUpReport {
        if self.initialized.load(Ordering::Acquire) {
            return WarmUpReport::already_warm();
        }

        let mut warmed = Vec::new();
        let mut estimated = Vec::new();
        let mut failures = Vec::new();

        for model in &self.warm_up_models {
            let key = format!("openai:{}", model);
            match self.openai_engine(Some(model)).await {
                Ok(engine) => {
                    if !engine.is_exact() {
                        estimated.push(key.clone());
                    }
                    warmed.push(key);
                }
                Err(e) => failures.push((key, e.to_string())),
            }
        }

        match self.gemini_engine().await {
            Ok(engine) => {
                if !engine.is_exact() {
                    estimated.push(GEMINI_KEY.to_string());
                }
                warmed.push(GEMINI_KEY.to_string());
            }
            Err(e) => failures.push((GEMINI_KEY.to_string(), e.to_string())),
        }

        let status = if failures.is_empty() {
            self.initialized.store(true, Ordering::Release);
            tracing::debug!("Tokenizer cache warmed: {}", warmed.join(", "));
            WarmUpStatus::Complete
        } else {
            for (key, error) in &failures {
                tracing::warn!("Cache initialization failed for {}: {}", key, error);
            }
            WarmUpStatus::Partial
        };

        WarmUpReport {
            status,
            warmed,
            estimated,
            failures,
        }
    }

    // ========================================================================
    // 조회
    // ========================================================================

    pub fn is_warm(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// 캐시된 OpenAI 모델 목록 (정렬)
    pub fn cached_openai_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.openai.read().keys().cloned().collect();
        models.sort();
        models
    }

    pub fn has_gemini(&self) -> bool {
        self.gemini.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::testing::CountingFactory;

    fn cache_with(factory: &Arc<CountingFactory>) -> EngineCache {
        EngineCache::new(
            factory.clone(),
            "gpt-4o",
            vec!["gpt-4o".to_string(), "gpt-4".to_string()],
        )
    }

    #[tokio::test]
    async fn test_openai_engine_identity() {
        let factory = Arc::new(CountingFactory::new());
        let cache = cache_with(&factory);

        let first = cache.openai_engine(Some("gpt-4o")).await.unwrap();
        let second = cache.openai_engine(Some("gpt-4o")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.openai_calls(), 1);
    }

    #[tokio::test]
    async fn test_default_model() {
        let factory = Arc::new(CountingFactory::new());
        let cache = cache_with(&factory);

        let default = cache.openai_engine(None).await.unwrap();
        let explicit = cache.openai_engine(Some("gpt-4o")).await.unwrap();

        assert!(Arc::ptr_eq(&default, &explicit));
        assert_eq!(cache.cached_openai_models(), vec!["gpt-4o"]);
    }

    #[tokio::test]
    async fn test_gemini_singleton() {
        let factory = Arc::new(CountingFactory::new());
        let cache = cache_with(&factory);
        assert!(!cache.has_gemini());

        let first = cache.gemini_engine().await.unwrap();
        let second = cache.gemini_engine().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.gemini_calls(), 1);
        assert!(cache.has_gemini());
    }

    #[tokio::test]
    async fn test_failed_build_is_not_cached() {
        let factory = Arc::new(CountingFactory::new().fail_openai("broken-model"));
        let cache = cache_with(&factory);

        assert!(cache.openai_engine(Some("broken-model")).await.is_err());
        assert!(cache.openai_engine(Some("broken-model")).await.is_err());

        assert_eq!(factory.openai_calls(), 2);
        assert!(cache.cached_openai_models().is_empty());
    }

    #[tokio::test]
    async fn test_warm_up_complete_then_idempotent() {
        let factory = Arc::new(CountingFactory::new());
        let cache = cache_with(&factory);

        let report = cache.warm_up().await;
        assert_eq!(report.status, WarmUpStatus::Complete);
        assert_eq!(report.warmed, vec!["openai:gpt-4o", "openai:gpt-4", "gemini"]);
        assert!(report.estimated.is_empty());
        assert!(report.failures.is_empty());
        assert!(cache.is_warm());

        let again = cache.warm_up().await;
        assert_eq!(again.status, WarmUpStatus::AlreadyWarm);
        assert_eq!(factory.openai_calls(), 2);
        assert_eq!(factory.gemini_calls(), 1);
    }

    #[tokio::test]
    async fn test_warm_up_partial() {
        let factory = Arc::new(CountingFactory::new().fail_openai("gpt-4").fail_gemini());
        let cache = cache_with(&factory);

        let report = cache.warm_up().await;
        assert_eq!(report.status, WarmUpStatus::Partial);
        assert!(!report.is_complete());
        assert_eq!(report.warmed, vec!["openai:gpt-4o"]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].0, "openai:gpt-4");
        assert_eq!(report.failures[1].0, "gemini");

        // 부분 실패 시 플래그가 서지 않으므로 다시 시도
        assert!(!cache.is_warm());
        let retry = cache.warm_up().await;
        assert_eq!(retry.status, WarmUpStatus::Partial);
        // 이미 캐시된 gpt-4o는 다시 생성하지 않음
        assert_eq!(factory.openai_calls(), 3);
    }

    #[tokio::test]
    async fn test_warm_up_reports_estimated_engines() {
        let factory = Arc::new(CountingFactory::new().estimate_gemini());
        let cache = cache_with(&factory);

        let report = cache.warm_up().await;
        assert_eq!(report.status, WarmUpStatus::Complete);
        assert_eq!(report.estimated, vec!["gemini"]);
    }

    #[tokio::test]
    async fn test_concurrent_builds_keep_one_engine() {
        let factory = Arc::new(CountingFactory::new());
        let cache = cache_with(&factory);

        let (first, second) = tokio::join!(
            cache.openai_engine(Some("gpt-4")),
            cache.openai_engine(Some("gpt-4"))
        );
        let cached = cache.openai_engine(Some("gpt-4")).await.unwrap();

        // 두 번 생성될 수는 있지만 캐시에는 처음 들어간 엔진만 남음
        let first = first.unwrap();
        let second = second.unwrap();
        assert!(Arc::ptr_eq(&first, &cached) || Arc::ptr_eq(&second, &cached));
        assert_eq!(cache.cached_openai_models(), vec!["gpt-4"]);
    }

    #[tokio::test]
    async fn test_accessors_bypass_warm_up_flag() {
        let factory = Arc::new(CountingFactory::new());
        let cache = cache_with(&factory);

        cache.openai_engine(Some("gpt-4o")).await.unwrap();
        assert!(!cache.is_warm());

        cache.warm_up().await;
        // gpt-4o는 이미 캐시되어 있으므로 gpt-4만 생성
        assert_eq!(factory.openai_calls(), 2);
    }
}
