//! 지수 백오프 재시도 컨트롤러.
//!
//! 소스를 우선순위 순서로 순회하며, 소스당 최대 N회 시도합니다.
//! 시도 사이 딜레이는 `base * 2^attempt`입니다 (기본 2s → 2s, 4s, ...).
//! 슬립은 [`Sleeper`]로 주입되어 실제 시간 지연 없이 테스트할 수 있습니다.

use crate::error::FetchError;
use crate::source::AccountDataSource;
use async_trait::async_trait;
use mtsync_core::config::RetryConfig;
use mtsync_core::types::{AccountInfo, FetchSource};
use std::time::Duration;

/// 재시도 정책.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 소스당 최대 시도 횟수
    pub max_attempts: u32,
    /// 백오프 기본 딜레이
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// 설정에서 정책 생성.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.attempts.max(1),
            base_delay: config.base_delay(),
        }
    }

    /// attempt번째 시도 실패 후 대기할 시간 (0부터 시작).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// 백오프 슬립 추상화.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// 주어진 시간만큼 대기.
    async fn sleep(&self, duration: Duration);
}

/// tokio 타이머 기반 실제 슬립.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 재시도까지 성공한 조회 결과.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// 정규화된 계좌 데이터
    pub info: AccountInfo,
    /// 데이터를 제공한 소스
    pub source: FetchSource,
}

/// 재시도/폴백을 감싼 계좌 조회 인터페이스.
///
/// Account Synchronizer는 이 trait에만 의존하므로 테스트에서 스텁으로
/// 대체할 수 있습니다.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// 모든 소스/시도를 동원한 계좌 조회.
    async fn fetch_with_retry(&self, login: &str) -> Result<FetchOutcome, FetchError>;
}

/// 소스 목록 + 재시도 정책을 조합한 기본 구현.
pub struct RetryingFetcher {
    sources: Vec<Box<dyn AccountDataSource>>,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl RetryingFetcher {
    /// 새 재시도 컨트롤러 생성.
    pub fn new(sources: Vec<Box<dyn AccountDataSource>>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(sources, policy, Box::new(TokioSleeper))
    }

    /// 슬립 구현을 직접 주입 (테스트용).
    pub fn with_sleeper(
        sources: Vec<Box<dyn AccountDataSource>>,
        policy: RetryPolicy,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            sources,
            policy,
            sleeper,
        }
    }
}

#[async_trait]
impl AccountFetcher for RetryingFetcher {
    async fn fetch_with_retry(&self, login: &str) -> Result<FetchOutcome, FetchError> {
        let mut last_error = "no sources configured".to_string();

        for source in &self.sources {
            for attempt in 0..self.policy.max_attempts {
                match source.fetch(login).await {
                    Ok(info) => {
                        tracing::debug!(
                            login = login,
                            source = source.name(),
                            attempt = attempt + 1,
                            "계좌 데이터 조회 성공"
                        );
                        return Ok(FetchOutcome {
                            info,
                            source: source.kind(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(
                            login = login,
                            source = source.name(),
                            attempt = attempt + 1,
                            max_attempts = self.policy.max_attempts,
                            error = %e,
                            "계좌 데이터 조회 실패"
                        );
                        let retryable = e.is_retryable();
                        last_error = e.to_string();

                        // 재시도 불가능한 에러는 같은 소스에 더 시도하지 않고
                        // 다음 소스로 넘어갑니다.
                        if !retryable {
                            break;
                        }
                        if attempt + 1 < self.policy.max_attempts {
                            self.sleeper.sleep(self.policy.delay_for(attempt)).await;
                        }
                    }
                }
            }
        }

        Err(FetchError::AllSourcesExhausted { last: last_error })
    }
}
