//! 계좌 데이터 소스 추상화.
//!
//! 소스는 우선순위 순서로 구성되며(브리지 → 브로커 직접 API),
//! 재시도 컨트롤러가 이 순서대로 폴백합니다.

use crate::bridge::BridgeSource;
use crate::error::FetchError;
use async_trait::async_trait;
use mtsync_core::config::BridgeConfig;
use mtsync_core::types::{AccountInfo, FetchSource};

/// 한 계좌 로그인에 대한 단일 조회를 수행하는 데이터 소스.
///
/// 호출 1회 = 네트워크 호출 1회. 영속화 등의 부수효과는 없습니다.
#[async_trait]
pub trait AccountDataSource: Send + Sync {
    /// 로그용 소스 이름.
    fn name(&self) -> &str;

    /// 소스 구분 (primary/fallback).
    fn kind(&self) -> FetchSource;

    /// 계좌 데이터 1회 조회.
    async fn fetch(&self, login: &str) -> Result<AccountInfo, FetchError>;
}

/// 브로커 직접 API 폴백 소스.
///
/// 아직 구현되지 않은 소스로, "지원되지 않음"을 유효한 실패로 보고합니다.
/// 브리지 장애 시 두 번째 경로가 필요해지면 여기에 구현을 채웁니다.
pub struct BrokerDirectSource;

#[async_trait]
impl AccountDataSource for BrokerDirectSource {
    fn name(&self) -> &str {
        "broker-direct"
    }

    fn kind(&self) -> FetchSource {
        FetchSource::Fallback
    }

    async fn fetch(&self, login: &str) -> Result<AccountInfo, FetchError> {
        tracing::debug!(login = login, "브로커 직접 API는 아직 구현되지 않았습니다");
        Err(FetchError::NotSupported(
            "broker direct API is not implemented".to_string(),
        ))
    }
}

/// 설정에 따라 우선순위 순서의 소스 목록 구성.
pub fn build_sources(config: &BridgeConfig) -> Vec<Box<dyn AccountDataSource>> {
    let mut sources: Vec<Box<dyn AccountDataSource>> = vec![Box::new(BridgeSource::new(config))];
    if config.enable_broker_fallback {
        sources.push(Box::new(BrokerDirectSource));
    }
    sources
}
