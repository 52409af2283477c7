//! MT5 브리지 HTTP 클라이언트.
//!
//! `GET {base_url}/api/mt5/account/{login}/info`를 `X-API-Key` 헤더로 호출하여
//! `{balance, equity, profit, margin}` JSON을 정규화합니다.
//! 2xx가 아니거나 `balance`가 없는 응답은 조회 실패입니다.

use crate::error::FetchError;
use crate::source::AccountDataSource;
use async_trait::async_trait;
use mtsync_core::config::BridgeConfig;
use mtsync_core::types::{AccountInfo, FetchSource};
use rust_decimal::Decimal;
use serde::Deserialize;

/// 브리지 응답 payload.
#[derive(Debug, Deserialize)]
struct BridgeAccountPayload {
    balance: Option<Decimal>,
    #[serde(default)]
    equity: Option<Decimal>,
    #[serde(default)]
    profit: Option<Decimal>,
    #[serde(default)]
    margin: Option<Decimal>,
}

/// MT5 브리지 데이터 소스 (1순위).
#[derive(Clone)]
pub struct BridgeSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BridgeSource {
    /// 새로운 브리지 클라이언트 생성.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout())
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl AccountDataSource for BridgeSource {
    fn name(&self) -> &str {
        "mt5-bridge"
    }

    fn kind(&self) -> FetchSource {
        FetchSource::Primary
    }

    async fn fetch(&self, login: &str) -> Result<AccountInfo, FetchError> {
        let url = format!("{}/api/mt5/account/{}/info", self.base_url, login);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let payload: BridgeAccountPayload = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

        let balance = payload.balance.ok_or_else(|| {
            FetchError::MalformedPayload("응답에 balance 필드가 없습니다".to_string())
        })?;

        Ok(AccountInfo {
            balance,
            equity: payload.equity.unwrap_or(balance),
            profit: payload.profit.unwrap_or(Decimal::ZERO),
            margin: payload.margin.unwrap_or(Decimal::ZERO),
        })
    }
}
