//! 동기화 엔진 에러 타입.

use mtsync_bridge::FetchError;
use rust_decimal::Decimal;
use thiserror::Error;

/// 스냅샷 검증 거부 사유.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// 유한/음이 아닌 숫자가 아님
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// 직전 잔고 대비 변동률이 임계치 초과 (브리지 오염 의심)
    #[error("Suspicious change: {pct}%")]
    SuspiciousChange {
        /// 변동률 (%)
        pct: Decimal,
    },
}

/// 스냅샷 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 데이터베이스 에러
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 해당 로그인의 스냅샷 없음 (갱신 0건 포함)
    #[error("Account not found: {0}")]
    NotFound(String),
}

/// 계좌 1건 동기화 중 발생 가능한 에러.
///
/// 모든 variant는 Account Synchronizer 경계에서 실패한 `SyncResult`와
/// 감사 로그로 흡수되며, fleet 사이클을 중단시키지 않습니다.
#[derive(Debug, Error)]
pub enum SyncError {
    /// 로그인이 스냅샷 저장소에 없음 (재시도하지 않고 보고만)
    #[error("계좌를 찾을 수 없습니다: {0}")]
    AccountNotFound(String),

    /// 모든 소스/재시도 소진 포함 원격 조회 실패
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// 검증 거부
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 저장소 쓰기 실패
    #[error("저장 실패: {0}")]
    Persistence(String),

    /// 설정 에러 (initialize 단계에서만 전파)
    #[error("설정 에러: {0}")]
    Config(String),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(login) => SyncError::AccountNotFound(login),
            StoreError::Database(e) => SyncError::Persistence(e.to_string()),
        }
    }
}

impl From<mtsync_core::CoreError> for SyncError {
    fn from(err: mtsync_core::CoreError) -> Self {
        SyncError::Config(err.to_string())
    }
}

/// 엔진 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, SyncError>;
