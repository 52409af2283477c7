//! 계좌 동기화 도메인 타입.
//!
//! 스냅샷 저장소와 원격 브리지 사이에서 오가는 모든 데이터 형태를 정의합니다.
//! 느슨한 map 형태 대신 태그된 타입을 사용하여 실패 모드를 컴파일 타임에
//! 처리하도록 합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 계좌의 마지막 동기화 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// 마지막 동기화 성공
    Success,
    /// 마지막 동기화 실패
    Failed,
    /// 아직 한 번도 동기화되지 않음 (프로비저닝 직후 placeholder)
    Never,
}

impl SyncStatus {
    /// 저장소 TEXT 컬럼 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
            SyncStatus::Never => "never",
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SyncStatus::Success),
            "failed" => Ok(SyncStatus::Failed),
            "never" => Ok(SyncStatus::Never),
            _ => Err(format!("Unknown sync status: {}", s)),
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 트레이딩 계좌의 마지막 known-good 영속 상태.
///
/// 불변식: 한 번 기록된 `balance`/`equity`/`margin`은 항상 0 이상이며,
/// 실패하거나 거부된 동기화는 이 값들을 절대 변경하지 않습니다.
/// (`sync_status`/`sync_error`만 변경 가능)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// 외부 식별자 (MT5 로그인, 유일)
    pub login: String,
    /// 잔고
    pub balance: Decimal,
    /// 평가금액
    pub equity: Decimal,
    /// 평가손익
    pub profit: Decimal,
    /// 사용 증거금
    pub margin: Decimal,
    /// 마지막 성공 기록 시각 (never 상태면 None)
    pub updated_at: Option<DateTime<Utc>>,
    /// 마지막 동기화 상태
    pub sync_status: SyncStatus,
    /// 마지막 동기화 에러 메시지
    pub sync_error: Option<String>,
}

impl AccountSnapshot {
    /// 아직 동기화되지 않은 placeholder 스냅샷 생성.
    ///
    /// 계좌 프로비저닝(외부 협력자)이 동기화 대상으로 등록할 때의 초기 형태입니다.
    pub fn placeholder(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            balance: Decimal::ZERO,
            equity: Decimal::ZERO,
            profit: Decimal::ZERO,
            margin: Decimal::ZERO,
            updated_at: None,
            sync_status: SyncStatus::Never,
            sync_error: None,
        }
    }
}

/// 원격 소스에서 정규화된 계좌 데이터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// 잔고
    pub balance: Decimal,
    /// 평가금액
    pub equity: Decimal,
    /// 평가손익
    pub profit: Decimal,
    /// 사용 증거금
    pub margin: Decimal,
}

/// 데이터를 가져온 소스 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    /// MT5 브리지 (1순위)
    Primary,
    /// 브로커 직접 API (2순위)
    Fallback,
}

impl std::fmt::Display for FetchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchSource::Primary => write!(f, "primary"),
            FetchSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// 동기화 시도 1회의 결과.
///
/// Fleet Orchestrator가 사이클 요약으로 집계하고, 감사 로그에 기록됩니다.
/// 감사 로그와 "마지막 사이클" 캐시 외에는 영속되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    /// 계좌 로그인
    pub login: String,
    /// 성공 여부
    pub success: bool,
    /// 동기화 이전 잔고
    pub old_balance: Decimal,
    /// 동기화 이후 잔고 (실패 시 이전 잔고 그대로)
    pub new_balance: Decimal,
    /// 잔고 변동분
    pub delta: Decimal,
    /// 시도 시각
    pub timestamp: DateTime<Utc>,
    /// 실패 사유
    pub error: Option<String>,
    /// 데이터 소스 (fetch까지 도달하지 못했으면 None)
    pub source: Option<FetchSource>,
}

impl SyncResult {
    /// 성공 결과 생성.
    pub fn succeeded(
        login: impl Into<String>,
        old_balance: Decimal,
        new_balance: Decimal,
        source: FetchSource,
    ) -> Self {
        Self {
            login: login.into(),
            success: true,
            old_balance,
            new_balance,
            delta: new_balance - old_balance,
            timestamp: Utc::now(),
            error: None,
            source: Some(source),
        }
    }

    /// 실패 결과 생성. 스냅샷 값은 변경되지 않으므로 delta는 0입니다.
    pub fn failed(
        login: impl Into<String>,
        old_balance: Decimal,
        error: impl Into<String>,
        source: Option<FetchSource>,
    ) -> Self {
        Self {
            login: login.into(),
            success: false,
            old_balance,
            new_balance: old_balance,
            delta: Decimal::ZERO,
            timestamp: Utc::now(),
            error: Some(error.into()),
            source,
        }
    }
}

/// 감사 로그 이벤트 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEventType {
    /// 동기화 성공
    Success,
    /// 임계치를 넘는 잔고 변동 (기록용, 거부 아님)
    SignificantChange,
    /// 동기화 실패
    Error,
}

impl SyncEventType {
    /// 저장소 TEXT 컬럼 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncEventType::Success => "success",
            SyncEventType::SignificantChange => "significant_change",
            SyncEventType::Error => "error",
        }
    }
}

/// 추가 전용(append-only) 감사 로그 레코드.
///
/// 모든 동기화 시도마다 생성되며, 이 서브시스템은 절대 수정/삭제하지 않습니다.
/// (보존/순환 정책은 외부 소관)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    /// 계좌 로그인
    pub login: String,
    /// 이벤트 유형
    pub event_type: SyncEventType,
    /// 성공 여부
    pub success: bool,
    /// 이전 잔고
    pub old_balance: Decimal,
    /// 이후 잔고
    pub new_balance: Decimal,
    /// 변동분
    pub delta: Decimal,
    /// 실패 사유
    pub error: Option<String>,
    /// 데이터 소스
    pub source: Option<FetchSource>,
    /// 기록 시각
    pub created_at: DateTime<Utc>,
}

impl SyncLogEntry {
    /// 동기화 결과를 감사 로그 레코드로 변환.
    pub fn from_result(result: &SyncResult, event_type: SyncEventType) -> Self {
        Self {
            login: result.login.clone(),
            event_type,
            success: result.success,
            old_balance: result.old_balance,
            new_balance: result.new_balance,
            delta: result.delta,
            error: result.error.clone(),
            source: result.source,
            created_at: result.timestamp,
        }
    }
}
