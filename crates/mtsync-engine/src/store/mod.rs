//! 스냅샷 저장소 인터페이스.
//!
//! 저장소 스키마와 커넥션 수명주기는 협력자(호스트) 소유입니다.
//! 이 서브시스템은 준비된 핸들을 받아 로그인 단위 조회/갱신과
//! 추가 전용 감사 로그만 사용합니다.

pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mtsync_core::types::{AccountInfo, AccountSnapshot, SyncLogEntry};

pub use memory::MemorySnapshotStore;
pub use postgres::PgSnapshotStore;

/// 계좌 스냅샷 저장소.
///
/// 불변식: 실패 경로(`mark_failure`)는 `sync_status`/`sync_error`만 변경하며
/// balance/equity/profit/margin은 성공 경로(`apply_success`)만 변경합니다.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 로그인으로 스냅샷 조회.
    async fn get(&self, login: &str) -> Result<Option<AccountSnapshot>, StoreError>;

    /// 동기화 대상(활성) 계좌 전체 조회.
    async fn list_active(&self) -> Result<Vec<AccountSnapshot>, StoreError>;

    /// 검증을 통과한 데이터를 스냅샷에 반영.
    ///
    /// balance/equity/profit/margin/updated_at을 갱신하고
    /// `sync_status=success`, `sync_error=NULL`로 설정합니다.
    /// 갱신된 행이 없으면 `StoreError::NotFound`입니다.
    async fn apply_success(
        &self,
        login: &str,
        info: &AccountInfo,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// 동기화 실패 기록. 스냅샷 값은 건드리지 않습니다.
    async fn mark_failure(&self, login: &str, error: &str) -> Result<(), StoreError>;

    /// 감사 로그 추가 (append-only).
    async fn append_log(&self, entry: &SyncLogEntry) -> Result<(), StoreError>;
}
