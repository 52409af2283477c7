//! 트레이딩 계좌 스냅샷 동기화 엔진.
//!
//! 로컬에 영속된 계좌 스냅샷(balance/equity/profit/margin)을 불안정한 HTTP
//! 브리지 너머의 원천 데이터와 주기적으로 조정(reconcile)하는 백그라운드
//! 엔진입니다:
//! - 소스 폴백 + 지수 백오프 재시도 조회
//! - 오염 의심 데이터 검증 거부 (영속 상태 보호)
//! - 고정 간격 무인 구동 + 성공률 헬스 게이트 알림
//! - 운영자용 헬스 대시보드 (순수 읽기)

pub mod dashboard;
pub mod engine;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod synchronizer;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;

pub use dashboard::{AccountHealth, DashboardReport, HealthDashboard, HealthState};
pub use engine::SyncEngine;
pub use error::{Result, StoreError, SyncError, ValidationError};
pub use orchestrator::FleetSynchronizer;
pub use scheduler::SyncScheduler;
pub use stats::{FleetStatus, FleetSyncSummary, SyncStats};
pub use store::{MemorySnapshotStore, PgSnapshotStore, SnapshotStore};
pub use synchronizer::AccountSynchronizer;
pub use validator::Validator;
