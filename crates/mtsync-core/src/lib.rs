//! 계좌 동기화 엔진의 핵심 타입과 설정.
//!
//! 이 crate는 동기화 엔진 전반에서 공유되는 것들을 제공합니다:
//! - 도메인 타입 (계좌 스냅샷, 동기화 결과, 감사 로그)
//! - 환경변수 기반 설정
//! - tracing 로깅 초기화

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::SyncConfig;
pub use error::{CoreError, Result};
pub use types::{
    AccountInfo, AccountSnapshot, FetchSource, SyncEventType, SyncLogEntry, SyncResult, SyncStatus,
};
