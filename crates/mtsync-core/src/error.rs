//! 핵심 에러 타입.

use thiserror::Error;

/// 설정/초기화 단계의 에러.
///
/// 이 에러만 호스트 애플리케이션까지 전파되어 기동을 중단시킬 수 있습니다.
/// 동기화 사이클 중의 에러는 각 계층에서 흡수됩니다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 에러
    #[error("로깅 초기화 에러: {0}")]
    Logging(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, CoreError>;
