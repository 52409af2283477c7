//! 원격 조회 에러 타입.

use thiserror::Error;

/// 원격 소스 조회 에러.
///
/// 단일 소스/시도의 에러는 재시도 컨트롤러가 로컬에서 복구하며,
/// 이 경계를 넘어 패닉으로 전파되는 일은 없습니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 비정상 HTTP 상태 코드
    #[error("Bad status: {0}")]
    BadStatus(u16),

    /// 요청 한도 초과
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 파싱 불가/필수 필드 누락 응답
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// 소스가 해당 작업을 지원하지 않음
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// 모든 소스의 모든 시도가 소진됨
    #[error("All sources exhausted: {last}")]
    AllSourcesExhausted {
        /// 마지막으로 관측된 에러
        last: String,
    },
}

impl FetchError {
    /// 같은 소스에 재시도할 가치가 있는 에러인지 확인.
    ///
    /// 4xx(429 제외)나 지원되지 않는 작업은 재시도해도 결과가 같으므로
    /// 즉시 다음 소스로 넘어갑니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_)
            | FetchError::Timeout(_)
            | FetchError::RateLimited => true,
            FetchError::BadStatus(status) => *status >= 500,
            FetchError::MalformedPayload(_)
            | FetchError::NotSupported(_)
            | FetchError::AllSourcesExhausted { .. } => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::MalformedPayload(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
