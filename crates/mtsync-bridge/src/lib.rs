//! MT5 브리지 HTTP API에서 계좌 데이터를 가져오는 crate.
//!
//! 구성 요소:
//! - [`BridgeSource`]: 브리지 1회 호출 + 응답 정규화 (1순위 소스)
//! - [`BrokerDirectSource`]: 브로커 직접 API 폴백 (미구현 소스도 유효한 실패)
//! - [`RetryingFetcher`]: 소스 우선순위 + 지수 백오프 재시도 제어

pub mod bridge;
pub mod error;
pub mod retry;
pub mod source;

pub use bridge::BridgeSource;
pub use error::FetchError;
pub use retry::{AccountFetcher, FetchOutcome, RetryPolicy, RetryingFetcher, Sleeper, TokioSleeper};
pub use source::{build_sources, AccountDataSource, BrokerDirectSource};
