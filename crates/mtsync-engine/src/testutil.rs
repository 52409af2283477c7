//! 엔진 테스트 공용 스텁.

use async_trait::async_trait;
use mtsync_bridge::{AccountFetcher, FetchError, FetchOutcome};
use mtsync_core::types::{AccountInfo, FetchSource};
use std::collections::HashMap;

/// 재시도/폴백 없이 정해진 응답을 돌려주는 fetcher 스텁.
pub(crate) enum StubFetcher {
    /// 모든 로그인에 같은 데이터 반환
    Ok(AccountInfo),
    /// 모든 로그인에 소진 에러 반환
    Fail(String),
    /// 로그인별 응답 (없는 로그인은 네트워크 에러)
    PerLogin(HashMap<String, Result<AccountInfo, String>>),
}

impl StubFetcher {
    pub(crate) fn ok(info: AccountInfo) -> Self {
        StubFetcher::Ok(info)
    }

    pub(crate) fn fail(error: impl Into<String>) -> Self {
        StubFetcher::Fail(error.into())
    }

    pub(crate) fn per_login(
        responses: impl IntoIterator<Item = (&'static str, Result<AccountInfo, &'static str>)>,
    ) -> Self {
        StubFetcher::PerLogin(
            responses
                .into_iter()
                .map(|(login, r)| (login.to_string(), r.map_err(|e| e.to_string())))
                .collect(),
        )
    }
}

#[async_trait]
impl AccountFetcher for StubFetcher {
    async fn fetch_with_retry(&self, login: &str) -> Result<FetchOutcome, FetchError> {
        match self {
            StubFetcher::Ok(info) => Ok(FetchOutcome {
                info: *info,
                source: FetchSource::Primary,
            }),
            StubFetcher::Fail(error) => Err(FetchError::AllSourcesExhausted {
                last: error.clone(),
            }),
            StubFetcher::PerLogin(responses) => match responses.get(login) {
                Some(Ok(info)) => Ok(FetchOutcome {
                    info: *info,
                    source: FetchSource::Primary,
                }),
                Some(Err(error)) => Err(FetchError::AllSourcesExhausted {
                    last: error.clone(),
                }),
                None => Err(FetchError::Network(format!("unknown login: {}", login))),
            },
        }
    }
}
