//! 계좌 1건 동기화 워크플로우.
//!
//! 스냅샷 조회 → 재시도 조회 → 검증 → 저장/감사 로그의 순차 파이프라인.
//! 모든 실패는 이 경계에서 실패한 [`SyncResult`]로 흡수되어 fleet 사이클을
//! 중단시키지 않습니다.

use crate::error::SyncError;
use crate::store::SnapshotStore;
use crate::validator::Validator;
use chrono::Utc;
use mtsync_bridge::AccountFetcher;
use mtsync_core::config::ValidationConfig;
use mtsync_core::types::{SyncEventType, SyncLogEntry, SyncResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 계좌 단위 동기화기.
pub struct AccountSynchronizer {
    store: Arc<dyn SnapshotStore>,
    fetcher: Arc<dyn AccountFetcher>,
    validator: Validator,
    significant_change_threshold: Decimal,
}

impl AccountSynchronizer {
    /// 새 동기화기 생성.
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        fetcher: Arc<dyn AccountFetcher>,
        config: &ValidationConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            validator: Validator::new(config),
            significant_change_threshold: config.significant_change_threshold,
        }
    }

    /// 계좌 1건 동기화.
    ///
    /// 멱등성: 원격 데이터가 변하지 않았다면 재호출해도 영속 상태는 동일하고
    /// `delta = 0`인 결과가 반환됩니다.
    pub async fn sync_one(&self, login: &str) -> SyncResult {
        // 1. 현재 스냅샷 조회. 없는 계좌는 재시도 없이 보고만 합니다.
        let snapshot = match self.store.get(login).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                let result = SyncResult::failed(
                    login,
                    Decimal::ZERO,
                    SyncError::AccountNotFound(login.to_string()).to_string(),
                    None,
                );
                self.append_log(&result, SyncEventType::Error).await;
                return result;
            }
            Err(e) => {
                let result = SyncResult::failed(
                    login,
                    Decimal::ZERO,
                    SyncError::from(e).to_string(),
                    None,
                );
                self.append_log(&result, SyncEventType::Error).await;
                return result;
            }
        };

        // 2. 원격 조회 (소스 폴백 + 지수 백오프는 fetcher 소관)
        let outcome = match self.fetcher.fetch_with_retry(login).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return self
                    .record_failure(login, snapshot.balance, e.to_string(), None)
                    .await;
            }
        };

        // 3. 검증. 거부된 데이터는 스냅샷에 닿지 않습니다.
        if let Err(e) = self.validator.validate(&snapshot, &outcome.info) {
            warn!(
                login = login,
                old_balance = %snapshot.balance,
                new_balance = %outcome.info.balance,
                error = %e,
                "수신 데이터 검증 거부"
            );
            return self
                .record_failure(login, snapshot.balance, e.to_string(), Some(outcome.source))
                .await;
        }

        // 4. 스냅샷 반영
        let now = Utc::now();
        if let Err(e) = self.store.apply_success(login, &outcome.info, now).await {
            return self
                .record_failure(
                    login,
                    snapshot.balance,
                    SyncError::from(e).to_string(),
                    Some(outcome.source),
                )
                .await;
        }

        let result = SyncResult::succeeded(
            login,
            snapshot.balance,
            outcome.info.balance,
            outcome.source,
        );
        self.append_log(&result, SyncEventType::Success).await;

        // 임계치를 넘는 변동은 운영자 가시성을 위해 추가 기록 (거부 아님)
        if result.delta.abs() > self.significant_change_threshold {
            info!(
                login = login,
                old_balance = %result.old_balance,
                new_balance = %result.new_balance,
                delta = %result.delta,
                "임계치를 넘는 잔고 변동"
            );
            self.append_log(&result, SyncEventType::SignificantChange)
                .await;
        }

        debug!(
            login = login,
            balance = %result.new_balance,
            delta = %result.delta,
            source = %outcome.source,
            "계좌 동기화 성공"
        );
        result
    }

    /// 실패를 스냅샷 상태 필드와 감사 로그에 기록.
    ///
    /// 실패 경로는 balance/equity/profit/margin을 절대 변경하지 않습니다.
    async fn record_failure(
        &self,
        login: &str,
        old_balance: Decimal,
        error: String,
        source: Option<mtsync_core::types::FetchSource>,
    ) -> SyncResult {
        if let Err(e) = self.store.mark_failure(login, &error).await {
            warn!(login = login, error = %e, "실패 상태 기록 실패");
        }
        let result = SyncResult::failed(login, old_balance, error, source);
        self.append_log(&result, SyncEventType::Error).await;
        result
    }

    /// 감사 로그 추가. 로그 기록 실패가 동기화 결과를 바꾸지는 않습니다.
    async fn append_log(&self, result: &SyncResult, event_type: SyncEventType) {
        let entry = SyncLogEntry::from_result(result, event_type);
        if let Err(e) = self.store.append_log(&entry).await {
            warn!(login = %result.login, error = %e, "감사 로그 기록 실패");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use crate::testutil::StubFetcher;
    use mtsync_core::types::{AccountInfo, AccountSnapshot, SyncStatus};
    use rust_decimal_macros::dec;

    fn validation_config() -> ValidationConfig {
        ValidationConfig {
            suspicious_change_pct: dec!(50),
            significant_change_threshold: dec!(10),
        }
    }

    fn seeded_store(login: &str, balance: Decimal) -> Arc<MemorySnapshotStore> {
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(AccountSnapshot {
            balance,
            equity: balance,
            sync_status: SyncStatus::Success,
            updated_at: Some(Utc::now()),
            ..AccountSnapshot::placeholder(login)
        });
        store
    }

    fn info(balance: Decimal) -> AccountInfo {
        AccountInfo {
            balance,
            equity: balance,
            profit: Decimal::ZERO,
            margin: Decimal::ZERO,
        }
    }

    fn synchronizer(
        store: Arc<MemorySnapshotStore>,
        fetcher: StubFetcher,
    ) -> AccountSynchronizer {
        AccountSynchronizer::new(store, Arc::new(fetcher), &validation_config())
    }

    #[tokio::test]
    async fn test_unknown_login_reported_not_retried() {
        let store = Arc::new(MemorySnapshotStore::new());
        let sync = synchronizer(Arc::clone(&store), StubFetcher::ok(info(dec!(100))));

        let result = sync.sync_one("999").await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("999"));

        let entries = store.log_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, SyncEventType::Error);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_snapshot_untouched() {
        let store = seeded_store("100", dec!(1000));
        let sync = synchronizer(Arc::clone(&store), StubFetcher::fail("bridge down"));

        let result = sync.sync_one("100").await;
        assert!(!result.success);

        let snapshot = store.get("100").await.unwrap().unwrap();
        assert_eq!(snapshot.balance, dec!(1000));
        assert_eq!(snapshot.sync_status, SyncStatus::Failed);
        assert!(snapshot.sync_error.as_deref().unwrap().contains("bridge down"));
    }

    #[tokio::test]
    async fn test_suspicious_change_rejected() {
        // 1000 → 1600 (60% 변동)은 거부되고 저장 잔고는 그대로
        let store = seeded_store("100", dec!(1000));
        let sync = synchronizer(Arc::clone(&store), StubFetcher::ok(info(dec!(1600))));

        let result = sync.sync_one("100").await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("Suspicious change"));

        let snapshot = store.get("100").await.unwrap().unwrap();
        assert_eq!(snapshot.balance, dec!(1000));
        assert_eq!(snapshot.sync_status, SyncStatus::Failed);
    }

    #[tokio::test]
    async fn test_negative_margin_rejected_and_never_persisted() {
        // balance/equity가 정상이어도 margin이 음수면 스냅샷에 닿으면 안 됨
        let store = seeded_store("100", dec!(1000));
        let sync = synchronizer(
            Arc::clone(&store),
            StubFetcher::ok(AccountInfo {
                balance: dec!(1000),
                equity: dec!(1000),
                profit: Decimal::ZERO,
                margin: dec!(-5),
            }),
        );

        let result = sync.sync_one("100").await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("margin"));

        let snapshot = store.get("100").await.unwrap().unwrap();
        assert_eq!(snapshot.margin, Decimal::ZERO);
        assert_eq!(snapshot.balance, dec!(1000));
        assert_eq!(snapshot.sync_status, SyncStatus::Failed);
    }

    #[tokio::test]
    async fn test_accepted_change_persists_and_reports_delta() {
        // 500 → 512 (2.4% 변동)은 허용
        let store = seeded_store("200", dec!(500));
        let sync = synchronizer(Arc::clone(&store), StubFetcher::ok(info(dec!(512))));

        let result = sync.sync_one("200").await;
        assert!(result.success);
        assert_eq!(result.delta, dec!(12));

        let snapshot = store.get("200").await.unwrap().unwrap();
        assert_eq!(snapshot.balance, dec!(512));
        assert_eq!(snapshot.sync_status, SyncStatus::Success);
        assert!(snapshot.sync_error.is_none());

        // delta 12 > 임계치 10 → significant_change 추가 기록
        let entries = store.log_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_type, SyncEventType::Success);
        assert_eq!(entries[1].event_type, SyncEventType::SignificantChange);
    }

    #[tokio::test]
    async fn test_small_delta_has_no_significant_entry() {
        let store = seeded_store("200", dec!(500));
        let sync = synchronizer(Arc::clone(&store), StubFetcher::ok(info(dec!(505))));

        let result = sync.sync_one("200").await;
        assert!(result.success);

        let entries = store.log_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, SyncEventType::Success);
    }

    #[tokio::test]
    async fn test_idempotent_resync() {
        let store = seeded_store("300", dec!(1000));
        let sync = synchronizer(Arc::clone(&store), StubFetcher::ok(info(dec!(1020))));

        let first = sync.sync_one("300").await;
        assert!(first.success);
        assert_eq!(first.delta, dec!(20));

        // 동일한 원격 데이터로 재실행: delta 0, significant_change 추가 없음
        let second = sync.sync_one("300").await;
        assert!(second.success);
        assert_eq!(second.delta, Decimal::ZERO);

        let significant = store
            .log_entries()
            .into_iter()
            .filter(|e| e.event_type == SyncEventType::SignificantChange)
            .count();
        assert_eq!(significant, 1);
    }
}
