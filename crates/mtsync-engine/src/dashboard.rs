//! 운영자용 헬스 대시보드 집계.
//!
//! 스냅샷 저장소에 대한 순수 읽기 경로입니다. 네트워크 호출이나 새 동기화를
//! 유발하지 않으며, 제외된 웹 레이어의 관리자 엔드포인트가 이 리포트를
//! 그대로 직렬화해 내보냅니다.

use crate::error::Result;
use crate::stats::FleetSyncSummary;
use crate::store::SnapshotStore;
use chrono::{DateTime, Utc};
use mtsync_core::config::DashboardConfig;
use mtsync_core::types::{AccountSnapshot, SyncStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// 계좌 헬스 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// 신선도 윈도우 이내에 갱신됨
    Synced,
    /// 마지막 성공이 윈도우보다 오래됨
    Stale,
    /// 마지막 동기화 실패
    Failed,
    /// 한 번도 동기화된 적 없음
    NeverSynced,
}

/// 계좌 1건의 헬스 정보.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountHealth {
    /// 계좌 로그인
    pub login: String,
    /// 분류 결과
    pub state: HealthState,
    /// 마지막 known-good 잔고
    pub balance: Decimal,
    /// 마지막 성공 시각
    pub updated_at: Option<DateTime<Utc>>,
    /// 마지막 동기화 에러
    pub sync_error: Option<String>,
}

/// 특정 시점의 fleet 헬스 리포트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// 리포트 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 전체 계좌 수
    pub total_accounts: usize,
    /// synced 수
    pub synced: usize,
    /// stale 수
    pub stale: usize,
    /// failed 수
    pub failed: usize,
    /// never_synced 수
    pub never_synced: usize,
    /// 계좌별 헬스
    pub accounts: Vec<AccountHealth>,
    /// 주시가 필요한 계좌 (watch 목록 + synced가 아닌 전부)
    pub critical_accounts: Vec<String>,
    /// 가장 최근 사이클 요약 (있다면)
    pub last_cycle: Option<FleetSyncSummary>,
}

/// 헬스 대시보드 집계기.
pub struct HealthDashboard {
    store: Arc<dyn SnapshotStore>,
    freshness_window: chrono::Duration,
    watch_logins: Vec<String>,
    last_summary: Arc<RwLock<Option<FleetSyncSummary>>>,
}

impl HealthDashboard {
    /// 새 대시보드 집계기 생성.
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        config: &DashboardConfig,
        last_summary: Arc<RwLock<Option<FleetSyncSummary>>>,
    ) -> Self {
        Self {
            store,
            freshness_window: config.freshness_window(),
            watch_logins: config.watch_logins.clone(),
            last_summary,
        }
    }

    /// 스냅샷 분류.
    ///
    /// 우선순위: never_synced → failed → (신선도 기준) synced/stale.
    /// never_synced는 staleness보다 우선합니다.
    fn classify(&self, snapshot: &AccountSnapshot, now: DateTime<Utc>) -> HealthState {
        match snapshot.sync_status {
            SyncStatus::Never => HealthState::NeverSynced,
            SyncStatus::Failed => HealthState::Failed,
            SyncStatus::Success => match snapshot.updated_at {
                Some(updated_at) if now - updated_at <= self.freshness_window => {
                    HealthState::Synced
                }
                _ => HealthState::Stale,
            },
        }
    }

    /// 현재 시점의 헬스 리포트 생성.
    pub async fn report(&self) -> Result<DashboardReport> {
        let now = Utc::now();
        let snapshots = self.store.list_active().await?;

        let mut accounts = Vec::with_capacity(snapshots.len());
        let mut critical_accounts = Vec::new();
        let (mut synced, mut stale, mut failed, mut never_synced) = (0, 0, 0, 0);

        for snapshot in &snapshots {
            let state = self.classify(snapshot, now);
            match state {
                HealthState::Synced => synced += 1,
                HealthState::Stale => stale += 1,
                HealthState::Failed => failed += 1,
                HealthState::NeverSynced => never_synced += 1,
            }

            if state != HealthState::Synced || self.watch_logins.contains(&snapshot.login) {
                critical_accounts.push(snapshot.login.clone());
            }

            accounts.push(AccountHealth {
                login: snapshot.login.clone(),
                state,
                balance: snapshot.balance,
                updated_at: snapshot.updated_at,
                sync_error: snapshot.sync_error.clone(),
            });
        }

        Ok(DashboardReport {
            generated_at: now,
            total_accounts: snapshots.len(),
            synced,
            stale,
            failed,
            never_synced,
            accounts,
            critical_accounts,
            last_cycle: self
                .last_summary
                .read()
                .expect("summary lock poisoned")
                .clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn dashboard_with(
        store: Arc<MemorySnapshotStore>,
        watch_logins: Vec<String>,
    ) -> HealthDashboard {
        HealthDashboard::new(
            store,
            &DashboardConfig {
                freshness_window_minutes: 10,
                watch_logins,
            },
            Arc::new(RwLock::new(None)),
        )
    }

    fn snapshot_at(
        login: &str,
        status: SyncStatus,
        updated_minutes_ago: Option<i64>,
    ) -> AccountSnapshot {
        AccountSnapshot {
            sync_status: status,
            updated_at: updated_minutes_ago.map(|m| Utc::now() - chrono::Duration::minutes(m)),
            balance: dec!(1000),
            ..AccountSnapshot::placeholder(login)
        }
    }

    #[tokio::test]
    async fn test_stale_classification() {
        // 15분 전 성공 → 10분 윈도우 기준 stale
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(snapshot_at("100", SyncStatus::Success, Some(15)));

        let report = dashboard_with(store, vec![]).report().await.unwrap();
        assert_eq!(report.stale, 1);
        assert_eq!(report.accounts[0].state, HealthState::Stale);
        assert_eq!(report.critical_accounts, vec!["100".to_string()]);
    }

    #[tokio::test]
    async fn test_never_synced_takes_precedence_over_staleness() {
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(snapshot_at("100", SyncStatus::Never, None));

        let report = dashboard_with(store, vec![]).report().await.unwrap();
        assert_eq!(report.never_synced, 1);
        assert_eq!(report.stale, 0);
        assert_eq!(report.accounts[0].state, HealthState::NeverSynced);
    }

    #[tokio::test]
    async fn test_fresh_success_is_synced_and_not_critical() {
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(snapshot_at("100", SyncStatus::Success, Some(2)));

        let report = dashboard_with(store, vec![]).report().await.unwrap();
        assert_eq!(report.synced, 1);
        assert!(report.critical_accounts.is_empty());
    }

    #[tokio::test]
    async fn test_failed_beats_freshness() {
        // 방금 갱신됐더라도 failed 상태면 failed로 분류
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(snapshot_at("100", SyncStatus::Failed, Some(1)));

        let report = dashboard_with(store, vec![]).report().await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.accounts[0].state, HealthState::Failed);
    }

    #[tokio::test]
    async fn test_watch_login_always_critical() {
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(snapshot_at("100", SyncStatus::Success, Some(1)));
        store.insert(snapshot_at("200", SyncStatus::Success, Some(1)));

        let report = dashboard_with(store, vec!["200".to_string()])
            .report()
            .await
            .unwrap();
        assert_eq!(report.synced, 2);
        assert_eq!(report.critical_accounts, vec!["200".to_string()]);
    }

    #[tokio::test]
    async fn test_report_includes_last_cycle() {
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(snapshot_at("100", SyncStatus::Success, Some(1)));

        let last_summary = Arc::new(RwLock::new(Some(FleetSyncSummary::from_results(
            Vec::new(),
            Utc::now(),
            Duration::ZERO,
        ))));
        let dashboard = HealthDashboard::new(
            store,
            &DashboardConfig {
                freshness_window_minutes: 10,
                watch_logins: vec![],
            },
            last_summary,
        );

        let report = dashboard.report().await.unwrap();
        assert!(report.last_cycle.is_some());

        // 관리자 엔드포인트로 내보낼 수 있도록 JSON 직렬화 가능해야 함
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"total_accounts\":1"));
    }
}
