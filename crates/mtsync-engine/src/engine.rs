//! 동기화 엔진 수명주기.
//!
//! 호스트 애플리케이션이 기동/종료 시퀀스에서 명시적으로 소유/주입하는
//! 객체입니다. 전역 싱글턴이나 암묵적 상태는 없습니다. 치명적인 설정 오류는
//! `initialize()`에서만 전파되어 기동을 중단시킵니다.

use crate::dashboard::{DashboardReport, HealthDashboard};
use crate::error::Result;
use crate::notify::notifier_from_config;
use crate::orchestrator::FleetSynchronizer;
use crate::scheduler::SyncScheduler;
use crate::stats::{FleetSyncSummary, SyncStats};
use crate::store::{PgSnapshotStore, SnapshotStore};
use crate::synchronizer::AccountSynchronizer;
use mtsync_bridge::{build_sources, AccountFetcher, RetryPolicy, RetryingFetcher};
use mtsync_core::types::SyncResult;
use mtsync_core::SyncConfig;
use sqlx::PgPool;
use std::sync::{Arc, RwLock};

/// 계좌 동기화 엔진.
pub struct SyncEngine {
    synchronizer: Arc<AccountSynchronizer>,
    scheduler: Arc<SyncScheduler>,
    dashboard: HealthDashboard,
}

impl SyncEngine {
    /// 준비된 DB 풀로 엔진 초기화.
    ///
    /// 풀 수명주기(연결/마이그레이션/종료)는 호스트 소유입니다.
    pub fn initialize(config: SyncConfig, pool: PgPool) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn SnapshotStore> = Arc::new(PgSnapshotStore::new(pool));
        let fetcher: Arc<dyn AccountFetcher> = Arc::new(RetryingFetcher::new(
            build_sources(&config.bridge),
            RetryPolicy::from_config(&config.retry),
        ));
        Self::assemble(config, store, fetcher)
    }

    /// 저장소/조회기를 직접 주입하여 초기화 (테스트, 오프라인 실행용).
    pub fn with_parts(
        config: SyncConfig,
        store: Arc<dyn SnapshotStore>,
        fetcher: Arc<dyn AccountFetcher>,
    ) -> Result<Self> {
        config.validate()?;
        Self::assemble(config, store, fetcher)
    }

    fn assemble(
        config: SyncConfig,
        store: Arc<dyn SnapshotStore>,
        fetcher: Arc<dyn AccountFetcher>,
    ) -> Result<Self> {
        let last_summary = Arc::new(RwLock::new(None));

        let synchronizer = Arc::new(AccountSynchronizer::new(
            Arc::clone(&store),
            fetcher,
            &config.validation,
        ));
        let orchestrator = Arc::new(FleetSynchronizer::new(
            Arc::clone(&store),
            Arc::clone(&synchronizer),
            config.scheduler.concurrency,
        ));
        let scheduler = Arc::new(SyncScheduler::new(
            orchestrator,
            notifier_from_config(&config.scheduler),
            config.scheduler.clone(),
            Arc::clone(&last_summary),
        ));
        let dashboard = HealthDashboard::new(store, &config.dashboard, last_summary);

        Ok(Self {
            synchronizer,
            scheduler,
            dashboard,
        })
    }

    /// 백그라운드 동기화 시작 (호스트 기동 훅).
    pub async fn start_background_sync(&self) {
        self.scheduler.start().await;
    }

    /// 백그라운드 동기화 정지 (호스트 종료 훅).
    pub async fn stop_background_sync(&self) {
        self.scheduler.stop().await;
    }

    /// 수동 강제 동기화. 스케줄 루프와 직렬화됩니다.
    pub async fn force_sync(&self) -> Result<FleetSyncSummary> {
        self.scheduler.force_sync().await
    }

    /// 계좌 1건 동기화.
    pub async fn sync_one(&self, login: &str) -> SyncResult {
        self.synchronizer.sync_one(login).await
    }

    /// 운영자용 헬스 리포트 (순수 읽기).
    pub async fn dashboard(&self) -> Result<DashboardReport> {
        self.dashboard.report().await
    }

    /// 프로세스 수명 누적 통계.
    pub fn stats(&self) -> SyncStats {
        self.scheduler.stats()
    }

    /// 엔진 종료. 루프를 정지합니다. 풀 종료는 호스트가 수행합니다.
    pub async fn close(&self) {
        self.stop_background_sync().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use crate::testutil::StubFetcher;
    use mtsync_core::config::{
        BridgeConfig, DashboardConfig, RetryConfig, SchedulerConfig, ValidationConfig,
    };
    use mtsync_core::types::{AccountInfo, AccountSnapshot};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn test_config() -> SyncConfig {
        SyncConfig {
            database_url: "postgres://localhost/test".to_string(),
            bridge: BridgeConfig {
                base_url: "http://127.0.0.1:8002".to_string(),
                api_key: "key".to_string(),
                request_timeout_seconds: 30,
                enable_broker_fallback: false,
            },
            retry: RetryConfig {
                attempts: 3,
                base_delay_seconds: 2,
            },
            validation: ValidationConfig {
                suspicious_change_pct: dec!(50),
                significant_change_threshold: dec!(10),
            },
            scheduler: SchedulerConfig {
                sync_interval_seconds: 120,
                concurrency: 1,
                watch_login: None,
                alert_webhook_url: None,
                alert_success_rate_pct: 80.0,
            },
            dashboard: DashboardConfig {
                freshness_window_minutes: 10,
                watch_logins: vec![],
            },
        }
    }

    fn engine_with_store(store: Arc<MemorySnapshotStore>) -> SyncEngine {
        SyncEngine::with_parts(
            test_config(),
            store,
            Arc::new(StubFetcher::ok(AccountInfo {
                balance: dec!(100),
                equity: dec!(100),
                profit: Decimal::ZERO,
                margin: Decimal::ZERO,
            })),
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_rejects_bad_config() {
        let mut config = test_config();
        config.retry.attempts = 0;

        let result = SyncEngine::with_parts(
            config,
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(StubFetcher::fail("unused")),
        );
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_start_force_dashboard_stop() {
        let store = Arc::new(MemorySnapshotStore::new());
        store.insert(AccountSnapshot::placeholder("100"));
        let engine = engine_with_store(store);

        let summary = engine.force_sync().await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.successful, 1);

        let report = engine.dashboard().await.unwrap();
        assert_eq!(report.total_accounts, 1);
        assert_eq!(report.synced, 1);
        assert!(report.last_cycle.is_some());

        engine.start_background_sync().await;
        engine.close().await;

        assert!(engine.stats().total_cycles >= 1);
    }
}
