//! Fleet 동기화 오케스트레이터.
//!
//! 활성 계좌 전체를 열거하여 계좌별 동기화를 실행합니다. 계좌 하나의 실패가
//! 배치를 중단시키지 않으며, 모든 계좌는 사이클당 정확히 한 번 시도됩니다.

use crate::error::Result;
use crate::stats::FleetSyncSummary;
use crate::store::SnapshotStore;
use crate::synchronizer::AccountSynchronizer;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use mtsync_core::types::SyncResult;
use std::sync::Arc;
use std::time::Instant;

/// fleet 단위 동기화기.
pub struct FleetSynchronizer {
    store: Arc<dyn SnapshotStore>,
    synchronizer: Arc<AccountSynchronizer>,
    concurrency: usize,
}

impl FleetSynchronizer {
    /// 새 오케스트레이터 생성. `concurrency`가 1이면 순차 처리입니다.
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        synchronizer: Arc<AccountSynchronizer>,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            synchronizer,
            concurrency: concurrency.max(1),
        }
    }

    /// 활성 계좌 전체 동기화.
    ///
    /// 계좌별 결과는 모두 수집(join)된 뒤에 요약이 확정됩니다.
    /// `Err`는 계좌 열거 자체가 실패한 경우뿐입니다.
    pub async fn sync_all(&self) -> Result<FleetSyncSummary> {
        let started_at = Utc::now();
        let start = Instant::now();

        let accounts = self.store.list_active().await?;
        tracing::info!(
            count = accounts.len(),
            concurrency = self.concurrency,
            "동기화 사이클 시작"
        );

        let results: Vec<SyncResult> = stream::iter(accounts)
            .map(|account| {
                let synchronizer = Arc::clone(&self.synchronizer);
                async move { synchronizer.sync_one(&account.login).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let summary = FleetSyncSummary::from_results(results, started_at, start.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}
