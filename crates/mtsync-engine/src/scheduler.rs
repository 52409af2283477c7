//! 백그라운드 동기화 스케줄러.
//!
//! 고정 간격으로 fleet 동기화를 구동하는 장기 실행 태스크의 수명주기를
//! 소유합니다. 사이클은 슬립보다 먼저 실행되므로 기동 직후 첫 사이클이
//! 지연 없이 돕니다. 정지는 CancellationToken으로 전달되어 진행 중인
//! 사이클이 끝나는 즉시 루프가 종료됩니다.

use crate::error::Result;
use crate::notify::Notifier;
use crate::orchestrator::FleetSynchronizer;
use crate::stats::{FleetSyncSummary, SyncStats};
use mtsync_core::config::SchedulerConfig;
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 실행 중인 루프의 핸들.
struct RunningLoop {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// 한 사이클의 실행과 부수 처리(통계/알림/관찰 로그)를 담당.
///
/// 수동 강제 동기화와 스케줄 루프가 같은 runner를 공유하며,
/// `cycle_lock`이 동시 실행(같은 스냅샷에 대한 두 writer)을 차단합니다.
struct CycleRunner {
    orchestrator: Arc<FleetSynchronizer>,
    notifier: Arc<dyn Notifier>,
    config: SchedulerConfig,
    cycle_lock: tokio::sync::Mutex<()>,
    last_summary: Arc<RwLock<Option<FleetSyncSummary>>>,
    stats: RwLock<SyncStats>,
}

impl CycleRunner {
    async fn run_cycle(&self) -> Result<FleetSyncSummary> {
        // 사이클은 한 번에 하나만 (스케줄 루프 vs 수동 강제 동기화)
        let _guard = self.cycle_lock.lock().await;

        let summary = self.orchestrator.sync_all().await?;

        if let Some(watch) = &self.config.watch_login {
            if let Some(result) = summary.results.iter().find(|r| &r.login == watch) {
                if result.success {
                    info!(
                        login = %watch,
                        old_balance = %result.old_balance,
                        new_balance = %result.new_balance,
                        delta = %result.delta,
                        source = ?result.source,
                        "중점 관찰 계좌 동기화 성공"
                    );
                } else {
                    error!(
                        login = %watch,
                        error = ?result.error,
                        "중점 관찰 계좌 동기화 실패"
                    );
                }
            }
        }

        // 성공률 저하 헬스 게이트
        if summary.total > 0 && summary.success_rate() < self.config.alert_success_rate_pct {
            self.notifier
                .alert(
                    "계좌 동기화 성공률 저하",
                    &format!(
                        "성공률 {:.1}% (임계치 {:.0}%), {}개 중 {}개 실패",
                        summary.success_rate(),
                        self.config.alert_success_rate_pct,
                        summary.total,
                        summary.failed
                    ),
                )
                .await;
        }

        self.stats
            .write()
            .expect("stats lock poisoned")
            .record_cycle(&summary);
        *self.last_summary.write().expect("summary lock poisoned") = Some(summary.clone());

        Ok(summary)
    }
}

/// 백그라운드 동기화 스케줄러.
///
/// 상태 전이는 Stopped → Running → Stopped 뿐이며, 새 사이클은 이전 사이클의
/// 오케스트레이션 호출이 반환된 뒤에만 시작됩니다 (사이클 중첩 없음).
pub struct SyncScheduler {
    runner: Arc<CycleRunner>,
    interval: std::time::Duration,
    running: tokio::sync::Mutex<Option<RunningLoop>>,
}

impl SyncScheduler {
    /// 새 스케줄러 생성.
    pub fn new(
        orchestrator: Arc<FleetSynchronizer>,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
        last_summary: Arc<RwLock<Option<FleetSyncSummary>>>,
    ) -> Self {
        let interval = config.interval();
        Self {
            runner: Arc::new(CycleRunner {
                orchestrator,
                notifier,
                config,
                cycle_lock: tokio::sync::Mutex::new(()),
                last_summary,
                stats: RwLock::new(SyncStats::default()),
            }),
            interval,
            running: tokio::sync::Mutex::new(None),
        }
    }

    /// 주기 루프 시작. 이미 실행 중이면 경고만 남기고 무시합니다.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            warn!("백그라운드 동기화가 이미 실행 중입니다");
            return;
        }

        let token = CancellationToken::new();
        let loop_token = token.clone();
        let runner = Arc::clone(&self.runner);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                "백그라운드 동기화 루프 시작"
            );
            loop {
                // 슬립보다 사이클이 먼저: 첫 사이클은 즉시 실행
                if let Err(e) = runner.run_cycle().await {
                    error!(error = %e, "동기화 사이클 실패");
                }
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            info!("백그라운드 동기화 루프 종료");
        });

        *running = Some(RunningLoop { token, handle });
    }

    /// 루프 정지. 진행 중인 사이클은 완료된 뒤 루프가 종료됩니다.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        match running.take() {
            Some(running_loop) => {
                running_loop.token.cancel();
                if let Err(e) = running_loop.handle.await {
                    error!(error = %e, "동기화 루프 태스크 join 실패");
                }
                info!("백그라운드 동기화 정지");
            }
            None => {
                warn!("백그라운드 동기화가 실행 중이 아닙니다");
            }
        }
    }

    /// 실행 중 여부.
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// 수동 강제 동기화. 스케줄 루프와 직렬화됩니다.
    pub async fn force_sync(&self) -> Result<FleetSyncSummary> {
        self.runner.run_cycle().await
    }

    /// 가장 최근 사이클 요약.
    pub fn last_summary(&self) -> Option<FleetSyncSummary> {
        self.runner
            .last_summary
            .read()
            .expect("summary lock poisoned")
            .clone()
    }

    /// 프로세스 수명 누적 통계.
    pub fn stats(&self) -> SyncStats {
        self.runner.stats.read().expect("stats lock poisoned").clone()
    }
}
