//! 사이클 요약 및 프로세스 수명 통계.

use chrono::{DateTime, Utc};
use mtsync_core::types::SyncResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// fleet 전체 상태 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetStatus {
    /// 성공률 정상
    Healthy,
    /// 성공률 임계치 미만
    Degraded,
    /// 동기화 대상 계좌 없음
    NoAccounts,
}

/// 한 사이클의 집계 결과.
///
/// 스케줄러가 가장 최근 사이클 것만 메모리에 유지하며 매 사이클 덮어씁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSyncSummary {
    /// 시도한 계좌 수
    pub total: usize,
    /// 성공 수
    pub successful: usize,
    /// 실패 수
    pub failed: usize,
    /// 계좌별 결과
    pub results: Vec<SyncResult>,
    /// 사이클 시작 시각
    pub started_at: DateTime<Utc>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl FleetSyncSummary {
    /// 결과 목록에서 요약 생성.
    pub fn from_results(
        results: Vec<SyncResult>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
            started_at,
            elapsed,
        }
    }

    /// 성공률 계산 (%). 계좌가 없으면 0.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.successful as f64 / self.total as f64) * 100.0
        }
    }

    /// fleet 상태 분류.
    pub fn status(&self, degraded_below_pct: f64) -> FleetStatus {
        if self.total == 0 {
            FleetStatus::NoAccounts
        } else if self.success_rate() < degraded_below_pct {
            FleetStatus::Degraded
        } else {
            FleetStatus::Healthy
        }
    }

    /// 사이클 요약 로그 출력.
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            successful = self.successful,
            failed = self.failed,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 사이클 완료"
        );
    }
}

/// 프로세스 수명 동안의 누적 통계.
///
/// 프로세스 재시작 시에만 초기화됩니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// 총 사이클 수
    pub total_cycles: u64,
    /// 누적 성공 수
    pub total_successful: u64,
    /// 누적 실패 수
    pub total_failed: u64,
    /// 마지막 사이클 시각
    pub last_cycle_at: Option<DateTime<Utc>>,
    /// 한 번이라도 성공적으로 동기화된 로그인 집합
    pub synced_logins: BTreeSet<String>,
}

impl SyncStats {
    /// 사이클 결과를 누적 통계에 반영.
    pub fn record_cycle(&mut self, summary: &FleetSyncSummary) {
        self.total_cycles += 1;
        self.total_successful += summary.successful as u64;
        self.total_failed += summary.failed as u64;
        self.last_cycle_at = Some(summary.started_at);
        for result in summary.results.iter().filter(|r| r.success) {
            self.synced_logins.insert(result.login.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtsync_core::types::FetchSource;
    use rust_decimal_macros::dec;

    fn mixed_results() -> Vec<SyncResult> {
        vec![
            SyncResult::failed("A", dec!(0), "timeout", None),
            SyncResult::succeeded("B", dec!(100), dec!(100), FetchSource::Primary),
            SyncResult::succeeded("C", dec!(200), dec!(210), FetchSource::Primary),
        ]
    }

    #[test]
    fn test_summary_counts_and_rate() {
        let summary = FleetSyncSummary::from_results(mixed_results(), Utc::now(), Duration::ZERO);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert!((summary.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_status_classification() {
        let summary = FleetSyncSummary::from_results(mixed_results(), Utc::now(), Duration::ZERO);
        assert_eq!(summary.status(80.0), FleetStatus::Degraded);
        assert_eq!(summary.status(50.0), FleetStatus::Healthy);

        let empty = FleetSyncSummary::from_results(Vec::new(), Utc::now(), Duration::ZERO);
        assert_eq!(empty.status(80.0), FleetStatus::NoAccounts);
        assert_eq!(empty.success_rate(), 0.0);
    }

    #[test]
    fn test_stats_accumulate_across_cycles() {
        let mut stats = SyncStats::default();
        let summary = FleetSyncSummary::from_results(mixed_results(), Utc::now(), Duration::ZERO);

        stats.record_cycle(&summary);
        stats.record_cycle(&summary);

        assert_eq!(stats.total_cycles, 2);
        assert_eq!(stats.total_successful, 4);
        assert_eq!(stats.total_failed, 2);
        // 집합이므로 중복 로그인은 한 번만
        assert_eq!(stats.synced_logins.len(), 2);
        assert!(stats.synced_logins.contains("B"));
        assert!(!stats.synced_logins.contains("A"));
    }
}
