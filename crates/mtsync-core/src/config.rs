//! 환경변수 기반 설정 모듈.
//!
//! "significant change" / "suspicious change" 임계치는 업무적 근거가 명시되지
//! 않은 휴리스틱 상수이므로 하드코딩하지 않고 설정으로 노출합니다.

use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use std::time::Duration;

/// 동기화 엔진 전체 설정.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 브리지 연결 설정
    pub bridge: BridgeConfig,
    /// 재시도 정책 설정
    pub retry: RetryConfig,
    /// 검증 임계치 설정
    pub validation: ValidationConfig,
    /// 백그라운드 스케줄러 설정
    pub scheduler: SchedulerConfig,
    /// 대시보드 설정
    pub dashboard: DashboardConfig,
}

/// MT5 브리지 연결 설정.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// 브리지 Base URL
    pub base_url: String,
    /// X-API-Key 헤더 값
    pub api_key: String,
    /// 요청당 하드 타임아웃 (초)
    pub request_timeout_seconds: u64,
    /// 브로커 직접 API 폴백 소스 활성화
    pub enable_broker_fallback: bool,
}

/// 재시도 정책 설정.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 소스당 최대 시도 횟수
    pub attempts: u32,
    /// 백오프 기본 딜레이 (초), attempt마다 2배씩 증가
    pub base_delay_seconds: u64,
}

/// 검증 임계치 설정.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// 이 비율(%)을 넘는 잔고 변동은 의심스러운 변동으로 거부
    pub suspicious_change_pct: Decimal,
    /// 이 금액($)을 넘는 잔고 변동은 significant_change로 추가 기록
    pub significant_change_threshold: Decimal,
}

/// 백그라운드 스케줄러 설정.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// 사이클 간격 (초)
    pub sync_interval_seconds: u64,
    /// 사이클 내 계좌 동시 처리 수 (1이면 순차 처리)
    pub concurrency: usize,
    /// 성공/실패 양쪽에 추가 구조화 로그를 남기는 중점 관찰 계좌
    pub watch_login: Option<String>,
    /// 성공률 저하 알림 webhook URL (없으면 로그 알림만)
    pub alert_webhook_url: Option<String>,
    /// 이 성공률(%) 미만이면 알림 발생
    pub alert_success_rate_pct: f64,
}

/// 대시보드 설정.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// 이 시간(분) 이내에 갱신된 계좌만 synced로 분류
    pub freshness_window_minutes: i64,
    /// 항상 critical 목록에 포함할 계좌 (쉼표 구분)
    pub watch_logins: Vec<String>,
}

impl SyncConfig {
    /// 환경변수에서 설정 로드.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            CoreError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        Ok(Self {
            database_url,
            bridge: BridgeConfig {
                base_url: std::env::var("BRIDGE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8002".to_string()),
                api_key: std::env::var("BRIDGE_API_KEY").unwrap_or_default(),
                request_timeout_seconds: env_var_parse("REQUEST_TIMEOUT_SECONDS", 30),
                enable_broker_fallback: env_var_bool("ENABLE_BROKER_FALLBACK", false),
            },
            retry: RetryConfig {
                attempts: env_var_parse("RETRY_ATTEMPTS", 3),
                base_delay_seconds: env_var_parse("RETRY_BASE_DELAY_SECONDS", 2),
            },
            validation: ValidationConfig {
                suspicious_change_pct: env_var_parse(
                    "SUSPICIOUS_CHANGE_PCT",
                    Decimal::from(50),
                ),
                significant_change_threshold: env_var_parse(
                    "SIGNIFICANT_CHANGE_THRESHOLD",
                    Decimal::from(10),
                ),
            },
            scheduler: SchedulerConfig {
                sync_interval_seconds: env_var_parse("SYNC_INTERVAL_SECONDS", 120),
                concurrency: env_var_parse("SYNC_CONCURRENCY", 1),
                watch_login: std::env::var("WATCH_LOGIN").ok().filter(|v| !v.is_empty()),
                alert_webhook_url: std::env::var("ALERT_WEBHOOK_URL")
                    .ok()
                    .filter(|v| !v.is_empty()),
                alert_success_rate_pct: env_var_parse("ALERT_SUCCESS_RATE_PCT", 80.0),
            },
            dashboard: DashboardConfig {
                freshness_window_minutes: env_var_parse("FRESHNESS_WINDOW_MINUTES", 10),
                watch_logins: std::env::var("WATCH_LOGINS")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }

    /// 설정 값의 유효성 검사. 치명적 설정 오류는 기동을 중단시킵니다.
    pub fn validate(&self) -> Result<()> {
        if self.bridge.base_url.is_empty() {
            return Err(CoreError::Config("BRIDGE_URL이 비어 있습니다".to_string()));
        }
        if self.retry.attempts == 0 {
            return Err(CoreError::Config(
                "RETRY_ATTEMPTS는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.scheduler.sync_interval_seconds == 0 {
            return Err(CoreError::Config(
                "SYNC_INTERVAL_SECONDS는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.validation.suspicious_change_pct <= Decimal::ZERO {
            return Err(CoreError::Config(
                "SUSPICIOUS_CHANGE_PCT는 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

impl BridgeConfig {
    /// 요청 타임아웃을 Duration으로 반환.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl RetryConfig {
    /// 백오프 기본 딜레이를 Duration으로 반환.
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_seconds)
    }
}

impl SchedulerConfig {
    /// 사이클 간격을 Duration으로 반환.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_seconds)
    }
}

impl DashboardConfig {
    /// 신선도 윈도우를 chrono Duration으로 반환.
    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.freshness_window_minutes)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용).
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱.
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
