//! Standalone account sync daemon CLI.

use clap::{Parser, Subcommand};
use mtsync_core::logging::{init_logging, LogConfig};
use mtsync_core::SyncConfig;
use mtsync_engine::SyncEngine;

#[derive(Parser)]
#[command(name = "mtsync-engine")]
#[command(about = "FundAdmin Account Sync Engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 활성 계좌 전체 1회 동기화
    SyncAll,

    /// 특정 계좌 1건 동기화
    SyncOne {
        /// 계좌 로그인
        #[arg(long)]
        login: String,
    },

    /// 헬스 대시보드 리포트 출력 (JSON)
    Dashboard,

    /// 데몬 모드: 주기적으로 전체 동기화 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 레벨은 CLI 플래그가, 출력 형식은 LOG_FORMAT 환경변수가 결정
    init_logging(&LogConfig {
        level: format!(
            "mtsync_engine={level},mtsync_bridge={level},mtsync_core={level}",
            level = cli.log_level
        ),
        ..LogConfig::from_env()
    })?;

    tracing::info!("Account Sync Engine 시작");

    // 설정 로드
    let config = SyncConfig::from_env()?;
    tracing::debug!(bridge_url = %config.bridge.base_url, "설정 로드 완료");

    // DB 연결 (풀 수명주기는 이 바이너리가 호스트로서 소유)
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    tracing::info!("데이터베이스 연결 성공");

    let engine = SyncEngine::initialize(config, pool.clone())?;

    // 명령 실행
    match cli.command {
        Commands::SyncAll => {
            let summary = engine.force_sync().await?;
            tracing::info!(
                total = summary.total,
                successful = summary.successful,
                failed = summary.failed,
                "전체 동기화 완료"
            );
        }
        Commands::SyncOne { login } => {
            let result = engine.sync_one(&login).await;
            if result.success {
                tracing::info!(
                    login = %result.login,
                    old_balance = %result.old_balance,
                    new_balance = %result.new_balance,
                    delta = %result.delta,
                    "계좌 동기화 성공"
                );
            } else {
                tracing::error!(
                    login = %result.login,
                    error = ?result.error,
                    "계좌 동기화 실패"
                );
            }
        }
        Commands::Dashboard => {
            let report = engine.dashboard().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Daemon => {
            engine.start_background_sync().await;

            tokio::signal::ctrl_c().await?;
            tracing::info!("종료 신호 수신, 데몬 종료 중...");

            engine.close().await;
        }
    }

    pool.close().await;
    tracing::info!("Account Sync Engine 종료");

    Ok(())
}
