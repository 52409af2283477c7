//! PostgreSQL 스냅샷 저장소 구현.
//!
//! 스키마(협력자 소유):
//! - `account_snapshots(login PK, balance, equity, profit, margin,
//!    updated_at, sync_status, sync_error, is_active)`
//! - `account_sync_log(id, login, event_type, success, old_balance,
//!    new_balance, delta, error, source, created_at)` — append-only

use super::SnapshotStore;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mtsync_core::types::{AccountInfo, AccountSnapshot, SyncLogEntry, SyncStatus};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// DB 행 ↔ 도메인 타입 매핑용 내부 구조체.
#[derive(sqlx::FromRow)]
struct SnapshotRow {
    login: String,
    balance: Decimal,
    equity: Decimal,
    profit: Decimal,
    margin: Decimal,
    updated_at: Option<DateTime<Utc>>,
    sync_status: String,
    sync_error: Option<String>,
}

impl SnapshotRow {
    fn into_snapshot(self) -> AccountSnapshot {
        AccountSnapshot {
            sync_status: self
                .sync_status
                .parse::<SyncStatus>()
                .unwrap_or(SyncStatus::Never),
            login: self.login,
            balance: self.balance,
            equity: self.equity,
            profit: self.profit,
            margin: self.margin,
            updated_at: self.updated_at,
            sync_error: self.sync_error,
        }
    }
}

/// PostgreSQL 기반 스냅샷 저장소.
#[derive(Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    /// 준비된 커넥션 풀로 저장소 생성. 풀 수명주기는 호스트 소유입니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn get(&self, login: &str) -> Result<Option<AccountSnapshot>, StoreError> {
        let row: Option<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT login, balance, equity, profit, margin,
                   updated_at, sync_status, sync_error
            FROM account_snapshots
            WHERE login = $1
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SnapshotRow::into_snapshot))
    }

    async fn list_active(&self) -> Result<Vec<AccountSnapshot>, StoreError> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT login, balance, equity, profit, margin,
                   updated_at, sync_status, sync_error
            FROM account_snapshots
            WHERE is_active = true
            ORDER BY login
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SnapshotRow::into_snapshot).collect())
    }

    async fn apply_success(
        &self,
        login: &str,
        info: &AccountInfo,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE account_snapshots
            SET balance = $2,
                equity = $3,
                profit = $4,
                margin = $5,
                updated_at = $6,
                sync_status = 'success',
                sync_error = NULL
            WHERE login = $1
            "#,
        )
        .bind(login)
        .bind(info.balance)
        .bind(info.equity)
        .bind(info.profit)
        .bind(info.margin)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(login.to_string()));
        }
        Ok(())
    }

    async fn mark_failure(&self, login: &str, error: &str) -> Result<(), StoreError> {
        // 실패는 상태 필드만 갱신 (스냅샷 값 불변식)
        let result = sqlx::query(
            r#"
            UPDATE account_snapshots
            SET sync_status = 'failed',
                sync_error = $2
            WHERE login = $1
            "#,
        )
        .bind(login)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(login.to_string()));
        }
        Ok(())
    }

    async fn append_log(&self, entry: &SyncLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO account_sync_log (
                login, event_type, success, old_balance, new_balance,
                delta, error, source, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&entry.login)
        .bind(entry.event_type.as_str())
        .bind(entry.success)
        .bind(entry.old_balance)
        .bind(entry.new_balance)
        .bind(entry.delta)
        .bind(&entry.error)
        .bind(entry.source.map(|s| s.to_string()))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
