//! 인메모리 스냅샷 저장소.
//!
//! DB 없이 엔진을 구동하는 오프라인 실행과 테스트에 사용합니다.
//! Postgres 구현과 동일한 계약(갱신 0건 = NotFound, 실패 시 값 불변)을
//! 따릅니다.

use super::SnapshotStore;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mtsync_core::types::{AccountInfo, AccountSnapshot, SyncLogEntry, SyncStatus};
use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

/// BTreeMap 기반 스냅샷 저장소.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<BTreeMap<String, AccountSnapshot>>,
    log: Mutex<Vec<SyncLogEntry>>,
}

impl MemorySnapshotStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스냅샷 등록 (테스트/오프라인 프로비저닝용).
    pub fn insert(&self, snapshot: AccountSnapshot) {
        self.snapshots
            .write()
            .expect("snapshot lock poisoned")
            .insert(snapshot.login.clone(), snapshot);
    }

    /// 기록된 감사 로그 전체 복사본.
    pub fn log_entries(&self) -> Vec<SyncLogEntry> {
        self.log.lock().expect("log lock poisoned").clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, login: &str) -> Result<Option<AccountSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .read()
            .expect("snapshot lock poisoned")
            .get(login)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<AccountSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .read()
            .expect("snapshot lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn apply_success(
        &self,
        login: &str,
        info: &AccountInfo,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().expect("snapshot lock poisoned");
        let snapshot = snapshots
            .get_mut(login)
            .ok_or_else(|| StoreError::NotFound(login.to_string()))?;

        snapshot.balance = info.balance;
        snapshot.equity = info.equity;
        snapshot.profit = info.profit;
        snapshot.margin = info.margin;
        snapshot.updated_at = Some(now);
        snapshot.sync_status = SyncStatus::Success;
        snapshot.sync_error = None;
        Ok(())
    }

    async fn mark_failure(&self, login: &str, error: &str) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().expect("snapshot lock poisoned");
        let snapshot = snapshots
            .get_mut(login)
            .ok_or_else(|| StoreError::NotFound(login.to_string()))?;

        snapshot.sync_status = SyncStatus::Failed;
        snapshot.sync_error = Some(error.to_string());
        Ok(())
    }

    async fn append_log(&self, entry: &SyncLogEntry) -> Result<(), StoreError> {
        self.log
            .lock()
            .expect("log lock poisoned")
            .push(entry.clone());
        Ok(())
    }
}
