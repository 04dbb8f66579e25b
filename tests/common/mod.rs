// Shared test helpers: temp SQLite store, payload builders, and a fault-injecting store wrapper.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use monitor_rollup::models::*;
use monitor_rollup::record_store::SqliteRecordTx;
use monitor_rollup::{RecordStore, RecordTx, SqliteRecordStore, StoreError};
use tempfile::TempDir;

/// Fixed run instant so boundary tests are exact to the millisecond.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub async fn temp_store() -> (TempDir, SqliteRecordStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.db");
    let store = SqliteRecordStore::connect(path.to_str().unwrap(), 4, Duration::from_secs(5))
        .await
        .unwrap();
    store.init().await.unwrap();
    (dir, store)
}

pub async fn add_entity(store: &SqliteRecordStore, id: &str, status: EntityStatus) {
    store
        .upsert_entity(&MonitoredEntity::new(id, format!("{id}-host"), status))
        .await
        .unwrap();
}

pub fn host(cpu: f64) -> HostSnapshot {
    HostSnapshot {
        cpu,
        mem: 16.0,
        mem_used: 8.0,
        mem_pct: 50.0,
        ..Default::default()
    }
}

pub fn host_with_temps(cpu: f64, temps: &[(&str, f64)]) -> HostSnapshot {
    HostSnapshot {
        temperatures: Some(temps.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
        ..host(cpu)
    }
}

pub fn container(name: &str, cpu: f64, mem: f64) -> ContainerSnapshot {
    ContainerSnapshot {
        name: name.to_string(),
        cpu,
        mem,
        network_sent: 0.0,
        network_recv: 0.0,
    }
}

pub fn temps(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub async fn insert<P: Snapshot>(
    store: &SqliteRecordStore,
    entity_id: &str,
    tier: Tier,
    created_at: DateTime<Utc>,
    payload: P,
) -> i64 {
    store
        .insert_record(&StatRecord::new(entity_id, tier, created_at, payload))
        .await
        .unwrap()
}

/// Write a record with a hand-written JSON payload, bypassing the typed models.
pub async fn insert_raw(
    dir: &TempDir,
    category: Category,
    entity_id: &str,
    tier: Tier,
    created_at: DateTime<Utc>,
    stats: &str,
) {
    let path = dir.path().join("records.db");
    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", path.display()))
        .await
        .unwrap();
    let sql = format!(
        "INSERT INTO {} (entity_id, type, created_at, stats) VALUES ($1, $2, $3, $4)",
        category.table()
    );
    sqlx::query(&sql)
        .bind(entity_id)
        .bind(tier.as_str())
        .bind(created_at.timestamp_millis())
        .bind(stats)
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;
}

/// Failures to inject; `None`/`false` means pass through.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_save_tier: Option<Tier>,
    pub fail_find_records_tier: Option<Tier>,
    pub fail_find_first: bool,
    pub fail_delete_tier: Option<Tier>,
    pub fail_begin: bool,
}

pub struct FlakyStore {
    pub inner: SqliteRecordStore,
    pub faults: Faults,
}

pub struct FlakyTx {
    inner: SqliteRecordTx,
    faults: Faults,
}

fn injected(what: &str) -> StoreError {
    StoreError::Backend(format!("injected {what} failure"))
}

impl RecordStore for FlakyStore {
    type Tx = FlakyTx;

    async fn begin(&self) -> Result<FlakyTx, StoreError> {
        if self.faults.fail_begin {
            return Err(injected("begin"));
        }
        Ok(FlakyTx {
            inner: self.inner.begin().await?,
            faults: self.faults.clone(),
        })
    }
}

impl RecordTx for FlakyTx {
    async fn list_active_entities(&mut self) -> Result<Vec<MonitoredEntity>, StoreError> {
        self.inner.list_active_entities().await
    }

    async fn find_records<P: Snapshot>(
        &mut self,
        entity_id: &str,
        tier: Tier,
        created_after: DateTime<Utc>,
    ) -> Result<Vec<StatRecord<P>>, StoreError> {
        if self.faults.fail_find_records_tier == Some(tier) {
            return Err(injected("find_records"));
        }
        self.inner.find_records(entity_id, tier, created_after).await
    }

    async fn find_first_record<P: Snapshot>(
        &mut self,
        entity_id: &str,
        tier: Tier,
        created_after: DateTime<Utc>,
    ) -> Result<Option<StatRecord<P>>, StoreError> {
        if self.faults.fail_find_first {
            return Err(injected("find_first_record"));
        }
        self.inner
            .find_first_record(entity_id, tier, created_after)
            .await
    }

    async fn save<P: Snapshot>(&mut self, record: &StatRecord<P>) -> Result<i64, StoreError> {
        if self.faults.fail_save_tier == Some(record.tier) {
            return Err(injected("save"));
        }
        self.inner.save(record).await
    }

    async fn find_expired(
        &mut self,
        category: Category,
        tier: Tier,
        created_before: DateTime<Utc>,
    ) -> Result<Vec<RecordKey>, StoreError> {
        self.inner
            .find_expired(category, tier, created_before)
            .await
    }

    async fn delete(&mut self, key: &RecordKey) -> Result<(), StoreError> {
        if self.faults.fail_delete_tier == Some(key.tier) {
            return Err(injected("delete"));
        }
        self.inner.delete(key).await
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.inner.commit().await
    }
}
