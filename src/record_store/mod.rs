// Record store seam. The rollup and retention runs only talk to the store through these traits;
// `SqliteRecordStore` is the shipped backend.

mod schema;
mod sqlite;

pub use sqlite::{SqliteRecordStore, SqliteRecordTx};

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{Category, MonitoredEntity, RecordKey, Snapshot, StatRecord, Tier};

/// A durable record store that hands out transactions.
pub trait RecordStore: Send + Sync {
    type Tx: RecordTx;

    /// Open a transaction. Everything done through the returned handle is committed by
    /// [`RecordTx::commit`] and rolled back if the handle is dropped first.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;

    /// Reclaim space after deletions. Backends without such a notion keep the default.
    fn vacuum(&self) -> impl Future<Output = Result<(), StoreError>> + Send {
        async { Ok(()) }
    }
}

/// Operations available inside one store transaction.
pub trait RecordTx: Send {
    fn list_active_entities(
        &mut self,
    ) -> impl Future<Output = Result<Vec<MonitoredEntity>, StoreError>> + Send;

    /// Records of `P`'s category for `entity_id` at `tier` with `created_at > created_after`,
    /// oldest first.
    fn find_records<P: Snapshot>(
        &mut self,
        entity_id: &str,
        tier: Tier,
        created_after: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<StatRecord<P>>, StoreError>> + Send;

    /// Like [`find_records`](RecordTx::find_records) but stops at the first match.
    fn find_first_record<P: Snapshot>(
        &mut self,
        entity_id: &str,
        tier: Tier,
        created_after: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<StatRecord<P>>, StoreError>> + Send;

    /// Insert `record` and return the id the store assigned to it.
    fn save<P: Snapshot>(
        &mut self,
        record: &StatRecord<P>,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Keys of every `category` record at `tier` with `created_at < created_before`, any entity.
    fn find_expired(
        &mut self,
        category: Category,
        tier: Tier,
        created_before: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<RecordKey>, StoreError>> + Send;

    fn delete(&mut self, key: &RecordKey) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
