// Entry points for the scheduler: one rollup run, one retention run. Each run is a single
// store transaction; an error leaves the store exactly as it was.

pub mod averaging;
mod retention;
mod rollup;

pub use retention::RetentionSummary;
pub use rollup::RollupSummary;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::RecordError;
use crate::record_store::{RecordStore, RecordTx};
use crate::tiers::{RetentionTable, TierRegistry};

pub struct RecordManager<S> {
    store: S,
    tiers: TierRegistry,
    retention: RetentionTable,
}

impl<S: RecordStore> RecordManager<S> {
    /// Manager with the standard tier chain and retention windows.
    pub fn new(store: S) -> Self {
        Self::with_tables(store, TierRegistry::default(), RetentionTable::default())
    }

    pub fn with_tables(store: S, tiers: TierRegistry, retention: RetentionTable) -> Self {
        Self {
            store,
            tiers,
            retention,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tiers(&self) -> &TierRegistry {
        &self.tiers
    }

    pub fn retention(&self) -> &RetentionTable {
        &self.retention
    }

    pub async fn run_rollup(&self) -> Result<RollupSummary, RecordError> {
        self.run_rollup_at(Utc::now()).await
    }

    /// Rollup as of `now`. Save failures for individual records are logged and counted in the
    /// summary; any query failure rolls back every record created so far in this run.
    #[instrument(skip(self), fields(operation = "run_rollup"))]
    pub async fn run_rollup_at(&self, now: DateTime<Utc>) -> Result<RollupSummary, RecordError> {
        let mut tx = self.store.begin().await.map_err(RecordError::transaction)?;
        let summary = rollup::rollup_all(&mut tx, &self.tiers, now).await?;
        tx.commit().await.map_err(RecordError::transaction)?;
        if summary.created > 0 || summary.save_failures > 0 {
            info!(
                created = summary.created,
                save_failures = summary.save_failures,
                "rollup complete"
            );
        }
        Ok(summary)
    }

    pub async fn run_retention(&self) -> Result<RetentionSummary, RecordError> {
        self.run_retention_at(Utc::now()).await
    }

    #[instrument(skip(self), fields(operation = "run_retention"))]
    pub async fn run_retention_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RetentionSummary, RecordError> {
        let mut tx = self.store.begin().await.map_err(RecordError::transaction)?;
        let summary = retention::prune_all(&mut tx, &self.retention, now).await?;
        tx.commit().await.map_err(RecordError::transaction)?;
        if summary.deleted > 0 {
            info!(deleted = summary.deleted, "retention complete");
        }
        Ok(summary)
    }
}
