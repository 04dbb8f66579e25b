//! Error types for the record store and the rollup/retention runs.

use thiserror::Error;

use crate::models::{Category, Tier};

/// Failure reported by a `RecordStore` backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payload encoding error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("unknown tier tag: {0}")]
    UnknownTier(String),

    #[error("invalid timestamp: {0} ms")]
    InvalidTimestamp(i64),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Failure of a rollup or retention run.
#[derive(Error, Debug)]
pub enum RecordError {
    /// A read failed; the run's transaction is rolled back.
    #[error("store query failed ({operation}): {source}")]
    StoreQuery {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// Writing one rollup record failed. Logged by the engine; never aborts a run.
    #[error("failed to save {tier} {category} record for entity {entity_id}: {source}")]
    RecordSave {
        entity_id: String,
        tier: Tier,
        category: Category,
        #[source]
        source: StoreError,
    },

    /// Deleting an expired record failed; the retention run is rolled back.
    #[error("failed to delete {category} record {id}: {source}")]
    RecordDelete {
        category: Category,
        id: i64,
        #[source]
        source: StoreError,
    },

    /// The transaction could not be opened or committed.
    #[error("transaction aborted: {source}")]
    TransactionAbort {
        #[source]
        source: StoreError,
    },
}

impl RecordError {
    pub(crate) fn query(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| RecordError::StoreQuery { operation, source }
    }

    pub(crate) fn transaction(source: StoreError) -> Self {
        RecordError::TransactionAbort { source }
    }
}
