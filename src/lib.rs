// Library for the daemon, the demo and tests

pub mod config;
pub mod error;
pub mod models;
pub mod record_manager;
pub mod record_store;
pub mod scheduler;
pub mod tiers;

pub use error::{RecordError, StoreError};
pub use record_manager::{RecordManager, RetentionSummary, RollupSummary};
pub use record_store::{RecordStore, RecordTx, SqliteRecordStore};
