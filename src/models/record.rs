// Stat records and the payload trait tying a payload type to its category and averaging.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Category, ContainerSnapshotSet, HostSnapshot, Tier};
use crate::record_manager::averaging;

/// A payload that can be stored as a stat record and rolled up.
///
/// Each implementor fixes its category (and therefore its table) and the reduction used to
/// merge same-tier snapshots. The rollup engine is generic over this trait, so the choice of
/// averaging function is made once per category at compile time.
pub trait Snapshot: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const CATEGORY: Category;

    /// Reduce a non-empty slice of snapshots into one averaged snapshot.
    fn average(snapshots: &[Self]) -> Self;
}

impl Snapshot for HostSnapshot {
    const CATEGORY: Category = Category::Host;

    fn average(snapshots: &[Self]) -> Self {
        averaging::average_host_snapshots(snapshots)
    }
}

impl Snapshot for ContainerSnapshotSet {
    const CATEGORY: Category = Category::Container;

    fn average(snapshots: &[Self]) -> Self {
        averaging::average_container_snapshot_sets(snapshots)
    }
}

/// One stored snapshot. `id` is `None` until the store assigns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRecord<P> {
    pub id: Option<i64>,
    pub entity_id: String,
    #[serde(rename = "tierTag")]
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
    pub payload: P,
}

impl<P: Snapshot> StatRecord<P> {
    pub fn new(
        entity_id: impl Into<String>,
        tier: Tier,
        created_at: DateTime<Utc>,
        payload: P,
    ) -> Self {
        Self {
            id: None,
            entity_id: entity_id.into(),
            tier,
            created_at,
            payload,
        }
    }
}

/// Identity of a stored record without its payload (what retention needs to delete it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub category: Category,
    pub id: i64,
    pub entity_id: String,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}
