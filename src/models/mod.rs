// Domain models: entities, tiers, payloads, records

mod container;
mod entity;
mod host;
mod record;
mod tier;

pub use container::{ContainerSnapshot, ContainerSnapshotSet};
pub use entity::{EntityStatus, MonitoredEntity};
pub use host::{FsStats, HostSnapshot};
pub use record::{RecordKey, Snapshot, StatRecord};
pub use tier::{Category, Tier};
