// Monitored entities (owned by the collector side; read-only here)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Entity status; only `Active` entities are rolled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Down,
    Paused,
    Pending,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Down => "down",
            EntityStatus::Paused => "paused",
            EntityStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntityStatus::Active),
            "down" => Ok(EntityStatus::Down),
            "paused" => Ok(EntityStatus::Paused),
            "pending" => Ok(EntityStatus::Pending),
            other => Err(StoreError::Backend(format!("unknown entity status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredEntity {
    pub id: String,
    pub name: String,
    pub status: EntityStatus,
}

impl MonitoredEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: EntityStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
        }
    }
}
