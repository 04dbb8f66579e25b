// Per-container snapshot payload

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerSnapshot {
    pub name: String,
    pub cpu: f64,
    pub mem: f64,
    pub network_sent: f64,
    pub network_recv: f64,
}

/// All containers observed at one capture time. Identity across sets is the container `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerSnapshotSet(pub Vec<ContainerSnapshot>);

impl ContainerSnapshotSet {
    pub fn get(&self, name: &str) -> Option<&ContainerSnapshot> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ContainerSnapshot>> for ContainerSnapshotSet {
    fn from(v: Vec<ContainerSnapshot>) -> Self {
        Self(v)
    }
}
