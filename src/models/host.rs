// Host-level snapshot payload. Field names are shared with collectors and readers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-mount stats for a secondary filesystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FsStats {
    pub disk_total: f64,
    pub disk_used: f64,
    pub disk_read_ps: f64,
    pub disk_write_ps: f64,
}

/// One host snapshot. `temperatures` and `extra_filesystems` are sparse: absent from JSON
/// when the source reported nothing. Numeric fields missing from a stored payload read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostSnapshot {
    pub cpu: f64,
    pub mem: f64,
    pub mem_used: f64,
    pub mem_pct: f64,
    pub mem_buff_cache: f64,
    pub swap: f64,
    pub swap_used: f64,
    pub disk_total: f64,
    pub disk_used: f64,
    pub disk_pct: f64,
    pub disk_read_ps: f64,
    pub disk_write_ps: f64,
    pub network_sent: f64,
    pub network_recv: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatures: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_filesystems: Option<BTreeMap<String, FsStats>>,
}
