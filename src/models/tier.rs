// Resolution tiers and record categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A resolution level. Serializes to its wire tag ("1m", "10m", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "20m")]
    TwentyMinutes,
    #[serde(rename = "120m")]
    TwoHours,
    #[serde(rename = "480m")]
    EightHours,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::OneMinute,
        Tier::TenMinutes,
        Tier::TwentyMinutes,
        Tier::TwoHours,
        Tier::EightHours,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::OneMinute => "1m",
            Tier::TenMinutes => "10m",
            Tier::TwentyMinutes => "20m",
            Tier::TwoHours => "120m",
            Tier::EightHours => "480m",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StoreError::UnknownTier(s.to_string()))
    }
}

/// Record category; each one lives in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Host,
    Container,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Host, Category::Container];

    pub fn table(self) -> &'static str {
        match self {
            Category::Host => "system_stats",
            Category::Container => "container_stats",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
