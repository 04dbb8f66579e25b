use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_busy_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Rollup cadence; should match the finest tier (one minute).
    #[serde(default = "default_rollup_interval_secs")]
    pub rollup_interval_secs: u64,
    /// Optional cron expression for retention (with seconds field, e.g. "0 8 * * * *"). Local time.
    #[serde(default)]
    pub retention_schedule: Option<String>,
    /// Run retention every N seconds when retention_schedule is not set.
    #[serde(default = "default_retention_interval_secs")]
    pub retention_interval_secs: u64,
    /// Optional cron expression for VACUUM (e.g. "0 0 3 * * *" = 03:00 daily). Local time.
    #[serde(default)]
    pub vacuum_schedule: Option<String>,
    #[serde(default = "default_vacuum_interval_secs")]
    pub vacuum_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rollup_interval_secs: default_rollup_interval_secs(),
            retention_schedule: None,
            retention_interval_secs: default_retention_interval_secs(),
            vacuum_schedule: None,
            vacuum_interval_secs: default_vacuum_interval_secs(),
        }
    }
}

fn default_rollup_interval_secs() -> u64 {
    60
}

fn default_retention_interval_secs() -> u64 {
    3600
}

fn default_vacuum_interval_secs() -> u64 {
    86_400
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.busy_timeout_secs > 0,
            "database.busy_timeout_secs must be > 0, got {}",
            self.database.busy_timeout_secs
        );
        anyhow::ensure!(
            self.schedule.rollup_interval_secs > 0,
            "schedule.rollup_interval_secs must be > 0, got {}",
            self.schedule.rollup_interval_secs
        );
        anyhow::ensure!(
            self.schedule.retention_interval_secs > 0,
            "schedule.retention_interval_secs must be > 0, got {}",
            self.schedule.retention_interval_secs
        );
        anyhow::ensure!(
            self.schedule.vacuum_interval_secs > 0,
            "schedule.vacuum_interval_secs must be > 0, got {}",
            self.schedule.vacuum_interval_secs
        );
        for (key, expr) in [
            ("schedule.retention_schedule", &self.schedule.retention_schedule),
            ("schedule.vacuum_schedule", &self.schedule.vacuum_schedule),
        ] {
            if let Some(expr) = expr {
                cron::Schedule::from_str(expr)
                    .map_err(|e| anyhow::anyhow!("{} is not a valid cron expression: {}", key, e))?;
            }
        }
        Ok(())
    }
}
