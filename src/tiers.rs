// Tier chain (1m -> 10m -> 20m -> 120m -> 480m) and per-tier retention windows.
// Both tables are built once at startup and never change afterwards.

use chrono::TimeDelta;

use crate::models::Tier;

/// One rollup transition: average `source` records from the last `lookback` into one `target` record
/// once at least `min_source_count` of them exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierDefinition {
    pub source: Tier,
    pub target: Tier,
    pub lookback: TimeDelta,
    pub min_source_count: usize,
}

impl TierDefinition {
    pub fn new(source: Tier, target: Tier, lookback_minutes: i64, min_source_count: usize) -> Self {
        Self {
            source,
            target,
            lookback: TimeDelta::minutes(lookback_minutes),
            min_source_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TierRegistry {
    transitions: Vec<TierDefinition>,
    padding: TimeDelta,
}

impl TierRegistry {
    /// Validates that `transitions` form a strict chain, each consuming its predecessor's target.
    pub fn new(transitions: Vec<TierDefinition>, padding: TimeDelta) -> anyhow::Result<Self> {
        anyhow::ensure!(!transitions.is_empty(), "tier chain must not be empty");
        anyhow::ensure!(
            padding >= TimeDelta::zero(),
            "idempotency padding must not be negative"
        );
        for (i, def) in transitions.iter().enumerate() {
            anyhow::ensure!(
                def.source != def.target,
                "transition {} -> {} must change tier",
                def.source,
                def.target
            );
            anyhow::ensure!(
                def.lookback > TimeDelta::zero(),
                "transition {} -> {} needs a positive lookback",
                def.source,
                def.target
            );
            anyhow::ensure!(
                def.min_source_count >= 1,
                "transition {} -> {} needs min_source_count >= 1",
                def.source,
                def.target
            );
            if i > 0 {
                let prev = transitions[i - 1];
                anyhow::ensure!(
                    def.source == prev.target,
                    "transition {} -> {} does not consume the output of {} -> {}",
                    def.source,
                    def.target,
                    prev.source,
                    prev.target
                );
            }
        }
        Ok(Self {
            transitions,
            padding,
        })
    }

    pub fn transitions(&self) -> &[TierDefinition] {
        &self.transitions
    }

    /// Slack applied to the "already rolled up" lookup, since rollups land slightly after the
    /// period boundary.
    pub fn padding(&self) -> TimeDelta {
        self.padding
    }

    /// Target of the first transition. Its source window equals the run interval, so it is
    /// recomputed on every run.
    pub fn finest_target(&self) -> Tier {
        self.transitions[0].target
    }

    pub fn requires_guard(&self, def: &TierDefinition) -> bool {
        def.target != self.finest_target()
    }
}

impl Default for TierRegistry {
    fn default() -> Self {
        Self {
            transitions: vec![
                TierDefinition::new(Tier::OneMinute, Tier::TenMinutes, 10, 10),
                TierDefinition::new(Tier::TenMinutes, Tier::TwentyMinutes, 20, 2),
                TierDefinition::new(Tier::TwentyMinutes, Tier::TwoHours, 120, 6),
                TierDefinition::new(Tier::TwoHours, Tier::EightHours, 480, 4),
            ],
            padding: TimeDelta::minutes(1),
        }
    }
}

/// Maximum age per tier before a record is deleted.
#[derive(Debug, Clone)]
pub struct RetentionTable {
    windows: Vec<(Tier, TimeDelta)>,
}

impl RetentionTable {
    pub fn new(windows: Vec<(Tier, TimeDelta)>) -> anyhow::Result<Self> {
        for (tier, window) in &windows {
            anyhow::ensure!(
                *window > TimeDelta::zero(),
                "retention window for {} must be positive",
                tier
            );
        }
        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[(Tier, TimeDelta)] {
        &self.windows
    }

    pub fn window(&self, tier: Tier) -> Option<TimeDelta> {
        self.windows
            .iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, w)| *w)
    }
}

impl Default for RetentionTable {
    fn default() -> Self {
        Self {
            windows: vec![
                (Tier::OneMinute, TimeDelta::hours(1)),
                (Tier::TenMinutes, TimeDelta::hours(12)),
                (Tier::TwentyMinutes, TimeDelta::hours(24)),
                (Tier::TwoHours, TimeDelta::days(7)),
                (Tier::EightHours, TimeDelta::days(30)),
            ],
        }
    }
}
