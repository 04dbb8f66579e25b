// Rollup: for every active entity, tier transition and category, average the source tier's
// recent records into one target-tier record once enough of them exist.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::RecordError;
use crate::models::{ContainerSnapshotSet, HostSnapshot, Snapshot, StatRecord};
use crate::record_store::RecordTx;
use crate::tiers::{TierDefinition, TierRegistry};

/// Counts from one rollup run, one entry per (entity, transition, category).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupSummary {
    pub created: u32,
    pub already_present: u32,
    pub insufficient: u32,
    pub save_failures: u32,
}

impl RollupSummary {
    fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::AlreadyPresent => self.already_present += 1,
            Outcome::Insufficient => self.insufficient += 1,
            Outcome::SaveFailed => self.save_failures += 1,
        }
    }
}

enum Outcome {
    Created,
    AlreadyPresent,
    Insufficient,
    SaveFailed,
}

/// Runs every transition for every active entity inside `tx`. Query failures abort; save
/// failures are logged and counted.
pub(super) async fn rollup_all<T: RecordTx>(
    tx: &mut T,
    tiers: &TierRegistry,
    now: DateTime<Utc>,
) -> Result<RollupSummary, RecordError> {
    let entities = tx
        .list_active_entities()
        .await
        .map_err(RecordError::query("list_active_entities"))?;

    let mut summary = RollupSummary::default();
    for entity in &entities {
        for def in tiers.transitions() {
            let existing_after = tiers
                .requires_guard(def)
                .then(|| now - def.lookback - tiers.padding());
            summary.tally(
                rollup_one::<_, HostSnapshot>(tx, &entity.id, def, existing_after, now).await?,
            );
            summary.tally(
                rollup_one::<_, ContainerSnapshotSet>(tx, &entity.id, def, existing_after, now)
                    .await?,
            );
        }
    }
    Ok(summary)
}

async fn rollup_one<T: RecordTx, P: Snapshot>(
    tx: &mut T,
    entity_id: &str,
    def: &TierDefinition,
    existing_after: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Outcome, RecordError> {
    if let Some(after) = existing_after {
        let existing = tx
            .find_first_record::<P>(entity_id, def.target, after)
            .await
            .map_err(RecordError::query("find_first_record"))?;
        if existing.is_some() {
            debug!(
                entity_id,
                tier = %def.target,
                category = %P::CATEGORY,
                "rollup already present"
            );
            return Ok(Outcome::AlreadyPresent);
        }
    }

    let sources = tx
        .find_records::<P>(entity_id, def.source, now - def.lookback)
        .await
        .map_err(RecordError::query("find_records"))?;
    if sources.len() < def.min_source_count {
        debug!(
            entity_id,
            tier = %def.target,
            category = %P::CATEGORY,
            found = sources.len(),
            needed = def.min_source_count,
            "not enough source records"
        );
        return Ok(Outcome::Insufficient);
    }

    let payloads: Vec<P> = sources.into_iter().map(|r| r.payload).collect();
    let record = StatRecord::new(entity_id, def.target, now, P::average(&payloads));
    match tx.save(&record).await {
        Ok(id) => {
            debug!(
                entity_id,
                id,
                tier = %def.target,
                category = %P::CATEGORY,
                sources = payloads.len(),
                "rollup saved"
            );
            Ok(Outcome::Created)
        }
        Err(source) => {
            let err = RecordError::RecordSave {
                entity_id: entity_id.to_string(),
                tier: def.target,
                category: P::CATEGORY,
                source,
            };
            warn!(error = %err, "rollup save failed; continuing");
            Ok(Outcome::SaveFailed)
        }
    }
}
