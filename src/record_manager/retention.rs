// Retention: delete every record older than its tier's window. Deletion must succeed; any
// failure aborts the run so the whole transaction rolls back.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::error::RecordError;
use crate::models::Category;
use crate::record_store::RecordTx;
use crate::tiers::RetentionTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionSummary {
    pub deleted: u64,
}

pub(super) async fn prune_all<T: RecordTx>(
    tx: &mut T,
    table: &RetentionTable,
    now: DateTime<Utc>,
) -> Result<RetentionSummary, RecordError> {
    let mut summary = RetentionSummary::default();
    for &(tier, window) in table.windows() {
        let cutoff = now - window;
        for category in Category::ALL {
            let expired = tx
                .find_expired(category, tier, cutoff)
                .await
                .map_err(RecordError::query("find_expired"))?;
            for key in &expired {
                tx.delete(key).await.map_err(|source| {
                    let err = RecordError::RecordDelete {
                        category,
                        id: key.id,
                        source,
                    };
                    error!(
                        error = %err,
                        tier = %tier,
                        entity_id = %key.entity_id,
                        "failed to delete expired record"
                    );
                    err
                })?;
            }
            if !expired.is_empty() {
                debug!(
                    tier = %tier,
                    category = %category,
                    deleted = expired.len(),
                    "expired records deleted"
                );
            }
            summary.deleted += expired.len() as u64;
        }
    }
    Ok(summary)
}
