// SQLite record store (sqlx, WAL, pooled). Payloads are stored as JSON text so collectors and
// readers see the same field names on disk as on the wire.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Sqlite, Transaction};
use tracing::instrument;

use super::{RecordStore, RecordTx, schema};
use crate::error::StoreError;
use crate::models::{
    Category, EntityStatus, MonitoredEntity, RecordKey, Snapshot, StatRecord, Tier,
};

const RECORD_COLUMNS: &str = "id, entity_id, type, created_at, stats";

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Connect to SQLite at `path`, creating the parent dir and DB if missing, with WAL enabled.
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        busy_timeout: Duration,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables and indexes. Safe to call repeatedly.
    pub async fn init(&self) -> anyhow::Result<()> {
        schema::init(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "records", operation = "upsert_entity", entity_id = %entity.id))]
    pub async fn upsert_entity(&self, entity: &MonitoredEntity) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO entities (id, name, status) VALUES ($1, $2, $3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, status = excluded.status",
        )
        .bind(&entity.id)
        .bind(&entity.name)
        .bind(entity.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove an entity; its records go with it (ON DELETE CASCADE).
    #[instrument(skip(self), fields(repo = "records", operation = "delete_entity"))]
    pub async fn delete_entity(&self, entity_id: &str) -> Result<u64, StoreError> {
        let r = sqlx::query("DELETE FROM entities WHERE id = $1")
            .bind(entity_id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    /// Write one record outside any run (the collector path for finest-tier samples).
    pub async fn insert_record<P: Snapshot>(
        &self,
        record: &StatRecord<P>,
    ) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut *conn, record).await
    }

    /// Latest `limit` records for an entity and tier, returned oldest first.
    pub async fn recent_records<P: Snapshot>(
        &self,
        entity_id: &str,
        tier: Tier,
        limit: u32,
    ) -> Result<Vec<StatRecord<P>>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE entity_id = $1 AND type = $2
             ORDER BY created_at DESC, id DESC LIMIT $3",
            P::CATEGORY.table()
        );
        let rows = sqlx::query(&sql)
            .bind(entity_id)
            .bind(tier.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let mut out = rows
            .iter()
            .map(parse_record)
            .collect::<Result<Vec<_>, _>>()?;
        out.reverse();
        Ok(out)
    }

    pub async fn count_records(&self, category: Category, tier: Tier) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE type = $1", category.table());
        let n = sqlx::query_scalar::<_, i64>(&sql)
            .bind(tier.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

impl RecordStore for SqliteRecordStore {
    type Tx = SqliteRecordTx;

    async fn begin(&self) -> Result<SqliteRecordTx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(SqliteRecordTx { tx })
    }

    #[instrument(skip(self), fields(repo = "records", operation = "vacuum"))]
    async fn vacuum(&self) -> Result<(), StoreError> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }
}

/// An open SQLite transaction. Dropping it without `commit` rolls back.
pub struct SqliteRecordTx {
    tx: Transaction<'static, Sqlite>,
}

impl RecordTx for SqliteRecordTx {
    async fn list_active_entities(&mut self) -> Result<Vec<MonitoredEntity>, StoreError> {
        let rows =
            sqlx::query("SELECT id, name, status FROM entities WHERE status = $1 ORDER BY id")
                .bind(EntityStatus::Active.as_str())
                .fetch_all(&mut *self.tx)
                .await?;
        rows.iter()
            .map(|row| -> Result<MonitoredEntity, StoreError> {
                let status: String = row.try_get("status")?;
                Ok(MonitoredEntity {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    status: status.parse()?,
                })
            })
            .collect()
    }

    async fn find_records<P: Snapshot>(
        &mut self,
        entity_id: &str,
        tier: Tier,
        created_after: DateTime<Utc>,
    ) -> Result<Vec<StatRecord<P>>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE entity_id = $1 AND type = $2 AND created_at > $3
             ORDER BY created_at ASC, id ASC",
            P::CATEGORY.table()
        );
        let rows = sqlx::query(&sql)
            .bind(entity_id)
            .bind(tier.as_str())
            .bind(created_after.timestamp_millis())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(parse_record).collect()
    }

    async fn find_first_record<P: Snapshot>(
        &mut self,
        entity_id: &str,
        tier: Tier,
        created_after: DateTime<Utc>,
    ) -> Result<Option<StatRecord<P>>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE entity_id = $1 AND type = $2 AND created_at > $3
             ORDER BY created_at ASC, id ASC LIMIT 1",
            P::CATEGORY.table()
        );
        let row = sqlx::query(&sql)
            .bind(entity_id)
            .bind(tier.as_str())
            .bind(created_after.timestamp_millis())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(parse_record).transpose()
    }

    async fn save<P: Snapshot>(&mut self, record: &StatRecord<P>) -> Result<i64, StoreError> {
        insert(&mut *self.tx, record).await
    }

    async fn find_expired(
        &mut self,
        category: Category,
        tier: Tier,
        created_before: DateTime<Utc>,
    ) -> Result<Vec<RecordKey>, StoreError> {
        let sql = format!(
            "SELECT id, entity_id, type, created_at FROM {} WHERE type = $1 AND created_at < $2
             ORDER BY created_at ASC",
            category.table()
        );
        let rows = sqlx::query(&sql)
            .bind(tier.as_str())
            .bind(created_before.timestamp_millis())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter()
            .map(|row| -> Result<RecordKey, StoreError> {
                let tier: String = row.try_get("type")?;
                Ok(RecordKey {
                    category,
                    id: row.try_get("id")?,
                    entity_id: row.try_get("entity_id")?,
                    tier: tier.parse()?,
                    created_at: from_millis(row.try_get("created_at")?)?,
                })
            })
            .collect()
    }

    async fn delete(&mut self, key: &RecordKey) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", key.category.table());
        let r = sqlx::query(&sql)
            .bind(key.id)
            .execute(&mut *self.tx)
            .await?;
        if r.rows_affected() == 0 {
            return Err(StoreError::Backend(format!(
                "{} record {} not found",
                key.category, key.id
            )));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn insert<P: Snapshot>(
    conn: &mut sqlx::SqliteConnection,
    record: &StatRecord<P>,
) -> Result<i64, StoreError> {
    let stats = serde_json::to_string(&record.payload)?;
    let sql = format!(
        "INSERT INTO {} (entity_id, type, created_at, stats) VALUES ($1, $2, $3, $4)",
        P::CATEGORY.table()
    );
    let r = sqlx::query(&sql)
        .bind(&record.entity_id)
        .bind(record.tier.as_str())
        .bind(record.created_at.timestamp_millis())
        .bind(stats)
        .execute(conn)
        .await?;
    Ok(r.last_insert_rowid())
}

fn parse_record<P: Snapshot>(row: &SqliteRow) -> Result<StatRecord<P>, StoreError> {
    let tier: String = row.try_get("type")?;
    let stats: String = row.try_get("stats")?;
    Ok(StatRecord {
        id: Some(row.try_get("id")?),
        entity_id: row.try_get("entity_id")?,
        tier: tier.parse()?,
        created_at: from_millis(row.try_get("created_at")?)?,
        payload: serde_json::from_str(&stats)?,
    })
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms).ok_or(StoreError::InvalidTimestamp(ms))
}
