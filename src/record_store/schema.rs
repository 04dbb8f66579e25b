// Tables: entities (collector-owned) and one stats table per record category.
// created_at is Unix milliseconds; stats holds the JSON payload.

use sqlx::SqlitePool;

use crate::models::Category;

pub(super) async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            status TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for category in Category::ALL {
        init_stats_table(pool, category.table()).await?;
    }
    Ok(())
}

async fn init_stats_table(pool: &SqlitePool, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id TEXT NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
            type TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            stats TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_entity_type_created ON {table}(entity_id, type, created_at)"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_type_created ON {table}(type, created_at)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}
