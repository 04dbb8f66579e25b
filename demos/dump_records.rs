// Dump recent stat records as JSON (payloads exactly as stored).
//
// Usage: cargo run --example dump_records -- ENTITY_ID [TIER] [CATEGORY] [DB_PATH] [LIMIT]
//   TIER      default: 10m
//   CATEGORY  host | container, default: host
//   DB_PATH   default: ./data/records.db
//   LIMIT     default: 5

use std::env;
use std::time::Duration;

use monitor_rollup::SqliteRecordStore;
use monitor_rollup::models::{ContainerSnapshotSet, HostSnapshot, Tier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(entity_id) = args.get(1) else {
        anyhow::bail!("usage: dump_records ENTITY_ID [TIER] [CATEGORY] [DB_PATH] [LIMIT]");
    };
    let tier: Tier = args.get(2).map(String::as_str).unwrap_or("10m").parse()?;
    let category = args.get(3).map(String::as_str).unwrap_or("host");
    let path = args.get(4).map(String::as_str).unwrap_or("./data/records.db");
    let limit: u32 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(5);

    let store = SqliteRecordStore::connect(path, 1, Duration::from_secs(5)).await?;
    let json = match category {
        "host" => serde_json::to_string_pretty(
            &store
                .recent_records::<HostSnapshot>(entity_id, tier, limit)
                .await?,
        )?,
        "container" => serde_json::to_string_pretty(
            &store
                .recent_records::<ContainerSnapshotSet>(entity_id, tier, limit)
                .await?,
        )?,
        other => anyhow::bail!("unknown category: {other}"),
    };
    println!("{json}");
    Ok(())
}
