// Background scheduler: rollup every rollup_interval_secs, retention and VACUUM on a cron
// expression or fixed interval. A failed run is logged and the next tick tries again.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::config::ScheduleConfig;
use crate::record_manager::RecordManager;
use crate::record_store::RecordStore;

/// Spawns the scheduler loop. It exits when `shutdown_rx` fires (or its sender is dropped).
pub fn spawn<S>(
    manager: Arc<RecordManager<S>>,
    config: ScheduleConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    S: RecordStore + 'static,
{
    tokio::spawn(async move {
        run(manager, config, shutdown_rx).await;
    })
}

#[instrument(skip_all, fields(rollup_interval_secs = config.rollup_interval_secs))]
async fn run<S>(
    manager: Arc<RecordManager<S>>,
    config: ScheduleConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    S: RecordStore + 'static,
{
    let mut rollup_tick = tokio::time::interval(Duration::from_secs(config.rollup_interval_secs));
    rollup_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (retention_tx, mut retention_rx) = mpsc::channel::<()>(1);
    let retention_task = tokio::spawn(ticker(
        "retention",
        config.retention_schedule.clone(),
        Duration::from_secs(config.retention_interval_secs),
        retention_tx,
    ));
    let (vacuum_tx, mut vacuum_rx) = mpsc::channel::<()>(1);
    let vacuum_task = tokio::spawn(ticker(
        "vacuum",
        config.vacuum_schedule.clone(),
        Duration::from_secs(config.vacuum_interval_secs),
        vacuum_tx,
    ));

    loop {
        tokio::select! {
            _ = rollup_tick.tick() => {
                if let Err(e) = manager.run_rollup().await {
                    warn!(error = %e, "rollup run failed");
                }
            }
            Some(()) = retention_rx.recv() => {
                if let Err(e) = manager.run_retention().await {
                    warn!(error = %e, "retention run failed");
                }
            }
            Some(()) = vacuum_rx.recv() => {
                if let Err(e) = manager.store().vacuum().await {
                    warn!(error = %e, "vacuum failed");
                } else {
                    info!("vacuum complete");
                }
            }
            _ = &mut shutdown_rx => {
                debug!("scheduler shutting down");
                break;
            }
        }
    }

    retention_task.abort();
    vacuum_task.abort();
}

/// Sends on `tx` at each time of `schedule` (cron, local time), or every `interval` when no
/// schedule is set.
async fn ticker(
    job: &'static str,
    schedule: Option<String>,
    interval: Duration,
    tx: mpsc::Sender<()>,
) {
    if let Some(ref cron_str) = schedule {
        let Ok(schedule) = cron::Schedule::from_str(cron_str) else {
            warn!(job, cron = %cron_str, "invalid schedule; job will not run");
            return;
        };
        loop {
            let now = chrono::Local::now();
            if let Some(next) = schedule.after(&now).next() {
                let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(delay).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    } else {
        loop {
            tokio::time::sleep(interval).await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    }
}
