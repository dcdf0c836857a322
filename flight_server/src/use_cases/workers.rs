// Background workers feeding the outbound collaborators. Failures here are
// logged and retried; they never reach the simulation task.

use crate::domain::ports::{ReportSink, SnapshotStore};
use crate::domain::{FlightReport, SimulationSnapshot};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Persists the latest snapshot every `interval` when it changed, and right
/// away when `persist_now` is notified. Writes a final snapshot on shutdown.
pub async fn persistence_worker<S: SnapshotStore>(
    store: S,
    snapshots: watch::Receiver<Arc<SimulationSnapshot>>,
    persist_now: Arc<Notify>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut persisted: Option<u64> = None;

    loop {
        let stopping = tokio::select! {
            _ = shutdown.cancelled() => true,
            _ = ticker.tick() => false,
            _ = persist_now.notified() => false,
        };

        let snapshot = snapshots.borrow().clone();
        if persisted != Some(snapshot.generation) {
            match store.persist(&snapshot).await {
                Ok(()) => {
                    debug!(generation = snapshot.generation, "snapshot persisted");
                    persisted = Some(snapshot.generation);
                }
                Err(error) => {
                    warn!(generation = snapshot.generation, %error, "snapshot persist failed");
                }
            }
        }

        if stopping {
            break;
        }
    }
}

/// Exports arrival reports, keeping failed ones queued for the next retry.
pub async fn report_worker<R: ReportSink>(
    sink: R,
    mut reports: mpsc::UnboundedReceiver<FlightReport>,
    retry_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut retry = tokio::time::interval(retry_interval);
    retry.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pending: VecDeque<FlightReport> = VecDeque::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                break;
            }
            report = reports.recv() => {
                let Some(report) = report else {
                    break;
                };
                if let Err(error) = sink.export(&report).await {
                    warn!(callsign = %report.callsign, %error, "report export failed, will retry");
                    pending.push_back(report);
                }
            }
            _ = retry.tick(), if !pending.is_empty() => {
                for _ in 0..pending.len() {
                    let Some(report) = pending.pop_front() else {
                        break;
                    };
                    match sink.export(&report).await {
                        Ok(()) => debug!(callsign = %report.callsign, "report exported after retry"),
                        Err(error) => {
                            warn!(callsign = %report.callsign, %error, "report export retry failed");
                            pending.push_back(report);
                        }
                    }
                }
            }
        }
    }

    if !pending.is_empty() {
        warn!(pending = pending.len(), "report worker stopped with unexported reports");
    }
}
