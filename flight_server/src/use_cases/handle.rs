// Control surface over the simulation task and its workers.

use super::simulation::{Simulation, SimulationSettings, simulation_task};
use super::types::{ControlState, SimulationCommand};
use super::workers::{persistence_worker, report_worker};
use crate::domain::ports::{Clock, ReportSink, SnapshotStore};
use crate::domain::{FlightPlan, FlightState, SimulationSnapshot, TelemetrySample};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

/// Errors returned by simulation handle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    /// The simulation task is no longer running.
    Closed,
    /// No flight with the requested callsign.
    UnknownFlight,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Closed => f.write_str("simulation is not running"),
            SimulationError::UnknownFlight => f.write_str("unknown flight"),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Cheap-to-clone handle; reads come from the latest published snapshot,
/// writes go through the command channel.
#[derive(Clone)]
pub struct SimulationHandle {
    commands: mpsc::Sender<SimulationCommand>,
    snapshots: watch::Receiver<Arc<SimulationSnapshot>>,
    shutdown: CancellationToken,
}

impl SimulationHandle {
    /// Spawns the simulation task, the persistence worker and the report worker.
    pub fn spawn<C, S, R>(
        plans: &[FlightPlan],
        settings: SimulationSettings,
        clock: C,
        store: S,
        sink: R,
    ) -> Self
    where
        C: Clock + 'static,
        S: SnapshotStore + 'static,
        R: ReportSink + 'static,
    {
        let shutdown = CancellationToken::new();

        // Channel wiring between the handle, the simulation task and the workers.
        let (command_tx, command_rx) = mpsc::channel::<SimulationCommand>(settings.command_channel_capacity);
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let persist_now = Arc::new(Notify::new());

        let simulation = Simulation::new(plans, &settings, clock, report_tx, persist_now.clone());
        let snapshots = simulation.subscribe();

        tokio::spawn(simulation_task(
            simulation,
            command_rx,
            settings.tick_interval,
            shutdown.clone(),
        ));
        tokio::spawn(persistence_worker(
            store,
            snapshots.clone(),
            persist_now,
            settings.persist_interval,
            shutdown.clone(),
        ));
        tokio::spawn(report_worker(
            sink,
            report_rx,
            settings.report_retry_interval,
            shutdown.clone(),
        ));

        Self {
            commands: command_tx,
            snapshots,
            shutdown,
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SimulationCommand,
    ) -> Result<T, SimulationError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| SimulationError::Closed)?;
        reply_rx.await.map_err(|_| SimulationError::Closed)
    }

    pub async fn start(&self) -> Result<ControlState, SimulationError> {
        self.request(|reply| SimulationCommand::Start { reply }).await
    }

    pub async fn stop(&self) -> Result<ControlState, SimulationError> {
        self.request(|reply| SimulationCommand::Stop { reply }).await
    }

    pub async fn set_speed(&self, multiplier: f64) -> Result<ControlState, SimulationError> {
        self.request(|reply| SimulationCommand::SetSpeed { multiplier, reply })
            .await
    }

    pub async fn reset(&self) -> Result<ControlState, SimulationError> {
        self.request(|reply| SimulationCommand::Reset { reply }).await
    }

    pub async fn telemetry(&self, callsign: &str) -> Result<Vec<TelemetrySample>, SimulationError> {
        let callsign = callsign.to_string();
        self.request(|reply| SimulationCommand::Telemetry { callsign, reply })
            .await?
            .ok_or(SimulationError::UnknownFlight)
    }

    /// Latest published snapshot. Never blocks on the simulation task.
    pub fn snapshot(&self) -> Arc<SimulationSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn flight(&self, callsign: &str) -> Result<FlightState, SimulationError> {
        self.snapshot()
            .flight(callsign)
            .cloned()
            .ok_or(SimulationError::UnknownFlight)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SimulationSnapshot>> {
        self.snapshots.clone()
    }

    /// Stops the simulation task and both workers at their next boundary.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
