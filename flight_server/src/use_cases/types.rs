// Use-case level inputs/outputs for the simulation loop.

use crate::domain::TelemetrySample;
use serde::Serialize;
use tokio::sync::oneshot;

/// Control messages handled by the simulation task between ticks.
#[derive(Debug)]
pub enum SimulationCommand {
    Start {
        reply: oneshot::Sender<ControlState>,
    },
    Stop {
        reply: oneshot::Sender<ControlState>,
    },
    SetSpeed {
        multiplier: f64,
        reply: oneshot::Sender<ControlState>,
    },
    Reset {
        reply: oneshot::Sender<ControlState>,
    },
    Telemetry {
        callsign: String,
        reply: oneshot::Sender<Option<Vec<TelemetrySample>>>,
    },
}

/// Scheduler flags after a control command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlState {
    pub running: bool,
    pub speed_multiplier: f64,
}
