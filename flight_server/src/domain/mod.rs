// Domain layer: atmosphere, aerodynamics, flight state and the phase machine.

pub mod aerodynamics;
pub mod atmosphere;
pub mod catalog;
pub mod geo;
pub mod ports;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod telemetry;

pub use snapshot::SimulationSnapshot;
pub use state::{Airport, FlightPhase, FlightPlan, FlightState, FlightStatus};
pub use telemetry::{FlightReport, TelemetryRecorder, TelemetrySample};
