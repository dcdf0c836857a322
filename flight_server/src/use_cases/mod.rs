// Use cases layer: the simulation task, its control surface and workers.

pub mod handle;
pub mod simulation;
pub mod types;
pub mod workers;

pub use handle::{SimulationError, SimulationHandle};
pub use simulation::SimulationSettings;
pub use types::{ControlState, SimulationCommand};
