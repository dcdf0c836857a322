use crate::domain::ports::Clock;
use crate::use_cases::SimulationHandle;
use chrono::{DateTime, Utc};

#[derive(Clone)]
pub struct AppState {
    // Control surface and snapshot source for every flight.
    pub simulation: SimulationHandle,
}

// System clock adapter used by the simulation task.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
