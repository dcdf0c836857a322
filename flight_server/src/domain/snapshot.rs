// Immutable view of every flight, published once per scheduler tick.

use crate::domain::state::{FlightState, FlightStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// Bumped on every publish; lets consumers skip unchanged snapshots.
    pub generation: u64,
    pub tick: u64,
    pub running: bool,
    pub speed_multiplier: f64,
    pub simulated_seconds: f64,
    pub taken_at: DateTime<Utc>,
    pub flights: Vec<FlightState>,
}

impl SimulationSnapshot {
    pub fn flight(&self, callsign: &str) -> Option<&FlightState> {
        self.flights
            .iter()
            .find(|flight| flight.callsign.eq_ignore_ascii_case(callsign))
    }

    pub fn count(&self, status: FlightStatus) -> usize {
        self.flights.iter().filter(|flight| flight.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::FlightPhase;
    use crate::domain::state::tests::{epoch, plan};

    #[test]
    fn lookup_ignores_case_and_counts_by_status() {
        let mut landed = FlightState::new(&plan("BAW1", "A320", (1.0, 1.0), 0), epoch());
        landed.enter_phase(FlightPhase::Arrived);
        let snapshot = SimulationSnapshot {
            generation: 1,
            tick: 1,
            running: true,
            speed_multiplier: 1.0,
            simulated_seconds: 0.0,
            taken_at: epoch(),
            flights: vec![
                FlightState::new(&plan("DLH2", "A320", (1.0, 1.0), 0), epoch()),
                landed,
            ],
        };

        assert_eq!(snapshot.flight("baw1").map(|f| f.phase), Some(FlightPhase::Arrived));
        assert!(snapshot.flight("XXX9").is_none());
        assert_eq!(snapshot.count(FlightStatus::Waiting), 1);
        assert_eq!(snapshot.count(FlightStatus::Landed), 1);
        assert_eq!(snapshot.count(FlightStatus::Active), 0);
    }
}
