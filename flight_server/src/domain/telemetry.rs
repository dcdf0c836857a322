// Per-flight sample history and the arrival report derived from it.

use crate::domain::state::{Airport, FlightPhase, FlightState, FlightStatistics};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Simulated seconds between periodic samples.
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 30.0;
/// Samples kept per flight before the history is decimated.
pub const DEFAULT_CAPACITY: usize = 2000;

const METERS_PER_100_KM: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    /// Seconds since takeoff.
    pub flight_time: f64,
    pub phase: FlightPhase,
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub tas: f64,
    pub ground_speed: f64,
    pub vertical_speed: f64,
    pub mach: f64,
    pub throttle: f64,
    pub fuel_remaining: f64,
    pub fuel_flow: f64,
    pub progress: f64,
}

impl TelemetrySample {
    pub fn capture(flight: &FlightState) -> Self {
        Self {
            flight_time: flight.flight_time,
            phase: flight.phase,
            lat: flight.lat,
            lon: flight.lon,
            altitude: flight.altitude,
            tas: flight.tas,
            ground_speed: flight.ground_speed,
            vertical_speed: flight.vertical_speed,
            mach: flight.mach,
            throttle: flight.throttle,
            fuel_remaining: flight.fuel_remaining,
            fuel_flow: flight.fuel_flow,
            progress: flight.progress,
        }
    }
}

/// Bounded sample history for one flight.
///
/// Samples are taken on every phase change and every `interval` simulated
/// seconds of flight time. When the buffer fills up every other sample is
/// dropped and the interval doubles, so memory stays bounded on long routes.
#[derive(Debug, Clone)]
pub struct TelemetryRecorder {
    samples: Vec<TelemetrySample>,
    base_interval: f64,
    interval: f64,
    capacity: usize,
    last_sample_at: Option<f64>,
    phase_durations: [f64; FlightPhase::ALL.len()],
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL, DEFAULT_CAPACITY)
    }
}

impl TelemetryRecorder {
    pub fn new(interval: f64, capacity: usize) -> Self {
        let interval = if interval.is_finite() && interval > 0.0 {
            interval
        } else {
            DEFAULT_SAMPLE_INTERVAL
        };
        Self {
            samples: Vec::new(),
            base_interval: interval,
            interval,
            capacity: capacity.max(2),
            last_sample_at: None,
            phase_durations: [0.0; FlightPhase::ALL.len()],
        }
    }

    /// Records the tick that moved `flight` out of phase `from` after `dt` seconds.
    pub fn observe(&mut self, flight: &FlightState, from: FlightPhase, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.phase_durations[from.index()] += dt;
        }

        let transitioned = from != flight.phase;
        // Nothing worth sampling while parked at the gate.
        if !transitioned && flight.phase <= FlightPhase::Taxi {
            return;
        }

        let due = self
            .last_sample_at
            .is_none_or(|at| flight.flight_time - at >= self.interval);
        if transitioned || due {
            self.push(TelemetrySample::capture(flight));
            self.last_sample_at = Some(flight.flight_time);
        }
    }

    fn push(&mut self, sample: TelemetrySample) {
        if self.samples.len() >= self.capacity {
            let mut index = 0;
            self.samples.retain(|_| {
                let keep = index % 2 == 0;
                index += 1;
                keep
            });
            self.interval *= 2.0;
        }
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn phase_duration(&self, phase: FlightPhase) -> f64 {
        self.phase_durations[phase.index()]
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.base_interval, self.capacity);
    }
}

/// Summary written when a flight reaches `Arrived`.
#[derive(Debug, Clone, Serialize)]
pub struct FlightReport {
    pub callsign: String,
    pub aircraft: String,
    pub profile: &'static str,
    pub origin: Airport,
    pub destination: Airport,
    pub scheduled_start: DateTime<Utc>,
    pub landed_at: Option<DateTime<Utc>>,
    pub flight_time: f64,
    pub route_distance: f64,
    pub distance_flown: f64,
    /// Great-circle route distance over distance actually flown.
    pub route_efficiency: f64,
    pub fuel_consumed: f64,
    pub fuel_remaining: f64,
    /// kg per 100 km flown.
    pub fuel_per_100km: f64,
    pub statistics: FlightStatistics,
    /// Seconds spent in each phase that was entered.
    pub phase_durations: BTreeMap<FlightPhase, f64>,
    pub samples: Vec<TelemetrySample>,
}

impl FlightReport {
    pub fn build(flight: &FlightState, telemetry: &TelemetryRecorder) -> Self {
        let flown = flight.distance_flown;
        let (route_efficiency, fuel_per_100km) = if flown > 0.0 {
            (
                flight.total_distance / flown,
                flight.fuel_consumed / (flown / METERS_PER_100_KM),
            )
        } else {
            (0.0, 0.0)
        };

        let phase_durations = FlightPhase::ALL
            .into_iter()
            .filter(|phase| telemetry.phase_duration(*phase) > 0.0)
            .map(|phase| (phase, telemetry.phase_duration(phase)))
            .collect();

        Self {
            callsign: flight.callsign.clone(),
            aircraft: flight.aircraft.clone(),
            profile: flight.profile_key,
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            scheduled_start: flight.scheduled_start,
            landed_at: flight.landed_at,
            flight_time: flight.flight_time,
            route_distance: flight.total_distance,
            distance_flown: flown,
            route_efficiency,
            fuel_consumed: flight.fuel_consumed,
            fuel_remaining: flight.fuel_remaining,
            fuel_per_100km,
            statistics: flight.stats,
            phase_durations,
            samples: telemetry.samples().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::tests::{epoch, plan};
    use crate::domain::systems::physics;

    fn flight() -> FlightState {
        FlightState::new(&plan("TLM1", "A320", (2.0, 2.0), 0), epoch())
    }

    #[test]
    fn parked_flights_are_not_sampled() {
        let mut recorder = TelemetryRecorder::default();
        let flight = flight();
        recorder.observe(&flight, FlightPhase::Preflight, 1.0);
        recorder.observe(&flight, FlightPhase::Preflight, 1.0);
        assert!(recorder.samples().is_empty());
        assert_eq!(recorder.phase_duration(FlightPhase::Preflight), 2.0);
    }

    #[test]
    fn samples_on_phase_change_and_interval() {
        let mut recorder = TelemetryRecorder::new(30.0, 100);
        let mut flight = flight();
        flight.enter_phase(FlightPhase::Takeoff);
        recorder.observe(&flight, FlightPhase::Preflight, 1.0);
        assert_eq!(recorder.samples().len(), 1);

        flight.flight_time = 10.0;
        recorder.observe(&flight, FlightPhase::Takeoff, 10.0);
        assert_eq!(recorder.samples().len(), 1);

        flight.flight_time = 30.0;
        recorder.observe(&flight, FlightPhase::Takeoff, 20.0);
        assert_eq!(recorder.samples().len(), 2);

        flight.flight_time = 31.0;
        flight.enter_phase(FlightPhase::Climb);
        recorder.observe(&flight, FlightPhase::Takeoff, 1.0);
        assert_eq!(recorder.samples().len(), 3);
        assert_eq!(recorder.samples()[2].phase, FlightPhase::Climb);
        assert_eq!(recorder.phase_duration(FlightPhase::Takeoff), 31.0);
    }

    #[test]
    fn full_history_is_decimated_and_interval_doubles() {
        let mut recorder = TelemetryRecorder::new(1.0, 10);
        let mut flight = flight();
        flight.enter_phase(FlightPhase::Cruise);
        for second in 0..10 {
            flight.flight_time = second as f64;
            recorder.observe(&flight, FlightPhase::Cruise, 1.0);
        }
        assert_eq!(recorder.samples().len(), 10);

        flight.flight_time = 10.0;
        recorder.observe(&flight, FlightPhase::Cruise, 1.0);
        assert_eq!(recorder.samples().len(), 6);
        assert_eq!(recorder.interval(), 2.0);
        let times: Vec<f64> = recorder.samples().iter().map(|s| s.flight_time).collect();
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn clear_restores_the_configured_interval() {
        let mut recorder = TelemetryRecorder::new(1.0, 2);
        let mut flight = flight();
        flight.enter_phase(FlightPhase::Cruise);
        for second in 0..5 {
            flight.flight_time = second as f64 * 4.0;
            recorder.observe(&flight, FlightPhase::Cruise, 4.0);
        }
        assert!(recorder.interval() > 1.0);
        recorder.clear();
        assert!(recorder.samples().is_empty());
        assert_eq!(recorder.interval(), 1.0);
        assert_eq!(recorder.phase_duration(FlightPhase::Cruise), 0.0);
    }

    #[test]
    fn report_summarizes_a_completed_flight() {
        let mut flight = flight();
        let mut recorder = TelemetryRecorder::default();
        let mut guard = 0;
        while !flight.is_arrived() && guard < 100_000 {
            let outcome = physics::advance(&mut flight, 5.0, epoch());
            recorder.observe(&flight, outcome.from, 5.0);
            guard += 1;
        }
        assert!(flight.is_arrived());

        let report = FlightReport::build(&flight, &recorder);
        assert_eq!(report.callsign, "TLM1");
        assert_eq!(report.profile, "Airbus A320");
        assert!(report.fuel_consumed > 0.0);
        assert!(report.fuel_per_100km > 0.0);
        assert!(report.route_efficiency > 0.5 && report.route_efficiency <= 1.05);
        assert!(report.phase_durations.contains_key(&FlightPhase::Cruise));
        assert!(!report.phase_durations.contains_key(&FlightPhase::Taxi));
        assert_eq!(report.samples.last().map(|s| s.phase), Some(FlightPhase::Arrived));
        assert!(report.landed_at.is_some());
    }

    #[test]
    fn report_for_unflown_route_has_zero_ratios() {
        let report = FlightReport::build(&flight(), &TelemetryRecorder::default());
        assert_eq!(report.route_efficiency, 0.0);
        assert_eq!(report.fuel_per_100km, 0.0);
        assert!(report.samples.is_empty());
    }
}
