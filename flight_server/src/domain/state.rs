// Domain-level flight records and their lifecycle phases.

use crate::domain::catalog;
use crate::domain::geo::{self, GeoPoint};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flight lifecycle phases in their only legal forward order.
///
/// `Taxi` is reserved: it sits in the order but no transition enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightPhase {
    Preflight,
    Taxi,
    Takeoff,
    Climb,
    Cruise,
    Descent,
    Approach,
    Landing,
    Arrived,
}

impl FlightPhase {
    pub const ALL: [FlightPhase; 9] = [
        FlightPhase::Preflight,
        FlightPhase::Taxi,
        FlightPhase::Takeoff,
        FlightPhase::Climb,
        FlightPhase::Cruise,
        FlightPhase::Descent,
        FlightPhase::Approach,
        FlightPhase::Landing,
        FlightPhase::Arrived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlightPhase::Preflight => "preflight",
            FlightPhase::Taxi => "taxi",
            FlightPhase::Takeoff => "takeoff",
            FlightPhase::Climb => "climb",
            FlightPhase::Cruise => "cruise",
            FlightPhase::Descent => "descent",
            FlightPhase::Approach => "approach",
            FlightPhase::Landing => "landing",
            FlightPhase::Arrived => "arrived",
        }
    }

    /// Simplified status for consumers that only know waiting/active/landed.
    pub fn status(self) -> FlightStatus {
        match self {
            FlightPhase::Preflight | FlightPhase::Taxi => FlightStatus::Waiting,
            FlightPhase::Arrived => FlightStatus::Landed,
            _ => FlightStatus::Active,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Waiting,
    Active,
    Landed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Airport {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Identity and route of a flight as supplied by the planning collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub callsign: String,
    /// Model name, fuzzy-matched against the performance catalog.
    pub aircraft: String,
    pub origin: Airport,
    pub destination: Airport,
    /// Delay between (re)initialization and takeoff.
    #[serde(default)]
    pub start_offset_seconds: i64,
}

/// Running maxima and incremental means over active ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlightStatistics {
    pub samples: u64,
    pub max_altitude: f64,
    pub avg_altitude: f64,
    pub max_speed: f64,
    pub avg_speed: f64,
    pub max_mach: f64,
    pub avg_mach: f64,
    pub max_vertical_speed: f64,
    pub avg_vertical_speed: f64,
    pub max_fuel_flow: f64,
    pub avg_fuel_flow: f64,
}

impl FlightStatistics {
    pub fn record(&mut self, altitude: f64, speed: f64, mach: f64, vertical_speed: f64, fuel_flow: f64) {
        self.samples += 1;
        let n = self.samples as f64;
        let vs = vertical_speed.abs();

        self.max_altitude = self.max_altitude.max(altitude);
        self.max_speed = self.max_speed.max(speed);
        self.max_mach = self.max_mach.max(mach);
        self.max_vertical_speed = self.max_vertical_speed.max(vs);
        self.max_fuel_flow = self.max_fuel_flow.max(fuel_flow);

        self.avg_altitude += (altitude - self.avg_altitude) / n;
        self.avg_speed += (speed - self.avg_speed) / n;
        self.avg_mach += (mach - self.avg_mach) / n;
        self.avg_vertical_speed += (vs - self.avg_vertical_speed) / n;
        self.avg_fuel_flow += (fuel_flow - self.avg_fuel_flow) / n;
    }
}

/// Complete mutable state of one simulated flight.
///
/// Units: meters, m/s, kg, kg/s, newtons, seconds; angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightState {
    // Identity.
    pub callsign: String,
    pub aircraft: String,
    pub profile_key: &'static str,
    pub origin: Airport,
    pub destination: Airport,
    pub start_offset_seconds: i64,
    pub scheduled_start: DateTime<Utc>,

    pub phase: FlightPhase,
    pub status: FlightStatus,

    // Position and attitude.
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
    pub aoa: f64,

    // Velocities.
    pub tas: f64,
    pub ias: f64,
    pub ground_speed: f64,
    pub mach: f64,
    pub vertical_speed: f64,

    // Forces.
    pub lift: f64,
    pub drag: f64,
    pub thrust: f64,
    pub lift_to_drag: f64,

    // Controls.
    pub throttle: f64,
    pub target_altitude: f64,
    pub target_speed: f64,
    pub target_heading: f64,

    // Mass.
    pub fuel_loaded: bool,
    pub gross_weight: f64,
    pub fuel_remaining: f64,
    pub fuel_consumed: f64,
    pub fuel_flow: f64,

    // Progress along the route (0..=1) and distance counters.
    pub progress: f64,
    pub total_distance: f64,
    pub distance_flown: f64,
    pub distance_remaining: f64,

    pub stats: FlightStatistics,

    pub flight_time: f64,
    pub time_in_phase: f64,
    pub landed_at: Option<DateTime<Utc>>,
}

impl FlightState {
    /// Builds a flight parked at its origin, waiting for `now + start_offset`.
    pub fn new(plan: &FlightPlan, now: DateTime<Utc>) -> Self {
        let profile = catalog::lookup(&plan.aircraft);
        let mut flight = Self {
            callsign: plan.callsign.clone(),
            aircraft: plan.aircraft.clone(),
            profile_key: profile.key,
            origin: plan.origin.clone(),
            destination: plan.destination.clone(),
            start_offset_seconds: plan.start_offset_seconds,
            scheduled_start: now,
            phase: FlightPhase::Preflight,
            status: FlightStatus::Waiting,
            lat: 0.0,
            lon: 0.0,
            altitude: 0.0,
            heading: 0.0,
            pitch: 0.0,
            roll: 0.0,
            aoa: 0.0,
            tas: 0.0,
            ias: 0.0,
            ground_speed: 0.0,
            mach: 0.0,
            vertical_speed: 0.0,
            lift: 0.0,
            drag: 0.0,
            thrust: 0.0,
            lift_to_drag: 0.0,
            throttle: 0.0,
            target_altitude: 0.0,
            target_speed: 0.0,
            target_heading: 0.0,
            fuel_loaded: false,
            gross_weight: 0.0,
            fuel_remaining: 0.0,
            fuel_consumed: 0.0,
            fuel_flow: 0.0,
            progress: 0.0,
            total_distance: 0.0,
            distance_flown: 0.0,
            distance_remaining: 0.0,
            stats: FlightStatistics::default(),
            flight_time: 0.0,
            time_in_phase: 0.0,
            landed_at: None,
        };
        flight.reset(now);
        flight
    }

    /// Returns the flight to Preflight at its origin with every accumulator
    /// zeroed and a fresh start time of `now + start_offset`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let origin = self.origin.position();
        let destination = self.destination.position();
        let route = geo::distance(origin, destination);
        let heading = geo::bearing(origin, destination);

        *self = Self {
            callsign: std::mem::take(&mut self.callsign),
            aircraft: std::mem::take(&mut self.aircraft),
            profile_key: self.profile_key,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            start_offset_seconds: self.start_offset_seconds,
            scheduled_start: now + TimeDelta::seconds(self.start_offset_seconds),
            phase: FlightPhase::Preflight,
            status: FlightStatus::Waiting,
            lat: origin.lat,
            lon: origin.lon,
            altitude: 0.0,
            heading,
            pitch: 0.0,
            roll: 0.0,
            aoa: 0.0,
            tas: 0.0,
            ias: 0.0,
            ground_speed: 0.0,
            mach: 0.0,
            vertical_speed: 0.0,
            lift: 0.0,
            drag: 0.0,
            thrust: 0.0,
            lift_to_drag: 0.0,
            throttle: 0.0,
            target_altitude: 0.0,
            target_speed: 0.0,
            target_heading: heading,
            fuel_loaded: false,
            gross_weight: 0.0,
            fuel_remaining: 0.0,
            fuel_consumed: 0.0,
            fuel_flow: 0.0,
            progress: 0.0,
            total_distance: route,
            distance_flown: 0.0,
            distance_remaining: route,
            stats: FlightStatistics::default(),
            flight_time: 0.0,
            time_in_phase: 0.0,
            landed_at: None,
        };
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn is_arrived(&self) -> bool {
        self.phase == FlightPhase::Arrived
    }

    /// Moves to `next` if it is later in the lifecycle; earlier phases are ignored.
    pub fn enter_phase(&mut self, next: FlightPhase) -> bool {
        if next <= self.phase {
            return false;
        }
        self.phase = next;
        self.status = next.status();
        self.time_in_phase = 0.0;
        true
    }

    /// Re-establishes the bounds every mutation must respect.
    pub fn clamp_invariants(&mut self) {
        self.throttle = finite_or_zero(self.throttle).clamp(0.0, 1.0);
        self.altitude = finite_or_zero(self.altitude).max(0.0);
        self.progress = finite_or_zero(self.progress).clamp(0.0, 1.0);
        self.fuel_remaining = finite_or_zero(self.fuel_remaining).max(0.0);
        self.tas = finite_or_zero(self.tas).max(0.0);
        self.ground_speed = finite_or_zero(self.ground_speed).max(0.0);
        self.distance_remaining = finite_or_zero(self.distance_remaining).max(0.0);
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
