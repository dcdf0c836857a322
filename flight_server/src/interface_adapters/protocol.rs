// HTTP DTOs and conversions for the public flight API.

use crate::domain::geo::GeoPoint;
use crate::domain::{FlightPhase, FlightState, FlightStatus, SimulationSnapshot, TelemetrySample};
use crate::use_cases::ControlState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact per-flight entry for map clients polling the whole fleet.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummaryDto {
    pub callsign: String,
    pub aircraft: String,
    pub origin: String,
    pub destination: String,
    pub phase: FlightPhase,
    pub status: FlightStatus,
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub heading: f64,
    pub ground_speed: f64,
    pub vertical_speed: f64,
    pub progress: f64,
}

impl From<&FlightState> for FlightSummaryDto {
    fn from(flight: &FlightState) -> Self {
        Self {
            callsign: flight.callsign.clone(),
            aircraft: flight.aircraft.clone(),
            origin: flight.origin.code.clone(),
            destination: flight.destination.code.clone(),
            phase: flight.phase,
            status: flight.status,
            lat: flight.lat,
            lon: flight.lon,
            altitude: flight.altitude,
            heading: flight.heading,
            ground_speed: flight.ground_speed,
            vertical_speed: flight.vertical_speed,
            progress: flight.progress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightsResponse {
    pub generation: u64,
    pub taken_at: DateTime<Utc>,
    pub flights: Vec<FlightSummaryDto>,
}

impl From<&SimulationSnapshot> for FlightsResponse {
    fn from(snapshot: &SimulationSnapshot) -> Self {
        Self {
            generation: snapshot.generation,
            taken_at: snapshot.taken_at,
            flights: snapshot.flights.iter().map(FlightSummaryDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TelemetryResponse {
    pub callsign: String,
    pub samples: Vec<TelemetrySample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteQuery {
    pub points: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    pub callsign: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// Great-circle distance (m).
    pub distance: f64,
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FlightCountsDto {
    pub total: usize,
    pub waiting: usize,
    pub active: usize,
    pub landed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStatusResponse {
    pub running: bool,
    pub speed_multiplier: f64,
    pub tick: u64,
    pub generation: u64,
    pub simulated_seconds: f64,
    pub flights: FlightCountsDto,
}

impl From<&SimulationSnapshot> for SimulationStatusResponse {
    fn from(snapshot: &SimulationSnapshot) -> Self {
        Self {
            running: snapshot.running,
            speed_multiplier: snapshot.speed_multiplier,
            tick: snapshot.tick,
            generation: snapshot.generation,
            simulated_seconds: snapshot.simulated_seconds,
            flights: FlightCountsDto {
                total: snapshot.flights.len(),
                waiting: snapshot.count(FlightStatus::Waiting),
                active: snapshot.count(FlightStatus::Active),
                landed: snapshot.count(FlightStatus::Landed),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeedRequest {
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlResponse {
    pub running: bool,
    pub speed_multiplier: f64,
}

impl From<ControlState> for ControlResponse {
    fn from(state: ControlState) -> Self {
        Self {
            running: state.running,
            speed_multiplier: state.speed_multiplier,
        }
    }
}
