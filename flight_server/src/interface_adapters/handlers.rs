use crate::domain::FlightState;
use crate::domain::geo;
use crate::interface_adapters::http::{ApiError, error_response};
use crate::interface_adapters::protocol::{
    ControlResponse, FlightsResponse, RouteQuery, RouteResponse, SimulationStatusResponse, SpeedRequest,
    TelemetryResponse,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::SimulationError;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

const DEFAULT_ROUTE_POINTS: usize = 64;
const MIN_ROUTE_POINTS: usize = 2;
const MAX_ROUTE_POINTS: usize = 512;

pub async fn list_flights(State(state): State<Arc<AppState>>) -> Json<FlightsResponse> {
    Json(FlightsResponse::from(state.simulation.snapshot().as_ref()))
}

pub async fn get_flight(
    State(state): State<Arc<AppState>>,
    Path(callsign): Path<String>,
) -> Result<Json<FlightState>, ApiError> {
    let flight = state.simulation.flight(&callsign).map_err(map_simulation_error)?;
    Ok(Json(flight))
}

pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Path(callsign): Path<String>,
) -> Result<Json<TelemetryResponse>, ApiError> {
    let samples = state
        .simulation
        .telemetry(&callsign)
        .await
        .map_err(map_simulation_error)?;
    Ok(Json(TelemetryResponse { callsign, samples }))
}

pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(callsign): Path<String>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let flight = state.simulation.flight(&callsign).map_err(map_simulation_error)?;
    let points = query
        .points
        .unwrap_or(DEFAULT_ROUTE_POINTS)
        .clamp(MIN_ROUTE_POINTS, MAX_ROUTE_POINTS);

    let origin = flight.origin.position();
    let destination = flight.destination.position();
    Ok(Json(RouteResponse {
        callsign: flight.callsign,
        origin,
        destination,
        distance: geo::distance(origin, destination),
        points: geo::great_circle_path(origin, destination, points),
    }))
}

pub async fn simulation_status(State(state): State<Arc<AppState>>) -> Json<SimulationStatusResponse> {
    Json(SimulationStatusResponse::from(state.simulation.snapshot().as_ref()))
}

#[tracing::instrument(name = "simulation_start", skip_all)]
pub async fn start_simulation(State(state): State<Arc<AppState>>) -> Result<Json<ControlResponse>, ApiError> {
    let control = state.simulation.start().await.map_err(map_simulation_error)?;
    Ok(Json(control.into()))
}

#[tracing::instrument(name = "simulation_stop", skip_all)]
pub async fn stop_simulation(State(state): State<Arc<AppState>>) -> Result<Json<ControlResponse>, ApiError> {
    let control = state.simulation.stop().await.map_err(map_simulation_error)?;
    Ok(Json(control.into()))
}

#[tracing::instrument(name = "simulation_speed", skip_all, fields(multiplier = body.multiplier))]
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SpeedRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    if !body.multiplier.is_finite() {
        return Err(error_response(StatusCode::BAD_REQUEST, "multiplier must be a finite number"));
    }
    let control = state
        .simulation
        .set_speed(body.multiplier)
        .await
        .map_err(map_simulation_error)?;
    Ok(Json(control.into()))
}

#[tracing::instrument(name = "simulation_reset", skip_all)]
pub async fn reset_simulation(State(state): State<Arc<AppState>>) -> Result<Json<ControlResponse>, ApiError> {
    let control = state.simulation.reset().await.map_err(map_simulation_error)?;
    Ok(Json(control.into()))
}

fn map_simulation_error(err: SimulationError) -> ApiError {
    match err {
        SimulationError::UnknownFlight => error_response(StatusCode::NOT_FOUND, "unknown flight"),
        SimulationError::Closed => {
            tracing::error!("simulation task is not running");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "simulation is not running")
        }
    }
}
