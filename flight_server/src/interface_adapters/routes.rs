use crate::interface_adapters::handlers::{
    get_flight, get_route, get_telemetry, list_flights, reset_simulation, set_speed, simulation_status,
    start_simulation, stop_simulation,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/flights", get(list_flights))
        .route("/flights/{callsign}", get(get_flight))
        .route("/flights/{callsign}/telemetry", get(get_telemetry))
        .route("/flights/{callsign}/route", get(get_route))
        .route("/simulation", get(simulation_status))
        .route("/simulation/start", post(start_simulation))
        .route("/simulation/stop", post(stop_simulation))
        .route("/simulation/speed", post(set_speed))
        .route("/simulation/reset", post(reset_simulation))
        .with_state(state)
}
