// Framework bootstrap for the flight server runtime.

use crate::frameworks::config::{self, ServerConfig};
use crate::frameworks::seed;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::interface_adapters::storage::{JsonReportSink, JsonSnapshotStore};
use crate::use_cases::SimulationHandle;

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener, config: ServerConfig) -> Result<()> {
    let address = listener.local_addr()?;
    // build state
    let state = build_state(&config)?;
    let simulation = state.simulation.clone();
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    simulation.shutdown();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let config = ServerConfig::from_env();
    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, config).await
}

fn build_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let plans = seed::load_flight_plans(&config.flight_plan_path).inspect_err(|e| {
        tracing::error!(error = %e, "failed to load flight plans");
    })?;
    tracing::info!(
        flights = plans.len(),
        path = %config.flight_plan_path.display(),
        "flight plans loaded"
    );
    tracing::debug!(
        snapshot_path = %config.snapshot_path.display(),
        report_dir = %config.report_dir.display(),
        speed_multiplier = config.simulation.speed_multiplier,
        autostart = config.simulation.autostart,
        "simulation configured"
    );

    // Spawns the simulation task plus its persistence and report workers.
    let simulation = SimulationHandle::spawn(
        &plans,
        config.simulation.clone(),
        SystemClock,
        JsonSnapshotStore::new(&config.snapshot_path),
        JsonReportSink::new(&config.report_dir),
    );

    Ok(Arc::new(AppState { simulation }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
