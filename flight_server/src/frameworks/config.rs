use crate::use_cases::SimulationSettings;
use crate::use_cases::simulation::clamp_speed_multiplier;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

// Runtime/server constants (not flight tuning).

pub fn http_port() -> u16 {
    parse_or("FLIGHT_SERVER_PORT", 3004)
}

pub fn flight_plan_path() -> PathBuf {
    env::var("FLIGHT_PLAN_PATH")
        .unwrap_or_else(|_| "flights.toml".to_string())
        .into()
}

pub fn snapshot_path() -> PathBuf {
    env::var("SNAPSHOT_PATH")
        .unwrap_or_else(|_| "data/snapshot.json".to_string())
        .into()
}

pub fn report_dir() -> PathBuf {
    env::var("REPORT_DIR")
        .unwrap_or_else(|_| "data/reports".to_string())
        .into()
}

pub fn speed_multiplier() -> f64 {
    let value: f64 = parse_or("SIM_SPEED_MULTIPLIER", 1.0);
    if value.is_nan() { 1.0 } else { clamp_speed_multiplier(value) }
}

pub fn autostart() -> bool {
    env::var("SIM_AUTOSTART")
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(true)
}

pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
pub const PERSIST_INTERVAL: Duration = Duration::from_secs(1);
pub const REPORT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
pub const COMMAND_CHANNEL_CAPACITY: usize = 256;
// Simulated seconds between telemetry samples.
pub const TELEMETRY_SAMPLE_INTERVAL: f64 = 30.0;
pub const TELEMETRY_CAPACITY: usize = 2000;

/// Everything `run` needs besides the listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub flight_plan_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub report_dir: PathBuf,
    pub simulation: SimulationSettings,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            flight_plan_path: flight_plan_path(),
            snapshot_path: snapshot_path(),
            report_dir: report_dir(),
            simulation: simulation_settings(),
        }
    }
}

/// Settings for the simulation task from the environment and the constants above.
pub fn simulation_settings() -> SimulationSettings {
    SimulationSettings {
        tick_interval: TICK_INTERVAL,
        command_channel_capacity: COMMAND_CHANNEL_CAPACITY,
        speed_multiplier: speed_multiplier(),
        autostart: autostart(),
        telemetry_interval: TELEMETRY_SAMPLE_INTERVAL,
        telemetry_capacity: TELEMETRY_CAPACITY,
        persist_interval: PERSIST_INTERVAL,
        report_retry_interval: REPORT_RETRY_INTERVAL,
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
