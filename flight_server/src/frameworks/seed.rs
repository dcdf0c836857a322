// Flight-plan seed: the `[[flight]]` tables of a TOML file.

use crate::domain::{Airport, FlightPlan};
use serde::Deserialize;
use std::collections::HashSet;
use std::io;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FlightPlanFile {
    #[serde(default, rename = "flight")]
    flights: Vec<FlightPlan>,
}

/// Reads and validates the seed file; any problem is fatal for startup.
pub fn load_flight_plans(path: &Path) -> io::Result<Vec<FlightPlan>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| io::Error::new(e.kind(), format!("failed to read {}: {e}", path.display())))?;
    parse_flight_plans(&text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", path.display())))
}

pub fn parse_flight_plans(text: &str) -> Result<Vec<FlightPlan>, String> {
    let file: FlightPlanFile = toml::from_str(text).map_err(|e| e.to_string())?;

    let mut seen = HashSet::new();
    for plan in &file.flights {
        let callsign = plan.callsign.trim();
        if callsign.is_empty() {
            return Err("flight with empty callsign".to_string());
        }
        if !seen.insert(callsign.to_ascii_uppercase()) {
            return Err(format!("duplicate callsign {callsign}"));
        }
        if plan.start_offset_seconds < 0 {
            return Err(format!("{callsign}: start_offset_seconds must not be negative"));
        }
        check_airport(callsign, &plan.origin)?;
        check_airport(callsign, &plan.destination)?;
    }

    Ok(file.flights)
}

fn check_airport(callsign: &str, airport: &Airport) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&airport.lat) || !(-180.0..=180.0).contains(&airport.lon) {
        return Err(format!(
            "{callsign}: airport {} has coordinates out of range ({}, {})",
            airport.code, airport.lat, airport.lon
        ));
    }
    Ok(())
}
