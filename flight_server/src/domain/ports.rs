use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::snapshot::SimulationSnapshot;
use crate::domain::telemetry::FlightReport;

// Port for best-effort bulk persistence of the latest snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn persist(&self, snapshot: &SimulationSnapshot) -> Result<(), String>;
}

// Port for exporting the report of a flight that has arrived.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn export(&self, report: &FlightReport) -> Result<(), String>;
}

// Port for retrieving the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

