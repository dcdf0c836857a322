// File-backed adapters for the snapshot and report ports.

use crate::domain::ports::{ReportSink, SnapshotStore};
use crate::domain::{FlightReport, SimulationSnapshot};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Writes the whole snapshot as JSON, replacing the previous file atomically.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn persist(&self, snapshot: &SimulationSnapshot) -> Result<(), String> {
        write_json(&self.path, snapshot).await
    }
}

/// One `<callsign>.json` file per arrived flight.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    dir: PathBuf,
}

impl JsonReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn report_path(&self, callsign: &str) -> PathBuf {
        let name: String = callsign
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl ReportSink for JsonReportSink {
    async fn export(&self, report: &FlightReport) -> Result<(), String> {
        write_json(&self.report_path(&report.callsign), report).await
    }
}

// Serializes to a sibling temp file, then renames over the target.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), String> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| format!("serialize {}: {e}", path.display()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("create {}: {e}", parent.display()))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| format!("write {}: {e}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| format!("rename {} -> {}: {e}", tmp.display(), path.display()))
}
