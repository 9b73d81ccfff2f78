use std::fs;
use std::path::PathBuf;

use services::{ReportSink, SinkError};
use visor_core::model::SessionReport;

/// Writes the completion report as pretty JSON, replacing any previous file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonFileSink {
    fn publish(&self, report: &SessionReport) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)?;
        tracing::info!(path = %self.path.display(), "report exported");
        Ok(())
    }
}
