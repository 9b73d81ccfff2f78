use std::sync::{Arc, Mutex};

use thiserror::Error;
use visor_core::model::SessionReport;

/// Errors surfaced by report sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives the final report of every completed session.
pub trait ReportSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `SinkError` if the report cannot be delivered.
    fn publish(&self, report: &SessionReport) -> Result<(), SinkError>;
}

/// Simple in-memory sink for tests/dev.
#[derive(Clone, Default)]
pub struct InMemoryReportSink {
    reports: Arc<Mutex<Vec<SessionReport>>>,
}

impl InMemoryReportSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Unavailable` if the lock is poisoned.
    pub fn reports(&self) -> Result<Vec<SessionReport>, SinkError> {
        let guard = self
            .reports
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }
}

impl ReportSink for InMemoryReportSink {
    fn publish(&self, report: &SessionReport) -> Result<(), SinkError> {
        let mut guard = self
            .reports
            .lock()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        guard.push(report.clone());
        Ok(())
    }
}
