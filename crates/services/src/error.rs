//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use visor_core::model::ReportError;
use visor_core::validate::ValidationError;

use crate::sessions::SinkError;

/// A bundle could not be turned into a playable exercise list.
///
/// Never leaves partial state behind: the previous session, if any, is kept.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BundleError {
    #[error("failed to read bundle {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bundle is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bundle root must be an object or a list of exercises")]
    NotAnObject,
    #[error("bundle contains no valid exercises")]
    NoValidExercises,
}

/// Errors emitted by the session state machine and its engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no session has been started")]
    NotStarted,
    #[error("session already completed")]
    Completed,
    #[error("session is not complete yet")]
    Incomplete,
    #[error("exercise {index} must be graded before advancing")]
    NotGraded { index: usize },
    #[error("exercise {index} has unsupported type {type_name:?} and cannot be graded")]
    Ungradeable { index: usize, type_name: String },
    #[error("exercise {index} reached its limit of {limit} attempts")]
    AttemptLimitReached { index: usize, limit: u32 },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl SessionError {
    /// True for transitions requested in the wrong state (as opposed to bad input).
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            SessionError::NotStarted
                | SessionError::Completed
                | SessionError::Incomplete
                | SessionError::NotGraded { .. }
                | SessionError::AttemptLimitReached { .. }
        )
    }
}
