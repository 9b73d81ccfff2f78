mod progress;
mod service;
mod sink;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{Graded, Session, SessionState};
pub use sink::{InMemoryReportSink, ReportSink, SinkError};
pub use view::ExerciseView;
pub use workflow::{AdvanceOutcome, GradeOutcome, SessionLoopService};
