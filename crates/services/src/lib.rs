#![forbid(unsafe_code)]

pub mod bundle;
pub mod error;
pub mod sessions;

pub use visor_core::Clock;

pub use bundle::{BundleResolver, ExerciseSource, ResolvedBundle, load_bundle, parse_bundle};
pub use error::{BundleError, SessionError};

pub use sessions::{
    AdvanceOutcome, ExerciseView, GradeOutcome, InMemoryReportSink, ReportSink, Session,
    SessionLoopService, SessionProgress, SessionState, SinkError,
};
