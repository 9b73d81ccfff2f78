mod bundle;
pub mod content;
mod exercise;
mod ids;
pub mod interaction;
mod response;
mod session;
mod settings;

pub use bundle::{Bundle, Delivery, LoadedMeta, RawCore, VariantPolicy};
pub use content::{Content, MediaUri, MediaValidationError, RawContent, RawMedia};
pub use exercise::{
    Exercise, ExerciseType, Interaction, MISSING_VARIANT_INDEX, RawExercise, RawScaffolding,
    UNKNOWN_EXERCISE_TYPE, UnknownExerciseType,
};
pub use ids::{ParseIdError, SessionId};
pub use response::{Placement, Response};
pub use session::{ExerciseRecord, ReportError, SessionReport};
pub use settings::{
    EngineSettings, EngineSettingsDraft, RegradePolicy, ScoringRules, SettingsError,
};
