mod loader;
mod resolver;

pub use crate::error::BundleError;
pub use loader::{load_bundle, parse_bundle};
pub use resolver::{BundleResolver, ExerciseSource, ResolvedBundle, normalize_variants, resolve_exercises};
