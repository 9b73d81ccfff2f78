use std::path::Path;

use serde_json::Value;
use visor_core::model::{Bundle, RawExercise};

use crate::error::BundleError;

/// Parse the full text of a bundle file.
///
/// The root may be a bundle object, or a bare list of exercises which is
/// treated as a flat `exercises` bundle. A leading UTF-8 BOM is ignored.
///
/// # Errors
///
/// Returns `BundleError::Parse` for invalid JSON or shapes serde rejects, and
/// `BundleError::NotAnObject` for scalar roots.
pub fn parse_bundle(content: &str) -> Result<Bundle, BundleError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let value: Value = serde_json::from_str(content)?;

    match value {
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        Value::Array(_) => {
            let exercises: Vec<RawExercise> = serde_json::from_value(value)?;
            Ok(Bundle::from_exercises(exercises))
        }
        _ => Err(BundleError::NotAnObject),
    }
}

/// Read and parse a bundle file.
///
/// # Errors
///
/// Returns `BundleError::Io` if the file cannot be read, or any error from
/// [`parse_bundle`].
pub async fn load_bundle(path: &Path) -> Result<Bundle, BundleError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let bundle = parse_bundle(&content)?;
    tracing::info!(
        path = %path.display(),
        bytes = content.len(),
        exercises = bundle.exercises.len(),
        cores = bundle.udl_cores.len(),
        policy = %bundle.policy(),
        "bundle loaded"
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use visor_core::model::VariantPolicy;

    #[test]
    fn parses_object_root() {
        let bundle = parse_bundle(
            r#"{"exercises": [{"type": "true_false"}], "delivery": {"variant_policy": "single_fixed"}}"#,
        )
        .unwrap();
        assert_eq!(bundle.exercises.len(), 1);
        assert_eq!(bundle.policy(), &VariantPolicy::SingleFixed);
    }

    #[test]
    fn parses_bare_exercise_list() {
        let bundle = parse_bundle(r#"[{"type": "ordering"}, {"type": "matching"}]"#).unwrap();
        assert_eq!(bundle.exercises.len(), 2);
        assert!(!bundle.has_cores());
    }

    #[test]
    fn ignores_byte_order_mark() {
        let bundle = parse_bundle("\u{feff}{\"exercises\": []}").unwrap();
        assert!(bundle.exercises.is_empty());
    }

    #[test]
    fn rejects_scalar_root_and_garbage() {
        assert!(matches!(parse_bundle("42"), Err(BundleError::NotAnObject)));
        assert!(matches!(parse_bundle("{not json"), Err(BundleError::Parse(_))));
    }
}
