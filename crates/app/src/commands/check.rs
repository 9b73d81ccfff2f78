//! The `visor check` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use services::{BundleResolver, load_bundle};

pub async fn execute(bundle_path: PathBuf, seed: Option<u64>) -> Result<()> {
    let bundle = load_bundle(&bundle_path)
        .await
        .with_context(|| format!("cannot load {}", bundle_path.display()))?;
    let resolved = BundleResolver::new(&bundle)
        .resolve(&mut super::rng(seed))
        .with_context(|| format!("cannot resolve {}", bundle_path.display()))?;

    println!(
        "Bundle: {} ({} exercises from {:?}, policy {})",
        bundle_path.display(),
        resolved.total(),
        resolved.source,
        resolved.meta.variant_policy,
    );

    for (index, exercise) in resolved.exercises.iter().enumerate() {
        let marker = if exercise.interaction().is_gradeable() {
            ""
        } else {
            "  UNGRADEABLE"
        };
        let media = exercise
            .content()
            .media()
            .map(|m| format!("  [media: {}]", m.display()))
            .unwrap_or_default();
        println!(
            "  {:>3}. {:<16} {}{media}{marker}",
            index + 1,
            exercise.type_name(),
            exercise.content().prompt_text(),
        );
    }

    let ungradeable = resolved.ungradeable();
    if ungradeable > 0 {
        println!("\n{ungradeable} exercise(s) have an unsupported type.");
    } else {
        println!("\nAll exercises gradeable.");
    }
    Ok(())
}
