use rand::Rng;

use visor_core::model::{Bundle, Exercise, LoadedMeta, RawCore, RawExercise, VariantPolicy};

use crate::error::BundleError;

/// Which part of the bundle produced the runtime list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseSource {
    Flat,
    Cores,
}

/// Selection result for a bundle load.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBundle {
    pub exercises: Vec<Exercise>,
    pub source: ExerciseSource,
    pub meta: LoadedMeta,
}

impl ResolvedBundle {
    #[must_use]
    pub fn total(&self) -> usize {
        self.exercises.len()
    }

    /// Exercises whose type has no validator; shown but never gradeable.
    #[must_use]
    pub fn ungradeable(&self) -> usize {
        self.exercises
            .iter()
            .filter(|exercise| exercise.exercise_type().is_none())
            .count()
    }
}

/// Turns a bundle into the ordered list of exercises a session will present.
pub struct BundleResolver<'a> {
    bundle: &'a Bundle,
}

impl<'a> BundleResolver<'a> {
    #[must_use]
    pub fn new(bundle: &'a Bundle) -> Self {
        Self { bundle }
    }

    /// Resolve the bundle according to its variant policy.
    ///
    /// - A non-empty flat `exercises` list is used verbatim when the bundle has
    ///   no cores or the policy is `single_fixed`.
    /// - Otherwise each core's variants are sorted by `dua.variant_index` and
    ///   selected per policy. `random_per_core` draws from `rng` on every call.
    ///
    /// # Errors
    ///
    /// Returns `BundleError::NoValidExercises` when nothing is selected.
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> Result<ResolvedBundle, BundleError> {
        let bundle = self.bundle;
        let policy = bundle.policy();

        let use_flat = !bundle.exercises.is_empty()
            && (!bundle.has_cores() || *policy == VariantPolicy::SingleFixed);

        let (selected, source): (Vec<&RawExercise>, _) = if use_flat {
            (bundle.exercises.iter().collect(), ExerciseSource::Flat)
        } else {
            if let VariantPolicy::Other(raw) = policy {
                tracing::warn!(policy = %raw, "unknown variant policy, using first_per_core");
            }
            let selected = bundle
                .udl_cores
                .iter()
                .flat_map(|core| select_variants(core, policy, &mut *rng))
                .collect();
            (selected, ExerciseSource::Cores)
        };

        if selected.is_empty() {
            return Err(BundleError::NoValidExercises);
        }

        let exercises: Vec<Exercise> = selected
            .into_iter()
            .cloned()
            .map(Exercise::from_raw)
            .collect();

        for (index, exercise) in exercises.iter().enumerate() {
            if exercise.exercise_type().is_none() {
                tracing::warn!(
                    index,
                    type_name = exercise.type_name(),
                    "unsupported exercise type, it will be shown as ungradeable"
                );
            }
        }

        tracing::debug!(
            count = exercises.len(),
            source = ?source,
            policy = %policy,
            "exercises resolved"
        );

        Ok(ResolvedBundle {
            exercises,
            source,
            meta: bundle.loaded_meta(),
        })
    }
}

/// Resolve a bundle straight to its exercise list.
///
/// # Errors
///
/// Returns `BundleError::NoValidExercises` when nothing is selected.
pub fn resolve_exercises<R: Rng>(
    bundle: &Bundle,
    rng: &mut R,
) -> Result<Vec<Exercise>, BundleError> {
    BundleResolver::new(bundle)
        .resolve(rng)
        .map(|resolved| resolved.exercises)
}

/// A core's variants in ascending `variant_index` order. Ties keep bundle order.
#[must_use]
pub fn normalize_variants(core: &RawCore) -> Vec<&RawExercise> {
    let mut variants: Vec<&RawExercise> = core.variants.iter().collect();
    variants.sort_by(|a, b| a.variant_index().total_cmp(&b.variant_index()));
    variants
}

fn select_variants<'a, R: Rng>(
    core: &'a RawCore,
    policy: &VariantPolicy,
    rng: &mut R,
) -> Vec<&'a RawExercise> {
    let mut variants = normalize_variants(core);
    if variants.is_empty() {
        tracing::debug!(core = ?core.core_id, "core has no variants, skipped");
        return variants;
    }

    match policy {
        VariantPolicy::ManualSelect => variants,
        VariantPolicy::RandomPerCore => {
            let pick = rng.random_range(0..variants.len());
            vec![variants.swap_remove(pick)]
        }
        VariantPolicy::SingleFixed | VariantPolicy::FirstPerCore | VariantPolicy::Other(_) => {
            variants.truncate(1);
            variants
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;
    use visor_core::model::ExerciseType;

    fn variant(prompt: &str, index: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "true_false",
            "content": {"prompt_text": prompt},
            "interaction": {"answer": true},
            "dua": {"variant_index": index},
        })
    }

    fn bundle(value: serde_json::Value) -> Bundle {
        serde_json::from_value(value).unwrap()
    }

    fn prompts(exercises: &[Exercise]) -> Vec<String> {
        exercises
            .iter()
            .map(|e| e.content().prompt_text().to_owned())
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn two_cores(policy: &str) -> Bundle {
        bundle(json!({
            "udl_cores": [
                {"core_id": "c1", "variants": [
                    variant("c1-late", json!(3)),
                    variant("c1-none", json!(null)),
                    variant("c1-early", json!(1)),
                ]},
                {"core_id": "empty", "variants": []},
                {"core_id": "c2", "variants": [variant("c2-only", json!("2"))]},
            ],
            "delivery": {"variant_policy": policy},
        }))
    }

    #[test]
    fn flat_list_is_used_verbatim_without_cores() {
        let b = bundle(json!({
            "exercises": [variant("one", json!(5)), variant("two", json!(1))],
            "delivery": {"variant_policy": "random_per_core"},
        }));
        for _ in 0..3 {
            let resolved = BundleResolver::new(&b).resolve(&mut rng()).unwrap();
            assert_eq!(resolved.source, ExerciseSource::Flat);
            assert_eq!(prompts(&resolved.exercises), vec!["one", "two"]);
        }
    }

    #[test]
    fn single_fixed_prefers_flat_list_over_cores() {
        let mut b = two_cores("single_fixed");
        b.exercises = vec![serde_json::from_value(variant("flat", json!(1))).unwrap()];
        let exercises = resolve_exercises(&b, &mut rng()).unwrap();
        assert_eq!(prompts(&exercises), vec!["flat"]);
    }

    #[test]
    fn cores_win_over_flat_list_for_other_policies() {
        let mut b = two_cores("first_per_core");
        b.exercises = vec![serde_json::from_value(variant("flat", json!(1))).unwrap()];
        let resolved = BundleResolver::new(&b).resolve(&mut rng()).unwrap();
        assert_eq!(resolved.source, ExerciseSource::Cores);
        assert_eq!(prompts(&resolved.exercises), vec!["c1-early", "c2-only"]);
    }

    #[test]
    fn manual_select_emits_every_variant_sorted() {
        let exercises = resolve_exercises(&two_cores("manual_select"), &mut rng()).unwrap();
        assert_eq!(
            prompts(&exercises),
            vec!["c1-early", "c1-late", "c1-none", "c2-only"]
        );
    }

    #[test]
    fn unknown_policy_behaves_like_first_per_core() {
        let exercises = resolve_exercises(&two_cores("weighted"), &mut rng()).unwrap();
        assert_eq!(prompts(&exercises), vec!["c1-early", "c2-only"]);
    }

    #[test]
    fn random_per_core_picks_one_per_non_empty_core() {
        let b = two_cores("random_per_core");
        let mut rng = rng();
        let mut seen_first = std::collections::HashSet::new();
        for _ in 0..64 {
            let exercises = resolve_exercises(&b, &mut rng).unwrap();
            assert_eq!(exercises.len(), 2);
            let names = prompts(&exercises);
            assert!(names[0].starts_with("c1-"));
            assert_eq!(names[1], "c2-only");
            seen_first.insert(names[0].clone());
        }
        assert!(seen_first.len() > 1, "random_per_core never varied: {seen_first:?}");
    }

    #[test]
    fn empty_resolution_is_an_error() {
        let b = bundle(json!({"udl_cores": [{"variants": []}]}));
        assert!(matches!(
            resolve_exercises(&b, &mut rng()),
            Err(BundleError::NoValidExercises)
        ));
        assert!(matches!(
            resolve_exercises(&Bundle::default(), &mut rng()),
            Err(BundleError::NoValidExercises)
        ));
    }

    #[test]
    fn unsupported_types_are_kept_and_counted() {
        let b = bundle(json!({"exercises": [
            {"type": "hotspot"},
            {"type": "ordering", "interaction": {"sequence": ["a"]}},
        ]}));
        let resolved = BundleResolver::new(&b).resolve(&mut rng()).unwrap();
        assert_eq!(resolved.total(), 2);
        assert_eq!(resolved.ungradeable(), 1);
        assert_eq!(
            resolved.exercises[1].exercise_type(),
            Some(ExerciseType::Ordering)
        );
    }

    #[test]
    fn normalize_variants_sorts_missing_last() {
        let b = two_cores("manual_select");
        let order: Vec<f64> = normalize_variants(&b.udl_cores[0])
            .iter()
            .map(|v| v.variant_index())
            .collect();
        assert_eq!(order, vec![1.0, 3.0, 999.0]);
    }
}
