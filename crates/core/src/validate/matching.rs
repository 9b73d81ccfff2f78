use crate::model::interaction::MatchingInteraction;
use crate::validate::Verdict;

/// Correct iff, position by position, the right value aligned with left item `i`
/// is `pairs[i].right`. A permutation of the right values is not enough.
pub fn check(truth: &MatchingInteraction, rights: &[String]) -> Verdict {
    if !truth.is_well_formed() {
        return Verdict::malformed();
    }

    let aligned = rights.len() == truth.pairs.len()
        && truth
            .pairs
            .iter()
            .zip(rights)
            .all(|(pair, right)| pair.right == right.trim());

    Verdict::from_bool(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn animals() -> MatchingInteraction {
        MatchingInteraction::from_value(&json!({
            "pairs": [
                {"left": "dog", "right": "perro"},
                {"left": "cat", "right": "gato"},
                {"left": "bird", "right": "pájaro"},
            ]
        }))
    }

    fn rights(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn exact_alignment_is_correct() {
        assert!(check(&animals(), &rights(&["perro", "gato", "pájaro"])).is_correct());
    }

    #[test]
    fn single_positional_mismatch_is_incorrect() {
        assert!(!check(&animals(), &rights(&["gato", "perro", "pájaro"])).is_correct());
    }

    #[test]
    fn short_response_is_incorrect() {
        assert!(!check(&animals(), &rights(&["perro", "gato"])).is_correct());
    }

    #[test]
    fn zero_pairs_is_blocked() {
        assert!(check(&MatchingInteraction::default(), &[]).is_blocked());
    }
}
