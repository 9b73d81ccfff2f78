use crate::model::interaction::FillGapsInteraction;
use crate::validate::{Verdict, messages};

/// Correct iff every input, trimmed and case-folded, equals its gap. No partial credit.
pub fn check(truth: &FillGapsInteraction, inputs: &[String]) -> Verdict {
    if !truth.is_well_formed() {
        return Verdict::malformed();
    }
    if inputs.len() != truth.gaps.len() {
        return Verdict::incorrect(messages::INCORRECT);
    }

    let matched = truth
        .gaps
        .iter()
        .zip(inputs)
        .filter(|(expected, input)| fold(input) == fold(expected))
        .count();

    if matched == truth.gaps.len() {
        Verdict::correct(messages::CORRECT)
    } else {
        Verdict::incorrect(format!(
            "{matched} of {} gaps are correct.",
            truth.gaps.len()
        ))
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}
