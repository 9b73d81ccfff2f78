//! Pure answer checking, one module per typology.
//!
//! Every validator is a function of the normalized ground truth and the
//! learner's final arranged state. None of them read or mutate session state.

mod choice;
mod fill_gaps;
mod grouping;
mod matching;
mod ordering;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Interaction, Response};

pub use choice::check as check_choice;
pub use fill_gaps::check as check_fill_gaps;
pub use grouping::check as check_grouping;
pub use matching::check as check_matching;
pub use ordering::check as check_ordering;

/// Default learner-facing messages.
pub mod messages {
    pub const CORRECT: &str = "Correct!";
    pub const INCORRECT: &str = "Not quite. Review your answer.";
    pub const NO_OPTION: &str = "You must choose an option.";
    pub const UNCLASSIFIED: &str = "Some items remain unclassified.";
    pub const MALFORMED: &str = "This exercise cannot be graded: its answer key is incomplete.";
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("exercise type {type_name:?} has no validator")]
    UnsupportedExerciseType { type_name: String },

    #[error("a {found} response cannot grade a {expected} exercise")]
    ResponseMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

//
// ─── VERDICT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Correct,
    Incorrect,
    /// No meaningful check was possible: missing input or an unusable answer key.
    /// Scored like `Incorrect`.
    Blocked,
}

/// Correctness result plus the message to show the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub message: String,
}

impl Verdict {
    #[must_use]
    pub fn correct(message: impl Into<String>) -> Self {
        Self {
            kind: VerdictKind::Correct,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn incorrect(message: impl Into<String>) -> Self {
        Self {
            kind: VerdictKind::Incorrect,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn blocked(message: impl Into<String>) -> Self {
        Self {
            kind: VerdictKind::Blocked,
            message: message.into(),
        }
    }

    /// Correct or the default incorrect message, for checks with no custom feedback.
    #[must_use]
    pub fn from_bool(correct: bool) -> Self {
        if correct {
            Self::correct(messages::CORRECT)
        } else {
            Self::incorrect(messages::INCORRECT)
        }
    }

    pub(crate) fn malformed() -> Self {
        Self::blocked(messages::MALFORMED)
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.kind == VerdictKind::Correct
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.kind == VerdictKind::Blocked
    }
}

//
// ─── DISPATCH ──────────────────────────────────────────────────────────────────
//

/// Grades `response` against `interaction`.
///
/// # Errors
///
/// Returns `ValidationError::UnsupportedExerciseType` for an ungradeable
/// exercise, and `ValidationError::ResponseMismatch` when the response shape
/// does not belong to the exercise's typology.
pub fn validate(interaction: &Interaction, response: &Response) -> Result<Verdict, ValidationError> {
    let verdict = match (interaction, response) {
        (
            Interaction::MultipleChoice(truth) | Interaction::TrueFalse(truth),
            Response::Choice { selected },
        ) => choice::check(truth, selected.as_deref()),
        (Interaction::FillGaps(truth), Response::FillGaps { inputs }) => {
            fill_gaps::check(truth, inputs)
        }
        (Interaction::Ordering(truth), Response::Ordering { order }) => ordering::check(truth, order),
        (Interaction::Matching(truth), Response::Matching { rights }) => {
            matching::check(truth, rights)
        }
        (
            Interaction::Grouping(truth),
            Response::Grouping {
                placements,
                unplaced,
            },
        ) => grouping::check(truth, placements, *unplaced),
        (Interaction::Unsupported { type_name }, _) => {
            return Err(ValidationError::UnsupportedExerciseType {
                type_name: type_name.clone(),
            });
        }
        (supported, other) => {
            return Err(ValidationError::ResponseMismatch {
                expected: supported
                    .exercise_type()
                    .map_or("unknown", |kind| kind.as_str()),
                found: other.kind(),
            });
        }
    };
    Ok(verdict)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::interaction::OrderingInteraction;

    #[test]
    fn dispatch_routes_by_typology() {
        let interaction = Interaction::Ordering(OrderingInteraction::from_texts(["a", "b"]));
        let verdict = validate(&interaction, &Response::ordering(vec![1, 2])).unwrap();
        assert!(verdict.is_correct());
    }

    #[test]
    fn mismatched_response_is_an_error() {
        let interaction = Interaction::Ordering(OrderingInteraction::from_texts(["a"]));
        let err = validate(&interaction, &Response::choice("a")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ResponseMismatch {
                expected: "ordering",
                found: "choice"
            }
        );
    }

    #[test]
    fn unsupported_type_is_an_error() {
        let interaction = Interaction::Unsupported {
            type_name: "hotspot".into(),
        };
        let err = validate(&interaction, &Response::no_choice()).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedExerciseType { .. }));
    }

    #[test]
    fn blocked_is_not_correct() {
        let verdict = Verdict::malformed();
        assert!(verdict.is_blocked());
        assert!(!verdict.is_correct());
    }
}
