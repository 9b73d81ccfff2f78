use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::content::{Content, RawContent};
use crate::model::interaction::{
    ChoiceInteraction, FillGapsInteraction, GroupingInteraction, MatchingInteraction,
    OrderingInteraction,
};

//
// ─── EXERCISE TYPE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown exercise type: {0:?}")]
pub struct UnknownExerciseType(pub String);

/// The six supported typologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    MultipleChoice,
    TrueFalse,
    FillGaps,
    Ordering,
    Matching,
    Grouping,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 6] = [
        ExerciseType::MultipleChoice,
        ExerciseType::TrueFalse,
        ExerciseType::FillGaps,
        ExerciseType::Ordering,
        ExerciseType::Matching,
        ExerciseType::Grouping,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseType::MultipleChoice => "multiple_choice",
            ExerciseType::TrueFalse => "true_false",
            ExerciseType::FillGaps => "fill_gaps",
            ExerciseType::Ordering => "ordering",
            ExerciseType::Matching => "matching",
            ExerciseType::Grouping => "grouping",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = UnknownExerciseType;

    /// Case-insensitive; `-` and spaces are accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownExerciseType(s.to_owned()))
    }
}

//
// ─── INTERACTION ───────────────────────────────────────────────────────────────
//

/// Type-specific ground truth, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    MultipleChoice(ChoiceInteraction),
    TrueFalse(ChoiceInteraction),
    FillGaps(FillGapsInteraction),
    Ordering(OrderingInteraction),
    Matching(MatchingInteraction),
    Grouping(GroupingInteraction),
    /// The bundle named a type none of the validators handle. Kept so the
    /// exercise can still be shown as ungradeable.
    Unsupported { type_name: String },
}

impl Interaction {
    /// Normalizes a raw interaction value for the named type.
    #[must_use]
    pub fn from_raw(type_name: &str, value: &Value) -> Self {
        let Ok(kind) = type_name.parse::<ExerciseType>() else {
            return Interaction::Unsupported {
                type_name: type_name.trim().to_owned(),
            };
        };
        match kind {
            ExerciseType::MultipleChoice => {
                Interaction::MultipleChoice(ChoiceInteraction::from_value(value))
            }
            ExerciseType::TrueFalse => {
                Interaction::TrueFalse(ChoiceInteraction::true_false_from_value(value))
            }
            ExerciseType::FillGaps => Interaction::FillGaps(FillGapsInteraction::from_value(value)),
            ExerciseType::Ordering => Interaction::Ordering(OrderingInteraction::from_value(value)),
            ExerciseType::Matching => Interaction::Matching(MatchingInteraction::from_value(value)),
            ExerciseType::Grouping => Interaction::Grouping(GroupingInteraction::from_value(value)),
        }
    }

    #[must_use]
    pub fn exercise_type(&self) -> Option<ExerciseType> {
        match self {
            Interaction::MultipleChoice(_) => Some(ExerciseType::MultipleChoice),
            Interaction::TrueFalse(_) => Some(ExerciseType::TrueFalse),
            Interaction::FillGaps(_) => Some(ExerciseType::FillGaps),
            Interaction::Ordering(_) => Some(ExerciseType::Ordering),
            Interaction::Matching(_) => Some(ExerciseType::Matching),
            Interaction::Grouping(_) => Some(ExerciseType::Grouping),
            Interaction::Unsupported { .. } => None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Interaction::Unsupported { type_name } => type_name,
            supported => supported.exercise_type().map_or("", ExerciseType::as_str),
        }
    }

    #[must_use]
    pub fn is_gradeable(&self) -> bool {
        self.exercise_type().is_some()
    }
}

//
// ─── RAW EXERCISE (bundle document) ────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScaffolding {
    pub explanation: Option<String>,
}

impl RawScaffolding {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            explanation: value
                .get("explanation")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

/// Type name given to entries that carry no usable `type`.
pub const UNKNOWN_EXERCISE_TYPE: &str = "unknown";

/// An exercise as it appears in a bundle, before normalization.
///
/// Reading one never fails. A non-object entry, or a `type` that is missing or
/// not a string, yields an exercise no validator handles; it is presented as
/// ungradeable instead of rejecting the bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawExercise {
    pub type_name: String,
    pub content: RawContent,
    pub interaction: Value,
    pub scaffolding: RawScaffolding,
    pub dua: Value,
}

impl From<Value> for RawExercise {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for RawExercise {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl RawExercise {
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self {
                type_name: UNKNOWN_EXERCISE_TYPE.to_owned(),
                ..Self::default()
            };
        };

        let type_name = match obj.remove("type") {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            None | Some(Value::Null | Value::String(_)) => UNKNOWN_EXERCISE_TYPE.to_owned(),
            Some(other) => other.to_string(),
        };
        let content = obj.remove("content").unwrap_or_default();
        let scaffolding = obj.remove("scaffolding").unwrap_or_default();

        Self {
            type_name,
            content: RawContent::from_value(&content),
            interaction: obj.remove("interaction").unwrap_or_default(),
            scaffolding: RawScaffolding::from_value(&scaffolding),
            dua: obj.remove("dua").unwrap_or_default(),
        }
    }

    /// Ordering hint among the variants of a core.
    ///
    /// A missing or non-numeric `dua.variant_index` sorts last.
    #[must_use]
    pub fn variant_index(&self) -> f64 {
        self.dua
            .get("variant_index")
            .and_then(crate::model::interaction::as_number)
            .unwrap_or(MISSING_VARIANT_INDEX)
    }
}

/// Sort key used for variants without a usable `dua.variant_index`.
pub const MISSING_VARIANT_INDEX: f64 = 999.0;

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// One resolved, normalized exercise. Identified only by its position in the
/// session's exercise list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    content: Content,
    interaction: Interaction,
    explanation: Option<String>,
}

impl Exercise {
    #[must_use]
    pub fn new(content: Content, interaction: Interaction, explanation: Option<String>) -> Self {
        Self {
            content,
            interaction,
            explanation: explanation
                .map(|e| e.trim().to_owned())
                .filter(|e| !e.is_empty()),
        }
    }

    #[must_use]
    pub fn from_raw(raw: RawExercise) -> Self {
        let interaction = Interaction::from_raw(&raw.type_name, &raw.interaction);
        Self::new(
            Content::from_raw(raw.content),
            interaction,
            raw.scaffolding.explanation,
        )
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn exercise_type(&self) -> Option<ExerciseType> {
        self.interaction.exercise_type()
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.interaction.type_name()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
