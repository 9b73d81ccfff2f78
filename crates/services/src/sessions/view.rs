use visor_core::model::{Content, Exercise, ExerciseRecord, Interaction};
use visor_core::validate::VerdictKind;

/// Presentation-agnostic snapshot of the exercise under the cursor.
///
/// Holds no formatted strings; renderers decide how to lay out the
/// interaction. The explanation is withheld until the exercise has a grade.
#[derive(Debug, Clone, Copy)]
pub struct ExerciseView<'a> {
    index: usize,
    total: usize,
    exercise: &'a Exercise,
    record: &'a ExerciseRecord,
}

impl<'a> ExerciseView<'a> {
    pub(crate) fn new(
        index: usize,
        total: usize,
        exercise: &'a Exercise,
        record: &'a ExerciseRecord,
    ) -> Self {
        Self {
            index,
            total,
            exercise,
            record,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn type_name(&self) -> &'a str {
        self.exercise.type_name()
    }

    #[must_use]
    pub fn content(&self) -> &'a Content {
        self.exercise.content()
    }

    #[must_use]
    pub fn interaction(&self) -> &'a Interaction {
        self.exercise.interaction()
    }

    #[must_use]
    pub fn is_gradeable(&self) -> bool {
        self.exercise.interaction().is_gradeable()
    }

    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.record.graded
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.record.attempts
    }

    #[must_use]
    pub fn last_verdict(&self) -> Option<VerdictKind> {
        self.record.verdict
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&'a str> {
        if self.record.graded {
            self.exercise.explanation()
        } else {
            None
        }
    }
}
