use crate::model::interaction::ChoiceInteraction;
use crate::validate::{Verdict, messages};

/// `multiple_choice` / `true_false`: correct iff the selected option exists and is
/// marked correct. The option's own feedback wins over the generic message.
pub fn check(truth: &ChoiceInteraction, selected: Option<&str>) -> Verdict {
    if !truth.is_well_formed() {
        return Verdict::malformed();
    }

    let Some(selected) = selected.map(str::trim).filter(|s| !s.is_empty()) else {
        return Verdict::blocked(messages::NO_OPTION);
    };

    match truth.option(selected) {
        Some(option) if option.is_correct => {
            Verdict::correct(option.feedback.as_deref().unwrap_or(messages::CORRECT))
        }
        Some(option) => {
            Verdict::incorrect(option.feedback.as_deref().unwrap_or(messages::INCORRECT))
        }
        None => Verdict::incorrect(messages::INCORRECT),
    }
}
