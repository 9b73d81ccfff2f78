use crate::model::interaction::OrderingInteraction;
use crate::validate::Verdict;

/// Correct iff the on-screen order keys are exactly the canonical ascending order.
pub fn check(truth: &OrderingInteraction, order: &[u32]) -> Verdict {
    if !truth.is_well_formed() {
        return Verdict::malformed();
    }

    let in_place = order.len() == truth.sequence.len()
        && truth
            .sequence
            .iter()
            .zip(order)
            .all(|(step, observed)| step.order == *observed);

    Verdict::from_bool(in_place)
}
