use std::collections::HashSet;

use crate::model::Placement;
use crate::model::interaction::GroupingInteraction;
use crate::validate::{Verdict, messages};

/// Correct iff the staging pool is empty, every placement agrees with the ground
/// truth, and every ground-truth item was placed.
pub fn check(truth: &GroupingInteraction, placements: &[Placement], unplaced: usize) -> Verdict {
    if !truth.is_well_formed() {
        return Verdict::malformed();
    }
    if unplaced > 0 {
        return Verdict::incorrect(messages::UNCLASSIFIED);
    }

    let all_agree = placements.iter().all(|placement| {
        truth
            .categories_of(placement.item.trim())
            .any(|category| category == placement.category.trim())
    });

    let placed: HashSet<&str> = placements.iter().map(|p| p.item.trim()).collect();
    let all_placed = truth
        .items
        .iter()
        .all(|item| placed.contains(item.text.as_str()));

    if !all_placed {
        return Verdict::incorrect(messages::UNCLASSIFIED);
    }
    Verdict::from_bool(all_agree)
}
