use serde::Serialize;

use crate::model::{RegradePolicy, ScoringRules};

/// Running score and streak for one session.
///
/// The score never decreases. The streak counts consecutive correct verdicts and
/// drops to zero on any other verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    score: u32,
    streak: u32,
}

/// What one verdict did to the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreDelta {
    pub awarded: u32,
    pub score: u32,
    pub streak: u32,
}

impl Scoreboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Apply a verdict. `already_awarded` is what this exercise earned before,
    /// consulted only under `RegradePolicy::AwardOnce`.
    pub fn record(
        &mut self,
        correct: bool,
        already_awarded: u32,
        rules: ScoringRules,
        policy: RegradePolicy,
    ) -> ScoreDelta {
        let awarded = if correct {
            let earned = rules.award(self.streak);
            self.streak = self.streak.saturating_add(1);
            match policy {
                RegradePolicy::AwardOnce if already_awarded > 0 => 0,
                _ => earned,
            }
        } else {
            self.streak = 0;
            0
        };
        self.score = self.score.saturating_add(awarded);

        ScoreDelta {
            awarded,
            score: self.score,
            streak: self.streak,
        }
    }
}
