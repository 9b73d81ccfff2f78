use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("base points must be > 0")]
    InvalidBasePoints,

    #[error("max attempts must be > 0 when set")]
    InvalidMaxAttempts,

    #[error("unknown regrade policy: {0:?} (expected `accumulate` or `award_once`)")]
    UnknownRegradePolicy(String),
}

//
// ─── REGRADE POLICY ────────────────────────────────────────────────────────────
//

/// How a second grading of the same exercise interacts with the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegradePolicy {
    /// Every correct grading awards points, even for an exercise already awarded.
    #[default]
    Accumulate,
    /// An exercise earns points at most once; re-grading it can still move the streak.
    AwardOnce,
}

impl RegradePolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accumulate => "accumulate",
            Self::AwardOnce => "award_once",
        }
    }
}

impl fmt::Display for RegradePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegradePolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "accumulate" => Ok(Self::Accumulate),
            "award_once" | "once" => Ok(Self::AwardOnce),
            _ => Err(SettingsError::UnknownRegradePolicy(s.to_owned())),
        }
    }
}

//
// ─── SCORING RULES ─────────────────────────────────────────────────────────────
//

/// Points for a correct verdict: `base_points + streak * streak_bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    base_points: u32,
    streak_bonus: u32,
}

impl ScoringRules {
    pub const DEFAULT_BASE_POINTS: u32 = 100;
    pub const DEFAULT_STREAK_BONUS: u32 = 20;

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidBasePoints` if `base_points` is zero.
    pub fn new(base_points: u32, streak_bonus: u32) -> Result<Self, SettingsError> {
        if base_points == 0 {
            return Err(SettingsError::InvalidBasePoints);
        }
        Ok(Self {
            base_points,
            streak_bonus,
        })
    }

    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.base_points
    }

    #[must_use]
    pub fn streak_bonus(&self) -> u32 {
        self.streak_bonus
    }

    /// Award for a correct verdict given the streak *before* this verdict.
    #[must_use]
    pub fn award(&self, streak: u32) -> u32 {
        self.base_points
            .saturating_add(streak.saturating_mul(self.streak_bonus))
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_points: Self::DEFAULT_BASE_POINTS,
            streak_bonus: Self::DEFAULT_STREAK_BONUS,
        }
    }
}

//
// ─── ENGINE SETTINGS ───────────────────────────────────────────────────────────
//

/// Validated knobs for a session engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineSettings {
    scoring: ScoringRules,
    regrade_policy: RegradePolicy,
    max_attempts: Option<u32>,
}

/// Unvalidated settings, e.g. straight from CLI flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct EngineSettingsDraft {
    pub base_points: Option<u32>,
    pub streak_bonus: Option<u32>,
    pub regrade_policy: Option<String>,
    pub max_attempts: Option<u32>,
}

impl EngineSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for zero base points, a zero attempt cap, or an
    /// unknown regrade policy.
    pub fn validate(self) -> Result<EngineSettings, SettingsError> {
        let scoring = ScoringRules::new(
            self.base_points.unwrap_or(ScoringRules::DEFAULT_BASE_POINTS),
            self.streak_bonus
                .unwrap_or(ScoringRules::DEFAULT_STREAK_BONUS),
        )?;

        let regrade_policy = match self.regrade_policy.as_deref().map(str::trim) {
            None | Some("") => RegradePolicy::default(),
            Some(raw) => raw.parse()?,
        };

        if self.max_attempts == Some(0) {
            return Err(SettingsError::InvalidMaxAttempts);
        }

        Ok(EngineSettings {
            scoring,
            regrade_policy,
            max_attempts: self.max_attempts,
        })
    }
}

impl EngineSettings {
    #[must_use]
    pub fn with_regrade_policy(mut self, policy: RegradePolicy) -> Self {
        self.regrade_policy = policy;
        self
    }

    /// # Errors
    ///
    /// Returns `SettingsError::InvalidMaxAttempts` for `Some(0)`.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Result<Self, SettingsError> {
        if max_attempts == Some(0) {
            return Err(SettingsError::InvalidMaxAttempts);
        }
        self.max_attempts = max_attempts;
        Ok(self)
    }

    #[must_use]
    pub fn scoring(&self) -> ScoringRules {
        self.scoring
    }

    #[must_use]
    pub fn regrade_policy(&self) -> RegradePolicy {
        self.regrade_policy
    }

    /// Per-exercise grading cap. `None` means unlimited.
    #[must_use]
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
