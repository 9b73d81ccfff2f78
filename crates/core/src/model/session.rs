use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{LoadedMeta, Response, SessionId};
use crate::validate::{Verdict, VerdictKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many exercises for a single report: {len}")]
    TooManyExercises { len: usize },
}

//
// ─── EXERCISE RECORD ───────────────────────────────────────────────────────────
//

/// Telemetry for one exercise of a session, keyed by its position.
///
/// A re-grade overwrites `correct`, `verdict`, `answer`, `time_ms` and
/// `graded_at`; `attempts` and `awarded` accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseRecord {
    pub session_id: SessionId,
    pub index: usize,
    pub exercise_type: String,
    pub attempts: u32,
    pub correct: Option<bool>,
    pub verdict: Option<VerdictKind>,
    pub answer: Option<Response>,
    pub time_ms: Option<u64>,
    pub graded: bool,
    pub graded_at: Option<DateTime<Utc>>,
    pub awarded: u32,
}

impl ExerciseRecord {
    #[must_use]
    pub fn new(session_id: SessionId, index: usize, exercise_type: impl Into<String>) -> Self {
        Self {
            session_id,
            index,
            exercise_type: exercise_type.into(),
            attempts: 0,
            correct: None,
            verdict: None,
            answer: None,
            time_ms: None,
            graded: false,
            graded_at: None,
            awarded: 0,
        }
    }

    /// Overwrite the last-grading fields and count the attempt.
    pub fn apply_grading(
        &mut self,
        verdict: &Verdict,
        answer: Response,
        time_ms: u64,
        graded_at: DateTime<Utc>,
        awarded: u32,
    ) {
        self.attempts = self.attempts.saturating_add(1);
        self.correct = Some(verdict.is_correct());
        self.verdict = Some(verdict.kind);
        self.answer = Some(answer);
        self.time_ms = Some(time_ms);
        self.graded = true;
        self.graded_at = Some(graded_at);
        self.awarded = self.awarded.saturating_add(awarded);
    }
}

//
// ─── SESSION REPORT ────────────────────────────────────────────────────────────
//

/// Final export of a completed session, handed to reporting collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: u32,
    streak: u32,
    total: u32,
    correct: u32,
    incorrect: u32,
    ungraded: u32,
    total_time_ms: u64,
    meta: LoadedMeta,
    records: Vec<ExerciseRecord>,
}

impl SessionReport {
    /// Build a report from the per-exercise records of a finished session.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `ReportError::TooManyExercises` if the record count cannot fit in `u32`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_records(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: u32,
        streak: u32,
        meta: LoadedMeta,
        records: Vec<ExerciseRecord>,
    ) -> Result<Self, ReportError> {
        if completed_at < started_at {
            return Err(ReportError::InvalidTimeRange);
        }

        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        let mut ungraded = 0_u32;
        let mut total_time_ms = 0_u64;

        for record in &records {
            match record.correct {
                Some(true) => correct = correct.saturating_add(1),
                Some(false) => incorrect = incorrect.saturating_add(1),
                None => ungraded = ungraded.saturating_add(1),
            }
            total_time_ms = total_time_ms.saturating_add(record.time_ms.unwrap_or(0));
        }

        let total = u32::try_from(records.len())
            .map_err(|_| ReportError::TooManyExercises { len: records.len() })?;

        Ok(Self {
            session_id,
            started_at,
            completed_at,
            score,
            streak,
            total,
            correct,
            incorrect,
            ungraded,
            total_time_ms,
            meta,
            records,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn ungraded(&self) -> u32 {
        self.ungraded
    }

    #[must_use]
    pub fn total_time_ms(&self) -> u64 {
        self.total_time_ms
    }

    #[must_use]
    pub fn meta(&self) -> &LoadedMeta {
        &self.meta
    }

    #[must_use]
    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }
}
