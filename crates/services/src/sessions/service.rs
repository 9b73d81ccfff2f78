use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use visor_core::model::{
    EngineSettings, Exercise, ExerciseRecord, LoadedMeta, Response, SessionId, SessionReport,
};
use visor_core::scoring::{ScoreDelta, Scoreboard};
use visor_core::time::elapsed_ms;
use visor_core::validate::{self, ValidationError, Verdict};

use super::progress::SessionProgress;
use super::view::ExerciseView;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

//
// ─── GRADING RESULT ────────────────────────────────────────────────────────────
//

/// Outcome of a grade transition: the successor session plus what happened.
#[derive(Debug, Clone)]
pub struct Graded {
    pub session: Session,
    pub index: usize,
    pub verdict: Verdict,
    pub delta: ScoreDelta,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's pass through a resolved exercise list.
///
/// Transitions never mutate in place: `grade` and `advance` borrow the current
/// value and return its successor, so a rejected transition leaves the caller's
/// session untouched.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    exercises: Arc<[Exercise]>,
    current: usize,
    board: Scoreboard,
    records: Vec<ExerciseRecord>,
    settings: EngineSettings,
    meta: LoadedMeta,
    started_at: DateTime<Utc>,
    exercise_started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session on the first exercise.
    ///
    /// `now` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bundle(BundleError::NoValidExercises)` for an empty list.
    pub fn start(
        exercises: Vec<Exercise>,
        meta: LoadedMeta,
        settings: EngineSettings,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if exercises.is_empty() {
            return Err(crate::error::BundleError::NoValidExercises.into());
        }

        let id = SessionId::new();
        let records = exercises
            .iter()
            .enumerate()
            .map(|(index, exercise)| ExerciseRecord::new(id, index, exercise.type_name()))
            .collect();

        Ok(Self {
            id,
            exercises: exercises.into(),
            current: 0,
            board: Scoreboard::new(),
            records,
            settings,
            meta,
            started_at: now,
            exercise_started_at: now,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_complete() {
            SessionState::Completed
        } else {
            SessionState::InProgress
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Cursor into `exercises`; equals `exercises().len()` once complete.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises.get(self.current)
    }

    #[must_use]
    pub fn current_view(&self) -> Option<ExerciseView<'_>> {
        let exercise = self.current_exercise()?;
        Some(ExerciseView::new(
            self.current,
            self.exercises.len(),
            exercise,
            &self.records[self.current],
        ))
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.board.score()
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.board.streak()
    }

    #[must_use]
    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }

    #[must_use]
    pub fn record(&self, index: usize) -> Option<&ExerciseRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub fn meta(&self) -> &LoadedMeta {
        &self.meta
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn exercise_started_at(&self) -> DateTime<Utc> {
        self.exercise_started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.exercises.len();
        SessionProgress {
            total,
            graded: self.records.iter().filter(|r| r.graded).count(),
            remaining: total.saturating_sub(self.current),
            current_index: self.current,
            is_complete: self.is_complete(),
        }
    }

    /// Grade `response` against the current exercise.
    ///
    /// Re-grading before advancing is allowed and overwrites the record's last
    /// verdict; scoring follows the configured regrade policy.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` once the session is over.
    /// - `SessionError::Ungradeable` for an exercise of unsupported type.
    /// - `SessionError::AttemptLimitReached` when the attempt cap is hit.
    /// - `SessionError::Validation` when the response shape does not fit the exercise.
    pub fn grade(&self, response: Response, now: DateTime<Utc>) -> Result<Graded, SessionError> {
        let index = self.current;
        let exercise = self
            .exercises
            .get(index)
            .filter(|_| !self.is_complete())
            .ok_or(SessionError::Completed)?;

        if let Some(limit) = self.settings.max_attempts() {
            if self.records[index].attempts >= limit {
                return Err(SessionError::AttemptLimitReached { index, limit });
            }
        }

        let verdict = validate::validate(exercise.interaction(), &response).map_err(|err| {
            match err {
                ValidationError::UnsupportedExerciseType { type_name } => {
                    SessionError::Ungradeable { index, type_name }
                }
                other => SessionError::Validation(other),
            }
        })?;

        let mut next = self.clone();
        let record = &mut next.records[index];
        let delta = next.board.record(
            verdict.is_correct(),
            record.awarded,
            next.settings.scoring(),
            next.settings.regrade_policy(),
        );
        record.apply_grading(
            &verdict,
            response,
            elapsed_ms(self.exercise_started_at, now),
            now,
            delta.awarded,
        );

        Ok(Graded {
            session: next,
            index,
            verdict,
            delta,
        })
    }

    /// Move to the next exercise, or to `Completed` after the last one.
    ///
    /// The current exercise must have been graded first, unless it is
    /// ungradeable.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` once the session is over.
    /// - `SessionError::NotGraded` when the current exercise has not been graded.
    pub fn advance(&self, now: DateTime<Utc>) -> Result<Session, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let index = self.current;
        let gradeable = self.exercises[index].interaction().is_gradeable();
        if gradeable && !self.records[index].graded {
            return Err(SessionError::NotGraded { index });
        }

        let mut next = self.clone();
        next.current += 1;
        next.exercise_started_at = now;
        if next.current >= next.exercises.len() {
            next.completed_at = Some(now);
        }
        Ok(next)
    }

    /// Final export, available once the session is complete.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Incomplete` before completion.
    pub fn report(&self) -> Result<SessionReport, SessionError> {
        let completed_at = self.completed_at.ok_or(SessionError::Incomplete)?;
        Ok(SessionReport::from_records(
            self.id,
            self.started_at,
            completed_at,
            self.board.score(),
            self.board.streak(),
            self.meta.clone(),
            self.records.clone(),
        )?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("exercises_len", &self.exercises.len())
            .field("current", &self.current)
            .field("score", &self.board.score())
            .field("streak", &self.board.streak())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use visor_core::model::{Content, Interaction, RegradePolicy};
    use visor_core::model::interaction::OrderingInteraction;
    use visor_core::time::fixed_now;

    fn ordering(texts: &[&str]) -> Exercise {
        Exercise::new(
            Content::text_only("Put in order"),
            Interaction::Ordering(OrderingInteraction::from_texts(texts.iter().copied())),
            Some("Alphabetical.".into()),
        )
    }

    fn unsupported() -> Exercise {
        Exercise::new(
            Content::text_only("Tap the hotspot"),
            Interaction::from_raw("hotspot", &json!({})),
            None,
        )
    }

    fn start(exercises: Vec<Exercise>, settings: EngineSettings) -> Session {
        Session::start(exercises, LoadedMeta::default(), settings, fixed_now()).unwrap()
    }

    fn right() -> Response {
        Response::ordering(vec![1, 2])
    }

    fn wrong() -> Response {
        Response::ordering(vec![2, 1])
    }

    #[test]
    fn empty_session_returns_error() {
        let err = Session::start(
            Vec::new(),
            LoadedMeta::default(),
            EngineSettings::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Bundle(_)));
    }

    #[test]
    fn starts_in_progress_on_first_exercise() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.exercise_started_at(), fixed_now());
    }

    #[test]
    fn grade_records_telemetry_without_touching_the_original() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        let later = fixed_now() + Duration::milliseconds(4_200);

        let graded = session.grade(right(), later).unwrap();
        assert!(graded.verdict.is_correct());
        assert_eq!(graded.delta.awarded, 100);

        let record = graded.session.record(0).unwrap();
        assert_eq!(record.attempts, 1);
        assert_eq!(record.correct, Some(true));
        assert_eq!(record.time_ms, Some(4_200));
        assert_eq!(record.answer, Some(right()));
        assert!(record.graded);
        assert_eq!(record.session_id, session.id());

        assert_eq!(session.score(), 0);
        assert!(!session.record(0).unwrap().graded);
    }

    #[test]
    fn three_correct_then_one_wrong() {
        let exercises = (0..4).map(|_| ordering(&["a", "b"])).collect();
        let mut session = start(exercises, EngineSettings::default());
        for response in [right(), right(), right(), wrong()] {
            session = session.grade(response, fixed_now()).unwrap().session;
            session = session.advance(fixed_now()).unwrap();
            if session.current_index() == 3 {
                assert_eq!(session.score(), 360);
                assert_eq!(session.streak(), 3);
            }
        }
        assert_eq!(session.score(), 360);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn regrade_accumulates_by_default() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        let once = session.grade(right(), fixed_now()).unwrap().session;
        let twice = once.grade(right(), fixed_now()).unwrap().session;
        assert_eq!(twice.score(), 100 + 120);
        assert_eq!(twice.record(0).unwrap().attempts, 2);
    }

    #[test]
    fn regrade_award_once_does_not_inflate() {
        let settings = EngineSettings::default().with_regrade_policy(RegradePolicy::AwardOnce);
        let session = start(vec![ordering(&["a", "b"])], settings);
        let once = session.grade(right(), fixed_now()).unwrap().session;
        let twice = once.grade(right(), fixed_now()).unwrap().session;
        assert_eq!(twice.score(), 100);
        assert_eq!(twice.streak(), 2);
    }

    #[test]
    fn regrade_overwrites_last_verdict() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        let first = session.grade(wrong(), fixed_now()).unwrap().session;
        let second = first.grade(right(), fixed_now()).unwrap().session;
        let record = second.record(0).unwrap();
        assert_eq!(record.correct, Some(true));
        assert_eq!(record.answer, Some(right()));
    }

    #[test]
    fn advance_requires_a_grade() {
        let session = start(
            vec![ordering(&["a", "b"]), ordering(&["a", "b"])],
            EngineSettings::default(),
        );
        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::NotGraded { index: 0 }));

        let graded = session.grade(right(), fixed_now()).unwrap().session;
        let moved = graded.advance(fixed_now()).unwrap();
        assert_eq!(moved.current_index(), 1);
        let err = moved.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::NotGraded { index: 1 }));
        assert_eq!(moved.current_index(), 1);
    }

    #[test]
    fn completed_session_rejects_grading_and_advancing() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        let done = session
            .grade(right(), fixed_now())
            .unwrap()
            .session
            .advance(fixed_now())
            .unwrap();
        assert_eq!(done.state(), SessionState::Completed);
        assert_eq!(done.current_index(), 1);
        assert!(done.current_view().is_none());
        assert!(matches!(
            done.grade(right(), fixed_now()),
            Err(SessionError::Completed)
        ));
        assert!(matches!(
            done.advance(fixed_now()),
            Err(SessionError::Completed)
        ));
    }

    #[test]
    fn ungradeable_exercise_blocks_grading_but_not_advancing() {
        let session = start(
            vec![unsupported(), ordering(&["a", "b"])],
            EngineSettings::default(),
        );
        let err = session.grade(Response::no_choice(), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Ungradeable { index: 0, .. }));
        let moved = session.advance(fixed_now()).unwrap();
        assert_eq!(moved.current_index(), 1);
    }

    #[test]
    fn attempt_cap_is_enforced_when_configured() {
        let settings = EngineSettings::default()
            .with_max_attempts(Some(1))
            .unwrap();
        let session = start(vec![ordering(&["a", "b"])], settings);
        let once = session.grade(wrong(), fixed_now()).unwrap().session;
        let err = once.grade(right(), fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::AttemptLimitReached { index: 0, limit: 1 }
        ));
    }

    #[test]
    fn mismatched_response_is_rejected_without_recording() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        let err = session.grade(Response::choice("a"), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(session.record(0).unwrap().attempts, 0);
    }

    #[test]
    fn report_only_after_completion() {
        let session = start(vec![ordering(&["a", "b"])], EngineSettings::default());
        assert!(matches!(session.report(), Err(SessionError::Incomplete)));

        let end = fixed_now() + Duration::seconds(30);
        let done = session
            .grade(right(), fixed_now())
            .unwrap()
            .session
            .advance(end)
            .unwrap();
        let report = done.report().unwrap();
        assert_eq!(report.score(), 100);
        assert_eq!(report.correct(), 1);
        assert_eq!(report.completed_at(), end);
        assert_eq!(report.session_id(), done.id());
    }

    #[test]
    fn progress_tracks_cursor() {
        let session = start(
            vec![ordering(&["a", "b"]), ordering(&["a", "b"])],
            EngineSettings::default(),
        );
        let graded = session.grade(right(), fixed_now()).unwrap().session;
        let progress = graded.advance(fixed_now()).unwrap().progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.graded, 1);
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.current_index, 1);
        assert!(!progress.is_complete);
    }
}
