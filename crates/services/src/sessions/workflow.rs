use std::path::Path;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use visor_core::model::{Bundle, EngineSettings, Response, SessionReport};
use visor_core::validate::Verdict;

use super::progress::SessionProgress;
use super::service::{Session, SessionState};
use super::sink::ReportSink;
use super::view::ExerciseView;
use crate::Clock;
use crate::bundle::{BundleResolver, load_bundle, parse_bundle};
use crate::error::SessionError;

/// Result of grading the current exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub index: usize,
    pub verdict: Verdict,
    pub awarded: u32,
    pub score: u32,
    pub streak: u32,
    pub attempts: u32,
}

/// Result of moving past the current exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceOutcome {
    pub index: usize,
    pub is_complete: bool,
    pub report: Option<SessionReport>,
}

/// Owns the single live session and drives it through load, grade and advance.
///
/// This service owns:
/// - the time source (`Clock`)
/// - the random source used by `random_per_core`
/// - the report sinks notified on completion
///
/// It does **not** render anything.
pub struct SessionLoopService {
    clock: Clock,
    settings: EngineSettings,
    rng: StdRng,
    session: Option<Session>,
    sinks: Vec<Arc<dyn ReportSink>>,
    // Sinks already notified for the current session, in order.
    published: usize,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, settings: EngineSettings) -> Self {
        Self {
            clock,
            settings,
            rng: StdRng::from_os_rng(),
            session: None,
            sinks: Vec::new(),
            published: 0,
        }
    }

    /// Reseed the variant selection so `random_per_core` is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access to the clock, mainly for stepping a fixed clock in tests.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Settings apply to the next loaded session; the live one keeps its own.
    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::NotStarted, Session::state)
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn current_view(&self) -> Option<ExerciseView<'_>> {
        self.session.as_ref()?.current_view()
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(Session::progress)
    }

    // ─── LOADING ──────────────────────────────────────────────────────────────

    /// Read a bundle file and start a session on it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bundle` when the file cannot be read, parsed or
    /// resolved. The previous session, if any, is kept.
    pub async fn load_path(&mut self, path: &Path) -> Result<&Session, SessionError> {
        let bundle = load_bundle(path).await?;
        self.load_bundle(&bundle)
    }

    /// Parse bundle text and start a session on it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bundle` when the text cannot be parsed or
    /// resolved. The previous session, if any, is kept.
    pub fn load_str(&mut self, content: &str) -> Result<&Session, SessionError> {
        let bundle = parse_bundle(content)?;
        self.load_bundle(&bundle)
    }

    /// Resolve a parsed bundle and replace the live session with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bundle(BundleError::NoValidExercises)` when the
    /// resolver selects nothing. The previous session, if any, is kept.
    pub fn load_bundle(&mut self, bundle: &Bundle) -> Result<&Session, SessionError> {
        let resolved = BundleResolver::new(bundle).resolve(&mut self.rng)?;
        let source = resolved.source;
        let ungradeable = resolved.ungradeable();
        let session = Session::start(
            resolved.exercises,
            resolved.meta,
            self.settings,
            self.clock.now(),
        )?;

        tracing::info!(
            session_id = %session.id(),
            exercises = session.exercises().len(),
            ungradeable,
            source = ?source,
            "session started"
        );

        self.published = 0;
        Ok(self.session.insert(session))
    }

    // ─── TRANSITIONS ──────────────────────────────────────────────────────────

    /// Grade the current exercise.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` before any bundle is loaded, or any
    /// error from [`Session::grade`]. A rejected grade leaves the session as it was.
    pub fn begin_grading(&mut self, response: Response) -> Result<GradeOutcome, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotStarted)?;
        let graded = match session.grade(response, self.clock.now()) {
            Ok(graded) => graded,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), index = session.current_index(), error = %err, "grade rejected");
                return Err(err);
            }
        };

        let attempts = graded
            .session
            .record(graded.index)
            .map_or(0, |record| record.attempts);
        let outcome = GradeOutcome {
            index: graded.index,
            verdict: graded.verdict,
            awarded: graded.delta.awarded,
            score: graded.delta.score,
            streak: graded.delta.streak,
            attempts,
        };

        tracing::info!(
            session_id = %graded.session.id(),
            index = outcome.index,
            correct = outcome.verdict.is_correct(),
            awarded = outcome.awarded,
            score = outcome.score,
            streak = outcome.streak,
            "exercise graded"
        );

        self.session = Some(graded.session);
        Ok(outcome)
    }

    /// Move to the next exercise. On the last one the session completes and
    /// its report is published to every sink.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted`, any error from [`Session::advance`],
    /// or `SessionError::Sink` when publishing fails. In the latter case the
    /// session is already `Completed`; call [`Self::publish_report`] to retry.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotStarted)?;
        let next = session.advance(self.clock.now())?;
        let index = next.current_index();
        let is_complete = next.is_complete();

        tracing::debug!(session_id = %next.id(), index, is_complete, "advanced");
        self.session = Some(next);

        let report = if is_complete {
            Some(self.publish_report()?)
        } else {
            None
        };

        Ok(AdvanceOutcome {
            index,
            is_complete,
            report,
        })
    }

    /// Build the completion report and deliver it to sinks not yet notified.
    ///
    /// Each sink receives a given session's report at most once, so calling
    /// this again after a sink failure only retries the remaining sinks.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted`, `SessionError::Incomplete`, or
    /// `SessionError::Sink` from the first failing sink.
    pub fn publish_report(&mut self) -> Result<SessionReport, SessionError> {
        let session = self.session.as_ref().ok_or(SessionError::NotStarted)?;
        let report = session.report()?;

        while let Some(sink) = self.sinks.get(self.published) {
            if let Err(err) = sink.publish(&report) {
                tracing::error!(session_id = %report.session_id(), error = %err, "report sink failed");
                return Err(err.into());
            }
            self.published += 1;
        }

        tracing::info!(
            session_id = %report.session_id(),
            score = report.score(),
            correct = report.correct(),
            total = report.total(),
            "session completed"
        );
        Ok(report)
    }
}
