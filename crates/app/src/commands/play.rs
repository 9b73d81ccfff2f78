//! The `visor play` command: drive one session from the terminal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use services::{Clock, SessionError, SessionLoopService};
use visor_core::model::{EngineSettings, SessionReport};

use crate::export::JsonFileSink;
use crate::render::Layout;

pub async fn execute(
    bundle_path: PathBuf,
    settings: EngineSettings,
    seed: Option<u64>,
    export: Option<PathBuf>,
) -> Result<()> {
    let mut svc = SessionLoopService::new(Clock::default(), settings);
    if let Some(seed) = seed {
        svc = svc.with_seed(seed);
    }
    if let Some(path) = export {
        svc.add_sink(Arc::new(JsonFileSink::new(path)));
    }
    svc.load_path(&bundle_path)
        .await
        .with_context(|| format!("cannot start a session on {}", bundle_path.display()))?;

    // Separate stream so render shuffles do not shift variant selection.
    let mut render_rng = super::rng(seed.map(|s| s.wrapping_add(1)));
    let mut input = io::stdin().lock().lines();

    while let Some(view) = svc.current_view() {
        let layout = Layout::new(view.interaction(), &mut render_rng);
        println!();
        println!(
            "Exercise {}/{} ({})",
            view.index() + 1,
            view.total(),
            view.type_name()
        );
        println!("{}", view.content().prompt_text());
        if let Some(media) = view.content().media() {
            println!("  [media: {}]", media.display());
        }
        print!("{}", layout.render());

        if layout.is_gradeable() {
            if !answer(&mut svc, &layout, &mut input)? {
                println!("\nSession abandoned.");
                return Ok(());
            }
        } else {
            prompt(layout.hint())?;
            if input.next().transpose()?.is_none() {
                println!("\nSession abandoned.");
                return Ok(());
            }
        }

        if let Some(explanation) = svc.current_view().and_then(|view| view.explanation()) {
            println!("  Explanation: {explanation}");
        }

        let outcome = match svc.advance() {
            Err(SessionError::Sink(err)) => {
                tracing::error!(error = %err, "report export failed, retrying once");
                Some(svc.publish_report().context("cannot export session report")?)
            }
            other => other?.report,
        };
        if let Some(report) = outcome {
            print_summary(&report);
        }
    }

    Ok(())
}

/// Grade until the learner moves on. Returns `false` when input ended.
fn answer(
    svc: &mut SessionLoopService,
    layout: &Layout,
    input: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<bool> {
    loop {
        prompt(layout.hint())?;
        let Some(line) = input.next().transpose()? else {
            return Ok(false);
        };
        let response = match layout.parse(&line) {
            Ok(response) => response,
            Err(err) => {
                println!("  {err}");
                continue;
            }
        };

        match svc.begin_grading(response) {
            Ok(outcome) => {
                let mark = if outcome.verdict.is_correct() { "✓" } else { "✗" };
                println!(
                    "  {mark} {}  (+{} points, score {}, streak {})",
                    outcome.verdict.message, outcome.awarded, outcome.score, outcome.streak
                );
                if outcome.verdict.is_correct() {
                    return Ok(true);
                }
            }
            Err(SessionError::AttemptLimitReached { limit, .. }) => {
                println!("  No attempts left (limit {limit}).");
                return Ok(true);
            }
            Err(err) => return Err(err.into()),
        }

        prompt("r to retry, Enter to continue")?;
        match input.next().transpose()? {
            Some(line) if line.trim().eq_ignore_ascii_case("r") => {}
            Some(_) => return Ok(true),
            None => return Ok(false),
        }
    }
}

fn prompt(hint: &str) -> Result<()> {
    print!("> ({hint}) ");
    io::stdout().flush().context("cannot write to stdout")
}

fn print_summary(report: &SessionReport) {
    println!();
    println!("Session complete.");
    println!(
        "  Score {}  |  {} correct, {} incorrect, {} ungraded of {}",
        report.score(),
        report.correct(),
        report.incorrect(),
        report.ungraded(),
        report.total()
    );
    println!(
        "  Time {:.1}s  |  final streak {}",
        report.total_time_ms() as f64 / 1000.0,
        report.streak()
    );
}
