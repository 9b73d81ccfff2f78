//! visor: terminal driver for exercise bundles.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use visor_core::model::{EngineSettings, EngineSettingsDraft};

mod commands;
mod export;
mod render;

#[derive(Parser)]
#[command(name = "visor", version, about = "Interactive exercise bundle player")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a bundle and list the exercises a session would present
    Check {
        /// Path to the bundle JSON file
        bundle: PathBuf,

        /// Seed for random_per_core selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Play a bundle in the terminal
    Play {
        /// Path to the bundle JSON file
        bundle: PathBuf,

        /// Seed for variant selection and render shuffles
        #[arg(long)]
        seed: Option<u64>,

        /// Write the completion report as JSON to this path
        #[arg(long)]
        export: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Scoring on re-grade: accumulate or award_once
    #[arg(long, env = "VISOR_REGRADE_POLICY")]
    regrade_policy: Option<String>,

    /// Grading attempts allowed per exercise (unlimited when unset)
    #[arg(long, env = "VISOR_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Points for a correct answer with no streak (default 100)
    #[arg(long, env = "VISOR_BASE_POINTS")]
    base_points: Option<u32>,

    /// Extra points per streak step (default 20)
    #[arg(long, env = "VISOR_STREAK_BONUS")]
    streak_bonus: Option<u32>,
}

impl EngineArgs {
    fn settings(self) -> Result<EngineSettings> {
        EngineSettingsDraft {
            base_points: self.base_points,
            streak_bonus: self.streak_bonus,
            regrade_policy: self.regrade_policy,
            max_attempts: self.max_attempts,
        }
        .validate()
        .context("invalid engine settings")
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("visor=info,services=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { bundle, seed } => commands::check::execute(bundle, seed).await,
        Commands::Play {
            bundle,
            seed,
            export,
            engine,
        } => run_play(bundle, seed, export, engine).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run_play(
    bundle: PathBuf,
    seed: Option<u64>,
    export: Option<PathBuf>,
    engine: EngineArgs,
) -> Result<()> {
    let settings = engine.settings()?;
    commands::play::execute(bundle, settings, seed, export).await
}
