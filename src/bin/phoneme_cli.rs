use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use phoneme_trainer::{AppConfig, TrainerContext};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "phoneme_cli",
    about = "Manage phoneme reference profiles and score recordings against them"
)]
struct Cli {
    /// JSON configuration file (defaults to config/trainer.json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the reference profile directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new reference profile for an audio file
    Register {
        #[arg(long)]
        language: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        audio: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Extract features from a registered profile's audio
    Extract {
        #[arg(long)]
        id: String,
    },
    /// Widen a profile's frequency and amplitude ranges
    Tolerance {
        #[arg(long)]
        id: String,
        #[arg(long)]
        percent: f64,
    },
    /// Analyze a recording, scoring it against a reference or fixed targets
    Analyze {
        #[arg(long)]
        audio: PathBuf,
        #[arg(long)]
        reference: Option<String>,
        /// Omit the 100-point spectrum/envelope snapshot from the output
        #[arg(long)]
        no_snapshot: bool,
    },
    /// List stored reference profiles
    List,
    /// Print one reference profile
    Show {
        #[arg(long)]
        id: String,
    },
    /// Report whether any reference has been configured
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }

    let ctx = TrainerContext::new(config).context("opening reference store")?;

    match cli.command {
        Commands::Register {
            language,
            symbol,
            audio,
            description,
        } => {
            let profile = ctx
                .register_reference(&language, &symbol, description, path_string(&audio)?)
                .context("registering reference")?;
            print_json(&profile)
        }
        Commands::Extract { id } => {
            let profile = ctx
                .extract_reference_features(&id)
                .await
                .with_context(|| format!("extracting features for {}", id))?;
            print_json(&profile)
        }
        Commands::Tolerance { id, percent } => {
            let profile = ctx
                .apply_reference_tolerance(&id, percent)
                .with_context(|| format!("applying tolerance to {}", id))?;
            print_json(&profile)
        }
        Commands::Analyze {
            audio,
            reference,
            no_snapshot,
        } => {
            let mut outcome = ctx
                .analyze_file(&audio, reference.as_deref())
                .await
                .with_context(|| format!("analyzing {}", audio.display()))?;
            if no_snapshot {
                outcome.report.snapshot.spectrum.clear();
                outcome.report.snapshot.envelope.clear();
            }
            print_json(&outcome)
        }
        Commands::List => print_json(&ctx.list_references()?),
        Commands::Show { id } => match ctx.get_reference(&id)? {
            Some(profile) => print_json(&profile),
            None => {
                eprintln!("Reference not found: {}", id);
                Ok(ExitCode::from(2))
            }
        },
        Commands::Status => print_json(&StatusPayload {
            configured: ctx.is_configured()?,
            references: ctx.list_references()?.len(),
        }),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn path_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("audio path is not valid UTF-8: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct StatusPayload {
    configured: bool,
    references: usize,
}
