use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::{Console, OutputFormat};
use crate::core::engine::GameEngine;
use crate::core::rules::LevelSpec;
use crate::tui;

#[derive(Parser, Debug)]
#[command(name = "numguess")]
#[command(about = "Guess the number, level by level, in your terminal")]
#[command(version)]
pub struct Cli {
    /// Seed for the target draws (same seed, same targets)
    #[arg(long, global = true, env = "NUMGUESS_SEED")]
    pub seed: Option<u64>,

    /// Write logs to this file (the full-screen game logs nowhere otherwise)
    #[arg(long, global = true, env = "NUMGUESS_LOG")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Play in a full-screen terminal UI (default)
    Play,
    /// Play line by line over stdin/stdout
    Console {
        /// Print every update as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Show range and chances per level
    Rules {
        /// Number of levels to list
        #[arg(short, long, default_value_t = 10)]
        levels: u32,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Play);

    // stderr would scribble over the full-screen UI
    let stderr_logs = command != Commands::Play;
    init_logging(cli.log_file.as_deref(), stderr_logs)?;

    let engine = match cli.seed {
        Some(seed) => {
            info!(seed, "using fixed seed");
            GameEngine::seeded(seed)
        }
        None => GameEngine::new(),
    };

    match command {
        Commands::Play => tui::app::play(engine).await,
        Commands::Console { json } => {
            let format = if json { OutputFormat::Json } else { OutputFormat::Text };
            Console::new(engine, format).run(io::stdin().lock(), io::stdout().lock())
        }
        Commands::Rules { levels } => print_rules(levels, io::stdout().lock()),
    }
}

pub fn print_rules(levels: u32, mut out: impl Write) -> Result<()> {
    writeln!(out, "{:>5}  {:>9}  {:>7}", "LEVEL", "RANGE", "CHANCES")?;
    for spec in LevelSpec::table(levels) {
        writeln!(
            out,
            "{:>5}  {:>9}  {:>7}",
            spec.level,
            format!("1-{}", spec.range_max),
            spec.chances
        )?;
    }
    Ok(())
}

fn init_logging(log_file: Option<&Path>, stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}
