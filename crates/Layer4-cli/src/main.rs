//! Zeyon CLI - Main entry point

mod init;
mod inspect;
mod scanner;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeyon_foundation::RegistryMode;

/// Zeyon - class registry tooling for Zeyon applications
#[derive(Parser, Debug)]
#[command(name = "zeyon")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Project root
    #[arg(short = 'C', long, global = true, default_value = ".")]
    root: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize Zeyon in the project root
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },
    /// Scan sources for #[zeyon(...)] markers and write the registry manifest
    Scan {
        /// Manifest output path (overrides zeyon.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Registry mode (overrides zeyon.json)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Show the entries of a generated manifest
    Inspect {
        /// Manifest path (defaults to the configured output)
        manifest: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Static,
    Dynamic,
}

impl From<ModeArg> for RegistryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Static => RegistryMode::Static,
            ModeArg::Dynamic => RegistryMode::Dynamic,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match args.command {
        Command::Init { force } => {
            init::init_project(&args.root, force)?;
        }
        Command::Scan { output, mode } => {
            scanner::run_scan(&args.root, output, mode.map(Into::into))?;
        }
        Command::Inspect { manifest } => {
            inspect::run_inspect(&args.root, manifest)?;
        }
    }

    Ok(())
}
