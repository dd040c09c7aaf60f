//! Morphline CLI
//!
//! Developer tool for checking morphline documents and running them against
//! local files.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod stdout_loader;

/// Morphline - embeddable record transformation pipelines
#[derive(Parser)]
#[command(name = "morphline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and compile a morphline without running it
    Check {
        /// Morphline document
        file: PathBuf,

        /// Morphline to select (defaults to the first one)
        #[arg(short, long)]
        id: Option<String>,

        /// Override document layered on top of FILE; may be repeated
        #[arg(short = 'o', long = "override")]
        overrides: Vec<PathBuf>,
    },

    /// Feed local files through a morphline
    Run {
        /// Morphline document
        file: PathBuf,

        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Morphline to select (defaults to the first one)
        #[arg(short, long)]
        id: Option<String>,

        /// Override document layered on top of FILE; may be repeated
        #[arg(short = 'o', long = "override")]
        overrides: Vec<PathBuf>,

        /// MIME type attached to every input
        #[arg(long)]
        mime_type: Option<String>,

        /// Charset attached to every input
        #[arg(long)]
        charset: Option<String>,

        /// Log and skip records that fail instead of aborting
        #[arg(long, env = "MORPHLINE_PRODUCTION")]
        production: bool,

        /// In production mode, also skip recoverable failures
        #[arg(long, requires = "production")]
        ignore_recoverable: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for loaded documents
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Check {
            file,
            id,
            overrides,
        } => {
            commands::check::run(&file, id.as_deref(), &overrides)?;
        }
        Commands::Run {
            file,
            inputs,
            id,
            overrides,
            mime_type,
            charset,
            production,
            ignore_recoverable,
        } => {
            let options = commands::run::RunOptions {
                id,
                overrides,
                mime_type,
                charset,
                production,
                ignore_recoverable,
            };
            commands::run::run(&file, &inputs, &options)?;
        }
    }

    Ok(())
}
