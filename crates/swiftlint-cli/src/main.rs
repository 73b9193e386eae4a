//! swiftlint CLI tool.
//!
//! Usage:
//! ```bash
//! swiftlint lint [OPTIONS] [PATHS]...
//! swiftlint analyze --compiler-args "-module-name App" [PATHS]...
//! swiftlint rules [--enabled]
//! swiftlint init [--force]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter for Swift sources
#[derive(Parser)]
#[command(name = "swiftlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SWIFTLINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint Swift files
    Lint(commands::lint::LintArgs),

    /// Run analyzer rules with compiler arguments
    Analyze {
        /// Arguments of the compiler invocation, as one string
        #[arg(long, allow_hyphen_values = true)]
        compiler_args: String,

        #[command(flatten)]
        lint: commands::lint::LintArgs,
    },

    /// List available rules
    Rules {
        /// Only show rules enabled by the configuration
        #[arg(long)]
        enabled: bool,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Xcode-style text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets rendered by miette.
    Pretty,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Lint(args) => commands::lint::run(&args, config, Vec::new()),
        Commands::Analyze {
            compiler_args,
            lint,
        } => {
            let arguments = compiler_args
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>();
            if arguments.is_empty() {
                anyhow::bail!("analyze needs a non-empty --compiler-args");
            }
            commands::lint::run(&lint, config, arguments)
        }
        Commands::Rules { enabled } => {
            commands::rules::run(enabled, config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
