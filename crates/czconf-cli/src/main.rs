//! # czconf CLI entry point
//!
//! Parses command-line arguments, installs logging, locates the repository
//! root and dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use czconf_cli::check_schema::{run_check_schema, CheckSchemaArgs};
use czconf_cli::validate::{run_validate, ValidateArgs};
use czconf_cli::{find_repo_root, EXIT_ERROR};

/// Validate commitizen configuration against its JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "czconf", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration files against the schema.
    Validate(ValidateArgs),

    /// Check that a schema document is well-formed.
    CheckSchema(CheckSchemaArgs),
}

/// `CZCONF_LOG` takes precedence over `-v`.
fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env("CZCONF_LOG").unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let repo_root = find_repo_root(&cwd).unwrap_or_else(|| {
        tracing::debug!("no schemas/ directory above the current directory");
        cwd.clone()
    });
    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &repo_root),
        Commands::CheckSchema(args) => run_check_schema(args, &repo_root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
