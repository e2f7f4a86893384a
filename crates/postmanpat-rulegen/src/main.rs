//! postmanpat-rulegen - builds postmanpat filter rules from mailbox analysis.
//!
//! Main entry point for the CLI.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod terminal;

use commands::{convert, generate};

/// Interactive generator for postmanpat watch and cleanup rules
#[derive(Parser)]
#[command(name = "postmanpat-rulegen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Walk through analysis clusters and write watch and cleanup rules
    Generate(generate::GenerateArgs),

    /// Derive cleanup rules from an existing watch rule file
    Convert(convert::ConvertArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate(args) => generate::run(args),
        Commands::Convert(args) => convert::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries the operator prompts.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "postmanpat_rulegen=debug,postmanpat_rules=debug,warn"
    } else {
        "postmanpat_rulegen=info,postmanpat_rules=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "postmanpat-rulegen",
            "generate",
            "--analyze",
            "analysis.json",
            "--watch-out",
            "watch.yaml",
            "--cleanup-out",
            "cleanup.yaml",
            "--folders",
            "INBOX, Lists",
        ])
        .unwrap();

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.watch_out.to_str(), Some("watch.yaml"));
        assert_eq!(args.checkpoint, None);
        assert_eq!(args.folders, "INBOX, Lists");
    }

    #[test]
    fn test_parse_convert_requires_paths() {
        assert!(Cli::try_parse_from(["postmanpat-rulegen", "convert", "--watch", "w.yaml"]).is_err());
        let cli =
            Cli::try_parse_from(["postmanpat-rulegen", "-v", "convert", "--watch", "w.yaml", "--out", "c.yaml"])
                .unwrap();
        assert!(cli.verbose);
    }
}
