//! Generate command - interactive rule generation from an analysis file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use postmanpat_rules::session::{self, DEFAULT_FOLDERS, SessionConfig};
use postmanpat_rules::{Analysis, Resume};
use tracing::info;

use crate::terminal::TerminalPrompter;

/// Arguments for the generate command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Analysis JSON written by the mailbox analyzer
    #[arg(long, value_name = "PATH")]
    pub analyze: PathBuf,

    /// Output file for watch (client-side) rules
    #[arg(long, value_name = "PATH")]
    pub watch_out: PathBuf,

    /// Output file for cleanup (server-side) rules
    #[arg(long, value_name = "PATH")]
    pub cleanup_out: PathBuf,

    /// Checkpoint file (default: <WATCH_OUT>.checkpoint.yaml)
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,

    /// Comma-separated folders offered for the first cleanup rule
    #[arg(long, env = "POSTMANPAT_CLEANUP_FOLDERS", default_value = DEFAULT_FOLDERS)]
    pub folders: String,
}

/// Run the generate command.
pub fn run(args: GenerateArgs) -> Result<()> {
    let analysis = Analysis::load(&args.analyze)
        .with_context(|| format!("failed to load analysis {}", args.analyze.display()))?;
    info!(clusters = analysis.len(), "loaded analysis");

    let mut config =
        SessionConfig::new(args.watch_out, args.cleanup_out).with_default_folders(args.folders);
    if let Some(checkpoint) = args.checkpoint {
        config = config.with_checkpoint(Some(checkpoint));
    }

    let mut prompter = TerminalPrompter::stdio();
    let report = session::run(&config, &analysis, &mut prompter)?;

    if let Resume::After(checkpoint) = &report.resume {
        println!(
            "Resumed after {} cluster {}.",
            checkpoint.lens, checkpoint.cluster_id
        );
    }
    println!(
        "Wrote {} watch rule(s) to {}",
        report.watch_rules,
        config.watch_out.display()
    );
    println!(
        "Wrote {} cleanup rule(s) to {}",
        report.cleanup_rules,
        config.cleanup_out.display()
    );
    if report.stopped {
        println!(
            "Stopped with {} cluster(s) left; run again to resume.",
            report.remaining
        );
    }
    Ok(())
}
