//! Convert command - derives cleanup rules from a watch rule file.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use postmanpat_rules::prompt::split_list;
use postmanpat_rules::session::DEFAULT_FOLDERS;
use postmanpat_rules::{convert_document, document};
use tracing::info;

/// Arguments for the convert command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Watch rule file to read
    #[arg(long, value_name = "PATH")]
    pub watch: PathBuf,

    /// Cleanup rule file to write
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Comma-separated folders attached to every cleanup rule
    #[arg(long, env = "POSTMANPAT_CLEANUP_FOLDERS", default_value = DEFAULT_FOLDERS)]
    pub folders: String,
}

/// Run the convert command.
pub fn run(args: ConvertArgs) -> Result<()> {
    let folders = split_list(&args.folders);
    if folders.is_empty() {
        bail!("--folders must name at least one folder");
    }

    let doc = document::read_yaml(&args.watch)
        .with_context(|| format!("failed to read watch rules {}", args.watch.display()))?;
    let conversion = convert_document(&doc, &folders)
        .with_context(|| format!("cannot convert {}", args.watch.display()))?;
    info!(
        rules = conversion.rules.len(),
        approximate = conversion.approximate.len(),
        "converted watch rules"
    );

    postmanpat_yaml::write_file(&args.out, &conversion.rules.to_value())?;

    println!(
        "Wrote {} cleanup rule(s) to {}",
        conversion.rules.len(),
        args.out.display()
    );
    if !conversion.approximate.is_empty() {
        println!(
            "{} pattern(s) looked like regexes and were converted approximately; review them.",
            conversion.approximate.len()
        );
    }
    for (rule, field) in &conversion.skipped_fields {
        println!("Skipped {field} in rule {rule:?}: no server-side equivalent.");
    }
    Ok(())
}
