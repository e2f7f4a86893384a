//! Interactive generation session.
//!
//! Walks every cluster of an analysis in order, builds rules with the
//! operator, and writes the watch and cleanup documents. The documents are
//! saved before the checkpoint after each cluster, so an interrupted session
//! can resume without losing finished clusters.

use std::path::PathBuf;

use postmanpat_yaml::Value;
use tracing::{debug, info, warn};

use crate::analysis::{Analysis, Cluster, Lens};
use crate::builder::{Step, process_cluster};
use crate::checkpoint::{CheckpointStore, Resume, default_path, resume_position};
use crate::document::existing_rules;
use crate::error::Result;
use crate::prompt::{PromptError, Prompter};
use crate::rule::RuleSet;

/// Folder list offered for the first cleanup rule.
pub const DEFAULT_FOLDERS: &str = "INBOX";

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Watch rule output.
    pub watch_out: PathBuf,
    /// Cleanup rule output.
    pub cleanup_out: PathBuf,
    /// Checkpoint file. `None` disables checkpointing.
    pub checkpoint: Option<PathBuf>,
    /// Comma-separated folders offered for the first cleanup rule.
    pub default_folders: String,
}

impl SessionConfig {
    /// Creates a config with the checkpoint next to the watch output.
    pub fn new(watch_out: impl Into<PathBuf>, cleanup_out: impl Into<PathBuf>) -> Self {
        let watch_out = watch_out.into();
        Self {
            checkpoint: Some(default_path(&watch_out)),
            watch_out,
            cleanup_out: cleanup_out.into(),
            default_folders: DEFAULT_FOLDERS.to_string(),
        }
    }

    /// Overrides the checkpoint location.
    #[must_use]
    pub fn with_checkpoint(mut self, checkpoint: Option<PathBuf>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    /// Overrides the initial folder default.
    #[must_use]
    pub fn with_default_folders(mut self, folders: impl Into<String>) -> Self {
        self.default_folders = folders.into();
        self
    }
}

/// What a session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// How the starting cluster was chosen.
    pub resume: Resume,
    /// Clusters completed in this run.
    pub processed: usize,
    /// Clusters left unprocessed because the operator stopped.
    pub remaining: usize,
    /// True if the operator quit or input closed before the last cluster.
    pub stopped: bool,
    /// Watch rules written, including carried-over ones.
    pub watch_rules: usize,
    /// Cleanup rules written, including carried-over ones.
    pub cleanup_rules: usize,
}

/// Runs a session and writes both rule documents.
///
/// Both documents are rewritten after every completed cluster, before the
/// checkpoint moves past it, and once more at the end. Rules of the cluster
/// in progress when the operator stops, or when reading input fails, are
/// discarded.
///
/// # Errors
///
/// Returns an error if the checkpoint is malformed, carried-over output
/// cannot be read, reading input fails for a reason other than end of
/// input, or any file cannot be written.
pub fn run(config: &SessionConfig, analysis: &Analysis, prompter: &mut dyn Prompter) -> Result<SessionReport> {
    let store = CheckpointStore::new(config.checkpoint.clone());
    let clusters: Vec<(Lens, &Cluster)> = analysis.iter().collect();
    let (start, resume) = resume_position(store.load()?, &clusters);

    let (prior_watch, prior_cleanup) = match &resume {
        Resume::Fresh => (Vec::new(), Vec::new()),
        Resume::Stale(checkpoint) => {
            warn!(
                lens = %checkpoint.lens,
                cluster_id = %checkpoint.cluster_id,
                "checkpoint cluster not found in analysis; starting from the beginning"
            );
            (Vec::new(), Vec::new())
        }
        Resume::After(checkpoint) => {
            info!(
                lens = %checkpoint.lens,
                cluster_id = %checkpoint.cluster_id,
                skipped = start,
                "resuming after checkpoint"
            );
            (existing_rules(&config.watch_out)?, existing_rules(&config.cleanup_out)?)
        }
    };

    let mut watch = RuleSet::new();
    let mut cleanup = RuleSet::new();
    let mut folders = config.default_folders.clone();
    let mut processed = 0;
    let mut stopped = false;

    for &(lens, cluster) in &clusters[start..] {
        match process_cluster(prompter, lens, cluster, &folders) {
            Ok(Step::Continue {
                rules,
                default_folders,
            }) => {
                if let Some(rule) = rules.watch {
                    watch.push(rule);
                }
                if let Some(rule) = rules.cleanup {
                    cleanup.push(rule);
                }
                folders = default_folders;
                write_documents(
                    config,
                    &watch.to_document(&prior_watch),
                    &cleanup.to_document(&prior_cleanup),
                )?;
                store.save(lens, &cluster.cluster_id)?;
                processed += 1;
            }
            Ok(Step::Quit) => {
                info!(lens = %lens, cluster_id = %cluster.cluster_id, "operator quit");
                stopped = true;
                break;
            }
            Err(PromptError::Closed) => {
                warn!(lens = %lens, cluster_id = %cluster.cluster_id, "operator input closed; stopping");
                stopped = true;
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    check(&watch, "watch");
    check(&cleanup, "cleanup");

    write_documents(
        config,
        &watch.to_document(&prior_watch),
        &cleanup.to_document(&prior_cleanup),
    )?;

    Ok(SessionReport {
        resume,
        processed,
        remaining: clusters.len() - start - processed,
        stopped,
        watch_rules: prior_watch.len() + watch.len(),
        cleanup_rules: prior_cleanup.len() + cleanup.len(),
    })
}

fn write_documents(config: &SessionConfig, watch: &Value, cleanup: &Value) -> Result<()> {
    postmanpat_yaml::write_file(&config.watch_out, watch)?;
    postmanpat_yaml::write_file(&config.cleanup_out, cleanup)?;
    debug!(
        watch = %config.watch_out.display(),
        cleanup = %config.cleanup_out.display(),
        "wrote rule documents"
    );
    Ok(())
}

fn check(rules: &RuleSet, kind: &str) {
    if let Err(errors) = rules.validate() {
        for error in errors {
            warn!(kind, "{error}");
        }
    }
}
