//! Session checkpoint persistence.
//!
//! The checkpoint records the last cluster an interactive session finished,
//! so a later run can continue after it. It is stored as a two-key YAML
//! document; JSON checkpoints from older runs parse as well.

use std::path::{Path, PathBuf};

use postmanpat_yaml::{Mapping, Value};
use serde::Deserialize;
use tracing::debug;

use crate::analysis::{Cluster, Lens, cluster_id};
use crate::error::{Error, Result};

/// Suffix appended to the watch output path for the default checkpoint.
pub const DEFAULT_SUFFIX: &str = ".checkpoint.yaml";

/// Last cluster fully processed in a session.
///
/// The lens is stored as text. A checkpoint naming an unknown lens loads
/// normally and resumes as [`Resume::Stale`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Checkpoint {
    /// Lens name of the cluster, e.g. `list_lens`.
    pub lens: String,
    /// Cluster identifier within the lens.
    #[serde(deserialize_with = "cluster_id")]
    pub cluster_id: String,
}

impl Checkpoint {
    /// Creates a checkpoint.
    #[must_use]
    pub fn new(lens: Lens, cluster_id: impl Into<String>) -> Self {
        Self {
            lens: lens.as_str().to_string(),
            cluster_id: cluster_id.into(),
        }
    }

    /// Document form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Mapping::from_iter([
            ("lens", self.lens.as_str()),
            ("cluster_id", self.cluster_id.as_str()),
        ])
        .into()
    }

    fn is_at(&self, lens: Lens, cluster: &Cluster) -> bool {
        self.lens == lens.as_str() && self.cluster_id == cluster.cluster_id
    }
}

/// Where a session starts relative to its checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    /// No checkpoint; start at the first cluster.
    Fresh,
    /// Checkpoint found; start after it.
    After(Checkpoint),
    /// Checkpoint names a cluster not in the input; start at the first cluster.
    Stale(Checkpoint),
}

/// Default checkpoint location for a watch output file.
#[must_use]
pub fn default_path(watch_out: &Path) -> PathBuf {
    let mut path = watch_out.as_os_str().to_os_string();
    path.push(DEFAULT_SUFFIX);
    PathBuf::from(path)
}

/// Checkpoint file handle. Without a path, loads find nothing and saves do
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct CheckpointStore {
    path: Option<PathBuf>,
}

impl CheckpointStore {
    /// Creates a store.
    #[must_use]
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Configured location.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Checkpoint`] if the file exists but is unreadable or
    /// is not a `{lens, cluster_id}` record.
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let malformed = |reason: String| Error::Checkpoint {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        let checkpoint: Checkpoint =
            serde_yaml::from_str(&text).map_err(|e| malformed(e.to_string()))?;
        debug!(path = %path.display(), lens = %checkpoint.lens, cluster_id = %checkpoint.cluster_id, "loaded checkpoint");
        Ok(Some(checkpoint))
    }

    /// Records `(lens, cluster_id)` as the last completed cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, lens: Lens, cluster_id: &str) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        postmanpat_yaml::write_file(path, &Checkpoint::new(lens, cluster_id).to_value())?;
        Ok(())
    }
}

/// Index of the first cluster to process, and how it was chosen.
#[must_use]
pub fn resume_position(checkpoint: Option<Checkpoint>, clusters: &[(Lens, &Cluster)]) -> (usize, Resume) {
    let Some(checkpoint) = checkpoint else {
        return (0, Resume::Fresh);
    };
    match clusters
        .iter()
        .position(|(lens, cluster)| checkpoint.is_at(*lens, cluster))
    {
        Some(index) => (index + 1, Resume::After(checkpoint)),
        None => (0, Resume::Stale(checkpoint)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clusters(ids: &[&str]) -> Vec<Cluster> {
        ids.iter()
            .map(|id| Cluster::deserialize(&json!({ "cluster_id": id })).unwrap())
            .collect()
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            default_path(Path::new("out/watch.yaml")),
            PathBuf::from("out/watch.yaml.checkpoint.yaml")
        );
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(Some(dir.path().join("cp.yaml")));
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(CheckpointStore::new(None).load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.yaml");
        let store = CheckpointStore::new(Some(path.clone()));

        store.save(Lens::SenderLens, "s-7").unwrap();
        store.save(Lens::ListLens, "l-2").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "lens: 'list_lens'\ncluster_id: 'l-2'\n"
        );
        assert_eq!(store.load().unwrap(), Some(Checkpoint::new(Lens::ListLens, "l-2")));
    }

    #[test]
    fn test_save_without_path_is_noop() {
        CheckpointStore::new(None).save(Lens::ListLens, "x").unwrap();
    }

    #[test]
    fn test_legacy_json_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.json");
        std::fs::write(&path, "{\n  \"lens\": \"sender_lens\",\n  \"cluster_id\": \"9\"\n}\n").unwrap();

        let store = CheckpointStore::new(Some(path));
        assert_eq!(store.load().unwrap(), Some(Checkpoint::new(Lens::SenderLens, "9")));
    }

    #[test]
    fn test_malformed_checkpoint_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.yaml");

        for text in ["lens: [list_lens\n", "lens: 'list_lens'\n", "- a\n- b\n"] {
            std::fs::write(&path, text).unwrap();
            let err = CheckpointStore::new(Some(path.clone())).load().unwrap_err();
            assert!(matches!(err, Error::Checkpoint { .. }), "{text:?}");
        }
    }

    #[test]
    fn test_unknown_lens_resumes_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.yaml");
        std::fs::write(&path, "lens: 'somewhere_lens'\ncluster_id: 'A'\n").unwrap();

        let checkpoint = CheckpointStore::new(Some(path)).load().unwrap().unwrap();
        assert_eq!(checkpoint.lens, "somewhere_lens");

        let list = clusters(&["A", "B"]);
        let all: Vec<_> = list.iter().map(|c| (Lens::ListLens, c)).collect();
        assert_eq!(
            resume_position(Some(checkpoint.clone()), &all),
            (0, Resume::Stale(checkpoint))
        );
    }

    #[test]
    fn test_resume_position() {
        let list = clusters(&["A", "B", "C"]);
        let all: Vec<_> = list.iter().map(|c| (Lens::ListLens, c)).collect();

        assert_eq!(resume_position(None, &all), (0, Resume::Fresh));

        let at_b = Checkpoint::new(Lens::ListLens, "B");
        assert_eq!(resume_position(Some(at_b.clone()), &all), (2, Resume::After(at_b)));

        let wrong_lens = Checkpoint::new(Lens::SenderLens, "B");
        assert_eq!(
            resume_position(Some(wrong_lens.clone()), &all),
            (0, Resume::Stale(wrong_lens))
        );

        let last = Checkpoint::new(Lens::ListLens, "C");
        assert_eq!(resume_position(Some(last.clone()), &all), (3, Resume::After(last)));
    }
}
