//! Analysis input model.
//!
//! The analysis tool groups mailbox messages into clusters under two lenses
//! and writes them as JSON:
//!
//! ```json
//! { "indexes": {
//!     "list_lens":   { "clusters": [ { "cluster_id": "...", "keys": { "ListID": "..." } } ] },
//!     "sender_lens": { "clusters": [ { "cluster_id": "...", "keys": { "SenderDomains": ["..."] } } ] }
//! } }
//! ```

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Example fields shown when previewing a cluster.
pub const PREVIEW_FIELDS: [&str; 4] = [
    "subject_raw",
    "recipients",
    "reply_to_domains",
    "list_unsubscribe_targets",
];

/// A fixed partitioning of clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    /// Clusters keyed by mailing-list identifier.
    ListLens,
    /// Clusters keyed by sender domain.
    SenderLens,
}

impl Lens {
    /// All lenses in processing order.
    pub const ALL: [Self; 2] = [Self::ListLens, Self::SenderLens];

    /// Name used in the analysis document and the checkpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ListLens => "list_lens",
            Self::SenderLens => "sender_lens",
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of similar analyzed messages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cluster {
    /// Identifier, unique within its lens.
    #[serde(deserialize_with = "cluster_id")]
    pub cluster_id: String,
    /// Grouping dimensions, e.g. `ListID` or `SenderDomains`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub keys: Map<String, Value>,
    /// Number of messages in the cluster.
    #[serde(default)]
    pub count: Option<u64>,
    /// Sample values per message field.
    #[serde(default, deserialize_with = "null_as_default")]
    pub examples: Map<String, Value>,
    /// Date of the newest message.
    #[serde(default)]
    pub latest_date: Option<String>,
}

impl Cluster {
    /// The `ListID` key, trimmed. `None` when absent or blank.
    #[must_use]
    pub fn list_id(&self) -> Option<String> {
        self.keys
            .get("ListID")
            .and_then(scalar_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// The `SenderDomains` key. A single string is treated as one domain.
    #[must_use]
    pub fn sender_domains(&self) -> Vec<String> {
        self.keys.get("SenderDomains").map(text_list).unwrap_or_default()
    }

    /// Sample values recorded for an example field.
    #[must_use]
    pub fn example_values(&self, field: &str) -> Vec<String> {
        self.examples.get(field).map(text_list).unwrap_or_default()
    }

    /// One-line summary: id, count and keys.
    #[must_use]
    pub fn summary(&self) -> String {
        let count = self
            .count
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        format!(
            "cluster_id={} count={} keys={}",
            self.cluster_id,
            count,
            Value::Object(self.keys.clone())
        )
    }

    /// Preview lines: up to `limit` values of each [`PREVIEW_FIELDS`] entry,
    /// then the latest date if known.
    #[must_use]
    pub fn preview(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = PREVIEW_FIELDS
            .iter()
            .filter_map(|field| {
                let values = self.example_values(field);
                if values.is_empty() {
                    return None;
                }
                let shown: Vec<&str> = values.iter().take(limit).map(String::as_str).collect();
                Some(format!("{field}: {}", shown.join(", ")))
            })
            .collect();
        if let Some(date) = self.latest_date.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("latest_date: {date}"));
        }
        lines
    }
}

/// Clusters from both lenses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    list_lens: Vec<Cluster>,
    sender_lens: Vec<Cluster>,
}

impl Analysis {
    /// Creates an analysis from already-parsed clusters.
    #[must_use]
    pub const fn new(list_lens: Vec<Cluster>, sender_lens: Vec<Cluster>) -> Self {
        Self {
            list_lens,
            sender_lens,
        }
    }

    /// Reads and parses an analysis file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not JSON, or lacks the
    /// top-level `indexes` mapping.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses an analysis document.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not JSON or lacks the top-level
    /// `indexes` mapping.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Builds an analysis from a parsed document.
    ///
    /// A missing lens yields no clusters for it. Cluster entries that cannot
    /// be parsed are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not an object or `indexes` is
    /// missing or not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            Error::InvalidInput("analysis document must be a JSON object".to_string())
        })?;
        let indexes = root
            .get("indexes")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                Error::InvalidInput("analysis document has no `indexes` object".to_string())
            })?;

        Ok(Self {
            list_lens: lens_clusters(indexes, Lens::ListLens),
            sender_lens: lens_clusters(indexes, Lens::SenderLens),
        })
    }

    /// Clusters of one lens, in input order.
    #[must_use]
    pub fn clusters(&self, lens: Lens) -> &[Cluster] {
        match lens {
            Lens::ListLens => &self.list_lens,
            Lens::SenderLens => &self.sender_lens,
        }
    }

    /// All clusters in processing order: list lens first, then sender lens.
    pub fn iter(&self) -> impl Iterator<Item = (Lens, &Cluster)> {
        Lens::ALL
            .into_iter()
            .flat_map(move |lens| self.clusters(lens).iter().map(move |c| (lens, c)))
    }

    /// Total number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list_lens.len() + self.sender_lens.len()
    }

    /// Returns true if neither lens has clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lens_clusters(indexes: &Map<String, Value>, lens: Lens) -> Vec<Cluster> {
    let Some(entries) = indexes
        .get(lens.as_str())
        .and_then(|l| l.get("clusters"))
        .and_then(Value::as_array)
    else {
        debug!(lens = %lens, "no clusters for lens");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Cluster::deserialize(entry) {
            Ok(cluster) => Some(cluster),
            Err(e) => {
                warn!(lens = %lens, index, error = %e, "skipping malformed cluster");
                None
            }
        })
        .collect()
}

/// Renders a JSON scalar as text. Null gives `None`; containers are rendered
/// as JSON.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Accepts string or numeric identifiers.
pub(crate) fn cluster_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    match Id::deserialize(deserializer) {
        Ok(Id::Text(s)) => Ok(s),
        Ok(Id::Int(n)) => Ok(n.to_string()),
        Ok(Id::Uint(n)) => Ok(n.to_string()),
        Err(_) => Err(de::Error::custom("cluster_id must be a string or integer")),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
