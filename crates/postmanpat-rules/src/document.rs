//! Reading existing rule documents.

use std::path::Path;

use postmanpat_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Reads and parses a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML.
pub fn read_yaml(path: &Path) -> Result<serde_yaml::Value> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&text)?)
}

/// The `rules` sequence of a rule document.
///
/// A `rules` key holding null counts as an empty collection.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the document is not a mapping, has no
/// `rules` key, or `rules` is not a sequence.
pub fn rule_entries(doc: &serde_yaml::Value) -> Result<&[serde_yaml::Value]> {
    let map = doc
        .as_mapping()
        .ok_or_else(|| Error::InvalidInput("rule document must be a mapping".to_string()))?;
    let rules: &[serde_yaml::Value] = match map.get("rules") {
        None => {
            return Err(Error::InvalidInput(
                "rule document must include rules".to_string(),
            ));
        }
        Some(serde_yaml::Value::Null) => &[],
        Some(serde_yaml::Value::Sequence(rules)) => rules,
        Some(_) => return Err(Error::InvalidInput("rules must be a sequence".to_string())),
    };
    Ok(rules)
}

/// Rules already written to `path`, as document values.
///
/// Returns an empty list if the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable or not a rule
/// document.
pub fn existing_rules(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let doc = read_yaml(path)?;
    Ok(rule_entries(&doc)?
        .iter()
        .map(from_yaml)
        .filter(|v| !v.is_null())
        .collect())
}

/// Scalar as text: strings as is, numbers and booleans formatted, null and
/// containers give `None`.
#[must_use]
pub fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// Converts a parsed YAML tree into a writable one.
///
/// Scalars become strings, tags are dropped, and mapping keys that are not
/// scalars are skipped.
#[must_use]
pub fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Sequence(items) => items.iter().map(from_yaml).collect(),
        serde_yaml::Value::Mapping(map) => map
            .iter()
            .filter_map(|(k, v)| Some((scalar_text(k)?, from_yaml(v))))
            .collect::<Mapping>()
            .into(),
        serde_yaml::Value::Tagged(tagged) => from_yaml(&tagged.value),
        scalar => scalar_text(scalar).into(),
    }
}
