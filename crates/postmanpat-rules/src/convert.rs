//! Batch conversion of watch rules into cleanup rules.
//!
//! Each client-side regex field is mapped to its server-side substring field
//! by stripping escapes. Patterns that use real regex syntax cannot be
//! represented as substrings; they are converted anyway and reported as
//! approximate.

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{from_yaml, rule_entries, scalar_text};
use crate::error::Result;
use crate::pattern::{literal_from_pattern, warn_if_regex_like};
use crate::rule::{Action, Matcher, Rule, RuleSet, ServerMatcher, ValidationError};

/// Client fields and the server fields they become.
pub const FIELD_MAP: [(&str, &str); 5] = [
    ("list_id_regex", "list_id_substring"),
    ("sender_regex", "sender_substring"),
    ("replyto_regex", "replyto_substring"),
    ("recipients_regex", "recipients"),
    ("body_regex", "body_substring"),
];

/// A watch rule that cannot be converted. Any of these aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// No folders to attach.
    #[error("at least one cleanup folder is required")]
    NoFolders,

    /// Rule has no client matcher, or an empty one.
    #[error("rule {name:?} must define a non-empty client matcher")]
    MissingClient {
        /// Rule name.
        name: String,
    },

    /// Client matcher is not a mapping.
    #[error("rule {name:?} has a client matcher that is not a mapping")]
    ClientNotMapping {
        /// Rule name.
        name: String,
    },

    /// Rule already carries server criteria.
    #[error("rule {name:?} already has a server matcher")]
    ServerAlreadyPresent {
        /// Rule name.
        name: String,
    },

    /// None of the client fields has a server counterpart.
    #[error("rule {name:?} has no client fields that map to server fields")]
    NoServerFields {
        /// Rule name.
        name: String,
    },

    /// Converted rule fails rule-set validation.
    #[error("converted {0}")]
    Invalid(#[from] ValidationError),
}

/// Output of a batch conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    /// Cleanup rules, one per converted watch rule.
    pub rules: RuleSet,
    /// Source patterns that looked like real regexes.
    pub approximate: Vec<String>,
    /// `(rule name, client field)` pairs with no server counterpart.
    pub skipped_fields: Vec<(String, String)>,
}

/// Converts the `rules` of a watch document.
///
/// # Errors
///
/// Returns an error if the document has no `rules` sequence or any rule
/// fails conversion.
pub fn convert_document(doc: &serde_yaml::Value, folders: &[String]) -> Result<Conversion> {
    Ok(convert_rules(rule_entries(doc)?, folders)?)
}

/// Converts watch rule entries into cleanup rules scoped to `folders`.
///
/// Entries that are not mappings are skipped.
///
/// # Errors
///
/// Returns the first [`ConvertError`] found; nothing is converted in that
/// case.
pub fn convert_rules(
    entries: &[serde_yaml::Value],
    folders: &[String],
) -> std::result::Result<Conversion, ConvertError> {
    if folders.is_empty() {
        return Err(ConvertError::NoFolders);
    }

    let mut conversion = Conversion::default();
    for (index, entry) in entries.iter().enumerate() {
        let Some(rule) = entry.as_mapping() else {
            warn!(index, "skipping rule entry that is not a mapping");
            continue;
        };
        let name = rule.get("name").and_then(scalar_text).unwrap_or_default();

        let client = match rule.get("client") {
            None | Some(serde_yaml::Value::Null) => {
                return Err(ConvertError::MissingClient { name });
            }
            Some(serde_yaml::Value::Mapping(client)) if client.is_empty() => {
                return Err(ConvertError::MissingClient { name });
            }
            Some(serde_yaml::Value::Mapping(client)) => client,
            Some(_) => return Err(ConvertError::ClientNotMapping { name }),
        };
        if rule.get("server").is_some_and(is_present) {
            return Err(ConvertError::ServerAlreadyPresent { name });
        }

        let mut server = ServerMatcher::new(folders.to_vec());
        for (key, value) in client {
            let Some(key) = scalar_text(key) else {
                continue;
            };
            let Some(slot) = server_field(&key).and_then(|field| server.field_mut(field)) else {
                warn!(rule = %name, field = %key, "client field has no server counterpart; skipped");
                conversion.skipped_fields.push((name.clone(), key));
                continue;
            };
            let mut literals = Vec::new();
            for pattern in pattern_list(value) {
                if warn_if_regex_like(&pattern) {
                    warn!(rule = %name, field = %key, pattern = %pattern, "pattern looks like a regex; substring is approximate");
                    conversion.approximate.push(pattern.clone());
                }
                literals.push(literal_from_pattern(&pattern));
            }
            if !literals.is_empty() {
                *slot = Some(literals);
            }
        }
        if server.is_empty() {
            return Err(ConvertError::NoServerFields { name });
        }

        let actions = match rule.get("actions") {
            Some(serde_yaml::Value::Sequence(items)) => items
                .iter()
                .map(|item| Action::from_value(from_yaml(item)))
                .collect(),
            _ => Vec::new(),
        };

        debug!(rule = %name, "converted rule");
        conversion.rules.push(Rule {
            name,
            matcher: Matcher::Server(server),
            actions,
        });
    }

    if let Err(mut errors) = conversion.rules.validate() {
        return Err(errors.swap_remove(0).into());
    }
    Ok(conversion)
}

fn server_field(client_field: &str) -> Option<&'static str> {
    FIELD_MAP
        .iter()
        .find(|(client, _)| *client == client_field)
        .map(|(_, server)| *server)
}

/// Non-null and, for containers, non-empty.
fn is_present(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => false,
        serde_yaml::Value::Mapping(map) => !map.is_empty(),
        serde_yaml::Value::Sequence(items) => !items.is_empty(),
        _ => true,
    }
}

/// String values of a matcher field. A lone string is one pattern; other
/// scalars and nested containers are ignored.
fn pattern_list(value: &serde_yaml::Value) -> Vec<String> {
    match value {
        serde_yaml::Value::String(s) => vec![s.clone()],
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(ToString::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
