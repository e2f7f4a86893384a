//! Rule records and their document form.

use std::fmt;

use postmanpat_yaml::{Mapping, Value};

/// Operation applied when a rule matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Delete the message.
    Delete,
    /// Move the message to another folder.
    Move {
        /// Destination folder.
        destination: String,
    },
    /// Action read from an existing document, kept exactly as written.
    Raw(Value),
}

impl Action {
    /// Recognizes the plain `delete` and `move` shapes; anything else is
    /// kept verbatim as [`Action::Raw`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if let Some(map) = value.as_mapping() {
            let kind = map.get("type").and_then(Value::as_str);
            let destination = map.get("destination").and_then(Value::as_str);
            match (kind, destination, map.len()) {
                (Some("delete"), None, 1) => return Self::Delete,
                (Some("move"), Some(dest), 2) => {
                    return Self::Move {
                        destination: dest.to_string(),
                    };
                }
                _ => {}
            }
        }
        Self::Raw(value)
    }

    /// Document form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Delete => Mapping::from_iter([("type", "delete")]).into(),
            Self::Move { destination } => {
                Mapping::from_iter([("type", "move"), ("destination", destination.as_str())]).into()
            }
            Self::Raw(value) => value.clone(),
        }
    }
}

/// Regex matchers evaluated by the mail client (watch rules).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMatcher {
    /// Patterns for the `List-Id` header.
    pub list_id_regex: Option<Vec<String>>,
    /// Patterns for the sender address.
    pub sender_regex: Option<Vec<String>>,
    /// Patterns for the `Reply-To` address.
    pub replyto_regex: Option<Vec<String>>,
    /// Patterns for recipient addresses.
    pub recipients_regex: Option<Vec<String>>,
}

impl ClientMatcher {
    /// Returns true if no field has a pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.list_id_regex,
            &self.sender_regex,
            &self.replyto_regex,
            &self.recipients_regex,
        ]
        .iter()
        .all(|field| field.as_ref().is_none_or(Vec::is_empty))
    }

    /// Document form. Unset fields are omitted.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("list_id_regex", self.list_id_regex.clone());
        map.insert("sender_regex", self.sender_regex.clone());
        map.insert("replyto_regex", self.replyto_regex.clone());
        map.insert("recipients_regex", self.recipients_regex.clone());
        map.into()
    }
}

/// Substring matchers evaluated by the IMAP server (cleanup rules).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerMatcher {
    /// Folders searched for matching messages.
    pub folders: Vec<String>,
    /// Substrings of the `List-Id` header.
    pub list_id_substring: Option<Vec<String>>,
    /// Substrings of the sender address.
    pub sender_substring: Option<Vec<String>>,
    /// Substrings of the `Reply-To` address.
    pub replyto_substring: Option<Vec<String>>,
    /// Recipient addresses.
    pub recipients: Option<Vec<String>>,
    /// Substrings of the message body.
    pub body_substring: Option<Vec<String>>,
}

impl ServerMatcher {
    /// Creates a matcher over `folders` with no criteria yet.
    #[must_use]
    pub const fn new(folders: Vec<String>) -> Self {
        Self {
            folders,
            list_id_substring: None,
            sender_substring: None,
            replyto_substring: None,
            recipients: None,
            body_substring: None,
        }
    }

    /// Criterion slot for a document key, e.g. `sender_substring`.
    pub fn field_mut(&mut self, key: &str) -> Option<&mut Option<Vec<String>>> {
        match key {
            "list_id_substring" => Some(&mut self.list_id_substring),
            "sender_substring" => Some(&mut self.sender_substring),
            "replyto_substring" => Some(&mut self.replyto_substring),
            "recipients" => Some(&mut self.recipients),
            "body_substring" => Some(&mut self.body_substring),
            _ => None,
        }
    }

    /// Returns true if no criterion is set. Folders only scope the search
    /// and do not count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.list_id_substring,
            &self.sender_substring,
            &self.replyto_substring,
            &self.recipients,
            &self.body_substring,
        ]
        .iter()
        .all(|field| field.as_ref().is_none_or(Vec::is_empty))
    }

    /// Document form. Unset fields are omitted.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("folders", self.folders.clone());
        map.insert("list_id_substring", self.list_id_substring.clone());
        map.insert("sender_substring", self.sender_substring.clone());
        map.insert("replyto_substring", self.replyto_substring.clone());
        map.insert("recipients", self.recipients.clone());
        map.insert("body_substring", self.body_substring.clone());
        map.into()
    }
}

/// Matching criteria of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Watch rule criteria, written under `client`.
    Client(ClientMatcher),
    /// Cleanup rule criteria, written under `server`.
    Server(ServerMatcher),
}

impl Matcher {
    /// Document key for this matcher.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Client(_) => "client",
            Self::Server(_) => "server",
        }
    }

    /// Returns true if the matcher has no criteria.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Client(m) => m.is_empty(),
            Self::Server(m) => m.is_empty(),
        }
    }

    /// Document form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Client(m) => m.to_value(),
            Self::Server(m) => m.to_value(),
        }
    }
}

/// A named filter rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Label shown to the operator. Not required to be unique.
    pub name: String,
    /// Matching criteria.
    pub matcher: Matcher,
    /// Actions applied on match.
    pub actions: Vec<Action>,
}

impl Rule {
    /// Document form: `name`, then the matcher, then `actions`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("name", self.name.as_str());
        map.insert(self.matcher.key(), self.matcher.to_value());
        map.insert(
            "actions",
            self.actions.iter().map(Action::to_value).collect::<Value>(),
        );
        map.into()
    }
}

/// Problem found by [`RuleSet::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Rule has no matching criteria.
    EmptyMatcher {
        /// Position in the rule set, starting at 1.
        index: usize,
        /// Rule name.
        name: String,
    },
    /// Cleanup rule lists no folders.
    MissingFolders {
        /// Position in the rule set, starting at 1.
        index: usize,
        /// Rule name.
        name: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMatcher { index, name } => {
                write!(f, "rule {index} ({name:?}) has no matching criteria")
            }
            Self::MissingFolders { index, name } => {
                write!(f, "rule {index} ({name:?}) must define server.folders")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a rule set.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A `rules` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Rules in the order they were produced.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Number of rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks the constraints the consuming tool enforces on load.
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        for (i, rule) in self.rules.iter().enumerate() {
            let index = i + 1;
            if rule.matcher.is_empty() {
                errors.push(ValidationError::EmptyMatcher {
                    index,
                    name: rule.name.clone(),
                });
            }
            if let Matcher::Server(server) = &rule.matcher
                && server.folders.is_empty()
            {
                errors.push(ValidationError::MissingFolders {
                    index,
                    name: rule.name.clone(),
                });
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Document form, with `prior` entries (already-written rules) first.
    #[must_use]
    pub fn to_document(&self, prior: &[Value]) -> Value {
        let rules: Vec<Value> = prior
            .iter()
            .cloned()
            .chain(self.rules.iter().map(Rule::to_value))
            .collect();
        Mapping::from_iter([("rules", rules)]).into()
    }

    /// Document form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.to_document(&[])
    }
}
