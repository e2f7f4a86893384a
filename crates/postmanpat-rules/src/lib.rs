//! # postmanpat-rules
//!
//! Turns mailbox analysis clusters into postmanpat filter rules.
//!
//! This crate provides:
//! - Analysis input model (clusters grouped by list and sender lenses)
//! - Watch (client regex) and cleanup (server substring) rule records
//! - Literal/regex pattern conversion
//! - **Interactive builder** - walks the operator through one cluster
//! - **Session driver** - processes every cluster with checkpoint/resume
//! - **Batch converter** - derives cleanup rules from existing watch rules

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod builder;
pub mod checkpoint;
pub mod convert;
pub mod document;
mod error;
pub mod pattern;
pub mod prompt;
pub mod rule;
pub mod session;

pub use analysis::{Analysis, Cluster, Lens};
pub use builder::{ClusterRules, Step, process_cluster};
pub use checkpoint::{Checkpoint, CheckpointStore, Resume};
pub use convert::{ConvertError, Conversion, convert_document, convert_rules};
pub use error::{Error, Result};
pub use pattern::{escape_literal, literal_from_pattern, warn_if_regex_like};
pub use prompt::{Answer, PromptError, PromptResult, Prompter, ScriptedPrompter};
pub use rule::{
    Action, ClientMatcher, Matcher, Rule, RuleSet, ServerMatcher, ValidationError,
    ValidationResult,
};
pub use session::{SessionConfig, SessionReport, run};
