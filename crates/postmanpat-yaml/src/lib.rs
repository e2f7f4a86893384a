//! # postmanpat-yaml
//!
//! Deterministic YAML writer for postmanpat rule files.
//!
//! The writer covers a deliberately small subset of YAML: block mappings,
//! block sequences and quoted string scalars. Output never depends on a
//! general-purpose serializer's formatting choices, so rule files stay stable
//! across releases and produce clean diffs when edited by hand.
//!
//! ## Features
//!
//! - **Ordered mappings**: keys are written in insertion order
//! - **Sparse fields**: `null` values are omitted instead of written empty
//! - **Compact sequences**: mapping items are flattened onto the dash line
//! - **Explicit quoting**: every scalar is quoted, so nothing is coerced on re-read
//!
//! ## Quick Start
//!
//! ```ignore
//! use postmanpat_yaml::{Mapping, Value};
//!
//! let mut rule = Mapping::new();
//! rule.insert("name", "Newsletters");
//! rule.insert("actions", vec![Value::from(Mapping::from_iter([("type", "delete")]))]);
//!
//! let mut doc = Mapping::new();
//! doc.insert("rules", vec![Value::from(rule)]);
//!
//! print!("{}", postmanpat_yaml::to_string(&Value::from(doc)));
//! // rules:
//! //   - name: 'Newsletters'
//! //     actions:
//! //       - type: 'delete'
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod emit;
mod error;
mod value;

pub use emit::{quote, to_string, write_file};
pub use error::{Error, Result};
pub use value::{Mapping, Value};
