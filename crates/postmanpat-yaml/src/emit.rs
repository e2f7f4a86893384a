//! Block-style YAML emitter.
//!
//! Layout rules:
//! - mapping entries are `key: value`, children indented two spaces;
//! - sequence items are `- item`, and a mapping item puts its first entry on
//!   the dash line with the remaining entries nested beneath it;
//! - null values are skipped, blank containers are written as `[]` or `{}`;
//! - every scalar is quoted (see [`quote`]).
//!
//! Keys are written bare and are expected to be plain identifiers.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

/// Spaces per nesting level.
const INDENT: usize = 2;

/// Renders a document.
///
/// The result is one line per entry or item, joined with `\n`, with a final
/// trailing newline.
#[must_use]
pub fn to_string(value: &Value) -> String {
    let mut lines = Vec::new();
    if value.is_blank() {
        lines.push(empty_marker(value).to_string());
    } else {
        push_value(&mut lines, value, 0);
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Renders `value` and replaces `path` with the result.
///
/// The document is written to a sibling temporary file first and then
/// renamed over the destination, so readers see either the old or the new
/// contents.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn write_file(path: &Path, value: &Value) -> Result<()> {
    let rendered = to_string(value);
    let tmp = temp_path(path);
    let io_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, rendered).map_err(io_err)?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Quotes a scalar.
///
/// Strings without backslashes or line-breaking characters use single
/// quotes, with embedded `'` doubled. Anything else uses double quotes,
/// escaping `\`, `"` and control characters.
#[must_use]
pub fn quote(s: &str) -> String {
    if !s.contains('\\') && !s.chars().any(needs_escape) {
        return format!("'{}'", s.replace('\'', "''"));
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if needs_escape(c) => {
                let code = u32::from(c);
                if code <= 0xFF {
                    let _ = write!(out, "\\x{code:02X}");
                } else {
                    let _ = write!(out, "\\u{code:04X}");
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Control characters and the Unicode line/paragraph separators, which a
/// YAML reader would otherwise fold as line breaks.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}')
}

const fn empty_marker(value: &Value) -> &'static str {
    match value {
        Value::Mapping(_) => "{}",
        _ => "[]",
    }
}

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

fn push_value(lines: &mut Vec<String>, value: &Value, indent: usize) {
    match value {
        Value::Null => {}
        Value::String(s) => lines.push(format!("{}{}", pad(indent), quote(s))),
        Value::Mapping(map) => push_entries(lines, map, &pad(indent), indent),
        Value::Sequence(items) => {
            for item in items.iter().filter(|item| !item.is_null()) {
                push_item(lines, item, indent);
            }
        }
    }
}

/// Writes every present entry of `map`, each line starting with `lead`.
fn push_entries(lines: &mut Vec<String>, map: &Mapping, lead: &str, indent: usize) {
    for (key, value) in map.present() {
        push_entry(lines, lead, key, value, indent + INDENT);
    }
}

fn push_entry(lines: &mut Vec<String>, lead: &str, key: &str, value: &Value, child: usize) {
    match value {
        Value::String(s) => lines.push(format!("{lead}{key}: {}", quote(s))),
        _ if value.is_blank() => lines.push(format!("{lead}{key}: {}", empty_marker(value))),
        _ => {
            lines.push(format!("{lead}{key}:"));
            push_value(lines, value, child);
        }
    }
}

fn push_item(lines: &mut Vec<String>, item: &Value, indent: usize) {
    let dash = format!("{}- ", pad(indent));
    match item {
        Value::Mapping(map) => {
            let mut present = map.present();
            let Some((first_key, first_value)) = present.next() else {
                lines.push(format!("{dash}{{}}"));
                return;
            };
            // Nested content sits under the first key, past the item's own
            // column, so the remaining entries stay siblings of the first.
            push_entry(lines, &dash, first_key, first_value, indent + 2 * INDENT);
            let lead = pad(indent + INDENT);
            for (key, value) in present {
                push_entry(lines, &lead, key, value, indent + 2 * INDENT);
            }
        }
        Value::Sequence(_) if item.is_blank() => lines.push(format!("{dash}[]")),
        Value::Sequence(_) => {
            lines.push(format!("{}-", pad(indent)));
            push_value(lines, item, indent + INDENT);
        }
        Value::String(s) => lines.push(format!("{dash}{}", quote(s))),
        Value::Null => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Mapping(Mapping::from_iter(entries))
    }

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("foo.com"), "'foo.com'");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("12345"), "'12345'");
    }

    #[test]
    fn test_quote_single_quote_doubled() {
        assert_eq!(quote("it's"), "'it''s'");
    }

    #[test]
    fn test_quote_backslash_uses_double_quotes() {
        assert_eq!(quote(r"foo\.com"), r#""foo\\.com""#);
        assert_eq!(quote(r#"say "hi"\"#), r#""say \"hi\"\\""#);
        assert_eq!(quote(r"it's\."), r#""it's\\.""#);
    }

    #[test]
    fn test_quote_control_characters() {
        assert_eq!(quote("a\nb"), r#""a\nb""#);
        assert_eq!(quote("a\tb"), r#""a\tb""#);
        assert_eq!(quote("bell\u{7}"), r#""bell\x07""#);
        assert_eq!(quote("a\u{2028}b"), r#""a\u2028b""#);
    }

    #[test]
    fn test_mapping_in_order() {
        let doc = map([("lens", "list_lens".into()), ("cluster_id", "c-1".into())]);
        assert_eq!(to_string(&doc), "lens: 'list_lens'\ncluster_id: 'c-1'\n");
    }

    #[test]
    fn test_null_omitted() {
        let doc = map([
            ("name", "A".into()),
            ("replyto_regex", Value::Null),
            ("sender_regex", vec!["x"].into()),
        ]);
        assert_eq!(to_string(&doc), "name: 'A'\nsender_regex:\n  - 'x'\n");
    }

    #[test]
    fn test_sequence_item_flattened() {
        let rule = map([
            ("name", "A".into()),
            ("client", map([("list_id_regex", vec![r"foo\.com"].into())])),
            ("actions", vec![map([("type", "delete".into())])].into()),
        ]);
        let doc = map([("rules", vec![rule].into())]);

        let expected = "\
rules:
  - name: 'A'
    client:
      list_id_regex:
        - \"foo\\\\.com\"
    actions:
      - type: 'delete'
";
        assert_eq!(to_string(&doc), expected);
    }

    #[test]
    fn test_first_key_container_nested_past_item() {
        let item = map([("client", map([("k", "v".into())])), ("name", "A".into())]);
        let doc = Value::Sequence(vec![item]);
        assert_eq!(to_string(&doc), "- client:\n    k: 'v'\n  name: 'A'\n");
    }

    #[test]
    fn test_empty_containers() {
        let doc = map([("rules", Value::Sequence(vec![]))]);
        assert_eq!(to_string(&doc), "rules: []\n");

        let doc = Value::Sequence(vec![map([]), Value::Sequence(vec![])]);
        assert_eq!(to_string(&doc), "- {}\n- []\n");

        assert_eq!(to_string(&map([])), "{}\n");
    }

    #[test]
    fn test_nested_sequence() {
        let doc = Value::Sequence(vec![vec!["a", "b"].into()]);
        assert_eq!(to_string(&doc), "-\n  - 'a'\n  - 'b'\n");
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/x/watch.yaml"));
        assert_eq!(tmp, PathBuf::from("/x/watch.yaml.tmp"));
    }
}
