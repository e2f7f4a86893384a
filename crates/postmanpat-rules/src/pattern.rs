//! Conversion between literal strings and regex patterns.
//!
//! Watch rules match with regular expressions while cleanup rules match with
//! plain substrings. These helpers move between the two forms for the common
//! case where a regex was built by escaping a literal.
//!
//! Both directions are heuristics, not a regex parser. A pattern that really
//! uses regex syntax (alternation, classes, repetition) does not survive
//! [`literal_from_pattern`]; use [`warn_if_regex_like`] to detect such
//! patterns and tell the operator the result is approximate.

/// Characters that mark a pattern as more than an escaped literal.
pub const REGEX_MARKERS: &[char] = &['^', '$', '|', '[', ']', '(', ')', '?', '*', '+'];

/// Characters escaped by [`escape_literal`] (the RE2 metacharacter set).
const META: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$',
];

/// Strips single-character backslash escapes (`\X` becomes `X`).
///
/// Assumes `pattern` encodes a literal string. A trailing lone backslash is
/// kept as is.
#[must_use]
pub fn literal_from_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Returns true if `pattern` contains any of [`REGEX_MARKERS`].
///
/// Escaped markers count too: the check is on characters, so callers treat a
/// `true` result as "conversion may be approximate" and warn, never abort.
#[must_use]
pub fn warn_if_regex_like(pattern: &str) -> bool {
    pattern.contains(REGEX_MARKERS)
}

/// Builds a regex that matches `literal` exactly.
#[must_use]
pub fn escape_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 8);
    for ch in literal.chars() {
        if META.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
