//! Reads written documents back with `serde_yaml` and compares the trees.

use postmanpat_yaml::{Mapping, Value, quote, to_string, write_file};
use proptest::prelude::*;

/// Converts a parsed document into our tree, keeping mapping order.
fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::String(s) => Value::from(s.as_str()),
        serde_yaml::Value::Sequence(items) => Value::Sequence(items.iter().map(from_yaml).collect()),
        serde_yaml::Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.as_str().unwrap_or_default().to_string(), from_yaml(v)))
                .collect(),
        ),
        other => panic!("unexpected non-string scalar: {other:?}"),
    }
}

fn parse(text: &str) -> Value {
    let parsed: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
    from_yaml(&parsed)
}

fn rule(name: &str, matcher: &str, fields: Vec<(&str, Vec<&str>)>, actions: Vec<Value>) -> Value {
    let mut rule = Mapping::new();
    rule.insert("name", name);
    rule.insert(
        matcher,
        fields
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect::<Mapping>(),
    );
    rule.insert("actions", actions);
    Value::from(rule)
}

fn action(kind: &str, destination: Option<&str>) -> Value {
    let mut map = Mapping::new();
    map.insert("type", kind);
    if let Some(dest) = destination {
        map.insert("destination", dest);
    }
    Value::from(map)
}

#[test]
fn test_rule_set_roundtrip() {
    let rules = vec![
        rule(
            "Newsletters",
            "client",
            vec![("list_id_regex", vec![r"news\.example\.com"])],
            vec![action("delete", None)],
        ),
        rule(
            "Bob's shop",
            "server",
            vec![
                ("folders", vec!["INBOX", "Archive/2024"]),
                ("sender_substring", vec!["shop.example", "shop.example"]),
                ("recipients", vec!["me+shop@example.com"]),
            ],
            vec![action("move", Some("Receipts"))],
        ),
    ];
    let doc = Value::from(Mapping::from_iter([("rules", Value::from(rules))]));

    let text = to_string(&doc);
    assert_eq!(parse(&text), doc);
}

#[test]
fn test_numeric_looking_values_stay_strings() {
    let doc = Value::from(Mapping::from_iter([(
        "list_id_substring",
        Value::from(vec!["12345", "true", "null", "1e3", "~"]),
    )]));

    let parsed: serde_yaml::Value = serde_yaml::from_str(&to_string(&doc)).unwrap();
    let items = parsed["list_id_substring"].as_sequence().unwrap();
    assert!(items.iter().all(serde_yaml::Value::is_string));
}

#[test]
fn test_absent_fields_stay_absent() {
    let doc = Value::from(Mapping::from_iter([
        ("name", Value::from("A")),
        ("replyto_regex", Value::Null),
    ]));

    let parsed: serde_yaml::Value = serde_yaml::from_str(&to_string(&doc)).unwrap();
    assert!(parsed.get("replyto_regex").is_none());
    assert_eq!(parsed["name"].as_str(), Some("A"));
}

#[test]
fn test_empty_rules_parse_as_empty_sequence() {
    let doc = Value::from(Mapping::from_iter([("rules", Value::Sequence(vec![]))]));
    let parsed: serde_yaml::Value = serde_yaml::from_str(&to_string(&doc)).unwrap();
    assert_eq!(parsed["rules"].as_sequence().map(Vec::len), Some(0));
}

#[test]
fn test_write_file_replaces_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cleanup.yaml");
    std::fs::write(&path, "stale").unwrap();

    let doc = Value::from(Mapping::from_iter([("rules", Value::Sequence(vec![]))]));
    write_file(&path, &doc).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "rules: []\n");
    assert!(!dir.path().join("cleanup.yaml.tmp").exists());
}

proptest! {
    #[test]
    fn prop_quoted_scalar_reparses(s in "\\PC*") {
        let text = format!("value: {}\n", quote(&s));
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        prop_assert_eq!(parsed["value"].as_str(), Some(s.as_str()));
    }

    #[test]
    fn prop_control_characters_reparse(s in "[a-z\\\\'\"\\n\\t]{0,16}") {
        let text = format!("value: {}\n", quote(&s));
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        prop_assert_eq!(parsed["value"].as_str(), Some(s.as_str()));
    }
}
