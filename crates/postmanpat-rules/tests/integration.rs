//! Integration tests for rule generation.
//!
//! These drive a whole session with scripted operator answers, then feed the
//! written watch rules through the batch converter.

use std::fs;

use postmanpat_rules::{
    Analysis, Checkpoint, CheckpointStore, Lens, Matcher, Resume, ScriptedPrompter, SessionConfig,
    convert_document, document, run,
};

const ANALYSIS: &str = r#"{
  "indexes": {
    "list_lens": {
      "clusters": [
        {
          "cluster_id": 1,
          "count": 40,
          "keys": {"ListID": "deals.shop.example"},
          "examples": {"subject_raw": ["50% off", "Last chance"]},
          "latest_date": "2024-06-01"
        }
      ]
    },
    "sender_lens": {
      "clusters": [
        {
          "cluster_id": "s-1",
          "keys": {"SenderDomains": ["news.example", "mail.news.example"]},
          "examples": {"reply_to_domains": ["reply.news.example"]}
        }
      ]
    }
  }
}"#;

#[test]
fn test_generate_then_convert() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::new(dir.path().join("watch.yaml"), dir.path().join("cleanup.yaml"))
        .with_default_folders("INBOX, Promotions");
    let analysis = Analysis::from_json(ANALYSIS).unwrap();
    let mut prompter = ScriptedPrompter::new([
        // list cluster: watch only
        "y", "Deals", "", "",
        "n",
        // sender cluster: watch with reply-to, cleanup with default folders
        "y", "News", "", "move", "Later", "y", "", "n",
        "y", "", "", "", "n", "n",
    ]);

    let report = run(&config, &analysis, &mut prompter).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!((report.watch_rules, report.cleanup_rules), (2, 1));
    assert_eq!(prompter.remaining(), 0);
    assert_eq!(
        CheckpointStore::new(config.checkpoint.clone()).load().unwrap(),
        Some(Checkpoint::new(Lens::SenderLens, "s-1"))
    );

    let cleanup = fs::read_to_string(&config.cleanup_out).unwrap();
    assert_eq!(
        cleanup,
        "\
rules:
  - name: 'News'
    server:
      folders:
        - 'INBOX'
        - 'Promotions'
      sender_substring:
        - 'news.example'
        - 'mail.news.example'
    actions:
      - type: 'delete'
"
    );

    // Convert the generated watch rules in batch.
    let watch = document::read_yaml(&config.watch_out).unwrap();
    let folders = vec!["Archive".to_string()];
    let conversion = convert_document(&watch, &folders).unwrap();

    assert!(conversion.approximate.is_empty());
    let names: Vec<_> = conversion.rules.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Deals", "News"]);

    let Matcher::Server(news) = &conversion.rules.rules[1].matcher else {
        panic!("expected server matcher");
    };
    assert_eq!(news.folders, folders);
    assert_eq!(
        news.sender_substring,
        Some(vec!["news.example".to_string(), "mail.news.example".to_string()])
    );
    assert_eq!(news.replyto_substring, Some(vec!["reply.news.example".to_string()]));
}

#[test]
fn test_interrupted_session_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::new(dir.path().join("watch.yaml"), dir.path().join("cleanup.yaml"));
    let analysis = Analysis::from_json(ANALYSIS).unwrap();

    // First run: finish the list cluster, then input ends.
    let mut first = ScriptedPrompter::new(["y", "Deals", "", "", "n"]);
    let report = run(&config, &analysis, &mut first).unwrap();
    assert!(report.stopped);
    assert_eq!(report.remaining, 1);

    // Second run picks up at the sender cluster and keeps the earlier rule.
    let mut second = ScriptedPrompter::new(["y", "News", "", "", "n", "n", "n"]);
    let report = run(&config, &analysis, &mut second).unwrap();

    assert_eq!(report.resume, Resume::After(Checkpoint::new(Lens::ListLens, "1")));
    assert_eq!(report.processed, 1);
    assert_eq!(report.watch_rules, 2);

    let written = document::existing_rules(&config.watch_out).unwrap();
    let names: Vec<_> = written
        .iter()
        .filter_map(|r| r.as_mapping()?.get("name")?.as_str())
        .collect();
    assert_eq!(names, vec!["Deals", "News"]);
}
