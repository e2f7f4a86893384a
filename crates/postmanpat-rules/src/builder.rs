//! Interactive rule building for one cluster.
//!
//! For each cluster the operator is shown a summary, then asked whether to
//! create a watch rule and a cleanup rule. Defaults are derived from the
//! cluster keys: escaped regexes for watch rules, raw substrings for cleanup
//! rules.

use tracing::{debug, warn};

use crate::analysis::{Cluster, Lens};
use crate::pattern::escape_literal;
use crate::prompt::{Answer, PromptResult, Prompter, ask_required, ask_yes_no, split_list};
use crate::rule::{Action, ClientMatcher, Matcher, Rule, ServerMatcher};

/// Values shown per example field in the cluster preview.
pub const PREVIEW_LIMIT: usize = 3;

/// Shown before offering `recipients_regex`.
pub const RECIPIENTS_REGEX_NOTE: &str = "Note: client.recipients_regex is not implemented yet.";

/// Rules produced for a completed cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterRules {
    /// Watch rule, if the operator asked for one.
    pub watch: Option<Rule>,
    /// Cleanup rule, if the operator asked for one.
    pub cleanup: Option<Rule>,
}

/// Outcome of processing one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Cluster completed.
    Continue {
        /// Rules built for the cluster.
        rules: ClusterRules,
        /// Folder default to offer for the next cleanup rule.
        default_folders: String,
    },
    /// Operator asked to stop. Nothing built for this cluster is kept.
    Quit,
}

/// Walks the operator through one cluster.
///
/// `default_folders` is the comma-separated folder list offered for a
/// cleanup rule; the folders chosen here are returned as the next default.
///
/// # Errors
///
/// Propagates prompt failures, including closed input.
pub fn process_cluster(
    prompter: &mut dyn Prompter,
    lens: Lens,
    cluster: &Cluster,
    default_folders: &str,
) -> PromptResult<Step> {
    debug!(lens = %lens, cluster_id = %cluster.cluster_id, "processing cluster");
    prompter.say("");
    prompter.say("=== Cluster ===");
    prompter.say(&cluster.summary());
    for line in cluster.preview(PREVIEW_LIMIT) {
        prompter.say(&format!("  {line}"));
    }

    let mut builder = RuleBuilder {
        prompter,
        lens,
        cluster,
        name: None,
    };
    let mut rules = ClusterRules::default();

    match ask_yes_no(builder.prompter, "Generate watch rule?", false)? {
        Answer::Quit => return Ok(Step::Quit),
        Answer::Yes => rules.watch = Some(builder.watch_rule()?),
        Answer::No => {}
    }

    let mut folders = default_folders.to_string();
    match ask_yes_no(builder.prompter, "Generate cleanup rule?", false)? {
        Answer::Quit => return Ok(Step::Quit),
        Answer::Yes => {
            let (rule, chosen) = builder.cleanup_rule(default_folders)?;
            rules.cleanup = Some(rule);
            folders = chosen;
        }
        Answer::No => {}
    }

    Ok(Step::Continue {
        rules,
        default_folders: folders,
    })
}

struct RuleBuilder<'a> {
    prompter: &'a mut dyn Prompter,
    lens: Lens,
    cluster: &'a Cluster,
    /// Asked once per cluster and shared by both rules.
    name: Option<String>,
}

impl RuleBuilder<'_> {
    fn rule_name(&mut self) -> PromptResult<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        self.prompter.say("");
        self.prompter.say(&format!("Rule for {}:", self.lens));
        self.prompter.say(&self.cluster.summary());
        let name = ask_required(self.prompter, "Rule name", None)?;
        self.name = Some(name.clone());
        Ok(name)
    }

    fn watch_rule(&mut self) -> PromptResult<Rule> {
        let name = self.rule_name()?;
        let (matcher, action) = match self.lens {
            Lens::ListLens => self.list_client()?,
            Lens::SenderLens => self.sender_client()?,
        };
        Ok(Rule {
            name,
            matcher: Matcher::Client(matcher),
            actions: vec![action],
        })
    }

    fn cleanup_rule(&mut self, default_folders: &str) -> PromptResult<(Rule, String)> {
        let name = self.rule_name()?;
        let (matcher, action) = match self.lens {
            Lens::ListLens => self.list_server(default_folders)?,
            Lens::SenderLens => self.sender_server(default_folders)?,
        };
        let folders = matcher.folders.join(", ");
        Ok((
            Rule {
                name,
                matcher: Matcher::Server(matcher),
                actions: vec![action],
            },
            folders,
        ))
    }

    // The lens helpers ask for the action right after the primary field
    // (and folders), before any opt-in fields.

    fn list_client(&mut self) -> PromptResult<(ClientMatcher, Action)> {
        let default = self.cluster.list_id().map(|id| escape_literal(&id));
        let regex = ask_required(self.prompter, "list_id_regex", default.as_deref())?;
        let action = ask_action(self.prompter)?;
        let matcher = ClientMatcher {
            list_id_regex: Some(vec![regex]),
            ..ClientMatcher::default()
        };
        Ok((matcher, action))
    }

    fn sender_client(&mut self) -> PromptResult<(ClientMatcher, Action)> {
        let domains: Vec<String> = self
            .cluster
            .sender_domains()
            .iter()
            .map(|d| escape_literal(d))
            .collect();
        let sender = ask_list(
            self.prompter,
            "sender_regex (comma-separated)",
            &domains.join(", "),
        )?;
        let action = ask_action(self.prompter)?;

        // Reply-to is offered only when the analysis saw reply-to values.
        let reply_defaults: Vec<String> = self
            .cluster
            .example_values("reply_to_domains")
            .iter()
            .map(|v| escape_literal(v))
            .collect();
        let replyto = if reply_defaults.is_empty() {
            None
        } else {
            ask_optional_list(self.prompter, "replyto_regex", &reply_defaults, None)?
        };

        let recipient_defaults: Vec<String> = self
            .cluster
            .example_values("recipients")
            .iter()
            .map(|v| escape_literal(v))
            .collect();
        let recipients = ask_optional_list(
            self.prompter,
            "recipients_regex",
            &recipient_defaults,
            Some(RECIPIENTS_REGEX_NOTE),
        )?;
        if recipients.is_some() {
            warn!(cluster_id = %self.cluster.cluster_id, "recipients_regex added but not yet enforced by postmanpat");
        }

        let matcher = ClientMatcher {
            sender_regex: Some(sender),
            replyto_regex: replyto,
            recipients_regex: recipients,
            ..ClientMatcher::default()
        };
        Ok((matcher, action))
    }

    fn list_server(&mut self, default_folders: &str) -> PromptResult<(ServerMatcher, Action)> {
        let default = self.cluster.list_id();
        let substring = ask_required(self.prompter, "list_id_substring", default.as_deref())?;
        let mut matcher = ServerMatcher::new(ask_folders(self.prompter, default_folders)?);
        matcher.list_id_substring = Some(vec![substring]);
        let action = ask_action(self.prompter)?;
        Ok((matcher, action))
    }

    fn sender_server(&mut self, default_folders: &str) -> PromptResult<(ServerMatcher, Action)> {
        let domains = self.cluster.sender_domains();
        let sender = ask_list(
            self.prompter,
            "sender_substring (comma-separated)",
            &domains.join(", "),
        )?;
        let mut matcher = ServerMatcher::new(ask_folders(self.prompter, default_folders)?);
        matcher.sender_substring = Some(sender);
        let action = ask_action(self.prompter)?;

        let reply_defaults = self.cluster.example_values("reply_to_domains");
        if !reply_defaults.is_empty() {
            matcher.replyto_substring =
                ask_optional_list(self.prompter, "replyto_substring", &reply_defaults, None)?;
        }
        let recipient_defaults = self.cluster.example_values("recipients");
        matcher.recipients =
            ask_optional_list(self.prompter, "recipients", &recipient_defaults, None)?;
        Ok((matcher, action))
    }
}

/// Asks for the rule action. Unknown answers fall back to delete.
fn ask_action(prompter: &mut dyn Prompter) -> PromptResult<Action> {
    let answer = ask_required(prompter, "Action (delete/move)", Some("delete"))?.to_lowercase();
    match answer.as_str() {
        "delete" => Ok(Action::Delete),
        "move" => {
            let destination = ask_required(prompter, "Move destination", None)?;
            Ok(Action::Move { destination })
        }
        other => {
            warn!(answer = other, "unrecognized action, using delete");
            prompter.say("Invalid action; using delete.");
            Ok(Action::Delete)
        }
    }
}

/// Asks for source folders until at least one is given.
fn ask_folders(prompter: &mut dyn Prompter, default: &str) -> PromptResult<Vec<String>> {
    loop {
        let raw = ask_required(prompter, "IMAP Source folders (comma-separated)", Some(default))?;
        let folders = split_list(&raw);
        if !folders.is_empty() {
            return Ok(folders);
        }
        prompter.say("At least one folder is required.");
    }
}

/// Asks for a comma-separated list until it has at least one item.
fn ask_list(prompter: &mut dyn Prompter, message: &str, default: &str) -> PromptResult<Vec<String>> {
    loop {
        let values = split_list(&ask_required(prompter, message, Some(default))?);
        if !values.is_empty() {
            return Ok(values);
        }
        prompter.say("At least one value is required.");
    }
}

/// Offers an optional field. Returns `None` unless the operator opts in and
/// gives at least one value.
fn ask_optional_list(
    prompter: &mut dyn Prompter,
    field: &str,
    defaults: &[String],
    note: Option<&str>,
) -> PromptResult<Option<Vec<String>>> {
    if let Some(note) = note {
        prompter.say(note);
    }
    if ask_yes_no(prompter, &format!("Add {field}?"), false)? != Answer::Yes {
        return Ok(None);
    }
    let default = defaults.join(", ");
    let values = split_list(&prompter.ask(&format!("{field} (comma-separated)"), Some(&default))?);
    if values.is_empty() {
        prompter.say(&format!("No values given; leaving out {field}."));
        return Ok(None);
    }
    Ok(Some(values))
}
