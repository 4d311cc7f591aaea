//! Routing rule evaluation
//!
//! Rules are checked top to bottom against an incoming issue. A rule matches
//! when every criterion it specifies holds; `negate` flips the combined result.
//! Evaluation never fails: a rule that cannot match is simply left out.

use regex::RegexBuilder;
use serde::Serialize;

use crate::schemas::{IssueContext, LabelMatch, MatchCriteria, RoutingConfig, RoutingRule};

/// A rule that matched, with its position in the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRule {
    pub index: usize,
    pub rule: RoutingRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingEvaluation {
    pub matched_rules: Vec<MatchedRule>,
    /// True when evaluation returned at the first match
    pub stopped_early: bool,
}

impl RoutingEvaluation {
    pub fn is_match(&self) -> bool {
        !self.matched_rules.is_empty()
    }
}

/// Translate a repository glob into an anchored regex.
///
/// `**` crosses `/`, `*` stays within one segment, everything else is literal.
/// There is no escape for a literal `*`.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            out.push_str(".*");
            rest = after;
        } else if let Some(after) = rest.strip_prefix('*') {
            out.push_str("[^/]*");
            rest = after;
        } else {
            let end = rest.find('*').unwrap_or(rest.len());
            out.push_str(&regex::escape(&rest[..end]));
            rest = &rest[end..];
        }
    }
    out.push('$');
    out
}

/// Case-insensitive glob match of `owner/name` against a pattern
pub fn repo_matches(pattern: &str, repo: &str) -> bool {
    match RegexBuilder::new(&glob_to_regex(pattern))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.is_match(repo),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "repo glob did not compile");
            false
        }
    }
}

/// Unicode-aware case-insensitive equality, matching the repo regex's folding
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn has_label(labels: &[String], wanted: &str) -> bool {
    labels.iter().any(|l| eq_ignore_case(l, wanted))
}

/// `any` needs a shared label, `all` needs every label; both must hold when given.
pub fn labels_match(criteria: &LabelMatch, labels: &[String]) -> bool {
    let any_ok = match &criteria.any {
        Some(any) => any.iter().any(|wanted| has_label(labels, wanted)),
        None => true,
    };
    let all_ok = match &criteria.all {
        Some(all) => all.iter().all(|wanted| has_label(labels, wanted)),
        None => true,
    };
    any_ok && all_ok
}

/// Whether the criteria select this issue; omitted criteria always hold.
pub fn criteria_match(criteria: &MatchCriteria, issue: &IssueContext) -> bool {
    let repo_ok = criteria
        .repo
        .as_deref()
        .map(|pattern| repo_matches(pattern, &issue.repo))
        .unwrap_or(true);
    let labels_ok = criteria
        .labels
        .as_ref()
        .map(|labels| labels_match(labels, &issue.labels))
        .unwrap_or(true);
    let type_ok = match (&criteria.issue_type, &issue.issue_type) {
        (None, _) => true,
        (Some(wanted), Some(actual)) => eq_ignore_case(wanted, actual),
        (Some(_), None) => false,
    };

    let matched = repo_ok && labels_ok && type_ok;
    matched != criteria.negate
}

/// Evaluate rules in order against an issue.
///
/// Disabled rules are skipped. With `stop_on_first_match` the first match is
/// returned alone; otherwise every match is collected.
pub fn evaluate_rules(config: &RoutingConfig, issue: &IssueContext) -> RoutingEvaluation {
    let mut matched_rules = Vec::new();

    for (index, rule) in config.rules.iter().enumerate() {
        if !rule.enabled {
            continue;
        }
        if !criteria_match(&rule.criteria, issue) {
            continue;
        }

        tracing::debug!(
            rule = %rule.display_name(index),
            repo = %issue.repo,
            "routing rule matched"
        );
        matched_rules.push(MatchedRule {
            index,
            rule: rule.clone(),
        });

        if config.stop_on_first_match {
            return RoutingEvaluation {
                matched_rules,
                stopped_early: true,
            };
        }
    }

    RoutingEvaluation {
        matched_rules,
        stopped_early: false,
    }
}
