//! Category rule set: an ordered list of labelled substring rules.
//!
//! Rules are loaded from configuration as plain data ([`RuleSetConfig`]) and
//! turned into a validated [`RuleSet`] exactly once per run. A `RuleSet` can
//! only be obtained through validation, so matching never meets an empty term
//! list or a duplicate label.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::finance::UNCATEGORIZED;

/// Whether a rule names a spending category or an income source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    #[default]
    Expense,
    Income,
}

/// One labelled rule as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleConfig {
    pub label: String,
    #[serde(default)]
    pub kind: RuleKind,
    #[serde(rename = "match")]
    pub match_terms: Vec<String>,
}

/// The `[categorize]` configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSetConfig {
    #[serde(default = "default_true")]
    pub case_insensitive: bool,
    #[serde(default = "default_true")]
    pub first_match_wins: bool,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

fn default_true() -> bool {
    true
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            first_match_wins: true,
            default_category: default_category(),
            rules: Vec::new(),
        }
    }
}

/// A validated rule. Terms are pre-folded when matching is case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRule {
    label: String,
    kind: RuleKind,
    match_terms: Vec<String>,
}

impl CategoryRule {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn match_terms(&self) -> &[String] {
        &self.match_terms
    }

    /// `text` must already be folded the same way as the terms.
    fn matches_folded(&self, text: &str) -> bool {
        self.match_terms.iter().any(|term| text.contains(term.as_str()))
    }
}

/// Ordered rules plus run-wide matching options. Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
    default_category: String,
    case_insensitive: bool,
}

impl RuleSet {
    /// Validate and build a rule set.
    ///
    /// Fails with [`Error::Config`] on an empty label, an empty term list, a
    /// blank term, a duplicate label, a blank default category, or
    /// `first_match_wins = false` (only first-match evaluation is supported).
    pub fn new(config: RuleSetConfig) -> Result<Self> {
        if !config.first_match_wins {
            return Err(Error::config(
                "first_match_wins = false is not supported; rules are evaluated first-match-wins",
            ));
        }

        let default_category = config.default_category.trim().to_string();
        if default_category.is_empty() {
            return Err(Error::config("default_category must not be empty"));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut rules = Vec::with_capacity(config.rules.len());

        for (i, rule) in config.rules.iter().enumerate() {
            let label = rule.label.trim();
            if label.is_empty() {
                return Err(Error::config(format!("rule #{} has an empty label", i + 1)));
            }
            if !seen.insert(label) {
                return Err(Error::config(format!("duplicate rule label: {label}")));
            }
            if rule.match_terms.is_empty() {
                return Err(Error::config(format!("rule {label:?} has no match terms")));
            }
            if rule.match_terms.iter().any(|t| t.trim().is_empty()) {
                return Err(Error::config(format!("rule {label:?} has a blank match term")));
            }

            let match_terms = rule
                .match_terms
                .iter()
                .map(|t| fold(t.trim(), config.case_insensitive))
                .collect();

            rules.push(CategoryRule {
                label: label.to_string(),
                kind: rule.kind,
                match_terms,
            });
        }

        Ok(Self {
            rules,
            default_category,
            case_insensitive: config.case_insensitive,
        })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Labels of every income-source rule, in rule order
    pub fn income_labels(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.kind == RuleKind::Income)
            .map(|r| r.label.as_str())
    }

    /// First rule (in configuration order) whose terms occur in `description`.
    pub fn first_match(&self, description: &str) -> Option<&CategoryRule> {
        let text = fold(description, self.case_insensitive);
        self.rules.iter().find(|r| r.matches_folded(&text))
    }

    /// Label for `description`, or the default category when no rule matches.
    pub fn label_for(&self, description: &str) -> &str {
        self.first_match(description)
            .map(|r| r.label.as_str())
            .unwrap_or(self.default_category.as_str())
    }
}

impl TryFrom<RuleSetConfig> for RuleSet {
    type Error = Error;

    fn try_from(config: RuleSetConfig) -> Result<Self> {
        RuleSet::new(config)
    }
}

fn fold(s: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        s.to_lowercase()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(label: &str, kind: RuleKind, terms: &[&str]) -> RuleConfig {
        RuleConfig {
            label: label.to_string(),
            kind,
            match_terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn config(rules: Vec<RuleConfig>) -> RuleSetConfig {
        RuleSetConfig {
            rules,
            ..RuleSetConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = RuleSetConfig::default();
        assert!(cfg.case_insensitive);
        assert!(cfg.first_match_wins);
        assert_eq!(cfg.default_category, "uncategorized");
        let set = RuleSet::new(cfg).unwrap();
        assert_eq!(set.label_for("anything"), "uncategorized");
    }

    #[test]
    fn test_first_match_in_config_order() {
        let set = RuleSet::new(config(vec![
            rule("groceries", RuleKind::Expense, &["lidl"]),
            rule("tutoring", RuleKind::Income, &["euklido akademija"]),
            rule("shops", RuleKind::Expense, &["lidl", "iki"]),
        ]))
        .unwrap();

        assert_eq!(set.label_for("LIDL VILNIUS"), "groceries");
        assert_eq!(set.label_for("IKI Gedimino"), "shops");
        assert_eq!(set.label_for("Euklido Akademija UAB"), "tutoring");
        assert_eq!(set.label_for("Bolt ride"), "uncategorized");
    }

    #[test]
    fn test_case_sensitive_matching() {
        let mut cfg = config(vec![rule("groceries", RuleKind::Expense, &["LIDL"])]);
        cfg.case_insensitive = false;
        let set = RuleSet::new(cfg).unwrap();
        assert_eq!(set.label_for("LIDL VILNIUS"), "groceries");
        assert_eq!(set.label_for("Lidl Vilnius"), "uncategorized");
    }

    #[test]
    fn test_income_labels() {
        let set = RuleSet::new(config(vec![
            rule("salary", RuleKind::Income, &["acme"]),
            rule("food", RuleKind::Expense, &["cafe"]),
            rule("students", RuleKind::Income, &["lesson"]),
        ]))
        .unwrap();
        let labels: Vec<_> = set.income_labels().collect();
        assert_eq!(labels, vec!["salary", "students"]);
    }

    #[test]
    fn test_rejects_empty_terms() {
        let err = RuleSet::new(config(vec![rule("food", RuleKind::Expense, &[])])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("no match terms"));

        let err = RuleSet::new(config(vec![rule("food", RuleKind::Expense, &["  "])])).unwrap_err();
        assert!(err.to_string().contains("blank match term"));
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let err = RuleSet::new(config(vec![
            rule("food", RuleKind::Expense, &["cafe"]),
            rule("food", RuleKind::Expense, &["bistro"]),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate rule label: food"));
    }

    #[test]
    fn test_rejects_multi_match_mode() {
        let mut cfg = config(vec![rule("food", RuleKind::Expense, &["cafe"])]);
        cfg.first_match_wins = false;
        assert!(matches!(RuleSet::new(cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_blank_default() {
        let mut cfg = RuleSetConfig::default();
        cfg.default_category = " ".to_string();
        assert!(RuleSet::try_from(cfg).is_err());
    }
}
