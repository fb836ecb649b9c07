//! Classification rules: aggregator handling, vertical table, locale token
//! sets and the reserved markers.
//!
//! The default rules ship embedded as JSON. A replacement document can be
//! loaded with [`Rules::from_json`]; it is normalized (trimmed, lowercased
//! where matching is case-insensitive) and validated before use.

use crate::error::RulesError;
use crate::types::Assignment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

const DEFAULT_RULES_JSON: &str = include_str!("default_rules.json");

/// One entry of the syndication-partner vertical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalRule {
    /// Substring matched against the lowercased resolved URL.
    pub pattern: String,
    pub group: String,
    pub outlet: String,
}

/// Every tunable the classifiers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Host substring identifying the aggregator whose links are preserved.
    pub aggregator_marker: String,
    /// Aggregator locales that stay in the deliverable.
    pub aggregator_locales: BTreeSet<String>,
    /// Assignment for kept aggregator rows.
    pub aggregator_assignment: Assignment,
    /// Reserved value for group/outlet of rows to drop.
    pub remove_marker: String,
    /// `Geo` value marking an excluded-region journalist.
    pub exclusion_geo: String,
    /// Evaluated in order, first match wins.
    pub vertical_rules: Vec<VerticalRule>,
    pub region_tokens: BTreeSet<String>,
    /// Base domains that carry locale in the first path segment.
    pub path_locale_domains: BTreeSet<String>,
    pub us_tokens: BTreeSet<String>,
    /// Language halves accepted in a `xx-yy` / `xx_yy` path segment.
    pub language_codes: BTreeSet<String>,
}

impl Rules {
    /// The rules compiled into the binary.
    pub fn embedded() -> &'static Rules {
        static RULES: OnceLock<Rules> = OnceLock::new();
        RULES.get_or_init(|| {
            Rules::from_json(DEFAULT_RULES_JSON).expect("embedded rules are valid")
        })
    }

    /// Parse, normalize and validate a rules document.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Rules = serde_json::from_str(json)?;
        let rules = rules.normalized();
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_json_pretty(&self) -> Result<String, RulesError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn normalized(self) -> Self {
        Self {
            aggregator_marker: self.aggregator_marker.trim().to_lowercase(),
            aggregator_locales: lower_set(self.aggregator_locales),
            aggregator_assignment: Assignment::new(
                self.aggregator_assignment.group.trim(),
                self.aggregator_assignment.outlet.trim(),
            ),
            remove_marker: self.remove_marker.trim().to_string(),
            exclusion_geo: self.exclusion_geo.trim().to_string(),
            vertical_rules: self
                .vertical_rules
                .into_iter()
                .map(|r| VerticalRule {
                    pattern: r.pattern.trim().to_lowercase(),
                    group: r.group.trim().to_string(),
                    outlet: r.outlet.trim().to_string(),
                })
                .collect(),
            region_tokens: lower_set(self.region_tokens),
            path_locale_domains: lower_set(self.path_locale_domains),
            us_tokens: lower_set(self.us_tokens),
            language_codes: lower_set(self.language_codes),
        }
    }

    fn validate(&self) -> Result<(), RulesError> {
        if self.aggregator_marker.is_empty() {
            return Err(RulesError::Invalid("aggregator_marker is empty".into()));
        }
        if self.remove_marker.is_empty() {
            return Err(RulesError::Invalid("remove_marker is empty".into()));
        }
        if self.exclusion_geo.is_empty() {
            return Err(RulesError::Invalid("exclusion_geo is empty".into()));
        }
        if self.aggregator_assignment.is_unmapped() {
            return Err(RulesError::Invalid(
                "aggregator_assignment needs a group or outlet".into(),
            ));
        }
        if let Some(rule) = self.vertical_rules.iter().find(|r| r.pattern.is_empty()) {
            return Err(RulesError::Invalid(format!(
                "vertical rule for '{}' has an empty pattern",
                rule.outlet
            )));
        }
        Ok(())
    }

    /// Whether `value` is the reserved removal marker (any casing).
    pub fn is_remove_marker(&self, value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(&self.remove_marker)
    }

    /// The sentinel assignment for rows that must leave the deliverable.
    pub fn remove_assignment(&self) -> Assignment {
        Assignment::new(self.remove_marker.clone(), self.remove_marker.clone())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::embedded().clone()
    }
}

fn lower_set(values: BTreeSet<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
