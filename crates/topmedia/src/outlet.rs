//! Group/outlet assignment.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. Aggregator links: kept under the aggregator's own assignment when the
//!    locale is one of the allowed US locales, otherwise marked for removal.
//! 2. Vertical table: substring rules for one syndication partner.
//! 3. Reference table: publication name, then resolved URL.
//! 4. Unmapped: both fields blank, left for manual triage.

use crate::rules::Rules;
use crate::types::Assignment;
use crate::urls::UrlParts;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static AGGREGATOR_LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}-[a-z]{2}$").unwrap());

/// Reference values treated as missing when building keys.
const MISSING_MARKERS: &[&str] = &["", "nan"];

/// The display pair a reference key resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletMapEntry {
    pub group: String,
    pub outlet: String,
}

/// One row of the outlet reference table, as read from the reference file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletRecord {
    pub group: String,
    pub outlet_name: String,
    pub searched_name: String,
    pub url: String,
}

/// Case-insensitive exact-match lookup from outlet names and URLs to their
/// reference entry.
#[derive(Debug, Clone, Default)]
pub struct OutletMap {
    entries: HashMap<String, OutletMapEntry>,
}

impl OutletMap {
    /// Build the map from reference records in file order.
    ///
    /// Each record contributes up to three keys: its outlet name, its
    /// alternate searched name and its URL. A key seen again in a later
    /// record is re-pointed at that record.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = OutletRecord>,
    {
        let mut entries = HashMap::new();
        let mut records_seen = 0usize;

        for record in records {
            records_seen += 1;
            let entry = OutletMapEntry {
                group: record.group.trim().to_string(),
                outlet: record.outlet_name.trim().to_string(),
            };
            for key in [&record.outlet_name, &record.searched_name, &record.url] {
                if let Some(key) = normalize_key(key) {
                    entries.insert(key, entry.clone());
                }
            }
        }

        debug!(records = records_seen, keys = entries.len(), "built outlet map");
        Self { entries }
    }

    /// Look up a single key (trimmed, case-insensitive).
    pub fn get(&self, key: &str) -> Option<&OutletMapEntry> {
        normalize_key(key).and_then(|k| self.entries.get(&k))
    }

    /// Try each key in order and return the first hit.
    pub fn lookup<'a, I>(&self, keys: I) -> Option<&OutletMapEntry>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().find_map(|k| self.get(k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    if MISSING_MARKERS.contains(&key.as_str()) {
        None
    } else {
        Some(key)
    }
}

/// Outcome of the aggregator rule for a URL on the aggregator's host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AggregatorVerdict {
    Keep { locale: String },
    Exclude { locale: Option<String> },
}

/// Apply the aggregator rule. `None` when the URL is not an aggregator link.
///
/// The locale must be the first path segment and look like `ll-rr`; a link
/// with no such segment is excluded.
pub fn aggregator_verdict(resolved_url: &str, rules: &Rules) -> Option<AggregatorVerdict> {
    let parts = UrlParts::parse(resolved_url)?;
    if !parts.host.contains(&rules.aggregator_marker) {
        return None;
    }

    let locale = parts
        .first_segment()
        .filter(|s| AGGREGATOR_LOCALE_RE.is_match(s))
        .map(str::to_string);

    Some(match locale {
        Some(locale) if rules.aggregator_locales.contains(&locale) => {
            AggregatorVerdict::Keep { locale }
        }
        locale => AggregatorVerdict::Exclude { locale },
    })
}

/// Which rule produced an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Aggregator,
    Vertical,
    Reference,
    Unmapped,
}

/// Assign `(group, outlet)` for a row.
pub fn map(
    resolved_url: &str,
    publication_name: &str,
    outlet_map: &OutletMap,
    rules: &Rules,
) -> Assignment {
    map_with_source(resolved_url, publication_name, outlet_map, rules).0
}

/// Like [`map`], also reporting which rule matched.
pub fn map_with_source(
    resolved_url: &str,
    publication_name: &str,
    outlet_map: &OutletMap,
    rules: &Rules,
) -> (Assignment, MappingSource) {
    match aggregator_verdict(resolved_url, rules) {
        Some(AggregatorVerdict::Keep { .. }) => {
            return (rules.aggregator_assignment.clone(), MappingSource::Aggregator);
        }
        Some(AggregatorVerdict::Exclude { .. }) => {
            return (rules.remove_assignment(), MappingSource::Aggregator);
        }
        None => {}
    }

    let url_lc = resolved_url.trim().to_lowercase();
    if !url_lc.is_empty() {
        if let Some(rule) = rules
            .vertical_rules
            .iter()
            .find(|r| url_lc.contains(r.pattern.as_str()))
        {
            return (
                Assignment::new(rule.group.clone(), rule.outlet.clone()),
                MappingSource::Vertical,
            );
        }
    }

    if let Some(entry) = outlet_map.lookup([publication_name, resolved_url]) {
        return (
            Assignment::new(entry.group.clone(), entry.outlet.clone()),
            MappingSource::Reference,
        );
    }

    (Assignment::unmapped(), MappingSource::Unmapped)
}
