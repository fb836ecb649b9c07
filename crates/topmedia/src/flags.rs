//! Suppression flags and reasons.
//!
//! Runs last, after every row carries its resolved URL, locale verdict,
//! assignment and author flag. Conditions are checked independently, so a
//! row can collect several reasons; they are always listed in
//! [`SuppressReason`] order.

use crate::outlet::{self, AggregatorVerdict};
use crate::rules::Rules;
use crate::types::{MediaRow, SuppressReason};
use std::collections::HashSet;

/// For each row, whether an earlier row already used the same resolved URL.
///
/// Comparison is case-insensitive. Rows without a resolved URL are never
/// duplicates.
pub fn duplicate_mask(rows: &[MediaRow]) -> Vec<bool> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.iter()
        .map(|row| {
            let key = row.resolved_permalink.trim().to_lowercase();
            !key.is_empty() && !seen.insert(key)
        })
        .collect()
}

/// Reasons for one row, given whether it repeats an earlier URL.
pub fn reasons_for(row: &MediaRow, is_duplicate: bool, rules: &Rules) -> Vec<SuppressReason> {
    let mut reasons = Vec::new();

    if is_duplicate {
        reasons.push(SuppressReason::DuplicateUrl);
    }
    if row.is_exus_author {
        reasons.push(SuppressReason::ExUsAuthor);
    }
    if rules.is_remove_marker(&row.group) {
        reasons.push(SuppressReason::RemoveGroup);
    }
    if rules.is_remove_marker(&row.outlet) {
        reasons.push(SuppressReason::RemoveOutlet);
    }

    let aggregator_non_us = matches!(
        outlet::aggregator_verdict(&row.resolved_permalink, rules),
        Some(AggregatorVerdict::Exclude { .. })
    );
    if aggregator_non_us {
        reasons.push(SuppressReason::AggregatorNonUs);
    } else if row.is_non_us {
        reasons.push(SuppressReason::NonUsUrl);
    }

    reasons
}

/// Flag a whole batch. Row order is the duplicate-detection order.
pub fn flag_rows(rows: Vec<MediaRow>, rules: &Rules) -> Vec<MediaRow> {
    let duplicates = duplicate_mask(&rows);
    rows.into_iter()
        .zip(duplicates)
        .map(|(row, is_duplicate)| {
            let suppress_reasons = reasons_for(&row, is_duplicate, rules);
            MediaRow {
                suppress_flag: !suppress_reasons.is_empty(),
                suppress_reasons,
                ..row
            }
        })
        .collect()
}
