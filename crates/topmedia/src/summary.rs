//! Per-run counters for reporting.

use crate::types::{MediaRow, SuppressReason};
use serde::Serialize;
use std::collections::BTreeMap;

/// How many rows carry one reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: SuppressReason,
    pub count: usize,
}

/// Totals over a processed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub suppressed: usize,
    pub unmapped: usize,
    pub exus_authors: usize,
    pub by_platform: BTreeMap<String, usize>,
    /// In reason order; reasons that never fired are omitted.
    pub reasons: Vec<ReasonCount>,
    /// Keyed by resolution kind (`resolved`, `fallback`, ...).
    pub resolutions: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn from_rows(rows: &[MediaRow]) -> Self {
        let mut summary = Self {
            rows: rows.len(),
            ..Self::default()
        };
        let mut reason_counts: BTreeMap<SuppressReason, usize> = BTreeMap::new();

        for row in rows {
            if row.suppress_flag {
                summary.suppressed += 1;
            }
            if row.assignment().is_unmapped() {
                summary.unmapped += 1;
            }
            if row.is_exus_author {
                summary.exus_authors += 1;
            }
            *summary
                .by_platform
                .entry(row.source_platform.to_string())
                .or_default() += 1;
            for reason in &row.suppress_reasons {
                *reason_counts.entry(*reason).or_default() += 1;
            }
            if let Some(resolution) = &row.resolution {
                *summary
                    .resolutions
                    .entry(resolution.kind().to_string())
                    .or_default() += 1;
            }
        }

        summary.reasons = reason_counts
            .into_iter()
            .map(|(reason, count)| ReasonCount { reason, count })
            .collect();
        summary
    }

    /// Rows that stay in the deliverable.
    pub fn kept(&self) -> usize {
        self.rows - self.suppressed
    }

    pub fn count(&self, reason: SuppressReason) -> usize {
        self.reasons
            .iter()
            .find(|r| r.reason == reason)
            .map(|r| r.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Resolution, SourcePlatform};

    #[test]
    fn test_from_rows() {
        let mut a = MediaRow::new(SourcePlatform::Sprinklr);
        a.group = "Tech".to_string();
        a.outlet = "Wired".to_string();
        a.resolution = Some(Resolution::Resolved);

        let mut b = MediaRow::new(SourcePlatform::Cision);
        b.suppress_flag = true;
        b.suppress_reasons = vec![SuppressReason::NonUsUrl, SuppressReason::DuplicateUrl];
        b.resolution = Some(Resolution::Fallback {
            reason: "timeout".to_string(),
        });

        let summary = RunSummary::from_rows(&[a, b]);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.kept(), 1);
        assert_eq!(summary.unmapped, 1);
        assert_eq!(summary.by_platform["Sprinklr"], 1);
        assert_eq!(summary.by_platform["Cision"], 1);
        assert_eq!(summary.count(SuppressReason::NonUsUrl), 1);
        assert_eq!(summary.count(SuppressReason::ExUsAuthor), 0);
        assert_eq!(summary.reasons[0].reason, SuppressReason::DuplicateUrl);
        assert_eq!(summary.resolutions["fallback"], 1);
        assert_eq!(summary.resolutions["resolved"], 1);
    }
}
