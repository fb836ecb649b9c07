//! Batch processing: resolve, classify, map, exclude, flag.
//!
//! Every stage is a `MediaRow -> MediaRow` transformation that reads only
//! fields written by earlier stages. Rows are processed one at a time in
//! input order; the flag stage then runs over the whole batch because
//! duplicate detection needs to see earlier rows.

use crate::author::{self, AuthorExclusionSet};
use crate::flags;
use crate::locale::{self, LocaleVerdict};
use crate::normalizer::{Normalizer, UrlResolver};
use crate::outlet::{self, AggregatorVerdict, MappingSource, OutletMap};
use crate::rules::Rules;
use crate::types::{Assignment, MediaRow, Resolution};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Read-only reference tables for one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub outlets: OutletMap,
    pub exclusions: AuthorExclusionSet,
}

impl ReferenceData {
    pub fn new(outlets: OutletMap, exclusions: AuthorExclusionSet) -> Self {
        Self {
            outlets,
            exclusions,
        }
    }
}

/// Everything the classifiers concluded about a single link.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub raw_url: String,
    pub resolved_url: String,
    pub resolution: Resolution,
    pub locale: LocaleVerdict,
    pub aggregator: Option<AggregatorVerdict>,
    pub assignment: Assignment,
    pub mapping_source: MappingSource,
}

/// Runs the stages over a batch.
pub struct Pipeline<'a, R> {
    rules: &'a Rules,
    reference: &'a ReferenceData,
    normalizer: Normalizer<R>,
}

impl<'a, R: UrlResolver> Pipeline<'a, R> {
    pub fn new(resolver: R, rules: &'a Rules, reference: &'a ReferenceData) -> Self {
        Self {
            rules,
            reference,
            normalizer: Normalizer::new(resolver, rules),
        }
    }

    /// Process a batch without progress reporting.
    pub async fn process(&mut self, rows: Vec<MediaRow>) -> Vec<MediaRow> {
        self.process_with_progress(rows, |_, _| {}).await
    }

    /// Process a batch, calling `on_row(done, total)` after each row.
    pub async fn process_with_progress<F>(&mut self, rows: Vec<MediaRow>, mut on_row: F) -> Vec<MediaRow>
    where
        F: FnMut(usize, usize),
    {
        let total = rows.len();
        let started = Instant::now();
        let mut classified = Vec::with_capacity(total);

        for (i, row) in rows.into_iter().enumerate() {
            let row = self.resolve_row(row).await;
            let row = classify_row(row, self.rules);
            let row = map_row(row, &self.reference.outlets, self.rules);
            let row = exclude_row(row, &self.reference.exclusions);
            classified.push(row);
            on_row(i + 1, total);
        }

        let flagged = flags::flag_rows(classified, self.rules);
        let suppressed = flagged.iter().filter(|r| r.suppress_flag).count();
        info!(
            rows = total,
            suppressed,
            distinct_links = self.normalizer.cached(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch processed"
        );
        flagged
    }

    /// Run every classifier on one link without touching a batch.
    pub async fn inspect(&mut self, raw_url: &str, publication_name: &str) -> Inspection {
        let resolved = self.normalizer.normalize(raw_url).await;
        let (assignment, mapping_source) = outlet::map_with_source(
            &resolved.url,
            publication_name,
            &self.reference.outlets,
            self.rules,
        );
        Inspection {
            raw_url: raw_url.to_string(),
            locale: locale::classify(&resolved.url, self.rules),
            aggregator: outlet::aggregator_verdict(&resolved.url, self.rules),
            resolved_url: resolved.url,
            resolution: resolved.resolution,
            assignment,
            mapping_source,
        }
    }

    async fn resolve_row(&mut self, row: MediaRow) -> MediaRow {
        let resolved = self.normalizer.normalize(&row.raw_permalink).await;
        MediaRow {
            resolved_permalink: resolved.url,
            resolution: Some(resolved.resolution),
            ..row
        }
    }
}

/// Locale stage.
pub fn classify_row(row: MediaRow, rules: &Rules) -> MediaRow {
    MediaRow {
        is_non_us: locale::is_non_us(&row.resolved_permalink, rules),
        ..row
    }
}

/// Outlet stage.
pub fn map_row(row: MediaRow, outlets: &OutletMap, rules: &Rules) -> MediaRow {
    let assignment = outlet::map(&row.resolved_permalink, &row.publication_name, outlets, rules);
    MediaRow {
        group: assignment.group,
        outlet: assignment.outlet,
        ..row
    }
}

/// Author stage.
pub fn exclude_row(row: MediaRow, exclusions: &AuthorExclusionSet) -> MediaRow {
    MediaRow {
        is_exus_author: author::is_excluded_author(&row.publication_name, &row.journalist, exclusions),
        ..row
    }
}
