//! Row and label types shared by every stage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separator used when suppression reasons are rendered as one cell.
pub const REASON_SEPARATOR: &str = "; ";

/// Vendor a row was exported from. Batches are concatenated in declaration
/// order: every Sprinklr row precedes every Cision row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourcePlatform {
    Sprinklr,
    Cision,
}

impl SourcePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sprinklr => "Sprinklr",
            Self::Cision => "Cision",
        }
    }
}

impl fmt::Display for SourcePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a row is marked for removal. Variant order is the rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuppressReason {
    #[serde(rename = "Duplicate URL")]
    DuplicateUrl,
    #[serde(rename = "ExUS Author")]
    ExUsAuthor,
    #[serde(rename = "REMOVE Group")]
    RemoveGroup,
    #[serde(rename = "REMOVE Outlet")]
    RemoveOutlet,
    #[serde(rename = "MSN Non-US")]
    AggregatorNonUs,
    #[serde(rename = "Non-US URL")]
    NonUsUrl,
}

impl SuppressReason {
    /// Every reason, in rendering order.
    pub const ALL: [SuppressReason; 6] = [
        Self::DuplicateUrl,
        Self::ExUsAuthor,
        Self::RemoveGroup,
        Self::RemoveOutlet,
        Self::AggregatorNonUs,
        Self::NonUsUrl,
    ];

    /// Label shown to reviewers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DuplicateUrl => "Duplicate URL",
            Self::ExUsAuthor => "ExUS Author",
            Self::RemoveGroup => "REMOVE Group",
            Self::RemoveOutlet => "REMOVE Outlet",
            Self::AggregatorNonUs => "MSN Non-US",
            Self::NonUsUrl => "Non-US URL",
        }
    }
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a permalink was turned into its resolved form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// No permalink; nothing to resolve.
    Empty,
    /// Aggregator link kept as-is.
    Preserved,
    /// Followed to its final destination.
    Resolved,
    /// Answered from this run's cache.
    Cached,
    /// Resolution failed; the original link was kept.
    Fallback { reason: String },
}

impl Resolution {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Preserved => "preserved",
            Self::Resolved => "resolved",
            Self::Cached => "cached",
            Self::Fallback { .. } => "fallback",
        }
    }
}

/// A `(group, outlet)` pair. Both blank means unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub group: String,
    pub outlet: String,
}

impl Assignment {
    pub fn new(group: impl Into<String>, outlet: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            outlet: outlet.into(),
        }
    }

    pub fn unmapped() -> Self {
        Self::default()
    }

    pub fn is_unmapped(&self) -> bool {
        self.group.is_empty() && self.outlet.is_empty()
    }
}

/// One reported mention.
///
/// The first block of fields comes from the vendor export. Everything under
/// "derived" is written by exactly one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRow {
    pub created_time: Option<NaiveDate>,
    pub source_type: String,
    pub publication_name: String,
    pub media_title: String,
    pub raw_permalink: String,
    pub journalist: String,
    pub sentiment: String,
    pub source_platform: SourcePlatform,
    /// Vendor columns carried through untouched (country, reach, EMV...).
    #[serde(default)]
    pub extra: BTreeMap<String, String>,

    // derived
    pub resolved_permalink: String,
    pub resolution: Option<Resolution>,
    pub is_non_us: bool,
    pub group: String,
    pub outlet: String,
    pub is_exus_author: bool,
    pub suppress_flag: bool,
    pub suppress_reasons: Vec<SuppressReason>,
}

impl MediaRow {
    /// A row with only its platform set; callers fill the vendor fields.
    pub fn new(source_platform: SourcePlatform) -> Self {
        Self {
            created_time: None,
            source_type: String::new(),
            publication_name: String::new(),
            media_title: String::new(),
            raw_permalink: String::new(),
            journalist: String::new(),
            sentiment: String::new(),
            source_platform,
            extra: BTreeMap::new(),
            resolved_permalink: String::new(),
            resolution: None,
            is_non_us: false,
            group: String::new(),
            outlet: String::new(),
            is_exus_author: false,
            suppress_flag: false,
            suppress_reasons: Vec::new(),
        }
    }

    pub fn with_publication(mut self, publication: &str) -> Self {
        self.publication_name = publication.to_string();
        self
    }

    pub fn with_permalink(mut self, permalink: &str) -> Self {
        self.raw_permalink = permalink.to_string();
        self
    }

    pub fn with_journalist(mut self, journalist: &str) -> Self {
        self.journalist = journalist.to_string();
        self
    }

    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.group.clone(), self.outlet.clone())
    }

    /// Suppression reasons as a single display string.
    pub fn reasons_display(&self) -> String {
        self.suppress_reasons
            .iter()
            .map(SuppressReason::label)
            .collect::<Vec<_>>()
            .join(REASON_SEPARATOR)
    }
}
