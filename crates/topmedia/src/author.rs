//! Excluded-region journalist lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One row of the journalist reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub publication: String,
    pub name: String,
    pub geo: String,
}

/// Set of `publication|author` keys for journalists outside the target region.
#[derive(Debug, Clone, Default)]
pub struct AuthorExclusionSet {
    keys: HashSet<String>,
}

impl AuthorExclusionSet {
    /// Keep the records whose `geo` equals `exclusion_geo` (any casing).
    pub fn from_records<I>(records: I, exclusion_geo: &str) -> Self
    where
        I: IntoIterator<Item = AuthorRecord>,
    {
        let keys: HashSet<String> = records
            .into_iter()
            .filter(|r| r.geo.trim().eq_ignore_ascii_case(exclusion_geo.trim()))
            .map(|r| author_key(&r.publication, &r.name))
            .collect();

        debug!(keys = keys.len(), "built author exclusion set");
        Self { keys }
    }

    /// Exact membership test; only surrounding whitespace and case are forgiven.
    pub fn is_excluded(&self, publication: &str, author: &str) -> bool {
        self.keys.contains(&author_key(publication, author))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Composite lookup key: `lower(trim(publication)) | lower(trim(author))`.
pub fn author_key(publication: &str, author: &str) -> String {
    format!(
        "{}|{}",
        publication.trim().to_lowercase(),
        author.trim().to_lowercase()
    )
}

/// Whether `(publication, author)` is an excluded-region journalist.
pub fn is_excluded_author(publication: &str, author: &str, exclusions: &AuthorExclusionSet) -> bool {
    exclusions.is_excluded(publication, author)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(publication: &str, name: &str, geo: &str) -> AuthorRecord {
        AuthorRecord {
            publication: publication.to_string(),
            name: name.to_string(),
            geo: geo.to_string(),
        }
    }

    fn exclusions() -> AuthorExclusionSet {
        AuthorExclusionSet::from_records(
            vec![
                record("TechCrunch", "Jane Doe", "ExUS"),
                record("The Verge", "John Roe", "US"),
                record("Wired", "Ann Poe", " exus "),
            ],
            "EXUS",
        )
    }

    #[test]
    fn test_only_exclusion_geo_kept() {
        let set = exclusions();
        assert_eq!(set.len(), 2);
        assert!(!is_excluded_author("The Verge", "John Roe", &set));
        assert!(is_excluded_author("Wired", "Ann Poe", &set));
    }

    #[test]
    fn test_case_and_outer_whitespace_forgiven() {
        let set = exclusions();
        assert!(is_excluded_author("techcrunch", "JANE DOE", &set));
        assert!(is_excluded_author(" TechCrunch ", "  Jane Doe\t", &set));
    }

    #[test]
    fn test_internal_whitespace_significant() {
        let set = exclusions();
        assert!(!is_excluded_author("TechCrunch", "Jane  Doe", &set));
        assert!(!is_excluded_author("Tech Crunch", "Jane Doe", &set));
    }

    #[test]
    fn test_blank_sides_do_not_match() {
        let set = exclusions();
        assert!(!is_excluded_author("TechCrunch", "", &set));
        assert!(!is_excluded_author("", "Jane Doe", &set));
    }

    #[test]
    fn test_blank_sided_reference_key_matches_literally() {
        let set = AuthorExclusionSet::from_records(vec![record("Reuters", "", "EXUS")], "EXUS");
        assert!(is_excluded_author("Reuters", "  ", &set));
    }

    #[test]
    fn test_author_key() {
        assert_eq!(author_key(" TechCrunch", "Jane Doe "), "techcrunch|jane doe");
    }
}
