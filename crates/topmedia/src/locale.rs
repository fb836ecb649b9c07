//! Non-US edition detection from a resolved URL.
//!
//! Two independent rules, either one is enough:
//!
//! - **Subdomain token**: any subdomain label in front of the registrable
//!   domain is a region token (`uk.example.com`).
//! - **First path segment**: only for outlets known to put locale in the path
//!   (`techradar.com/uk/...`). The segment is a region token or a
//!   language-region code (`en-gb`, `fr_ca`) whose language half is a known
//!   language, unless it names a US edition. Section slugs such as `how-to`
//!   have the same shape and are not locales.
//!
//! Anything unparseable is treated as US so that a bad link never removes a
//! row on its own.

use crate::rules::Rules;
use crate::urls::UrlParts;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static LANGUAGE_REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]{2,3})[-_][a-z]{2,3}$").unwrap());

/// Which rule classified a URL as non-US.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LocaleVerdict {
    Us,
    SubdomainToken { token: String },
    PathSegment { segment: String },
}

impl LocaleVerdict {
    pub fn is_non_us(&self) -> bool {
        !matches!(self, Self::Us)
    }
}

/// Whether `resolved_url` points at a non-US edition.
pub fn is_non_us(resolved_url: &str, rules: &Rules) -> bool {
    classify(resolved_url, rules).is_non_us()
}

/// Classify `resolved_url`, reporting which rule fired.
pub fn classify(resolved_url: &str, rules: &Rules) -> LocaleVerdict {
    let Some(parts) = UrlParts::parse(resolved_url) else {
        return LocaleVerdict::Us;
    };
    if parts.is_ip {
        return LocaleVerdict::Us;
    }

    let (base, subdomains) = parts.split_domain();

    if let Some(token) = subdomains.iter().find(|s| rules.region_tokens.contains(*s)) {
        return LocaleVerdict::SubdomainToken {
            token: token.clone(),
        };
    }

    if rules.path_locale_domains.contains(&base) {
        if let Some(segment) = parts.first_segment() {
            if is_locale_segment(segment, rules) {
                return LocaleVerdict::PathSegment {
                    segment: segment.to_string(),
                };
            }
        }
    }

    LocaleVerdict::Us
}

/// Whether a path segment designates a US edition.
pub fn is_us_segment(segment: &str, rules: &Rules) -> bool {
    let segment = segment.to_lowercase();
    segment.ends_with("us") || rules.us_tokens.contains(&segment)
}

fn is_locale_segment(segment: &str, rules: &Rules) -> bool {
    if is_us_segment(segment, rules) {
        return false;
    }
    rules.region_tokens.contains(segment) || is_language_region(segment, rules)
}

fn is_language_region(segment: &str, rules: &Rules) -> bool {
    LANGUAGE_REGION_RE
        .captures(segment)
        .is_some_and(|caps| rules.language_codes.contains(&caps[1].to_lowercase()))
}
