//! Lenient URL parsing helpers shared by the classifiers.

use url::{Host, Url};

/// Two-label public suffixes under which the registrable domain has three
/// labels (`bbc.co.uk`, not `co.uk`).
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "ltd.uk", "plc.uk",
    "com.au", "net.au", "org.au", "co.nz", "net.nz", "org.nz",
    "co.jp", "ne.jp", "or.jp", "co.kr", "or.kr", "co.in", "net.in", "org.in",
    "co.za", "org.za", "com.br", "com.mx", "com.ar", "com.sg", "com.hk",
    "com.tw", "com.cn", "com.tr", "com.my", "com.ph", "co.il", "co.id",
];

/// A parsed URL reduced to what the classifiers look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlParts {
    /// Lowercased host name.
    pub host: String,
    /// Lowercased path segments, empty ones removed.
    pub segments: Vec<String>,
    /// Whether the host is an IP literal.
    pub is_ip: bool,
}

impl UrlParts {
    /// Parse `raw`, assuming `https://` when no scheme is given.
    ///
    /// Returns `None` for blank input or anything without a host.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let url = match Url::parse(raw) {
            Ok(url) if url.has_host() => url,
            _ => Url::parse(&format!("https://{raw}")).ok()?,
        };

        let (host, is_ip) = match url.host()? {
            Host::Domain(d) => (d.trim_end_matches('.').to_lowercase(), false),
            Host::Ipv4(ip) => (ip.to_string(), true),
            Host::Ipv6(ip) => (ip.to_string(), true),
        };
        if host.is_empty() {
            return None;
        }

        let segments = url
            .path_segments()
            .map(|segs| {
                segs.filter(|s| !s.is_empty())
                    .map(|s| s.to_lowercase())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            host,
            segments,
            is_ip,
        })
    }

    /// First non-empty path segment.
    pub fn first_segment(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Registrable base domain and the subdomain labels in front of it.
    pub fn split_domain(&self) -> (String, Vec<String>) {
        if self.is_ip {
            return (self.host.clone(), Vec::new());
        }

        let labels: Vec<&str> = self.host.split('.').collect();
        if labels.len() <= 2 {
            return (self.host.clone(), Vec::new());
        }

        let last_two = labels[labels.len() - 2..].join(".");
        let base_len = if MULTI_PART_SUFFIXES.contains(&last_two.as_str()) {
            3
        } else {
            2
        };
        if labels.len() <= base_len {
            return (self.host.clone(), Vec::new());
        }

        let split = labels.len() - base_len;
        let base = labels[split..].join(".");
        let subdomains = labels[..split].iter().map(|s| s.to_string()).collect();
        (base, subdomains)
    }
}

/// Whether `raw` has a host containing `marker`. `marker` must be lowercase.
pub(crate) fn host_contains(raw: &str, marker: &str) -> bool {
    UrlParts::parse(raw)
        .map(|p| p.host.contains(marker))
        .unwrap_or(false)
}
