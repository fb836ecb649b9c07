//! Permalink resolution.
//!
//! [`UrlResolver`] does the network work and reports failures as
//! [`ResolutionError`]. [`Normalizer`] wraps a resolver with the row-level
//! policy: blank links stay blank, aggregator links are preserved, failures
//! fall back to the original link, and each distinct link is resolved at
//! most once per run.

use crate::error::ResolutionError;
use crate::rules::Rules;
use crate::types::Resolution;
use crate::urls;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{redirect, Client};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP settings for permalink resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_redirects: 10,
            user_agent: format!("topmedia/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Follows a link to its final destination.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<String, ResolutionError>;
}

/// Resolver that issues one GET per link and follows redirects.
pub struct HttpResolver {
    client: Client,
}

impl HttpResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, ua);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(ResolutionError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UrlResolver for HttpResolver {
    async fn resolve(&self, url: &str) -> Result<String, ResolutionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolutionError::from_reqwest(url, e))?;

        let status = response.status();
        if status.is_redirection() {
            return Err(ResolutionError::UnfollowedRedirect {
                url: url.to_string(),
                status: Some(status.as_u16()),
            });
        }
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "final response is not a success");
        }

        // Only the final location matters; the body is never read.
        Ok(response.url().to_string())
    }
}

/// Resolver that treats every link as already final.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

#[async_trait]
impl UrlResolver for IdentityResolver {
    async fn resolve(&self, url: &str) -> Result<String, ResolutionError> {
        Ok(url.to_string())
    }
}

/// A resolved permalink and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    pub resolution: Resolution,
}

/// Row-level resolution policy with a per-run cache.
pub struct Normalizer<R> {
    resolver: R,
    aggregator_marker: String,
    cache: HashMap<String, String>,
}

impl<R: UrlResolver> Normalizer<R> {
    pub fn new(resolver: R, rules: &Rules) -> Self {
        Self {
            resolver,
            aggregator_marker: rules.aggregator_marker.clone(),
            cache: HashMap::new(),
        }
    }

    /// Resolve `raw` and return only the URL.
    pub async fn resolve(&mut self, raw: &str) -> String {
        self.normalize(raw).await.url
    }

    /// Resolve `raw`, reporting how the result was reached.
    pub async fn normalize(&mut self, raw: &str) -> ResolvedUrl {
        let key = raw.trim();
        if key.is_empty() {
            return ResolvedUrl {
                url: String::new(),
                resolution: Resolution::Empty,
            };
        }

        if urls::host_contains(key, &self.aggregator_marker) {
            return ResolvedUrl {
                url: raw.to_string(),
                resolution: Resolution::Preserved,
            };
        }

        if let Some(hit) = self.cache.get(key) {
            return ResolvedUrl {
                url: hit.clone(),
                resolution: Resolution::Cached,
            };
        }

        let resolved = match self.resolver.resolve(key).await {
            Ok(url) => {
                debug!(from = %key, to = %url, "resolved permalink");
                ResolvedUrl {
                    url,
                    resolution: Resolution::Resolved,
                }
            }
            Err(e) => {
                warn!(url = %key, kind = e.kind(), "resolution failed, keeping original: {e}");
                ResolvedUrl {
                    url: raw.to_string(),
                    resolution: Resolution::Fallback {
                        reason: e.kind().to_string(),
                    },
                }
            }
        };

        self.cache.insert(key.to_string(), resolved.url.clone());
        resolved
    }

    /// Number of distinct links resolved so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
