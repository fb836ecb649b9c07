//! Subcommand implementations for the `topmedia` binary.

pub mod combine;
pub mod inspect;
pub mod rules_cmd;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use std::path::Path;
use std::time::Duration;
use topmedia::{HttpResolver, IdentityResolver, ResolutionError, ResolverConfig, Rules, UrlResolver};

/// Resolution flags shared by `combine` and `inspect`.
#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Per-request timeout in seconds
    #[arg(long, env = "TOPMEDIA_TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,

    /// Maximum redirects followed per link
    #[arg(long, env = "TOPMEDIA_MAX_REDIRECTS", default_value_t = 10)]
    pub max_redirects: usize,

    /// User-Agent header sent when resolving links
    #[arg(long, env = "TOPMEDIA_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Skip network resolution and keep permalinks as given
    #[arg(long)]
    pub no_resolve: bool,

    /// Rules document replacing the built-in one
    #[arg(long, env = "TOPMEDIA_RULES")]
    pub rules: Option<std::path::PathBuf>,
}

impl ResolveArgs {
    pub fn config(&self) -> ResolverConfig {
        let defaults = ResolverConfig::default();
        ResolverConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    pub fn resolver(&self) -> Result<Resolver> {
        if self.no_resolve {
            return Ok(Resolver::Identity(IdentityResolver));
        }
        let http = HttpResolver::new(&self.config()).context("Failed to build HTTP client")?;
        Ok(Resolver::Http(http))
    }

    pub fn load_rules(&self) -> Result<Rules> {
        load_rules(self.rules.as_deref())
    }
}

/// Resolver chosen at runtime from `--no-resolve`.
pub enum Resolver {
    Http(HttpResolver),
    Identity(IdentityResolver),
}

impl Resolver {
    pub fn name(&self) -> &'static str {
        match self {
            Resolver::Http(_) => "http",
            Resolver::Identity(_) => "offline",
        }
    }
}

#[async_trait]
impl UrlResolver for Resolver {
    async fn resolve(&self, url: &str) -> Result<String, ResolutionError> {
        match self {
            Resolver::Http(r) => r.resolve(url).await,
            Resolver::Identity(r) => r.resolve(url).await,
        }
    }
}

/// Built-in rules, or the document at `path`.
pub fn load_rules(path: Option<&Path>) -> Result<Rules> {
    match path {
        None => Ok(Rules::embedded().clone()),
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules file {}", path.display()))?;
            Rules::from_json(&json).with_context(|| format!("Invalid rules file {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        resolve: ResolveArgs,
    }

    #[test]
    fn test_resolve_args_defaults() {
        let args = Harness::parse_from(["t"]).resolve;
        let config = args.config();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.user_agent, ResolverConfig::default().user_agent);
    }

    #[test]
    fn test_no_resolve_uses_identity() {
        let args = Harness::parse_from(["t", "--no-resolve", "--timeout-secs", "2"]).resolve;
        assert_eq!(args.config().timeout, Duration::from_secs(2));
        let resolver = args.resolver().unwrap();
        assert_eq!(resolver.name(), "offline");
        let got = tokio_test::block_on(resolver.resolve("https://t.co/x")).unwrap();
        assert_eq!(got, "https://t.co/x");
    }

    #[test]
    fn test_load_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, Rules::embedded().to_json_pretty().unwrap()).unwrap();
        assert_eq!(&load_rules(Some(path.as_path())).unwrap(), Rules::embedded());

        std::fs::write(&path, "{not json").unwrap();
        let err = load_rules(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Invalid rules file"));

        assert!(load_rules(Some(dir.path().join("missing.json").as_path())).is_err());
    }
}
