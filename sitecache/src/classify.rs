//! URL classification into caching strategies.
//!
//! Classification is one ordered table of (matcher, decision) rules,
//! evaluated top to bottom with first match winning. The order is a policy
//! statement: privacy-sensitive and highly dynamic endpoints are excluded
//! before anything else, and the most aggressive caching is reserved for
//! assets that only change with a deploy.
//!
//! Classification is a pure function of the URL text; nothing here reads
//! cache or network state.

use crate::config::WorkerConfig;
use crate::registry::Category;
use std::collections::HashSet;
use url::Url;

/// The read/write policy applied to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
    CacheFirstImages,
}

/// Result of classifying a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Never intercepted: no cache entry is ever created or read
    Bypass,
    /// Handled by the given strategy, storing into the given category
    Handle {
        strategy: Strategy,
        category: Category,
    },
}

/// Structural pieces of a request URL used for matching.
///
/// Relative inputs ("/index.html") are treated as same-origin paths with no
/// scheme or host.
#[derive(Debug)]
struct UrlParts {
    scheme: Option<String>,
    host: Option<String>,
    path: String,
}

impl UrlParts {
    fn parse(url: &str) -> Self {
        if let Ok(parsed) = Url::parse(url) {
            return Self {
                scheme: Some(parsed.scheme().to_string()),
                host: parsed.host_str().map(|h| h.to_ascii_lowercase()),
                path: parsed.path().to_string(),
            };
        }

        // Same-origin path; strip any query for path matching
        let path = url.split(['?', '#']).next().unwrap_or(url).to_string();
        Self {
            scheme: None,
            host: None,
            path,
        }
    }

    fn host_matches(&self, domain: &str) -> bool {
        match &self.host {
            Some(host) => host == domain || host.ends_with(&format!(".{}", domain)),
            None => false,
        }
    }
}

/// One way a rule can match a URL.
#[derive(Debug)]
enum Matcher {
    /// URL scheme is one of these
    Scheme(Vec<String>),
    /// Path equals one of these exactly
    PathExact(HashSet<String>),
    /// Full URL text equals one of these exactly
    UrlExact(HashSet<String>),
    /// Path starts with one of these
    PathPrefix(Vec<String>),
    /// Path ends with one of these (case-insensitive)
    PathSuffix(Vec<String>),
    /// Host equals or is a subdomain of one of these
    Host(Vec<String>),
    /// Host matches the domain and the path starts with the prefix
    HostPathPrefix { domain: String, prefix: String },
    /// Any of the nested matchers
    AnyOf(Vec<Matcher>),
    /// Unconditional (the default rule)
    Always,
}

impl Matcher {
    fn matches(&self, url: &str, parts: &UrlParts) -> bool {
        match self {
            Matcher::Scheme(schemes) => parts
                .scheme
                .as_deref()
                .map(|s| schemes.iter().any(|candidate| candidate == s))
                .unwrap_or(false),
            Matcher::PathExact(paths) => paths.contains(&parts.path),
            Matcher::UrlExact(urls) => urls.contains(url),
            Matcher::PathPrefix(prefixes) => {
                prefixes.iter().any(|prefix| parts.path.starts_with(prefix))
            }
            Matcher::PathSuffix(suffixes) => {
                let path = parts.path.to_ascii_lowercase();
                suffixes.iter().any(|suffix| path.ends_with(suffix))
            }
            Matcher::Host(domains) => domains.iter().any(|domain| parts.host_matches(domain)),
            Matcher::HostPathPrefix { domain, prefix } => {
                parts.host_matches(domain) && parts.path.starts_with(prefix)
            }
            Matcher::AnyOf(matchers) => matchers.iter().any(|m| m.matches(url, parts)),
            Matcher::Always => true,
        }
    }
}

struct Rule {
    label: &'static str,
    matcher: Matcher,
    decision: Decision,
}

/// Ordered classification table built from worker configuration.
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// Build the rule table from configuration.
    pub fn from_config(config: &WorkerConfig) -> Self {
        let same_origin_paths: HashSet<String> = config
            .critical_paths
            .iter()
            .chain(config.static_asset_paths.iter())
            .cloned()
            .collect();

        let image_suffixes = config
            .image_extensions
            .iter()
            .map(|ext| ext.to_ascii_lowercase())
            .collect();

        let rules = vec![
            Rule {
                label: "bypass-extension-schemes",
                matcher: Matcher::Scheme(config.bypass_schemes.clone()),
                decision: Decision::Bypass,
            },
            Rule {
                label: "bypass-lead-relay",
                matcher: Matcher::PathExact(config.never_cache_paths.iter().cloned().collect()),
                decision: Decision::Bypass,
            },
            Rule {
                label: "bypass-tracking",
                matcher: Matcher::AnyOf(vec![
                    Matcher::Host(config.tracking_domains.clone()),
                    Matcher::HostPathPrefix {
                        domain: "facebook.com".to_string(),
                        prefix: "/tr".to_string(),
                    },
                ]),
                decision: Decision::Bypass,
            },
            Rule {
                label: "critical-static",
                matcher: Matcher::AnyOf(vec![
                    Matcher::PathExact(same_origin_paths),
                    Matcher::UrlExact(config.critical_urls.iter().cloned().collect()),
                ]),
                decision: Decision::Handle {
                    strategy: Strategy::CacheFirst,
                    category: Category::Static,
                },
            },
            Rule {
                label: "api-endpoints",
                matcher: Matcher::PathPrefix(config.api_path_prefixes.clone()),
                decision: Decision::Handle {
                    strategy: Strategy::NetworkFirst,
                    category: Category::Api,
                },
            },
            Rule {
                label: "images",
                matcher: Matcher::PathSuffix(image_suffixes),
                decision: Decision::Handle {
                    strategy: Strategy::CacheFirstImages,
                    category: Category::Images,
                },
            },
            Rule {
                label: "external-fonts",
                matcher: Matcher::Host(config.font_domains.clone()),
                decision: Decision::Handle {
                    strategy: Strategy::StaleWhileRevalidate,
                    category: Category::Fonts,
                },
            },
            Rule {
                label: "external-cdn",
                matcher: Matcher::Host(config.external_domains.clone()),
                decision: Decision::Handle {
                    strategy: Strategy::StaleWhileRevalidate,
                    category: Category::Dynamic,
                },
            },
            Rule {
                label: "default",
                matcher: Matcher::Always,
                decision: Decision::Handle {
                    strategy: Strategy::NetworkFirst,
                    category: Category::Dynamic,
                },
            },
        ];

        Self { rules }
    }

    /// Classify a URL. Pure: depends only on the URL text and the table.
    pub fn classify(&self, url: &str) -> Decision {
        let parts = UrlParts::parse(url);
        for rule in &self.rules {
            if rule.matcher.matches(url, &parts) {
                return rule.decision;
            }
        }
        // The table always ends with an unconditional rule
        Decision::Handle {
            strategy: Strategy::NetworkFirst,
            category: Category::Dynamic,
        }
    }

    /// Rule labels in evaluation order, for auditing the policy.
    pub fn rule_labels(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.label).collect()
    }
}
