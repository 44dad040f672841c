//! Route policies and longest-prefix matching.
//!
//! The table is built once at startup and shared read-only across requests.

use std::sync::Arc;

use axum::http::Uri;
use thiserror::Error;
use url::Url;

/// How a route treats bearer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// A valid token must be presented.
    Required,
    /// A valid token is used when presented; anything else is ignored.
    Optional,
    /// Tokens are never inspected.
    None,
}

/// How the matched prefix is rewritten before forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRewrite {
    Preserve,
    StripPrefix,
    ReplacePrefix(String),
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    prefix: String,
    target: Url,
    rewrite: PathRewrite,
    auth: AuthRequirement,
    service: String,
}

impl RoutePolicy {
    /// `service` is the human-facing backend name used in unavailability
    /// messages (e.g. "Spell service").
    pub fn new(prefix: impl Into<String>, target: Url, service: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target,
            rewrite: PathRewrite::Preserve,
            auth: AuthRequirement::None,
            service: service.into(),
        }
    }

    pub fn with_rewrite(mut self, rewrite: PathRewrite) -> Self {
        self.rewrite = rewrite;
        self
    }

    pub fn with_auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn auth(&self) -> AuthRequirement {
        self.auth
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Segment-aware prefix match: `/api/spells` matches `/api/spells` and
    /// `/api/spells/1` but not `/api/spellsbook`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }

    /// Path the backend sees, before the target's base path is applied.
    pub fn rewrite_path(&self, path: &str) -> String {
        let rest = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);

        let rewritten = match &self.rewrite {
            PathRewrite::Preserve => return path.to_string(),
            PathRewrite::StripPrefix => rest.to_string(),
            PathRewrite::ReplacePrefix(to) => format!("{}{}", to.trim_end_matches('/'), rest),
        };

        if rewritten.starts_with('/') {
            rewritten
        } else {
            format!("/{rewritten}")
        }
    }

    /// Full upstream URL for an inbound request URI (query carried over).
    pub fn upstream_url(&self, uri: &Uri) -> Url {
        let rewritten = self.rewrite_path(uri.path());

        let mut url = self.target.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{rewritten}"));
        url.set_query(uri.query());
        url
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route prefix must start with '/': {0}")]
    InvalidPrefix(String),
    #[error("duplicate route prefix: {0}")]
    DuplicatePrefix(String),
}

/// Immutable set of route policies, longest prefix first.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Arc<RoutePolicy>>,
}

impl RouteTable {
    pub fn new(routes: impl IntoIterator<Item = RoutePolicy>) -> Result<Self, RouteError> {
        let mut routes: Vec<Arc<RoutePolicy>> = routes.into_iter().map(Arc::new).collect();

        for route in &routes {
            if !route.prefix.starts_with('/') {
                return Err(RouteError::InvalidPrefix(route.prefix.clone()));
            }
        }

        routes.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });

        for pair in routes.windows(2) {
            if pair[0].prefix == pair[1].prefix {
                return Err(RouteError::DuplicatePrefix(pair[0].prefix.clone()));
            }
        }

        Ok(Self { routes })
    }

    pub fn match_path(&self, path: &str) -> Option<Arc<RoutePolicy>> {
        self.routes.iter().find(|r| r.matches(path)).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePolicy> {
        self.routes.iter().map(|r| r.as_ref())
    }
}

/// Whether `path` has a `.` or `..` segment, literal or percent-encoded.
///
/// The upstream URL parser resolves these, so a path carrying one could be
/// matched against one prefix and delivered outside it.
pub fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.replace("%2e", ".").replace("%2E", ".");
        decoded == "." || decoded == ".."
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn table() -> RouteTable {
        RouteTable::new([
            RoutePolicy::new("/api", url("http://fallback:9000"), "Api"),
            RoutePolicy::new("/api/spells", url("http://spells:3002"), "Spell service")
                .with_auth(AuthRequirement::Optional),
            RoutePolicy::new("/api/spells/admin", url("http://admin:3004"), "Admin service")
                .with_auth(AuthRequirement::Required),
        ])
        .unwrap()
    }

    #[test]
    fn longest_prefix_wins() {
        let table = table();

        assert_eq!(table.match_path("/api/spells/admin/1").unwrap().service(), "Admin service");
        assert_eq!(table.match_path("/api/spells/42").unwrap().service(), "Spell service");
        assert_eq!(table.match_path("/api/spells").unwrap().service(), "Spell service");
        assert_eq!(table.match_path("/api/other").unwrap().service(), "Api");
        assert!(table.match_path("/health").is_none());
    }

    #[test]
    fn prefix_match_respects_segment_boundaries() {
        let table = table();

        assert_eq!(table.match_path("/api/spellsbook").unwrap().service(), "Api");
        assert!(table.match_path("/apix").is_none());
    }

    #[test]
    fn preserve_keeps_path_and_query() {
        let route = RoutePolicy::new("/api/auth", url("http://auth:3001"), "Auth service");
        let uri: Uri = "/api/auth/login?next=%2Fhome".parse().unwrap();

        assert_eq!(
            route.upstream_url(&uri).as_str(),
            "http://auth:3001/api/auth/login?next=%2Fhome"
        );
    }

    #[test]
    fn strip_and_replace_rewrite_the_prefix() {
        let strip = RoutePolicy::new("/api/spells", url("http://spells:3002/v2/"), "Spell service")
            .with_rewrite(PathRewrite::StripPrefix);
        let replace = RoutePolicy::new("/api/spells", url("http://spells:3002"), "Spell service")
            .with_rewrite(PathRewrite::ReplacePrefix("/spells/".into()));

        assert_eq!(strip.rewrite_path("/api/spells"), "/");
        assert_eq!(strip.rewrite_path("/api/spells/7"), "/7");
        assert_eq!(
            strip.upstream_url(&"/api/spells/7".parse().unwrap()).as_str(),
            "http://spells:3002/v2/7"
        );
        assert_eq!(replace.rewrite_path("/api/spells/7"), "/spells/7");
    }

    #[test]
    fn dot_segments_are_detected_in_every_spelling() {
        for path in [
            "/api/spells/../auth/register",
            "/api/spells/./1",
            "/api/spells/..",
            "/api/spells/%2e%2e/auth",
            "/api/spells/%2E./auth",
            "/api/spells/.%2e/auth",
            "/api/spells/%2e",
            "/api/spells\\..\\auth",
        ] {
            assert!(has_dot_segment(path), "{path}");
        }

        for path in ["/api/spells", "/api/spells/fire.ball", "/api/spells/...", "/api/spells/..x", "/"] {
            assert!(!has_dot_segment(path), "{path}");
        }
    }

    #[test]
    fn iterates_longest_prefix_first() {
        let table = table();
        let prefixes: Vec<_> = table.iter().map(RoutePolicy::prefix).collect();
        assert_eq!(prefixes, ["/api/spells/admin", "/api/spells", "/api"]);
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(
            RouteTable::new([RoutePolicy::new("api", url("http://a"), "A")]).unwrap_err(),
            RouteError::InvalidPrefix("api".into())
        );
        assert_eq!(
            RouteTable::new([
                RoutePolicy::new("/a", url("http://a"), "A"),
                RoutePolicy::new("/b", url("http://b"), "B"),
                RoutePolicy::new("/a", url("http://c"), "C"),
            ])
            .unwrap_err(),
            RouteError::DuplicatePrefix("/a".into())
        );
    }
}
