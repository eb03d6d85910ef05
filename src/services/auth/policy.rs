//! Route policy table consulted by the authorization gate.
//!
//! Rules are `(method | any, path pattern) -> RequiredRoles` and are checked in
//! insertion order; the first match wins. Requests that match no rule get the
//! fallback, which defaults to `Authenticated`.
//!
//! Pattern syntax:
//! - `literal` matches that exact segment
//! - `{name}` matches exactly one non-empty segment
//! - `**` (last segment only) matches zero or more remaining segments

use std::collections::BTreeSet;

use axum::http::Method;
use thiserror::Error;

use crate::services::auth::principal::{Principal, normalize_role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredRoles {
    Public,
    Authenticated,
    /// Holds normalised (`ROLE_`-prefixed) names.
    AnyOf(BTreeSet<String>),
}

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No identity on a route that needs one (401).
    Unauthenticated,
    /// Identity present but lacking every required role (403).
    Forbidden,
}

impl RequiredRoles {
    /// `any_of(["ADMIN", "USER"])` requires `ROLE_ADMIN` or `ROLE_USER`.
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::AnyOf(
            roles
                .into_iter()
                .map(|r| normalize_role(r.as_ref()))
                .collect(),
        )
    }

    pub fn evaluate(&self, principal: Option<&Principal>) -> Result<(), AccessDenied> {
        match (self, principal) {
            (Self::Public, _) => Ok(()),
            (_, None) => Err(AccessDenied::Unauthenticated),
            (Self::Authenticated, Some(_)) => Ok(()),
            (Self::AnyOf(required), Some(p)) if p.has_any_role(required) => Ok(()),
            (Self::AnyOf(_), Some(_)) => Err(AccessDenied::Forbidden),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("path pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("'**' is only allowed as the last segment: {0}")]
    MisplacedWildcard(String),
    #[error("empty parameter name in path pattern: {0}")]
    EmptyParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Rest,
}

#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| PatternError::NotAbsolute(raw.to_string()))?;
        let parts: Vec<&str> = rest.split('/').collect();

        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == "**" {
                if i + 1 != parts.len() {
                    return Err(PatternError::MisplacedWildcard(raw.to_string()));
                }
                Segment::Rest
            } else if part.starts_with('{') && part.ends_with('}') {
                if part.len() <= 2 {
                    return Err(PatternError::EmptyParam(raw.to_string()));
                }
                Segment::Param
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let mut parts = rest.split('/');

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Literal(literal) => {
                    if parts.next() != Some(literal.as_str()) {
                        return false;
                    }
                }
                Segment::Param => match parts.next() {
                    Some(part) if !part.is_empty() => {}
                    _ => return false,
                },
            }
        }

        parts.next().is_none()
    }
}

#[derive(Debug, Clone)]
struct PolicyRule {
    method: Option<Method>,
    pattern: PathPattern,
    required: RequiredRoles,
}

/// Read-only `(method, path) -> RequiredRoles` table, built once at start-up.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<PolicyRule>,
    fallback: RequiredRoles,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// First rule matching `method` and `path`, else the fallback.
    ///
    /// HEAD is looked up as GET: the router answers it with the GET handler.
    pub fn policy_for(&self, method: &Method, path: &str) -> &RequiredRoles {
        let head = method == Method::HEAD;
        let method_matches = |m: &Method| m == method || (head && m == Method::GET);

        self.rules
            .iter()
            .find(|rule| rule.method.as_ref().is_none_or(method_matches) && rule.pattern.matches(path))
            .map(|rule| &rule.required)
            .unwrap_or(&self.fallback)
    }
}

pub struct RoutePolicyBuilder {
    rules: Vec<(Option<Method>, String, RequiredRoles)>,
    fallback: RequiredRoles,
}

impl Default for RoutePolicyBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: RequiredRoles::Authenticated,
        }
    }
}

impl RoutePolicyBuilder {
    pub fn rule(mut self, method: Method, pattern: &str, required: RequiredRoles) -> Self {
        self.rules.push((Some(method), pattern.to_string(), required));
        self
    }

    pub fn any_method(mut self, pattern: &str, required: RequiredRoles) -> Self {
        self.rules.push((None, pattern.to_string(), required));
        self
    }

    pub fn public(self, method: Method, pattern: &str) -> Self {
        self.rule(method, pattern, RequiredRoles::Public)
    }

    pub fn fallback(mut self, required: RequiredRoles) -> Self {
        self.fallback = required;
        self
    }

    pub fn build(self) -> Result<RoutePolicy, PatternError> {
        let rules = self
            .rules
            .into_iter()
            .map(|(method, pattern, required)| {
                Ok(PolicyRule {
                    method,
                    pattern: PathPattern::parse(&pattern)?,
                    required,
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(RoutePolicy {
            rules,
            fallback: self.fallback,
        })
    }
}

/// Access rules for the routes mounted in `api::routes`.
pub fn default_route_policy() -> Result<RoutePolicy, PatternError> {
    RoutePolicy::builder()
        .public(Method::GET, "/health")
        .public(Method::POST, "/login")
        .public(Method::GET, "/api/users")
        .public(Method::POST, "/api/users/register")
        .rule(Method::POST, "/api/users", RequiredRoles::any_of(["ADMIN"]))
        .rule(
            Method::GET,
            "/api/products",
            RequiredRoles::any_of(["ADMIN", "USER"]),
        )
        .rule(
            Method::GET,
            "/api/products/{id}",
            RequiredRoles::any_of(["ADMIN", "USER"]),
        )
        .rule(Method::POST, "/api/products", RequiredRoles::any_of(["ADMIN"]))
        .rule(
            Method::PUT,
            "/api/products/{id}",
            RequiredRoles::any_of(["ADMIN"]),
        )
        .rule(
            Method::DELETE,
            "/api/products/**",
            RequiredRoles::any_of(["ADMIN"]),
        )
        .fallback(RequiredRoles::Authenticated)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Principal {
        Principal::new("ana", ["ROLE_USER"])
    }

    fn admin() -> Principal {
        Principal::new("root", ["ROLE_USER", "ROLE_ADMIN"])
    }

    #[test]
    fn pattern_matching() {
        let exact = PathPattern::parse("/api/products").unwrap();
        assert!(exact.matches("/api/products"));
        assert!(!exact.matches("/api/products/1"));
        assert!(!exact.matches("/api/products/"));
        assert!(!exact.matches("api/products"));

        let param = PathPattern::parse("/api/products/{id}").unwrap();
        assert!(param.matches("/api/products/42"));
        assert!(!param.matches("/api/products/"));
        assert!(!param.matches("/api/products/42/extra"));

        let rest = PathPattern::parse("/api/products/**").unwrap();
        assert!(rest.matches("/api/products"));
        assert!(rest.matches("/api/products/42"));
        assert!(rest.matches("/api/products/42/extra"));
        assert!(!rest.matches("/api/productsx"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert_eq!(
            PathPattern::parse("api").unwrap_err(),
            PatternError::NotAbsolute("api".to_string())
        );
        assert!(matches!(
            PathPattern::parse("/a/**/b"),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/{}"),
            Err(PatternError::EmptyParam(_))
        ));
    }

    #[test]
    fn evaluate_state_machine() {
        let public = RequiredRoles::Public;
        let authenticated = RequiredRoles::Authenticated;
        let admin_only = RequiredRoles::any_of(["ADMIN"]);

        assert_eq!(public.evaluate(None), Ok(()));
        assert_eq!(public.evaluate(Some(&user())), Ok(()));

        assert_eq!(authenticated.evaluate(None), Err(AccessDenied::Unauthenticated));
        assert_eq!(authenticated.evaluate(Some(&user())), Ok(()));

        assert_eq!(admin_only.evaluate(None), Err(AccessDenied::Unauthenticated));
        assert_eq!(admin_only.evaluate(Some(&user())), Err(AccessDenied::Forbidden));
        assert_eq!(admin_only.evaluate(Some(&admin())), Ok(()));
    }

    #[test]
    fn any_of_normalises_role_names() {
        assert_eq!(
            RequiredRoles::any_of(["ADMIN", "ROLE_USER"]),
            RequiredRoles::AnyOf(["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()].into())
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = RoutePolicy::builder()
            .public(Method::GET, "/things/open")
            .rule(Method::GET, "/things/**", RequiredRoles::any_of(["ADMIN"]))
            .build()
            .unwrap();

        assert_eq!(
            policy.policy_for(&Method::GET, "/things/open"),
            &RequiredRoles::Public
        );
        assert_eq!(
            policy.policy_for(&Method::GET, "/things/secret"),
            &RequiredRoles::any_of(["ADMIN"])
        );
    }

    #[test]
    fn method_is_part_of_the_match() {
        let policy = RoutePolicy::builder()
            .public(Method::GET, "/items")
            .any_method("/admin/**", RequiredRoles::any_of(["ADMIN"]))
            .build()
            .unwrap();

        assert_eq!(policy.policy_for(&Method::GET, "/items"), &RequiredRoles::Public);
        assert_eq!(
            policy.policy_for(&Method::POST, "/items"),
            &RequiredRoles::Authenticated
        );
        assert_eq!(
            policy.policy_for(&Method::PATCH, "/admin/x"),
            &RequiredRoles::any_of(["ADMIN"])
        );
    }

    #[test]
    fn head_follows_the_get_rule() {
        let policy = default_route_policy().unwrap();

        assert_eq!(policy.policy_for(&Method::HEAD, "/api/users"), &RequiredRoles::Public);
        assert_eq!(
            policy.policy_for(&Method::HEAD, "/api/products/7"),
            &RequiredRoles::any_of(["ADMIN", "USER"])
        );
    }

    #[test]
    fn default_table_matches_the_security_layout() {
        let policy = default_route_policy().unwrap();

        assert_eq!(policy.policy_for(&Method::POST, "/login"), &RequiredRoles::Public);
        assert_eq!(policy.policy_for(&Method::GET, "/api/users"), &RequiredRoles::Public);
        assert_eq!(
            policy.policy_for(&Method::POST, "/api/users/register"),
            &RequiredRoles::Public
        );
        assert_eq!(
            policy.policy_for(&Method::POST, "/api/users"),
            &RequiredRoles::any_of(["ADMIN"])
        );
        assert_eq!(
            policy.policy_for(&Method::GET, "/api/products/7"),
            &RequiredRoles::any_of(["ADMIN", "USER"])
        );
        assert_eq!(
            policy.policy_for(&Method::DELETE, "/api/products/7"),
            &RequiredRoles::any_of(["ADMIN"])
        );
        assert_eq!(
            policy.policy_for(&Method::GET, "/somewhere/else"),
            &RequiredRoles::Authenticated
        );
    }
}
