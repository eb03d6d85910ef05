/*
 * Responsibility
 * - Authenticated identity (subject + roles) shared by login, token codec and the gate
 * - Role name normalisation (`ROLE_` prefix convention)
 */
use std::collections::BTreeSet;

pub const ROLE_PREFIX: &str = "ROLE_";
pub const ROLE_USER: &str = "ROLE_USER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Prefix a role name with `ROLE_` unless it already carries it.
///
/// `"ADMIN"` and `"ROLE_ADMIN"` both normalise to `"ROLE_ADMIN"`.
pub fn normalize_role(name: &str) -> String {
    let name = name.trim();
    if name.starts_with(ROLE_PREFIX) {
        name.to_string()
    } else {
        format!("{ROLE_PREFIX}{name}")
    }
}

/// Identity of the caller for the lifetime of a single request.
///
/// - `subject` is the username
/// - `roles` is an ordered set so duplicates collapse and serialization is stable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject: String,
    roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role(&self, required: &BTreeSet<String>) -> bool {
        !self.roles.is_disjoint(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_prefix_once() {
        assert_eq!(normalize_role("ADMIN"), "ROLE_ADMIN");
        assert_eq!(normalize_role("ROLE_ADMIN"), "ROLE_ADMIN");
        assert_eq!(normalize_role(" USER "), "ROLE_USER");
    }

    #[test]
    fn duplicate_roles_collapse() {
        let p = Principal::new("ana", ["ROLE_USER", "ROLE_USER", "ROLE_ADMIN"]);
        assert_eq!(p.roles().len(), 2);
        assert!(p.has_role(ROLE_ADMIN));
    }

    #[test]
    fn any_role_match() {
        let p = Principal::new("ana", [ROLE_USER]);
        let admin_only: BTreeSet<String> = [ROLE_ADMIN.to_string()].into();
        let either: BTreeSet<String> = [ROLE_ADMIN.to_string(), ROLE_USER.to_string()].into();

        assert!(!p.has_any_role(&admin_only));
        assert!(p.has_any_role(&either));
    }
}
