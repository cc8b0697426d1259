//! Permission tokens
//!
//! Permissions are opaque strings such as `view:hotels`. There is no
//! hierarchy and no expiry; a check is exact string containment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tokens granted by the API for the dashboard sections
pub mod tokens {
    pub const VIEW_GUESTS: &str = "view:guests";
    pub const VIEW_FINANCE: &str = "view:finance";
    pub const VIEW_HOTELS: &str = "view:hotels";
    pub const VIEW_CONTACTS: &str = "view:contacts";
    pub const VIEW_TICKETS: &str = "view:tickets";
    pub const VIEW_BOOKINGS: &str = "view:bookings";
    pub const MANAGE_USERS: &str = "manage:users";
    pub const ADMIN: &str = "admin";
}

/// Set of permission tokens granted to a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact membership test
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn insert<S: Into<String>>(&mut self, token: S) -> bool {
        self.0.insert(token.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(", ");
        write!(f, "[{}]", joined)
    }
}

/// Anything that can answer "is this token granted?"
///
/// `has_any` and `has_all` are the usual quantifiers over `has_permission`.
pub trait Authorizer {
    fn has_permission(&self, token: &str) -> bool;

    fn has_any(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.has_permission(t))
    }

    fn has_all(&self, tokens: &[&str]) -> bool {
        tokens.iter().all(|t| self.has_permission(t))
    }
}

impl Authorizer for PermissionSet {
    fn has_permission(&self, token: &str) -> bool {
        self.contains(token)
    }
}

impl<A: Authorizer + ?Sized> Authorizer for &A {
    fn has_permission(&self, token: &str) -> bool {
        (**self).has_permission(token)
    }

    fn has_any(&self, tokens: &[&str]) -> bool {
        (**self).has_any(tokens)
    }

    fn has_all(&self, tokens: &[&str]) -> bool {
        (**self).has_all(tokens)
    }
}

impl<A: Authorizer> Authorizer for Option<A> {
    fn has_permission(&self, token: &str) -> bool {
        self.as_ref().is_some_and(|a| a.has_permission(token))
    }

    fn has_all(&self, tokens: &[&str]) -> bool {
        self.as_ref().is_some_and(|a| a.has_all(tokens))
    }
}

impl<A: Authorizer + ?Sized> Authorizer for std::sync::Arc<A> {
    fn has_permission(&self, token: &str) -> bool {
        (**self).has_permission(token)
    }

    fn has_any(&self, tokens: &[&str]) -> bool {
        (**self).has_any(tokens)
    }

    fn has_all(&self, tokens: &[&str]) -> bool {
        (**self).has_all(tokens)
    }
}

/// Grants nothing; the predicate for "no session"
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Authorizer for Anonymous {
    fn has_permission(&self, _token: &str) -> bool {
        false
    }

    fn has_all(&self, _tokens: &[&str]) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_containment() {
        let set: PermissionSet = ["view:hotels", "view:guests"].into_iter().collect();
        assert!(set.has_permission("view:hotels"));
        assert!(!set.has_permission("view:hotel"));
        assert!(!set.has_permission("VIEW:HOTELS"));
        assert!(!set.has_permission("view"));
    }

    #[test]
    fn test_quantifiers() {
        let set: PermissionSet = ["view:hotels", "view:guests"].into_iter().collect();
        assert!(set.has_any(&["admin", "view:guests"]));
        assert!(!set.has_any(&["admin", "manage:users"]));
        assert!(set.has_all(&["view:hotels", "view:guests"]));
        assert!(!set.has_all(&["view:hotels", "admin"]));
        assert!(!set.has_any(&[]));
        assert!(set.has_all(&[]));
    }

    #[test]
    fn test_absent_authorizer_denies_everything() {
        let none: Option<PermissionSet> = None;
        assert!(!none.has_permission(tokens::ADMIN));
        assert!(!none.has_any(&[tokens::ADMIN]));
        assert!(!none.has_all(&[]));
        assert!(!Anonymous.has_permission(tokens::VIEW_HOTELS));
        assert!(!Anonymous.has_all(&[]));
    }

    #[test]
    fn test_serde_is_a_plain_list() {
        let set: PermissionSet = serde_json::from_str(r#"["view:tickets","admin"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["admin","view:tickets"]"#
        );
        assert_eq!(set.to_string(), "[admin, view:tickets]");
    }
}
