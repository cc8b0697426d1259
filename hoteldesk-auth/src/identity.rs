//! User identity and the external auth collaborator

use crate::permissions::PermissionSet;
use crate::AuthResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity of the logged-in dashboard user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user identifier
    pub id: String,
    /// Login name
    pub username: String,
    /// Display name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// User email (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role label shown in the header, e.g. "manager"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Identity {
    pub fn new<I: Into<String>, U: Into<String>>(id: I, username: U) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            display_name: None,
            email: None,
            role: None,
        }
    }

    pub fn with_display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_role<S: Into<String>>(mut self, role: S) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Get user display string
    pub fn display_string(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(&self.username);
        match &self.role {
            Some(role) => format!("{} ({})", name, role),
            None => name.to_string(),
        }
    }
}

/// Body of the identity endpoint: the identity plus its granted permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub permissions: PermissionSet,
}

/// Bearer credential returned by a successful login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
}

impl Credential {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// External authentication collaborator
///
/// Implemented over HTTP by the API client; tests use in-memory fakes.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange a username and secret for a bearer credential
    async fn login(&self, username: &str, secret: &str) -> AuthResult<Credential>;

    /// Fetch the identity and permissions the credential belongs to
    async fn fetch_identity(&self, token: &str) -> AuthResult<AuthenticatedUser>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_endpoint_body() {
        let body = r#"{
            "id": "u-1",
            "username": "alice",
            "display_name": "Alice Martin",
            "role": "manager",
            "permissions": ["view:hotels", "view:bookings"]
        }"#;

        let user: AuthenticatedUser = serde_json::from_str(body).unwrap();
        assert_eq!(user.identity.username, "alice");
        assert_eq!(user.identity.email, None);
        assert!(user.permissions.contains("view:bookings"));
        assert_eq!(user.identity.display_string(), "Alice Martin (manager)");
    }

    #[test]
    fn test_missing_permissions_means_empty_set() {
        let user: AuthenticatedUser =
            serde_json::from_str(r#"{"id": "u-2", "username": "bob"}"#).unwrap();
        assert!(user.permissions.is_empty());
        assert_eq!(user.identity.display_string(), "bob");
    }

    #[test]
    fn test_display_string_prefers_display_name() {
        let identity = Identity::new("u-3", "carol");
        assert_eq!(identity.display_string(), "carol");

        let identity = identity.with_display_name("Carol Reyes").with_role("night audit");
        assert_eq!(identity.display_string(), "Carol Reyes (night audit)");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        assert!(!format!("{:?}", credential).contains("secret-token"));
    }
}
