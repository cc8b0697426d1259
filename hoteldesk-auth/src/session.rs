//! Session record
//!
//! Exists only while the user is authenticated.

use crate::identity::{AuthenticatedUser, Identity};
use crate::permissions::{Authorizer, PermissionSet};
use chrono::{DateTime, Utc};

/// The authenticated user, their permissions and the token that proved it
#[derive(Clone)]
pub struct Session {
    pub identity: Identity,
    pub permissions: PermissionSet,
    pub established_at: DateTime<Utc>,
    token: String,
}

impl Session {
    pub fn new(user: AuthenticatedUser, token: String) -> Self {
        Self {
            identity: user.identity,
            permissions: user.permissions,
            established_at: Utc::now(),
            token,
        }
    }

    /// Bearer token attached to API requests
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Authorizer for Session {
    fn has_permission(&self, token: &str) -> bool {
        self.permissions.contains(token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("permissions", &self.permissions)
            .field("established_at", &self.established_at)
            .field("token", &"<redacted>")
            .finish()
    }
}
