//! HotelDesk Auth - session lifecycle and permission checks
//!
//! The [`SessionStore`] is the single source of truth for who is logged in
//! and what they may do. It is an explicit value shared through `Arc`, with
//! `login`, `logout`, `restore` and `invalidate` as its only mutation points,
//! and it publishes a [`SessionEvent`] on every transition.
//!
//! ## Modules
//!
//! - [`permissions`]: opaque permission tokens and the [`Authorizer`] predicate
//! - [`identity`]: identity records and the [`AuthApi`] collaborator trait
//! - [`credentials`]: persistence of the bearer token
//! - [`session`]: the in-memory session record
//! - [`store`]: the session store itself

pub mod credentials;
pub mod identity;
pub mod permissions;
pub mod session;
pub mod store;

pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, CREDENTIAL_KEY,
};
pub use identity::{AuthApi, AuthenticatedUser, Credential, Identity};
pub use permissions::{tokens, Anonymous, Authorizer, PermissionSet};
pub use session::Session;
pub use store::{SessionEvent, SessionStore};

use hoteldesk_core::HotelDeskError;

/// Authentication-layer error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The auth endpoint rejected the supplied username/password
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The API answered 401 for a bearer token
    #[error("Session is no longer authenticated")]
    Unauthorized,

    /// Connection, timeout or other transport level failure
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The API answered with a body we could not interpret
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Core error: {0}")]
    Core(#[from] HotelDeskError),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Create an invalid credentials error
    pub fn invalid_credentials<S: Into<String>>(message: S) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Whether this error means the bearer token is no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Unauthorized)
    }
}
