//! Session Store - who is logged in and what they can do
//!
//! Mutation happens only through `login`, `logout`, `restore` and
//! `invalidate`. Every transition is published as a [`SessionEvent`].

use crate::credentials::CredentialStore;
use crate::identity::{AuthApi, Identity};
use crate::permissions::Authorizer;
use crate::session::Session;
use crate::{AuthError, AuthResult};
use hoteldesk_core::validation_error;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Session transitions observed by views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login completed and the identity was fetched
    LoggedIn(Identity),
    /// A persisted credential was accepted at startup
    Restored(Identity),
    /// The user logged out
    LoggedOut,
    /// The API rejected the token (401); the session was dropped
    Expired,
}

/// Single source of truth for the current session
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel::<SessionEvent>(32);

        Self {
            api,
            credentials,
            session: RwLock::new(None),
            events,
        }
    }

    /// Subscribe to session transitions
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_session(|s| s.is_some())
    }

    /// Bearer token of the current session
    pub fn token(&self) -> Option<String> {
        self.with_session(|s| s.map(|s| s.token().to_string()))
    }

    /// Identity of the current session
    pub fn identity(&self) -> Option<Identity> {
        self.with_session(|s| s.map(|s| s.identity.clone()))
    }

    /// Populate the session from the persisted credential.
    ///
    /// Never fails: a missing credential, a network error or a rejected token
    /// all leave the session absent. A rejected token is also discarded.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> bool {
        let token = match self.credentials.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted credential to restore");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted credential");
                return false;
            }
        };

        match self.establish(token).await {
            Ok(identity) => {
                info!(user = %identity.username, "Restored session from persisted credential");
                self.publish(SessionEvent::Restored(identity));
                true
            }
            Err(e) if e.is_unauthorized() => {
                info!("Persisted credential rejected, discarding it");
                self.invalidate();
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not restore session");
                false
            }
        }
    }

    /// Log in, load the permissions and persist the credential.
    ///
    /// The credential is only persisted once its identity has been fetched,
    /// so a failed login leaves both the current session and the stored
    /// token untouched. The error is returned for display.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, username: &str, secret: &str) -> AuthResult<Identity> {
        if username.trim().is_empty() {
            return Err(AuthError::Core(validation_error!(
                "Username is required",
                "username",
                "session_store"
            )));
        }

        let credential = self.api.login(username, secret).await.map_err(|e| {
            warn!(user = %username, error = %e, "Login rejected");
            e
        })?;

        let identity = self.establish(credential.token.clone()).await.map_err(|e| {
            warn!(error = %e, "Identity fetch after login failed");
            e
        })?;

        if let Err(e) = self.credentials.save(&credential.token) {
            // The in-memory session still works; only restart survival is lost
            warn!(error = %e, "Failed to persist credential");
        }

        info!(user = %identity.username, "Logged in");
        self.publish(SessionEvent::LoggedIn(identity.clone()));
        Ok(identity)
    }

    /// Drop the session and the persisted credential. Never fails.
    pub fn logout(&self) {
        self.forget_credential();
        let had_session = self.replace(None).is_some();
        info!(had_session, "Logged out");
        self.publish(SessionEvent::LoggedOut);
    }

    /// Entry point for the transport interceptor on a 401 response
    pub fn invalidate(&self) {
        self.forget_credential();
        if self.replace(None).is_some() {
            warn!("Session expired, re-authentication required");
            self.publish(SessionEvent::Expired);
        }
    }

    async fn establish(&self, token: String) -> AuthResult<Identity> {
        let user = self.api.fetch_identity(&token).await?;
        debug!(
            user = %user.identity.username,
            permissions = %user.permissions,
            "Fetched identity"
        );
        let session = Session::new(user, token);
        let identity = session.identity.clone();
        self.replace(Some(session));
        Ok(identity)
    }

    fn replace(&self, session: Option<Session>) -> Option<Session> {
        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, session)
    }

    fn with_session<T>(&self, f: impl FnOnce(Option<&Session>) -> T) -> T {
        match self.session.read() {
            Ok(guard) => f(guard.as_ref()),
            Err(_) => f(None),
        }
    }

    fn forget_credential(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "Failed to clear persisted credential");
        }
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Authorizer for SessionStore {
    fn has_permission(&self, token: &str) -> bool {
        self.with_session(|s| s.is_some_and(|s| s.has_permission(token)))
    }

    fn has_any(&self, tokens: &[&str]) -> bool {
        self.with_session(|s| s.is_some_and(|s| s.has_any(tokens)))
    }

    fn has_all(&self, tokens: &[&str]) -> bool {
        self.with_session(|s| s.is_some_and(|s| s.has_all(tokens)))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.current())
            .finish_non_exhaustive()
    }
}
