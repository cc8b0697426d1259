//! Dashboard shell
//!
//! Holds one location, one session and one API client. Rendering resolves the
//! current location against the session; opening a location also loads the
//! data behind list and detail views. Session expiry or logout moves the
//! location to `/login`.

use hoteldesk_auth::{
    AuthResult, CredentialStore, FileCredentialStore, Identity, SessionEvent, SessionStore,
};
use hoteldesk_client::{ApiClient, ClientResult, LoadState, SessionGuard};
use hoteldesk_core::HotelDeskConfig;
use hoteldesk_router::{
    menu, DetailPolicy, MenuItem, Navigator, Resolution, Resolver, RouteTable, View,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, instrument};

pub const LOGIN_PATH: &str = "/login";

/// A rendered location together with the data it loaded
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub resolution: Resolution,
    /// `None` for views that show no remote data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LoadState<Value>>,
}

pub struct Shell {
    store: Arc<SessionStore>,
    guard: SessionGuard,
    resolver: Resolver,
    navigator: Navigator,
    session_events: broadcast::Receiver<SessionEvent>,
}

impl Shell {
    /// Build a shell from configuration, persisting the token on disk
    pub fn new(config: &HotelDeskConfig) -> ClientResult<Self> {
        let client = Arc::new(ApiClient::new(&config.api)?);
        let credentials = Arc::new(FileCredentialStore::new(config.storage.credential_path()));
        Ok(Self::with_parts(config, client, credentials))
    }

    pub fn with_parts(
        config: &HotelDeskConfig,
        client: Arc<ApiClient>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let store = Arc::new(SessionStore::new(client.clone(), credentials));
        let session_events = store.subscribe();

        Self {
            guard: SessionGuard::new(client, store.clone()),
            resolver: Resolver::new(RouteTable::standard(), DetailPolicy::from(&config.routing)),
            navigator: Navigator::new("/", config.routing.history_limit),
            store,
            session_events,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Restore the persisted session; true if one was accepted
    pub async fn start(&mut self) -> bool {
        let restored = self.store.restore().await;
        self.drain_session_events();
        restored
    }

    pub async fn login(&mut self, username: &str, secret: &str) -> AuthResult<Identity> {
        let identity = self.store.login(username, secret).await?;
        self.drain_session_events();
        if self.navigator.location().pathname == LOGIN_PATH {
            self.navigator.replace("/");
        }
        Ok(identity)
    }

    pub fn logout(&mut self) {
        self.store.logout();
        self.drain_session_events();
    }

    /// Resolve the current location against the current session
    pub fn render(&mut self) -> Resolution {
        self.drain_session_events();
        self.resolver
            .resolve(&self.navigator.location().pathname, self.store.as_ref())
    }

    pub fn navigate(&mut self, pathname: &str) -> Resolution {
        self.navigator.navigate(pathname);
        self.render()
    }

    /// Navigate and load the data the resolved view needs
    #[instrument(skip(self))]
    pub async fn open(&mut self, pathname: &str) -> Page {
        self.navigate(pathname);
        self.refresh().await
    }

    /// Reload the current location
    pub async fn refresh(&mut self) -> Page {
        let resolution = self.render();
        let data = self.load(&resolution.view).await;

        // Any 401 sends the user to the login page, with or without a session
        if matches!(data, Some(LoadState::Unauthorized)) {
            info!("API rejected the request, returning to login");
            self.navigator.replace(LOGIN_PATH);
        }

        let resolution = self.render();
        Page { resolution, data }
    }

    /// Sidebar entries for the current session
    pub fn menu(&self) -> Vec<MenuItem> {
        menu(self.resolver.table(), self.store.as_ref())
    }

    async fn load(&self, view: &View) -> Option<LoadState<Value>> {
        let collection = view.collection()?;
        let result = match view.resource_id() {
            Some(id) => self.guard.get::<Value>(collection, id).await,
            None => self
                .guard
                .list::<Value>(collection)
                .await
                .map(Value::Array),
        };
        debug!(view = %view, ok = result.is_ok(), "Loaded view data");
        Some(LoadState::from_result(result))
    }

    fn drain_session_events(&mut self) {
        loop {
            match self.session_events.try_recv() {
                Ok(SessionEvent::Expired) | Ok(SessionEvent::LoggedOut) => {
                    info!("Session ended, returning to login");
                    self.navigator.replace(LOGIN_PATH);
                }
                Ok(SessionEvent::LoggedIn(_)) | Ok(SessionEvent::Restored(_)) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Missed session events");
                    if !self.store.is_authenticated() {
                        self.navigator.replace(LOGIN_PATH);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("location", self.navigator.location())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
