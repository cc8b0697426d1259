//! 401 interceptor
//!
//! Data requests made through the [`SessionGuard`] carry the current session
//! token. Any 401 answer invalidates the session, which publishes
//! [`SessionEvent::Expired`](hoteldesk_auth::SessionEvent::Expired) so views
//! can send the user back to the login page.

use hoteldesk_auth::SessionStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

use crate::{ApiClient, ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct SessionGuard {
    client: Arc<ApiClient>,
    store: Arc<SessionStore>,
}

impl SessionGuard {
    pub fn new(client: Arc<ApiClient>, store: Arc<SessionStore>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Fetch a collection with the session token
    pub async fn list<T>(&self, collection: &str) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let token = self.store.token();
        let result = self.client.list(collection, token.as_deref()).await;
        self.intercept(result)
    }

    /// Fetch one record with the session token
    pub async fn get<T>(&self, collection: &str, id: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let token = self.store.token();
        let result = self.client.get(collection, id, token.as_deref()).await;
        self.intercept(result)
    }

    /// Fetch an arbitrary API path with the session token
    pub async fn get_json<T>(&self, path: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let token = self.store.token();
        let result = self.client.get_json(path, token.as_deref()).await;
        self.intercept(result)
    }

    fn intercept<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(ClientError::Unauthorized) = &result {
            warn!("API answered 401, invalidating session");
            self.store.invalidate();
        }
        result
    }
}
