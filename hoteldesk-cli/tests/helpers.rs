//! Minimal stub API for the shell scenarios; the client crate's stub covers
//! error statuses and retries

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hoteldesk_auth::{CredentialStore, MemoryCredentialStore};
use hoteldesk_cli::Shell;
use hoteldesk_client::ApiClient;
use hoteldesk_core::{HotelDeskConfig, RetryConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct StubState {
    revoked: Arc<AtomicBool>,
}

pub struct StubApi {
    pub config: HotelDeskConfig,
    state: StubState,
}

impl StubApi {
    pub fn shell(&self) -> Shell {
        self.shell_with(&self.config, Arc::new(MemoryCredentialStore::new()))
    }

    pub fn shell_with(
        &self,
        config: &HotelDeskConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Shell {
        let client = ApiClient::new(&config.api)
            .expect("Failed to create client")
            .with_retry(RetryConfig::with_retries(1).immediate());
        Shell::with_parts(config, Arc::new(client), credentials)
    }

    /// Every token is rejected from now on
    pub fn revoke_all(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }
}

pub async fn spawn_stub() -> StubApi {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/{collection}", get(data))
        .route("/api/{collection}/{id}", get(data))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    let mut config = HotelDeskConfig::default();
    config.api.base_url = format!("http://127.0.0.1:{}/api", port);
    config.api.timeout_seconds = 5;

    StubApi { config, state }
}

fn user_for(state: &StubState, headers: &HeaderMap) -> Option<&'static str> {
    if state.revoked.load(Ordering::SeqCst) {
        return None;
    }
    match headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
    {
        Some("Bearer token-alice") => Some("alice"),
        Some("Bearer token-root") => Some("root"),
        _ => None,
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if body["password"] == "password" && matches!(username, "alice" | "root") {
        return Json(json!({ "token": format!("token-{}", username) })).into_response();
    }
    StatusCode::UNAUTHORIZED.into_response()
}

async fn me(State(state): State<StubState>, headers: HeaderMap) -> Response {
    match user_for(&state, &headers) {
        Some("alice") => Json(json!({
            "id": "u-1",
            "username": "alice",
            "role": "front desk",
            "permissions": ["view:hotels", "view:guests"],
        }))
        .into_response(),
        Some(_) => Json(json!({
            "id": "u-0",
            "username": "root",
            "permissions": ["admin", "manage:users"],
        }))
        .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// `GET /api/{collection}` and `GET /api/{collection}/{id}`
async fn data(
    State(state): State<StubState>,
    Path(params): Path<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if user_for(&state, &headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let body = match (params["collection"].as_str(), params.get("id").map(String::as_str)) {
        ("users", None) => json!([{ "id": "u-0", "username": "root" }]),
        ("hotels", None) => json!([{ "id": "H1", "name": "Harbour View" }]),
        ("guests", None) => json!([{ "id": "G001", "name": "Ada Lovelace" }]),
        ("guests", Some("G001")) => json!({ "id": "G001", "name": "Ada Lovelace" }),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(body).into_response()
}
