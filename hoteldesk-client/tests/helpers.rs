//! Stub dashboard API served on an ephemeral port

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hoteldesk_client::ApiClient;
use hoteldesk_core::{ApiConfig, RetryConfig};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
pub struct StubState {
    revoked: Arc<AtomicBool>,
    data_hits: Arc<AtomicUsize>,
}

pub struct StubApi {
    pub base_url: String,
    state: StubState,
}

impl StubApi {
    pub fn client(&self) -> ApiClient {
        client_for(&self.base_url)
    }

    /// Every token is rejected from now on
    pub fn revoke_all(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }

    pub fn data_hits(&self) -> usize {
        self.state.data_hits.load(Ordering::SeqCst)
    }
}

pub fn client_for(base_url: &str) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..ApiConfig::default()
    };
    ApiClient::new(&config)
        .expect("Failed to create client")
        .with_retry(RetryConfig::with_retries(1).immediate())
}

pub async fn spawn_stub() -> StubApi {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/{collection}", get(list))
        .route("/api/{collection}/{id}", get(detail))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    StubApi {
        base_url: format!("http://127.0.0.1:{}/api", port),
        state,
    }
}

fn user_for(state: &StubState, headers: &HeaderMap) -> Result<&'static str, StatusCode> {
    if state.revoked.load(Ordering::SeqCst) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match bearer {
        Some("token-alice") => Ok("alice"),
        Some("token-root") => Ok("root"),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if username.is_empty() {
        return (StatusCode::BAD_REQUEST, "username is required").into_response();
    }
    if password == "password" && matches!(username, "alice" | "root") {
        return Json(json!({ "token": format!("token-{}", username) })).into_response();
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid credentials" })),
    )
        .into_response()
}

async fn me(State(state): State<StubState>, headers: HeaderMap) -> Response {
    match user_for(&state, &headers) {
        Ok("alice") => Json(json!({
            "id": "u-1",
            "username": "alice",
            "display_name": "Alice Martin",
            "role": "manager",
            "permissions": ["view:guests", "view:hotels"],
        }))
        .into_response(),
        Ok(_) => Json(json!({
            "id": "u-0",
            "username": "root",
            "permissions": ["admin", "manage:users", "view:finance"],
        }))
        .into_response(),
        Err(status) => status.into_response(),
    }
}

async fn list(
    State(state): State<StubState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.data_hits.fetch_add(1, Ordering::SeqCst);
    if let Err(status) = user_for(&state, &headers) {
        return status.into_response();
    }
    match collection.as_str() {
        "guests" => Json(json!([
            { "id": "G001", "name": "Ada Lovelace" },
            { "id": "G002", "name": "Grace Hopper" },
        ]))
        .into_response(),
        "hotels" => Json(json!([{ "id": "H1", "name": "Harbour View" }])).into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response(),
        "garbled" => "not json".into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn detail(
    State(state): State<StubState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.data_hits.fetch_add(1, Ordering::SeqCst);
    if let Err(status) = user_for(&state, &headers) {
        return status.into_response();
    }
    match (collection.as_str(), id.as_str()) {
        ("guests", "G001") => Json(json!({ "id": "G001", "name": "Ada Lovelace" })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
