//! HotelDesk Client - the dashboard's view of the external REST API
//!
//! - [`ApiClient`]: reqwest based client; bearer auth, one retry on transport
//!   failures, and the [`AuthApi`](hoteldesk_auth::AuthApi) implementation
//!   used by the session store
//! - [`SessionGuard`]: the transport interceptor; any 401 clears the session
//! - [`LoadState`]: per-view loading / loaded / failed state

pub mod auth_api;
pub mod client;
pub mod guard;
pub mod load_state;

pub use client::ApiClient;
pub use guard::SessionGuard;
pub use load_state::LoadState;

use hoteldesk_core::HotelDeskError;

/// Client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 401 from the API
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-success status
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// The request never produced a response
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected shape
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Core error: {0}")]
    Core(#[from] HotelDeskError),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Only transport failures are worth retrying
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}
