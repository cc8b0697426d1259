//! HotelDesk Core - shared building blocks for the dashboard crates
//!
//! Error handling, logging, configuration and async helpers used by the
//! session store, the route resolver and the API client.

pub mod async_utils;
pub mod config;
pub mod error;
pub mod logging;

pub use async_utils::*;
pub use config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
