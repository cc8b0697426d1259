//! Configuration management
//!
//! Layering order: built-in defaults, then the TOML file, then `HOTELDESK_*`
//! environment variables (`HOTELDESK_API__BASE_URL`, ...). `HOTELDESK_API_URL`
//! is accepted as a shorthand for the API base URL.

use crate::error::{ErrorContext, HotelDeskError, HotelDeskResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "HOTELDESK";

/// Shorthand environment variable for the API base URL
pub const API_URL_ENV: &str = "HOTELDESK_API_URL";

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelDeskConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub routing: RoutingConfig,
    pub logging: LoggingConfig,
}

/// External REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint is resolved against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Extra attempts after a transport failure
    pub retry_attempts: usize,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            timeout_seconds: 30,
            retry_attempts: 1,
            user_agent: format!("hoteldesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Local persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory; a leading `~` expands to the home directory
    pub data_dir: String,
    /// File name of the persisted credential inside `data_dir`
    pub credential_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.hoteldesk".to_string(),
            credential_file: "credentials.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// Data directory with `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    /// Full path of the credential file
    pub fn credential_path(&self) -> PathBuf {
        self.data_dir().join(&self.credential_file)
    }
}

/// Client-side routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Apply the collection permission to `/{collection}/{id}` detail routes
    pub inherit_detail_permissions: bool,
    /// Maximum number of locations kept for `back()`
    pub history_limit: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            inherit_detail_permissions: false,
            history_limit: 50,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

impl HotelDeskConfig {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hoteldesk")
            .join("config.toml")
    }

    /// Load configuration from defaults, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> HotelDeskResult<Self> {
        let defaults = config::Config::try_from(&HotelDeskConfig::default())
            .map_err(|e| load_error("serialize_defaults", e))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let loaded: HotelDeskConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("api.base_url", std::env::var(API_URL_ENV).ok())
            .map_err(|e| load_error("env_override", e))?
            .build()
            .map_err(|e| load_error("build", e))?
            .try_deserialize()
            .map_err(|e| load_error("deserialize", e))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Load configuration from a TOML file only
    pub fn from_file<P: AsRef<Path>>(path: P) -> HotelDeskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HotelDeskError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: HotelDeskConfig = toml::from_str(&content).map_err(|e| HotelDeskError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> HotelDeskResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| HotelDeskError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| HotelDeskError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> HotelDeskResult<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| HotelDeskError::Config {
            message: format!("Invalid api.base_url '{}': {}", self.api.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Set api.base_url to an absolute http(s) URL"),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(HotelDeskError::Config {
                message: format!("Unsupported api.base_url scheme: {}", url.scheme()),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use an http or https URL"),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(HotelDeskError::Config {
                message: "api.timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        if self.storage.credential_file.trim().is_empty() {
            return Err(HotelDeskError::Config {
                message: "storage.credential_file must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        if self.routing.history_limit == 0 {
            return Err(HotelDeskError::Config {
                message: "routing.history_limit must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        Ok(())
    }
}

fn load_error(operation: &str, error: config::ConfigError) -> HotelDeskError {
    HotelDeskError::Config {
        message: format!("Failed to load configuration: {}", error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("config").with_operation(operation),
    }
}
