//! Shared error type
//!
//! Each error carries an [`ErrorContext`] naming the component and operation
//! that failed, plus hints shown to the operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn, Level};

pub type HotelDeskResult<T> = Result<T, HotelDeskError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Where an error happened and what the operator can do about it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Correlates the log line with what the user saw
    pub error_id: String,
    pub timestamp: DateTime<Utc>,
    pub component: String,
    pub operation: Option<String>,
    pub metadata: HashMap<String, String>,
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

#[derive(Error, Debug)]
pub enum HotelDeskError {
    /// Bad or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// The persisted credential could not be read or written
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// Input rejected before anything was sent
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HotelDeskError {
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            HotelDeskError::Config { context, .. }
            | HotelDeskError::Storage { context, .. }
            | HotelDeskError::Network { context, .. }
            | HotelDeskError::Validation { context, .. } => Some(context),
            HotelDeskError::Io(_) | HotelDeskError::Serialization(_) => None,
        }
    }

    /// Whether trying again may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HotelDeskError::Network { .. })
    }

    fn level(&self) -> Level {
        match self {
            HotelDeskError::Network { .. } | HotelDeskError::Validation { .. } => Level::WARN,
            _ => Level::ERROR,
        }
    }

    /// Log the error with its id, component and suggestions
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        let component = self.context().map(|c| c.component.as_str());
        let suggestions = self
            .context()
            .map(|c| c.recovery_suggestions.join("; "))
            .unwrap_or_default();

        if self.level() == Level::WARN {
            warn!(error_id, component, suggestions, error = %self, "Recoverable failure");
        } else {
            error!(error_id, component, suggestions, error = %self, "Operation failed");
        }
    }
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::HotelDeskError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::HotelDeskError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::HotelDeskError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}
