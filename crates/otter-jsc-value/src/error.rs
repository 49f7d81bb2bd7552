//! Error types for the wrapper's own fallible paths.
//!
//! Engine exceptions never surface here: value handles forward them to
//! their context and fall back to a benign result. `JscError` only covers
//! setup, such as loading a [`ContextConfig`](crate::ContextConfig).

use thiserror::Error;

/// Result type alias for wrapper operations
pub type JscResult<T> = Result<T, JscError>;

#[derive(Debug, Error)]
pub enum JscError {
    /// Configuration document could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid config: {field}: {message}")]
    InvalidConfig { field: String, message: String },
}

impl JscError {
    /// Create an invalid-config error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get the error type name
    pub fn error_type(&self) -> &str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::InvalidConfig { .. } => "ConfigError",
        }
    }
}
