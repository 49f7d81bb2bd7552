//! Context configuration.
//!
//! Loaded from JSON so embedders can keep it next to the rest of their
//! runtime settings.

use serde::Deserialize;

use crate::error::{JscError, JscResult};

/// Which handle a value-returning accessor yields after an engine exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionValue {
    /// The thrown value itself
    #[default]
    Thrown,
    /// A fresh `undefined`
    Undefined,
}

/// Settings for a [`JscContext`](crate::JscContext).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Label attached to log events from this context.
    /// Default: "main"
    pub name: String,

    /// Sentinel returned by getters whose engine call threw.
    /// Default: thrown
    pub exception_value: ExceptionValue,

    /// Keep the most recent exception for later inspection.
    /// Default: true
    pub record_last_exception: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            exception_value: ExceptionValue::Thrown,
            record_last_exception: true,
        }
    }
}

impl ContextConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> JscResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_exception_value(mut self, exception_value: ExceptionValue) -> Self {
        self.exception_value = exception_value;
        self
    }

    pub fn with_record_last_exception(mut self, record: bool) -> Self {
        self.record_last_exception = record;
        self
    }

    fn validate(&self) -> JscResult<()> {
        if self.name.trim().is_empty() {
            return Err(JscError::invalid_config("name", "must not be empty"));
        }
        Ok(())
    }
}
