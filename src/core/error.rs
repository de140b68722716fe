use std::io;
use thiserror::Error;

/// Unified error type for the invoice chat application
#[derive(Error, Debug)]
pub enum InvoiceChatError {
    /// Errors reported by the model provider (non-2xx, blocked prompt, empty reply)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors, including a missing provider credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Invoice store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Errors returned by the relay endpoint
    #[error("Relay error: {0}")]
    Relay(String),
}

impl InvoiceChatError {
    pub fn is_config(&self) -> bool {
        matches!(self, InvoiceChatError::Config(_))
    }
}

impl From<reqwest::Error> for InvoiceChatError {
    fn from(err: reqwest::Error) -> Self {
        // URLs can carry query parameters; keep them out of user-facing text.
        let err = err.without_url();
        if err.is_timeout() {
            InvoiceChatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            InvoiceChatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            InvoiceChatError::Api(format!("API returned error status: {}", err))
        } else if err.is_decode() {
            InvoiceChatError::Serialization(format!("Failed to decode response: {}", err))
        } else {
            InvoiceChatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for InvoiceChatError {
    fn from(err: serde_json::Error) -> Self {
        InvoiceChatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for InvoiceChatError {
    fn from(err: serde_yml::Error) -> Self {
        InvoiceChatError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<crate::store::StoreError> for InvoiceChatError {
    fn from(err: crate::store::StoreError) -> Self {
        InvoiceChatError::Store(err.to_string())
    }
}
