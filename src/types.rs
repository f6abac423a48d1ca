//! Type definitions and aliases

use reqwest::Method;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Status recorded when a probe never received a response
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Literal rendered for any value the responder did not report
pub const NOT_AVAILABLE: &str = "N/A";

/// HTTP methods a probe may currently use
pub const SUPPORTED_METHODS: &[Method] = &[Method::POST];

/// Check whether a configured method string names a supported verb
pub fn is_supported_method(method: &str) -> bool {
    match Method::from_bytes(method.trim().to_uppercase().as_bytes()) {
        Ok(parsed) => SUPPORTED_METHODS.contains(&parsed),
        Err(_) => false,
    }
}

/// Outcome classification for a single probe execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// A response was received (any HTTP status)
    Responded,
    /// The request could not be sent or no response arrived
    Failed,
    /// The request exceeded the configured timeout
    Timeout,
}

impl ProbeStatus {
    /// Whether a response was received
    pub fn responded(&self) -> bool {
        matches!(self, Self::Responded)
    }
}

/// Report rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Bordered text table
    #[default]
    Table,
    /// Machine-readable JSON document
    Json,
}
