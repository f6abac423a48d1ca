//! Probe targets and request templates

use crate::types::is_supported_method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A deployment under test, identified by its base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    pub base_url: String,
}

impl Target {
    /// Create a new target from a base URL
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self { base_url: base_url.into() }
    }

    /// Join the base URL and an endpoint path with exactly one slash between them
    pub fn url_for(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}

impl From<&str> for Target {
    fn from(base_url: &str) -> Self {
        Self::new(base_url)
    }
}

/// A named request template applied to every target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeDefinition {
    /// Display name used in the report's Endpoint column
    pub name: String,
    /// Path appended to each target's base URL
    pub endpoint: String,
    /// HTTP method as configured; only POST is executed
    #[serde(default = "default_method")]
    pub method: String,
    /// JSON payload sent verbatim as the request body
    #[serde(default = "default_data")]
    pub data: Value,
}

impl ProbeDefinition {
    /// Create a POST probe
    pub fn post<N: Into<String>, E: Into<String>>(name: N, endpoint: E, data: Value) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            method: default_method(),
            data,
        }
    }

    /// Override the configured method
    pub fn with_method<M: Into<String>>(mut self, method: M) -> Self {
        self.method = method.into();
        self
    }

    /// Whether this probe's method can be executed
    pub fn has_supported_method(&self) -> bool {
        is_supported_method(&self.method)
    }
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_data() -> Value {
    Value::Object(serde_json::Map::new())
}
