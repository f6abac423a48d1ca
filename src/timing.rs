//! Server-side timing header protocol
//!
//! Responders report two timing scopes through response headers:
//!
//! | Scope    | Start                   | End                   | Duration              |
//! |----------|-------------------------|-----------------------|-----------------------|
//! | lambda   | `X-Lambda-Start-Time`   | `X-Lambda-End-Time`   | `X-Lambda-Duration`   |
//! | endpoint | `X-Endpoint-Start-Time` | `X-Endpoint-End-Time` | `X-Endpoint-Duration` |
//!
//! Start/end values are decimal epoch seconds and durations are decimal
//! elapsed seconds. Every header is optional. The client treats the values
//! as opaque strings because the server clock is not synchronized with ours.

use crate::types::NOT_AVAILABLE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const LAMBDA_START_HEADER: &str = "X-Lambda-Start-Time";
pub const LAMBDA_END_HEADER: &str = "X-Lambda-End-Time";
pub const LAMBDA_DURATION_HEADER: &str = "X-Lambda-Duration";
pub const ENDPOINT_START_HEADER: &str = "X-Endpoint-Start-Time";
pub const ENDPOINT_END_HEADER: &str = "X-Endpoint-End-Time";
pub const ENDPOINT_DURATION_HEADER: &str = "X-Endpoint-Duration";

/// All six timing headers in emission order
pub const TIMING_HEADERS: [&str; 6] = [
    LAMBDA_START_HEADER,
    LAMBDA_END_HEADER,
    LAMBDA_DURATION_HEADER,
    ENDPOINT_START_HEADER,
    ENDPOINT_END_HEADER,
    ENDPOINT_DURATION_HEADER,
];

/// One server-reported timing scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingScope {
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<String>,
}

impl TimingScope {
    fn from_headers(headers: &[(String, String)], start: &str, end: &str, duration: &str) -> Self {
        Self {
            start: header_value(headers, start),
            end: header_value(headers, end),
            duration: header_value(headers, duration),
        }
    }

    /// Duration as reported, or the "N/A" sentinel when absent or blank
    pub fn duration_display(&self) -> &str {
        match self.duration.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => NOT_AVAILABLE,
        }
    }

    /// Duration parsed as seconds, when the responder sent a plain decimal
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite())
    }

    /// Whether the responder sent any header for this scope
    pub fn is_reported(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.duration.is_some()
    }
}

/// Both timing scopes harvested from one response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerTiming {
    pub lambda: TimingScope,
    pub endpoint: TimingScope,
}

impl ServerTiming {
    /// Extract timing scopes from response headers. Missing headers become `None`.
    pub fn from_headers(headers: &[(String, String)]) -> Self {
        Self {
            lambda: TimingScope::from_headers(
                headers,
                LAMBDA_START_HEADER,
                LAMBDA_END_HEADER,
                LAMBDA_DURATION_HEADER,
            ),
            endpoint: TimingScope::from_headers(
                headers,
                ENDPOINT_START_HEADER,
                ENDPOINT_END_HEADER,
                ENDPOINT_DURATION_HEADER,
            ),
        }
    }

    /// Timing for a probe that never got a response
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Case-insensitive header lookup; a blank value counts as absent
fn header_value(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.clone())
        .filter(|value| !value.trim().is_empty())
}

/// Format a wall-clock instant as decimal epoch seconds (microsecond precision)
pub fn format_epoch_seconds(at: DateTime<Utc>) -> String {
    let micros = at.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let micros = micros.unsigned_abs();
    format!("{}{}.{:06}", sign, micros / 1_000_000, micros % 1_000_000)
}

/// Format an elapsed duration as decimal seconds
pub fn format_duration_seconds(duration: Duration) -> String {
    format!("{:.6}", duration.as_secs_f64())
}
