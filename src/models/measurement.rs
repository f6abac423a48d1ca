//! Per-probe timing measurements

use crate::{
    error::AppError,
    timing::ServerTiming,
    types::{ProbeStatus, NOT_AVAILABLE, TRANSPORT_FAILURE_STATUS},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of executing one probe against one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Base URL of the target the probe ran against
    pub application: String,

    /// Display name of the probe
    pub probe_name: String,

    /// Wall-clock time immediately before the request was sent
    pub client_start: DateTime<Utc>,

    /// Always `client_start + client_duration`
    pub client_end: DateTime<Utc>,

    /// Round trip measured with a monotonic clock
    pub client_duration: Duration,

    /// Timing reported by the responder, passed through verbatim
    pub server: ServerTiming,

    /// HTTP status, or `TRANSPORT_FAILURE_STATUS` when no response arrived
    pub status_code: u16,

    /// Execution status
    pub status: ProbeStatus,

    /// Transport error description for failed probes
    pub error: Option<String>,

    /// Size of the received body in bytes
    pub body_size: Option<usize>,
}

impl Measurement {
    /// Create a measurement for a probe that received a response
    pub fn responded(
        application: impl Into<String>,
        probe_name: impl Into<String>,
        client_start: DateTime<Utc>,
        client_duration: Duration,
        status_code: u16,
        server: ServerTiming,
        body_size: usize,
    ) -> Self {
        Self {
            application: application.into(),
            probe_name: probe_name.into(),
            client_start,
            client_end: end_time(client_start, client_duration),
            client_duration,
            server,
            status_code,
            status: ProbeStatus::Responded,
            error: None,
            body_size: Some(body_size),
        }
    }

    /// Create a failure measurement for a probe whose request never completed
    pub fn transport_failure(
        application: impl Into<String>,
        probe_name: impl Into<String>,
        client_start: DateTime<Utc>,
        client_duration: Duration,
        error: &AppError,
    ) -> Self {
        let status = match error {
            AppError::Timeout(_) => ProbeStatus::Timeout,
            _ => ProbeStatus::Failed,
        };

        Self {
            application: application.into(),
            probe_name: probe_name.into(),
            client_start,
            client_end: end_time(client_start, client_duration),
            client_duration,
            server: ServerTiming::unavailable(),
            status_code: TRANSPORT_FAILURE_STATUS,
            status,
            error: Some(error.to_string()),
            body_size: None,
        }
    }

    /// Whether the probe failed at the transport level
    pub fn is_failure(&self) -> bool {
        !self.status.responded()
    }

    /// Client duration in seconds
    pub fn client_duration_secs(&self) -> f64 {
        self.client_duration.as_secs_f64()
    }

    /// Client duration with 6 decimals, or "N/A" for failed probes
    pub fn client_duration_display(&self) -> String {
        if self.is_failure() {
            NOT_AVAILABLE.to_string()
        } else {
            format!("{:.6}", self.client_duration_secs())
        }
    }

    /// Server-reported lambda duration, or "N/A"
    pub fn lambda_duration_display(&self) -> &str {
        self.server.lambda.duration_display()
    }

    /// Server-reported endpoint duration, or "N/A"
    pub fn endpoint_duration_display(&self) -> &str {
        self.server.endpoint.duration_display()
    }
}

fn end_time(start: DateTime<Utc>, elapsed: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(elapsed)
        .ok()
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(start)
}
