//! JSON formatter for machine consumption

use super::formatter::OutputFormatter;
use crate::{
    error::{AppError, Result},
    models::{Measurement, Report},
    stats::ReportStatistics,
    timing::{format_epoch_seconds, TimingScope},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

/// One report row as emitted in JSON
#[derive(Debug, Serialize)]
pub struct JsonMeasurement<'a> {
    pub application: &'a str,
    pub endpoint: &'a str,
    pub status: u16,
    /// Epoch seconds with microsecond precision
    pub client_start: String,
    pub client_end: String,
    /// `null` for probes that failed at the transport level
    pub client_duration_s: Option<f64>,
    pub lambda: &'a TimingScope,
    pub endpoint_timing: &'a TimingScope,
    pub error: Option<&'a str>,
}

impl<'a> From<&'a Measurement> for JsonMeasurement<'a> {
    fn from(m: &'a Measurement) -> Self {
        Self {
            application: &m.application,
            endpoint: &m.probe_name,
            status: m.status_code,
            client_start: format_epoch_seconds(m.client_start),
            client_end: format_epoch_seconds(m.client_end),
            client_duration_s: (!m.is_failure()).then(|| m.client_duration_secs()),
            lambda: &m.server.lambda,
            endpoint_timing: &m.server.endpoint,
            error: m.error.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    measurements: Vec<JsonMeasurement<'a>>,
    statistics: ReportStatistics,
}

/// Renders reports as pretty-printed JSON documents
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| AppError::output(format!("Failed to serialize JSON: {}", e)))
    }
}

impl OutputFormatter for JsonFormatter {
    /// JSON output has no header
    fn format_header(&self, _title: &str) -> Result<String> {
        Ok(String::new())
    }

    /// The complete document: measurements in report order plus statistics
    fn format_report(&self, report: &Report) -> Result<String> {
        Self::to_json(&JsonReport {
            generated_at: report.generated_at,
            measurements: report.iter().map(JsonMeasurement::from).collect(),
            statistics: ReportStatistics::from_report(report),
        })
    }

    fn format_statistics(&self, statistics: &ReportStatistics) -> Result<String> {
        Self::to_json(statistics)
    }

    /// Failures are part of the report document
    fn format_failures(&self, _report: &Report) -> Result<String> {
        Ok(String::new())
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(json!({ "error": error }).to_string())
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(json!({ "warning": warning }).to_string())
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(json!({ "success": message }).to_string())
    }
}
