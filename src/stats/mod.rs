//! Per-target timing statistics
//!
//! Client durations are aggregated over probes that received a response.
//! Server-reported durations are opaque strings on the wire; the ones
//! that parse as plain decimals are averaged and the rest are skipped.

use crate::models::{Measurement, Report};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of the measurements taken against one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStatistics {
    /// Target base URL
    pub application: String,
    /// Number of probes executed
    pub probe_count: usize,
    /// Probes that received a response (any status)
    pub responded: usize,
    /// Probes that failed at the transport level
    pub failures: usize,
    /// Client duration over responded probes, in seconds
    pub client_mean_s: Option<f64>,
    pub client_min_s: Option<f64>,
    pub client_max_s: Option<f64>,
    pub client_std_dev_s: Option<f64>,
    /// Mean of the parseable `X-Lambda-Duration` values
    pub lambda_mean_s: Option<f64>,
    /// Mean of the parseable `X-Endpoint-Duration` values
    pub endpoint_mean_s: Option<f64>,
}

impl TargetStatistics {
    /// Summarize measurements that all belong to one target
    pub fn from_measurements<'a, I>(application: &str, measurements: I) -> Self
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut probe_count = 0;
        let mut client = Vec::new();
        let mut lambda = Vec::new();
        let mut endpoint = Vec::new();

        for measurement in measurements {
            probe_count += 1;
            if measurement.is_failure() {
                continue;
            }
            client.push(measurement.client_duration_secs());
            if let Some(value) = measurement.server.lambda.duration_secs() {
                lambda.push(value);
            }
            if let Some(value) = measurement.server.endpoint.duration_secs() {
                endpoint.push(value);
            }
        }

        let responded = client.len();
        let client_mean_s = mean(&client);

        Self {
            application: application.to_string(),
            probe_count,
            responded,
            failures: probe_count - responded,
            client_mean_s,
            client_min_s: client.iter().copied().reduce(f64::min),
            client_max_s: client.iter().copied().reduce(f64::max),
            client_std_dev_s: client_mean_s.and_then(|m| std_dev(&client, m)),
            lambda_mean_s: mean(&lambda),
            endpoint_mean_s: mean(&endpoint),
        }
    }

    /// Share of probes that got a response, in percent
    pub fn response_rate(&self) -> f64 {
        if self.probe_count == 0 {
            0.0
        } else {
            self.responded as f64 / self.probe_count as f64 * 100.0
        }
    }
}

/// Statistics for a whole report, one entry per target in report order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub targets: Vec<TargetStatistics>,
    pub total_probes: usize,
    pub total_failures: usize,
    pub generated_at: DateTime<Utc>,
}

impl ReportStatistics {
    pub fn from_report(report: &Report) -> Self {
        let targets: Vec<TargetStatistics> = report
            .applications()
            .into_iter()
            .map(|application| TargetStatistics::from_measurements(application, report.for_application(application)))
            .collect();

        Self {
            total_probes: targets.iter().map(|t| t.probe_count).sum(),
            total_failures: targets.iter().map(|t| t.failures).sum(),
            targets,
            generated_at: Utc::now(),
        }
    }

    pub fn for_application(&self, application: &str) -> Option<&TargetStatistics> {
        self.targets.iter().find(|t| t.application == application)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Target with the lowest mean client duration
    pub fn fastest(&self) -> Option<&TargetStatistics> {
        self.targets
            .iter()
            .filter(|t| t.client_mean_s.is_some())
            .min_by(|a, b| {
                a.client_mean_s
                    .partial_cmp(&b.client_mean_s)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation; needs at least two values
fn std_dev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
