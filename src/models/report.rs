//! Ordered collection of measurements from one run

use super::measurement::Measurement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All measurements of a run, in Target-major, ProbeDefinition-minor order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub measurements: Vec<Measurement>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            measurements: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// Create a report from already-ordered measurements
    pub fn from_measurements(measurements: Vec<Measurement>) -> Self {
        Self {
            measurements,
            generated_at: Utc::now(),
        }
    }

    /// Append a measurement, keeping insertion order
    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// Append measurements from another batch in order
    pub fn extend(&mut self, measurements: impl IntoIterator<Item = Measurement>) {
        self.measurements.extend(measurements);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    /// Measurements whose request never completed
    pub fn failures(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter().filter(|m| m.is_failure())
    }

    /// Distinct applications in first-seen order
    pub fn applications(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for m in &self.measurements {
            if !seen.contains(&m.application.as_str()) {
                seen.push(&m.application);
            }
        }
        seen
    }

    /// Measurements for one application, in report order
    pub fn for_application<'a>(&'a self, application: &'a str) -> impl Iterator<Item = &'a Measurement> + 'a {
        self.measurements.iter().filter(move |m| m.application == application)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}
