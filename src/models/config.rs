//! Configuration data model and validation

use crate::models::probe::{ProbeDefinition, Target};
use crate::types::{AppError, OutputMode, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target base URLs, probed in order
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,

    /// Probe battery, executed in order against every target
    #[serde(default = "default_probes")]
    pub probes: Vec<ProbeDefinition>,

    /// Battery file the targets/probes were loaded from, if any
    #[serde(default)]
    pub battery_file: Option<PathBuf>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Probe targets concurrently
    #[serde(default)]
    pub parallel: bool,

    /// Upper bound on targets probed at once in parallel mode
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Report rendering mode
    #[serde(default)]
    pub output_mode: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            probes: default_probes(),
            battery_file: None,
            timeout_seconds: default_timeout_secs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
            parallel: false,
            max_concurrency: default_max_concurrency(),
            output_mode: OutputMode::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the configuration and return the first error
    ///
    /// Empty target or probe lists are allowed (they produce an empty report),
    /// and so are non-POST methods, which are rejected when the run starts.
    pub fn validate(&self) -> Result<()> {
        for target in &self.targets {
            validate_target_url(target)?;
        }

        for (index, probe) in self.probes.iter().enumerate() {
            if probe.name.trim().is_empty() {
                return Err(AppError::config(format!("Probe #{} has an empty name", index + 1)));
            }
            if probe.endpoint.trim().is_empty() {
                return Err(AppError::config(format!("Probe '{}' has an empty endpoint", probe.name)));
            }
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if self.max_concurrency == 0 {
            return Err(AppError::config("Max concurrency must be at least 1"));
        }

        Ok(())
    }

    /// Build targets from the configured base URLs
    pub fn create_targets(&self) -> Result<Vec<Target>> {
        self.targets
            .iter()
            .map(|url| {
                validate_target_url(url)?;
                Ok(Target::new(url.trim()))
            })
            .collect()
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(targets) = std::env::var("PROBE_TARGETS") {
            self.targets = split_list(&targets);
        }

        if let Ok(battery) = std::env::var("PROBE_BATTERY") {
            let battery = battery.trim();
            if !battery.is_empty() {
                self.battery_file = Some(PathBuf::from(battery));
            }
        }

        if let Ok(timeout) = std::env::var("PROBE_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(parallel) = std::env::var("PROBE_PARALLEL") {
            self.parallel = parallel
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_PARALLEL value '{}': {}", parallel, e)))?;
        }

        Ok(())
    }
}

fn validate_target_url(target: &str) -> Result<()> {
    let target = target.trim();
    if target.is_empty() {
        return Err(AppError::config("Target URL cannot be empty"));
    }

    let parsed = url::Url::parse(target)
        .map_err(|e| AppError::config(format!("Invalid target URL '{}': {}", target, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::config(format!(
                "Target URL '{}' must use http or https, not {}",
                target, scheme
            )))
        }
    }

    if parsed.host_str().is_none() {
        return Err(AppError::config(format!("Target URL '{}' has no host", target)));
    }

    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Default value functions for serde
fn default_targets() -> Vec<String> {
    crate::defaults::DEFAULT_TARGETS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_probes() -> Vec<ProbeDefinition> {
    crate::defaults::default_probes()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

fn default_max_concurrency() -> usize {
    num_cpus::get().max(1)
}
