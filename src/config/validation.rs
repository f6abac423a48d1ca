//! Configuration validation rules that produce warnings rather than errors

use crate::{
    error::Result,
    models::Config,
};
use std::collections::HashSet;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run hard validation, then collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_targets(&config.targets));
        warnings.extend(Self::validate_probes(config));
        warnings.extend(Self::validate_performance_settings(config));

        Ok(warnings)
    }

    fn validate_targets(targets: &[String]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if targets.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "No targets configured; the report will be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for target in targets {
            let normalized = target.trim().trim_end_matches('/');
            if !seen.insert(normalized.to_string()) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Target '{}' is listed more than once and will be probed repeatedly", target),
                ));
            }

            if let Ok(parsed) = url::Url::parse(target.trim()) {
                if parsed.query().is_some() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Warning,
                        format!("Target '{}' has a query string; probe endpoints are appended after it", target),
                    ));
                }
            }
        }

        warnings
    }

    fn validate_probes(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.probes.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "No probes configured; the report will be empty".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for probe in &config.probes {
            if !probe.has_supported_method() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Error,
                    format!(
                        "Probe '{}' uses method '{}'; only POST is supported and the run will abort",
                        probe.name, probe.method
                    ),
                ));
            }

            if !names.insert(probe.name.as_str()) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Probe name '{}' is used more than once; report rows will be ambiguous", probe.name),
                ));
            }

            if !probe.endpoint.starts_with('/') {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Probe '{}' endpoint '{}' has no leading '/'; one will be inserted", probe.name, probe.endpoint),
                ));
            }
        }

        warnings
    }

    fn validate_performance_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout_seconds < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}s may be too short for cold-start deployments", config.timeout_seconds),
            ));
        } else if config.timeout_seconds > 60 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long timeout of {}s will slow down failure detection", config.timeout_seconds),
            ));
        }

        let total_probes = config.targets.len() * config.probes.len();
        if total_probes > 100 && !config.parallel {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Configuration will run {} sequential probes; consider --parallel", total_probes),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let label = match self.level {
                ValidationLevel::Info => self.level.as_str().blue(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
                ValidationLevel::Error => self.level.as_str().red().bold(),
            };
            format!("[{}] {}", label, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
