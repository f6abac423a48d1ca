//! Structured logging for probe runs
//!
//! Entries are built with a small builder, carry structured fields and an
//! optional correlation id, and are written as console text or JSON lines.
//! Warnings and above go to stderr, and so does everything else when the
//! report on stdout is JSON.

use crate::error::AppError;
use crate::models::{Config, Measurement};
use crate::types::OutputMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// ANSI color code for console output
    fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }

    fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
}

/// A single structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID tying together the events of one run
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Logger with level filtering and console or JSON output
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    /// Send every level to stderr, used when stdout carries a JSON report
    stderr_only: bool,
    name: String,
    /// Correlation id stamped on entries that do not carry their own
    correlation_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    /// Create a logger whose level and format follow the run configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            stderr_only: config.output_mode == OutputMode::Json,
            name,
            correlation_id: Arc::new(RwLock::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set or clear the correlation id attached to subsequent entries
    pub async fn set_correlation_id(&self, id: Option<String>) {
        *self.correlation_id.write().await = id;
    }

    pub async fn correlation_id(&self) -> Option<String> {
        self.correlation_id.read().await.clone()
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        if entry.correlation_id.is_none() {
            entry.correlation_id = self.correlation_id().await;
        }

        let output = self.render(&entry);

        if self.stderr_only || entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Attach the interesting parts of a measurement
    pub fn measurement(self, measurement: &Measurement) -> Self {
        self.field("application", &measurement.application)
            .field("probe", &measurement.probe_name)
            .field("status_code", measurement.status_code)
            .field("client_duration_s", measurement.client_duration_secs())
            .field("lambda_duration", measurement.lambda_duration_display())
            .field("endpoint_duration", measurement.endpoint_duration_display())
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_transport", error.is_transport())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }

    #[cfg(test)]
    fn build(self) -> LogEntry {
        self.entry
    }
}

/// Logger for probe run lifecycle events
///
/// A run's correlation id lives in the logger context from `run_started`
/// until `run_finished`, so every probe event in between carries it.
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("PROBE".to_string(), config),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log the start of a run and return its correlation id
    pub async fn run_started(&self, targets: usize, probes: usize, parallel: bool) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.logger.set_correlation_id(Some(correlation_id.clone())).await;

        self.logger
            .info(&format!("Starting probe run: {} targets x {} probes", targets, probes))
            .field("targets", targets)
            .field("probes", probes)
            .field("parallel", parallel)
            .log()
            .await;

        correlation_id
    }

    pub async fn run_finished(&self, measurements: usize, failures: usize, elapsed: std::time::Duration) {
        self.logger
            .info(&format!(
                "Probe run finished: {} measurements, {} transport failures in {:.3}s",
                measurements,
                failures,
                elapsed.as_secs_f64()
            ))
            .field("measurements", measurements)
            .field("failures", failures)
            .field("elapsed_s", elapsed.as_secs_f64())
            .log()
            .await;

        self.logger.set_correlation_id(None).await;
    }

    /// Log a run refused before any request was sent
    pub async fn run_rejected(&self, error: &AppError) {
        self.logger
            .error(&format!("Probe run rejected: {}", error))
            .error_info(error)
            .log()
            .await;
    }

    /// Log a probe that received a response
    pub async fn probe_completed(&self, measurement: &Measurement) {
        let mut builder = self
            .logger
            .debug(&format!(
                "POST {}{} -> {} in {}s",
                measurement.application,
                measurement.probe_name,
                measurement.status_code,
                measurement.client_duration_display()
            ))
            .measurement(measurement);

        if let Some(size) = measurement.body_size {
            builder = builder.field("body_size", size);
        }

        builder.log().await;
    }

    /// Log a probe whose request never completed
    pub async fn probe_failed(&self, application: &str, probe: &str, error: &AppError) {
        self.logger
            .warn(&format!("Probe {} against {} failed: {}", probe, application, error))
            .field("application", application)
            .field("probe", probe)
            .error_info(error)
            .log()
            .await;
    }
}
