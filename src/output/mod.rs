//! Output formatting and display system
//!
//! This module provides a flexible output formatting system for probe
//! reports, supporting colored and plain text tables as well as JSON.

mod colored;
mod formatter;
mod json;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{
    report_row, report_table_format, Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData,
    TableFormat, REPORT_TITLE,
};
pub use json::{JsonFormatter, JsonMeasurement};

use crate::{error::Result, models::Config, models::Report, stats::ReportStatistics, types::OutputMode};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the output mode and color preference
    pub fn create_formatter(mode: OutputMode, enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        if mode == OutputMode::Json {
            return Box::new(JsonFormatter::new());
        }

        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(OutputMode::Table, false, false)
    }
}

/// Main output coordinator that handles all report display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    mode: OutputMode,
    verbose: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, mode: OutputMode, verbose: bool) -> Self {
        Self {
            formatter,
            mode,
            verbose,
        }
    }

    /// Build the coordinator the configuration asks for
    pub fn from_config(config: &Config) -> Self {
        let formatter = OutputFormatterFactory::create_formatter(config.output_mode, config.enable_color, config.verbose);
        Self::new(formatter, config.output_mode, config.verbose)
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Render a complete report
    ///
    /// Table mode prints the header, the table, failure details when any
    /// probe failed, and per-target statistics in verbose mode. JSON mode
    /// prints a single document.
    pub fn display_report(&self, report: &Report) -> Result<String> {
        if self.mode == OutputMode::Json {
            return self.formatter.format_report(report);
        }

        let mut sections = vec![
            self.formatter.format_header(REPORT_TITLE)?,
            self.formatter.format_report(report)?,
        ];

        let failures = self.formatter.format_failures(report)?;
        if !failures.is_empty() {
            sections.push(failures);
        }

        if self.verbose {
            sections.push(self.formatter.format_statistics(&ReportStatistics::from_report(report))?);
        }

        Ok(sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Measurement;
    use crate::timing::ServerTiming;
    use chrono::Utc;
    use std::time::Duration;

    fn report() -> Report {
        Report::from_measurements(vec![
            Measurement::responded("http://a", "/json", Utc::now(), Duration::from_millis(2), 200, ServerTiming::default(), 2),
            Measurement::transport_failure("http://b", "/json", Utc::now(), Duration::from_millis(1), &AppError::transport("refused")),
        ])
    }

    fn coordinator(mode: OutputMode, verbose: bool) -> OutputCoordinator {
        OutputCoordinator::new(OutputFormatterFactory::create_formatter(mode, false, verbose), mode, verbose)
    }

    #[test]
    fn test_table_output_sections() {
        let output = coordinator(OutputMode::Table, false).display_report(&report()).unwrap();
        assert!(output.starts_with("====="));
        assert!(output.contains(REPORT_TITLE));
        assert!(output.contains("| http://a"));
        assert!(output.contains("Failures:"));
        assert!(!output.contains("Statistics:"));
    }

    #[test]
    fn test_verbose_adds_statistics() {
        let output = coordinator(OutputMode::Table, true).display_report(&report()).unwrap();
        assert!(output.contains("Statistics:"));
    }

    #[test]
    fn test_no_failure_section_for_clean_run() {
        let clean = Report::from_measurements(report().iter().filter(|m| !m.is_failure()).cloned().collect());
        let output = coordinator(OutputMode::Table, false).display_report(&clean).unwrap();
        assert!(!output.contains("Failures:"));
    }

    #[test]
    fn test_json_output_is_single_document() {
        let output = coordinator(OutputMode::Json, true).display_report(&report()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(doc["measurements"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            enable_color: false,
            output_mode: OutputMode::Json,
            ..Default::default()
        };
        let output = OutputCoordinator::from_config(&config).display_report(&Report::new()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(doc["measurements"].as_array().unwrap().is_empty());
    }
}
