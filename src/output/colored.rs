//! Colored formatter implementation with terminal color support
//!
//! Same layout as the plain formatter; status codes are colored by class
//! and missing values are muted.

use super::formatter::{
    fmt_err, render_table, report_row, report_table_format, seconds, target_statistics_lines, FormattingOptions,
    OutputFormatter, PlainFormatter, RowData, STATUS_COLUMN,
};
use crate::{
    error::Result,
    models::{Measurement, Report},
    stats::ReportStatistics,
    types::{NOT_AVAILABLE, TRANSPORT_FAILURE_STATUS},
};
use colored::*;
use std::fmt::Write as _;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub redirect: Color,
    pub client_error: Color,
    pub server_error: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            redirect: Color::Cyan,
            client_error: Color::Yellow,
            server_error: Color::Red,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Bold and colored when colors are enabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    /// Color for an HTTP status, `None` for informational codes
    pub fn status_color(&self, status: u16) -> Option<Color> {
        match status {
            TRANSPORT_FAILURE_STATUS => Some(self.color_scheme.error),
            200..=299 => Some(self.color_scheme.success),
            300..=399 => Some(self.color_scheme.redirect),
            400..=499 => Some(self.color_scheme.client_error),
            500..=599 => Some(self.color_scheme.server_error),
            _ => None,
        }
    }

    fn style_status(&self, raw: &str, padded: String) -> String {
        let status = raw.parse::<u16>().ok();
        match status.and_then(|s| self.status_color(s).map(|c| (s, c))) {
            Some((TRANSPORT_FAILURE_STATUS, color)) => self.emphasize(&padded, color).to_string(),
            Some((_, color)) => self.colorize(&padded, color).to_string(),
            None => padded,
        }
    }

    fn style_cell(&self, column: usize, raw: &str, padded: String) -> String {
        if column == STATUS_COLUMN {
            self.style_status(raw, padded)
        } else if raw == NOT_AVAILABLE {
            self.colorize(&padded, self.color_scheme.muted).to_string()
        } else {
            padded
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let plain = self.plain_formatter.format_header(title)?;
        Ok(self.emphasize(&plain, self.color_scheme.header).to_string())
    }

    fn format_report(&self, report: &Report) -> Result<String> {
        if report.is_empty() {
            return Ok(self.colorize("No measurements recorded.", self.color_scheme.muted).to_string());
        }

        let rows: Vec<RowData> = report.iter().map(report_row).collect();
        Ok(render_table(&report_table_format(&self.options), &rows, |column, raw, padded| {
            self.style_cell(column, raw, padded)
        }))
    }

    fn format_statistics(&self, statistics: &ReportStatistics) -> Result<String> {
        let mut output = String::new();
        write!(output, "{}", self.emphasize("Statistics:", self.color_scheme.header)).map_err(fmt_err)?;

        if statistics.is_empty() {
            write!(output, "\n{}", self.colorize("No targets were probed.", self.color_scheme.muted)).map_err(fmt_err)?;
            return Ok(output);
        }

        for target in &statistics.targets {
            let mut lines = target_statistics_lines(target).into_iter();
            if let Some(first) = lines.next() {
                let color = if target.failures > 0 {
                    self.color_scheme.warning
                } else {
                    self.color_scheme.success
                };
                write!(output, "\n{}", self.colorize(&first, color)).map_err(fmt_err)?;
            }
            for line in lines {
                write!(output, "\n{}", line).map_err(fmt_err)?;
            }
        }

        if let Some(fastest) = statistics.fastest() {
            write!(
                output,
                "\nFastest target: {} ({})",
                self.emphasize(&fastest.application, self.color_scheme.success),
                seconds(fastest.client_mean_s)
            )
            .map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_failures(&self, report: &Report) -> Result<String> {
        let failures: Vec<&Measurement> = report.failures().collect();
        let mut output = String::new();
        if failures.is_empty() {
            return Ok(output);
        }

        write!(output, "{}", self.emphasize("Failures:", self.color_scheme.error)).map_err(fmt_err)?;
        for m in failures {
            write!(
                output,
                "\n  {} {} {}: {}",
                self.colorize("✗", self.color_scheme.error),
                m.application,
                m.probe_name,
                m.error.as_deref().unwrap_or("no response")
            )
            .map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("ERROR:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("WARNING:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize("SUCCESS:", self.color_scheme.success), message))
    }
}
