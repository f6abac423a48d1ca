//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::{Measurement, Report},
    stats::{ReportStatistics, TargetStatistics},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the measurement table, one row per measurement in report order
    fn format_report(&self, report: &Report) -> Result<String>;

    /// Format per-target statistics
    fn format_statistics(&self, statistics: &ReportStatistics) -> Result<String>;

    /// Format error details of transport-failed probes
    fn format_failures(&self, report: &Report) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
    /// Draw a separator line between data rows
    pub row_separators: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width: 0,
            max_width,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

pub const REPORT_TITLE: &str = "Latency Probe Results";

/// Index of the status column in the report table
pub(crate) const STATUS_COLUMN: usize = 2;

/// Column layout of the report table
pub fn report_table_format(options: &FormattingOptions) -> TableFormat {
    // Report cells are never cut: base URLs identify the deployment
    let width = usize::MAX;
    TableFormat {
        columns: vec![
            Column::new("Application", Alignment::Left, width),
            Column::new("Endpoint", Alignment::Left, width),
            Column::new("Status", Alignment::Right, width),
            Column::new("Client Duration (s)", Alignment::Right, width),
            Column::new("Lambda Duration (s)", Alignment::Right, width),
            Column::new("Endpoint Duration (s)", Alignment::Right, width),
        ],
        show_borders: options.table_borders,
        show_header: true,
        row_separators: options.table_borders,
    }
}

/// Cells of one report row
pub fn report_row(measurement: &Measurement) -> RowData {
    vec![
        measurement.application.clone(),
        measurement.probe_name.clone(),
        measurement.status_code.to_string(),
        measurement.client_duration_display(),
        measurement.lambda_duration_display().to_string(),
        measurement.endpoint_duration_display().to_string(),
    ]
}

/// Render a table. `style` receives the column index and the padded cell
/// text and may decorate it; widths are computed on the raw text.
pub(crate) fn render_table<F>(format: &TableFormat, rows: &[RowData], style: F) -> String
where
    F: Fn(usize, &str, String) -> String,
{
    let widths = column_widths(format, rows);
    let border = horizontal_border(&widths);
    let mut output = String::new();

    if format.show_header && !format.columns.is_empty() {
        if format.show_borders {
            output.push_str(&border);
            output.push('\n');
        }
        let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
        output.push_str(&table_row(&headers, &widths, format, &|_, _, padded| padded));
        output.push('\n');
        if format.show_borders {
            output.push_str(&border.replace('-', "="));
            output.push('\n');
        }
    }

    for (index, row) in rows.iter().enumerate() {
        output.push_str(&table_row(row, &widths, format, &style));
        output.push('\n');
        if format.show_borders && format.row_separators && index + 1 < rows.len() {
            output.push_str(&border);
            output.push('\n');
        }
    }

    if format.show_borders {
        output.push_str(&border);
    }

    output.trim_end_matches('\n').to_string()
}

fn column_widths(format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
    let num_columns = format
        .columns
        .len()
        .max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

    (0..num_columns)
        .map(|idx| {
            let column = format.columns.get(idx);
            let mut width = column.map(|c| c.min_width.max(text_width(&c.header))).unwrap_or(0);
            for row in rows {
                if let Some(cell) = row.get(idx) {
                    width = width.max(text_width(cell));
                }
            }
            match column {
                Some(c) => width.min(c.max_width.max(text_width(&c.header))),
                None => width,
            }
        })
        .collect()
}

fn table_row<F>(data: &[String], widths: &[usize], format: &TableFormat, style: &F) -> String
where
    F: Fn(usize, &str, String) -> String,
{
    let mut row = String::new();
    if format.show_borders {
        row.push('|');
    }

    for (idx, &width) in widths.iter().enumerate() {
        let cell = data.get(idx).map(String::as_str).unwrap_or("");
        let alignment = format.columns.get(idx).map(|c| c.alignment).unwrap_or(Alignment::Left);
        let padded = style(idx, cell, align_text(cell, width, alignment));

        if format.show_borders {
            row.push(' ');
            row.push_str(&padded);
            row.push_str(" |");
        } else {
            row.push_str(&padded);
            row.push_str("  ");
        }
    }

    row.trim_end().to_string()
}

fn horizontal_border(widths: &[usize]) -> String {
    let mut border = String::from("+");
    for &width in widths {
        border.push_str(&"-".repeat(width + 2));
        border.push('+');
    }
    border
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Pad text to the specified width; longer text is returned whole
pub(crate) fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let len = text_width(text);
    if len >= width {
        return text.to_string();
    }

    let padding = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

pub(crate) fn seconds(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6}s", v))
        .unwrap_or_else(|| crate::types::NOT_AVAILABLE.to_string())
}

pub(crate) fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::output(format!("Failed to format output: {}", e))
}

/// Plain-text lines describing one target's statistics
pub(crate) fn target_statistics_lines(stats: &TargetStatistics) -> Vec<String> {
    vec![
        format!(
            "{}: {} probes, {} responded, {} failed ({:.1}% responded)",
            stats.application,
            stats.probe_count,
            stats.responded,
            stats.failures,
            stats.response_rate()
        ),
        format!(
            "  client   mean {}  min {}  max {}  std dev {}",
            seconds(stats.client_mean_s),
            seconds(stats.client_min_s),
            seconds(stats.client_max_s),
            seconds(stats.client_std_dev_s)
        ),
        format!(
            "  server   lambda mean {}  endpoint mean {}",
            seconds(stats.lambda_mean_s),
            seconds(stats.endpoint_mean_s)
        ),
    ]
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(text_width(title) + 4);

        writeln!(output, "{}", border).map_err(fmt_err)?;
        writeln!(output, "  {}  ", title).map_err(fmt_err)?;
        write!(output, "{}", border).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_report(&self, report: &Report) -> Result<String> {
        if report.is_empty() {
            return Ok("No measurements recorded.".to_string());
        }

        let rows: Vec<RowData> = report.iter().map(report_row).collect();
        Ok(render_table(&report_table_format(&self.options), &rows, |_, _, padded| padded))
    }

    fn format_statistics(&self, statistics: &ReportStatistics) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Statistics:").map_err(fmt_err)?;
        write!(output, "-----------").map_err(fmt_err)?;

        if statistics.is_empty() {
            write!(output, "\nNo targets were probed.").map_err(fmt_err)?;
            return Ok(output);
        }

        for target in &statistics.targets {
            for line in target_statistics_lines(target) {
                write!(output, "\n{}", line).map_err(fmt_err)?;
            }
        }

        if let Some(fastest) = statistics.fastest() {
            write!(
                output,
                "\nFastest target: {} ({})",
                fastest.application,
                seconds(fastest.client_mean_s)
            )
            .map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_failures(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let failures: Vec<&Measurement> = report.failures().collect();
        if failures.is_empty() {
            return Ok(output);
        }

        writeln!(output, "Failures:").map_err(fmt_err)?;
        write!(output, "---------").map_err(fmt_err)?;
        for m in failures {
            write!(
                output,
                "\n  {} {}: {}",
                m.application,
                m.probe_name,
                m.error.as_deref().unwrap_or("no response")
            )
            .map_err(fmt_err)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ServerTiming;
    use chrono::Utc;
    use std::time::Duration;

    fn plain() -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            ..Default::default()
        })
    }

    fn sample_report() -> Report {
        let mut server = ServerTiming::default();
        server.lambda.duration = Some("0.0021".to_string());
        server.endpoint.duration = Some("0.0019".to_string());

        Report::from_measurements(vec![
            Measurement::responded(
                "http://localhost:5000",
                "/math (sum)",
                Utc::now(),
                Duration::from_micros(12_345),
                200,
                server,
                13,
            ),
            Measurement::transport_failure(
                "http://localhost:5001",
                "/json",
                Utc::now(),
                Duration::from_millis(2),
                &AppError::transport("connection refused"),
            ),
        ])
    }

    #[test]
    fn test_report_table_layout() {
        let table = plain().format_report(&sample_report()).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("+-"));
        assert!(lines[1].contains("Application"));
        assert!(lines[1].contains("Client Duration (s)"));
        assert!(lines[1].contains("Endpoint Duration (s)"));
        assert!(lines[2].starts_with("+="));
        assert!(lines[3].contains("http://localhost:5000"));
        assert!(lines[3].contains("/math (sum)"));
        assert!(lines[3].contains("0.012345"));
        assert!(lines[3].contains("0.0021"));
        assert!(lines[3].contains("0.0019"));
        assert!(lines[5].contains("http://localhost:5001"));
        assert!(lines.last().unwrap().starts_with("+-"));

        // Every line of a bordered table has the same width
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_long_application_url_is_rendered_whole() {
        let first = format!("https://{}.lambda-url.us-east-1.on.aws/prod", "a".repeat(60));
        let second = format!("https://{}.lambda-url.us-east-1.on.aws/stage", "a".repeat(60));
        assert!(first.len() > 80);

        let report = Report::from_measurements(vec![
            Measurement::responded(first.as_str(), "/math (sum)", Utc::now(), Duration::from_millis(3), 200, ServerTiming::default(), 0),
            Measurement::responded(second.as_str(), "/math (sum)", Utc::now(), Duration::from_millis(4), 200, ServerTiming::default(), 0),
        ]);
        let table = plain().format_report(&report).unwrap();

        assert!(table.contains(&first));
        assert!(table.contains(&second));
        let lines: Vec<&str> = table.lines().collect();
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_blank_server_duration_renders_not_available() {
        let mut server = ServerTiming::default();
        server.lambda.duration = Some(String::new());
        server.endpoint.duration = Some("0.0019".to_string());

        let m = Measurement::responded("http://localhost:5000", "/json", Utc::now(), Duration::from_millis(2), 200, server, 0);
        assert_eq!(report_row(&m)[4], "N/A");
        assert_eq!(report_row(&m)[5], "0.0019");
    }

    #[test]
    fn test_failure_row_shows_sentinels() {
        let table = plain().format_report(&sample_report()).unwrap();
        let failure_row = table.lines().find(|l| l.contains("/json")).unwrap();
        let cells: Vec<&str> = failure_row.split('|').map(str::trim).filter(|c| !c.is_empty()).collect();

        assert_eq!(cells, vec!["http://localhost:5001", "/json", "0", "N/A", "N/A", "N/A"]);
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(plain().format_report(&Report::new()).unwrap(), "No measurements recorded.");
    }

    #[test]
    fn test_unbordered_table() {
        let formatter = PlainFormatter::new(FormattingOptions {
            table_borders: false,
            ..Default::default()
        });
        let table = formatter.format_report(&sample_report()).unwrap();
        assert!(!table.contains('|'));
        assert!(!table.contains('+'));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn test_failures_section() {
        let report = sample_report();
        let failures = plain().format_failures(&report).unwrap();
        assert!(failures.starts_with("Failures:"));
        assert!(failures.contains("http://localhost:5001 /json: Transport error: connection refused"));

        let clean = Report::from_measurements(report.iter().filter(|m| !m.is_failure()).cloned().collect());
        assert!(plain().format_failures(&clean).unwrap().is_empty());
    }

    #[test]
    fn test_statistics_section() {
        let stats = ReportStatistics::from_report(&sample_report());
        let text = plain().format_statistics(&stats).unwrap();

        assert!(text.contains("http://localhost:5000: 1 probes, 1 responded, 0 failed"));
        assert!(text.contains("lambda mean 0.002100s"));
        assert!(text.contains("http://localhost:5001: 1 probes, 0 responded, 1 failed"));
        assert!(text.contains("Fastest target: http://localhost:5000"));
    }

    #[test]
    fn test_messages_and_header() {
        let formatter = plain();
        assert_eq!(formatter.format_error("boom").unwrap(), "ERROR: boom");
        assert_eq!(formatter.format_warning("careful").unwrap(), "WARNING: careful");
        assert_eq!(formatter.format_success("done").unwrap(), "SUCCESS: done");

        let header = formatter.format_header("Title").unwrap();
        assert_eq!(header, "=========\n  Title  \n=========");
    }

    #[test]
    fn test_align_text() {
        assert_eq!(align_text("ab", 5, Alignment::Left), "ab   ");
        assert_eq!(align_text("ab", 5, Alignment::Right), "   ab");
        assert_eq!(align_text("ab", 6, Alignment::Center), "  ab  ");
        assert_eq!(align_text("abcdef", 3, Alignment::Left), "abcdef");
    }
}
