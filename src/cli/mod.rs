//! Command-line interface definition

use clap::{ArgAction, Parser};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
ENVIRONMENT:
    PROBE_TARGETS            Comma-separated target base URLs
    PROBE_BATTERY            Path to a JSON battery file
    PROBE_TIMEOUT_SECONDS    Per-request timeout in seconds (1-300)
    PROBE_PARALLEL           Probe targets concurrently (true/false)
    ENABLE_COLOR             Colored output (true/false)

BATTERY FILE:
    {
      \"targets\": [\"http://localhost:5000\"],
      \"probes\": [
        {\"name\": \"/math (sum)\", \"endpoint\": \"/math\", \"method\": \"POST\",
         \"data\": {\"numbers\": [1, 2, 3], \"operation\": \"sum\"}}
      ]
    }

Values from a .env file in the working directory are loaded first.";

/// Latency Probe - time POST endpoints across deployments
#[derive(Parser, Debug, Clone)]
#[command(name = "latency-probe")]
#[command(version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Cli {
    /// Target base URL to probe (can be used multiple times)
    #[arg(long = "target", action = ArgAction::Append, value_name = "URL")]
    pub targets: Vec<String>,

    /// JSON file with targets and/or probe definitions
    #[arg(short, long, value_name = "FILE")]
    pub battery: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_parser = parse_duration, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Probe targets concurrently (probes within a target stay sequential)
    #[arg(long)]
    pub parallel: bool,

    /// Maximum number of targets probed at once with --parallel
    #[arg(long, value_name = "N", requires = "parallel")]
    pub max_concurrency: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub print_example_env: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.max_concurrency == Some(0) {
            return Err("--max-concurrency must be at least 1".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command line:\n");
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Parallel: {}\n", self.parallel));
        summary.push_str(&format!("  JSON output: {}\n", self.json));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        if !self.targets.is_empty() {
            summary.push_str(&format!("  Targets: {}\n", self.targets.join(", ")));
        }

        if let Some(ref battery) = self.battery {
            summary.push_str(&format!("  Battery file: {}\n", battery.display()));
        }

        summary
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
