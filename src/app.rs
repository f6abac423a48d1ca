//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config},
    error::Result,
    executor::ProbeExecutor,
    models::{Config, Report},
    output::OutputCoordinator,
    types::OutputMode,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Load configuration, run the battery and print the report
    pub async fn run(self) -> Result<Report> {
        if self.cli.color {
            colored::control::set_override(true);
        }

        let config = load_config(self.cli.clone())?;
        self.report_configuration(&config)?;

        let targets = config.create_targets()?;
        let executor = ProbeExecutor::from_config(&config)?;

        if config.verbose && config.output_mode == OutputMode::Table {
            println!(
                "Probing {} targets with {} probes ({}, timeout {}s)...",
                targets.len(),
                config.probes.len(),
                if config.parallel { "parallel" } else { "sequential" },
                config.timeout_seconds
            );
            println!();
        }

        let report = executor.run(&targets, &config.probes).await?;

        let coordinator = OutputCoordinator::from_config(&config);
        println!("{}", coordinator.display_report(&report)?);

        Ok(report)
    }

    /// Print debug summary and validation warnings
    fn report_configuration(&self, config: &Config) -> Result<()> {
        let warnings = validate_config(config)?;

        if config.debug {
            eprintln!("Configuration Summary:");
            eprintln!("{}", display_config_summary(config));
            eprintln!();
        }

        // Warnings go to stderr so JSON output stays parseable
        if !warnings.is_empty() {
            eprintln!("Configuration Warnings:");
            for warning in &warnings {
                eprintln!("  {}", warning.format(config.enable_color));
            }
            eprintln!();
        }

        Ok(())
    }
}
