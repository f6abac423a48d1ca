//! Configuration parsing from CLI arguments, environment variables and battery files

use crate::{
    cli::Cli,
    config::{battery::BatteryFile, env::EnvManager},
    error::Result,
    models::Config,
    types::OutputMode,
};

/// Configuration parser that layers defaults, .env, environment, battery file and CLI
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;
        config.merge_from_env()?;

        // --battery wins over PROBE_BATTERY
        if let Some(ref battery) = self.cli.battery {
            config.battery_file = Some(battery.clone());
        }
        if let Some(ref path) = config.battery_file {
            BatteryFile::load(path)?.apply_to(&mut config);
        }

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Load .env file if it exists
    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if !self.cli.targets.is_empty() {
            config.targets = self.cli.targets.clone();
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if self.cli.color {
            config.enable_color = true;
        } else if self.cli.no_color {
            config.enable_color = false;
        }

        if self.cli.parallel {
            config.parallel = true;
        }

        if let Some(max_concurrency) = self.cli.max_concurrency {
            config.max_concurrency = max_concurrency;
        }

        if self.cli.json {
            config.output_mode = OutputMode::Json;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", self.cli.get_config_summary());
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Targets: {}", config.targets.join(", ")));
    summary.push(format!(
        "Probes: {}",
        config.probes.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
    ));
    if let Some(ref battery) = config.battery_file {
        summary.push(format!("Battery file: {}", battery.display()));
    }
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!(
        "Execution: {}",
        if config.parallel {
            format!("parallel (max {} targets)", config.max_concurrency)
        } else {
            "sequential".to_string()
        }
    ));
    summary.push(format!("Output: {:?}", config.output_mode));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
