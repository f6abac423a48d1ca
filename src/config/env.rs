//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists. Variables already set in the
    /// process environment are not overridden.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Latency Probe Configuration
#
# Values here are used as defaults and can be overridden by
# command-line arguments.

# Target base URLs to probe, in report order (comma-separated)
# PROBE_TARGETS=http://localhost:5000,http://localhost:5001,http://localhost:5002

# JSON battery file with "targets" and/or "probes"
# PROBE_BATTERY=battery.json

# Per-request timeout in seconds (1-300)
# PROBE_TIMEOUT_SECONDS=30

# Probe targets concurrently (true/false)
# PROBE_PARALLEL=false

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Comparing three deployments of the same service:
# PROBE_TARGETS=https://python.example.com,https://go.example.com,https://rust.example.com
"#.to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "PROBE_TARGETS" => {
                for target in value.split(',') {
                    let target = target.trim();
                    if !target.is_empty() {
                        url::Url::parse(target)
                            .map_err(|e| AppError::config(format!("Invalid PROBE_TARGETS entry '{}': {}", target, e)))?;
                    }
                }
            }
            "PROBE_BATTERY" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("PROBE_BATTERY must not be empty"));
                }
            }
            "PROBE_TIMEOUT_SECONDS" => {
                let timeout: u64 = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid PROBE_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > 300 {
                    return Err(AppError::config(format!("PROBE_TIMEOUT_SECONDS must be between 1 and 300, got: {}", timeout)));
                }
            }
            "PROBE_PARALLEL" | "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PROBE_TARGETS", "Comma-separated target base URLs", "http://localhost:5000,http://localhost:5001"),
            ("PROBE_BATTERY", "Path to a JSON battery file", "battery.json"),
            ("PROBE_TIMEOUT_SECONDS", "Per-request timeout in seconds (1-300)", "30"),
            ("PROBE_PARALLEL", "Probe targets concurrently", "false"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_create_example_content() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "example should mention {}", name);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Latency Probe Configuration"));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("PROBE_TARGETS", "http://localhost:5000,https://example.com").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_BATTERY", "battery.json").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "30").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_PARALLEL", "true").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "whatever").is_ok());

        assert!(EnvManager::validate_env_var("PROBE_TARGETS", "not-a-url").is_err());
        assert!(EnvManager::validate_env_var("PROBE_BATTERY", "  ").is_err());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "0").is_err());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "301").is_err());
        assert!(EnvManager::validate_env_var("PROBE_PARALLEL", "sometimes").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join(".env");
        assert!(EnvManager::load_env_file_from(&missing, false).is_ok());
    }
}
