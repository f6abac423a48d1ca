//! JSON battery files
//!
//! A battery file may carry targets, probes, or both:
//!
//! ```json
//! {
//!   "targets": ["http://localhost:5000", "http://localhost:5001"],
//!   "probes": [
//!     { "name": "/math (sum)", "endpoint": "/math", "method": "POST",
//!       "data": { "numbers": [1, 2, 3, 4, 5], "operation": "sum" } }
//!   ]
//! }
//! ```

use crate::{
    error::Result,
    models::{Config, ProbeDefinition},
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Targets and probes loaded from a file. Absent sections leave the
/// existing configuration untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatteryFile {
    #[serde(default)]
    pub targets: Option<Vec<String>>,
    #[serde(default)]
    pub probes: Option<Vec<ProbeDefinition>>,
}

impl BatteryFile {
    /// Read and parse a battery file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading battery file {}", path.display()))?;

        let battery: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing battery file {}", path.display()))?;

        Ok(battery)
    }

    /// Overlay this battery onto a configuration
    pub fn apply_to(self, config: &mut Config) {
        if let Some(targets) = self.targets {
            config.targets = targets;
        }
        if let Some(probes) = self.probes {
            config.probes = probes;
        }
    }
}
