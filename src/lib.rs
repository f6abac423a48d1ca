//! Latency Probe
//!
//! Times a battery of POST probes against one or more deployments of the
//! same service, harvests the server-side timing headers each deployment
//! reports, and renders a consolidated report grouped by deployment.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod responder;
pub mod stats;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::ProbeExecutor;
pub use models::{Config, Measurement, ProbeDefinition, Report, Target};
pub use output::{OutputCoordinator, OutputFormatter, OutputFormatterFactory};
pub use responder::{instrument, Handler, Instrumented};
pub use stats::ReportStatistics;
pub use timing::ServerTiming;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata injected by build.rs
pub const BUILD_TIME: Option<&str> = option_env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use crate::models::ProbeDefinition;
    use serde_json::json;
    use std::time::Duration;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_TARGETS: &[&str] = &[
        "http://localhost:5000",
        "http://localhost:5001",
        "http://localhost:5002",
    ];
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// The standard six-probe battery
    pub fn default_probes() -> Vec<ProbeDefinition> {
        vec![
            ProbeDefinition::post("/math (sum)", "/math", json!({
                "numbers": [1, 2, 3, 4, 5],
                "operation": "sum"
            })),
            ProbeDefinition::post("/math (product)", "/math", json!({
                "numbers": [1, 2, 3, 4, 5],
                "operation": "product"
            })),
            ProbeDefinition::post("/json", "/json", json!({
                "key": "username",
                "value": "john_doe"
            })),
            ProbeDefinition::post("/string", "/string", json!({
                "text": "Hello, this is a test string",
                "pattern": "t"
            })),
            ProbeDefinition::post("/compress", "/compress", json!({
                "text": "Compress this data please!"
            })),
            ProbeDefinition::post("/image", "/image", json!({
                "text": "Imagem de teste"
            })),
        ]
    }
}
