//! Data models and structures for the latency probe

pub mod config;
pub mod measurement;
pub mod probe;
pub mod report;

// Re-export main model types
pub use config::Config;
pub use measurement::Measurement;
pub use probe::{ProbeDefinition, Target};
pub use report::Report;
