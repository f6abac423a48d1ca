//! Latency Probe - Main CLI Application
//!
//! Times a battery of POST probes against one or more deployments and
//! prints the client round trip next to the server-reported timings.

use clap::Parser;
use latency_probe::{
    app::App,
    cli::Cli,
    config::EnvManager,
    error::{AppError, Result},
    BUILD_TIME, GIT_COMMIT, PKG_NAME, VERSION,
};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    if cli.print_example_env {
        print!("{}", EnvManager::create_example_env_content());
        return;
    }

    if let Err(e) = run_application(cli).await {
        eprintln!("Error: {}", e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!("Built: {}", BUILD_TIME.unwrap_or("unknown"));
        eprintln!("Commit: {}", GIT_COMMIT.unwrap_or("unknown"));
        eprintln!();
    }

    App::new(cli)?.run().await?;
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (see --print-example-env)");
            eprintln!("  - Target URLs must start with http:// or https://");
            eprintln!("  - Timeout must be between 1 and 300 seconds");
            eprintln!("  - Battery files accept only \"targets\" and \"probes\"");
        }
        AppError::UnsupportedMethod { probe, .. } => {
            eprintln!();
            eprintln!("Probe '{}' must use POST. Remove its \"method\" or set it to \"POST\".", probe);
        }
        AppError::Transport(_) | AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that the target services are running");
            eprintln!("  - Increase the timeout with --timeout");
        }
        _ => {}
    }
}
