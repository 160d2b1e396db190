//! Command execution for the AQS processor CLI

use crate::cli::args::{Args, Commands};
use crate::models::ProcessingStats;
use crate::processor::{CleaningProcessor, ReshapeProcessor};

use anyhow::{Context, Result};
use tracing::debug;

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aqs_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the selected command
pub async fn run(args: Args) -> Result<ProcessingStats> {
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Commands::Clean(clean) => {
            let processor = CleaningProcessor::new(clean.to_config())
                .context("Invalid cleaning configuration")?;
            processor.process().await.context("Cleaning failed")
        }
        Commands::Reshape(reshape) => {
            let processor = ReshapeProcessor::new(reshape.to_config())
                .context("Invalid reshape configuration")?;
            processor.process().await.context("Reshape failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_reshape_reports_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent_cleaned.csv");
        let args = Args::parse_from([
            OsString::from("aqs_processor"),
            OsString::from("reshape"),
            missing.into_os_string(),
            OsString::from("--output"),
            temp_dir.path().as_os_str().to_os_string(),
        ]);

        let error = run(args).await.unwrap_err();
        let message = format!("{:#}", error);
        assert!(message.starts_with("Reshape failed"), "{}", message);
        assert!(message.contains("absent_cleaned.csv"), "{}", message);
    }
}
