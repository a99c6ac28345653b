mod args;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transpack_core::{
    load_config, validate_config, AlbumProcessor, ErrorSet, FfprobeTagReader, ShellRunner,
};

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(cli).await {
        Ok(errors) => std::process::exit(exit_status(&errors)),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<ErrorSet> {
    let config_path = cli.config_path();
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No configuration file, using defaults"),
    }
    let mut config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let options = cli.apply(&mut config);
    let tags = FfprobeTagReader::new(config.tools.ffprobe_path.clone());
    let processor = AlbumProcessor::new(config, options, ShellRunner::new(), tags);

    let errors = processor.process(&cli.albums).await;

    if let Some(path) = &cli.metrics_file {
        metrics::RUN_ERROR_BITS.set(i64::from(errors.bits()));
        metrics::write_metrics(path).await?;
        info!("Wrote metrics to {}", path.display());
    }

    Ok(errors)
}

/// Process exit status for `errors`.
///
/// Only the low 8 bits of an exit status reach the parent on Unix, so a
/// mask with higher bits set is reported as 255; the full mask is logged.
fn exit_status(errors: &ErrorSet) -> i32 {
    match errors.bits() {
        bits if bits <= 0xFF => bits as i32,
        _ => 0xFF,
    }
}
