mod cli;

use std::process::ExitCode;

use clap::Parser;
use plugctl_core::kernel::constants::{APP_NAME, APP_VERSION};
use plugctl_core::{AppConfig, Error};
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match load_config(&args).await {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_level, args.verbose);
    tracing::debug!("{} v{} starting with {:?}", APP_NAME, APP_VERSION, config);

    match cli::run(&args, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Load the configuration file and apply command line overrides.
async fn load_config(args: &CliArgs) -> plugctl_core::Result<AppConfig> {
    let mut config = AppConfig::load(&args.config).await?;
    if let Some(dir) = &args.plugins_dir {
        config.plugins_dir = dir.clone();
    }
    if let Some(file) = &args.state_file {
        config.state_file = file.clone();
    }
    Ok(config)
}

/// Install the fmt subscriber on stderr and route `log` records into it.
///
/// `RUST_LOG` wins over `-v`, which wins over the configured level.
fn init_logging(level: &str, verbose: u8) {
    let default_filter = match verbose {
        0 => level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to forward log records to tracing: {}", e);
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}

fn report_error(e: &Error) {
    match e.plugin_id() {
        Some(id) => eprintln!("Error [{}]: {}", id, e),
        None => eprintln!("Error: {}", e),
    }
}
