//! fmufer - Entry Point
//!
//! Watches drop folders and delivers new files over SFTP.

use clap::Parser;
use log::info;
use std::process;

use fmufer::Service;
use fmufer::cli::Args;
use fmufer::config::AppConfig;
use fmufer::error::AppError;
use fmufer::error::handlers::{exit_code, handle_error};
use fmufer::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    // `--version` and `--help` exit here, before any other work
    let args = Args::parse();

    setup_logging();

    if let Err(e) = run(args).await {
        handle_error(&e);
        process::exit(exit_code(&e));
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    info!("Starting fmufer {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config_file)?;
    info!(
        "Loaded {} transfer rule(s) from {}",
        config.transfers.len(),
        args.config_file.display()
    );

    let service = Service::new(&config)?;
    service.run().await;
    Ok(())
}
