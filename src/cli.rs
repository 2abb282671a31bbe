//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Uploads files dropped into watched directories over SFTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The fmufer configuration file
    #[arg(long = "config.file", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,
}
