//! Init command implementation.
//!
//! Writes a commented default `mfm.yaml`.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::{CONFIG_FILENAME, DEFAULT_TEMPLATE};
use crate::error::{MfmError, Result};
use crate::output::{display_path, Printer};

/// Write a default mfm.yaml option file
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing mfm.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(MfmError::Config {
            message: format!("{} already exists", display_path(&config_path)),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    fs::write(&config_path, DEFAULT_TEMPLATE).map_err(|e| MfmError::Io {
        path: config_path.clone(),
        message: format!("Failed to write options: {}", e),
    })?;

    printer.success("Created", &display_path(&config_path));

    Ok(())
}
