pub mod completions;
pub mod convert;
pub mod init;

use clap::{Parser, Subcommand};

/// img2mfm - Convert images into MFM background-colour markup
#[derive(Parser, Debug)]
#[command(name = "img2mfm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an image into MFM markup
    Convert(convert::ConvertArgs),

    /// Write a default option file (mfm.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
