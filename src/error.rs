use miette::Diagnostic;
use thiserror::Error;

/// Main error type for img2mfm operations
#[derive(Error, Diagnostic, Debug)]
pub enum MfmError {
    #[error("IO error: {0}")]
    #[diagnostic(code(img2mfm::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(img2mfm::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(img2mfm::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(img2mfm::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Malformed colour grid: {message}")]
    #[diagnostic(code(img2mfm::grid))]
    Grid {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, MfmError>;
