//! Convert command implementation.
//!
//! Loads an image, preprocesses it and writes the MFM markup.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{Options, CONFIG_FILENAME};
use crate::diagnostic::Diagnostics;
use crate::encoder::{encode, CarryPolicy, DigitMode};
use crate::error::{MfmError, Result};
use crate::output::{display_path, plural, Printer};
use crate::source::{load_image, prepare};

/// Convert an image into MFM markup
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Image to convert (default: `input` from the option file)
    pub input: Option<PathBuf>,

    /// Option file (default: ./mfm.yaml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output file (default: <input stem>.txt)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the markup to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Colour token width
    #[arg(long, value_enum)]
    pub mode: Option<DigitMode>,

    /// Resize width (0 or less follows the aspect ratio)
    #[arg(long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Resize height (0 or less follows the aspect ratio)
    #[arg(long, allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Maximum nested colour spans
    #[arg(long, allow_negative_numbers = true)]
    pub max_depth: Option<i64>,

    /// End-of-row behaviour
    #[arg(long, value_enum)]
    pub carry: Option<CarryPolicy>,
}

pub fn run(args: ConvertArgs, printer: &Printer) -> Result<()> {
    let mut options = load_options(args.config.as_deref(), Path::new("."))?;
    apply_overrides(&mut options, &args);

    let input = args
        .input
        .clone()
        .or_else(|| options.input.clone())
        .ok_or_else(|| MfmError::Config {
            message: "No input image given".to_string(),
            help: Some(format!(
                "Pass an image path or set `input` in {}",
                CONFIG_FILENAME
            )),
        })?;

    let (config, mut diagnostics) = options.encode_config()?;
    let source = options.source_options()?;

    printer.status("Loading", &display_path(&input));
    let image = load_image(&input)?;
    let grid = prepare(&image, &source)?;

    printer.status(
        "Encoding",
        &format!("{}x{} as {}", grid.width(), grid.height(), config.mode),
    );
    let document = encode(&grid, &config)?;
    diagnostics.merge(document.diagnostics());
    report(printer, &diagnostics);

    let text = document.text();
    let count = plural(document.char_count(), "character", "characters");

    if args.stdout {
        println!("{}", text);
        printer.success("Encoded", &count);
    } else {
        let output = args.output.unwrap_or_else(|| default_output(&input));
        fs::write(&output, &text).map_err(|e| MfmError::Io {
            path: output.clone(),
            message: format!("Failed to write markup: {}", e),
        })?;
        printer.success("Wrote", &format!("{} ({})", display_path(&output), count));
    }

    Ok(())
}

/// Explicit option file, else `mfm.yaml` in `dir`, else defaults.
fn load_options(explicit: Option<&Path>, dir: &Path) -> Result<Options> {
    if let Some(path) = explicit {
        return Options::load(path);
    }

    let path = dir.join(CONFIG_FILENAME);
    if path.exists() {
        Options::load(&path)
    } else {
        Ok(Options::default())
    }
}

fn apply_overrides(options: &mut Options, args: &ConvertArgs) {
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    if let Some(width) = args.width {
        options.resize_width = width;
    }
    if let Some(height) = args.height {
        options.resize_height = height;
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(carry) = args.carry {
        options.carry = carry;
    }
}

/// `<input stem>.txt` in the working directory.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    PathBuf::from(format!("{}.txt", stem))
}

fn report(printer: &Printer, diagnostics: &Diagnostics) {
    for d in diagnostics.iter() {
        printer.warning("Warning", &d.message);
        if let Some(help) = &d.help {
            printer.info("Help", &printer.dim(help));
        }
    }
}
