//! Option file (mfm.yaml) parsing.
//!
//! The option file holds everything a conversion needs besides the image:
//! preprocessing, token mode, background and the scale and filler presets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostics;
use crate::encoder::{CarryPolicy, DigitMode, EncodeConfig};
use crate::error::{MfmError, Result};
use crate::source::SourceOptions;
use crate::types::Colour;

/// Default option file name.
pub const CONFIG_FILENAME: &str = "mfm.yaml";

/// Commented option file written by `img2mfm init`.
pub const DEFAULT_TEMPLATE: &str = r##"# img2mfm options

# Image to convert when none is given on the command line.
# input: image.png

# Target size in pixels. Zero or negative keeps the image size, or follows
# the aspect ratio when only the other side is set.
resize_width: -1
resize_height: -1

# Horizontal smoothing passes.
smooth_repeat: 0

# Channel divisor for colour reduction. 1 keeps colours unchanged.
color_division: 1.0

# Colour token width: full, short or short-alpha.
mode: short-alpha

# Background painted under the image. Quote it, e.g. "#000000".
# background: "#000000"

# Composite translucent pixels onto the background before encoding.
flatten_background: false

# scale.y presets and the one to use.
scales:
  - "0.7"
scale_index: 0

# Filler presets (one character each) and the one to use.
spaces:
  - "　"
space_index: 0

# Maximum nested colour spans. 0 or less selects 19.
max_depth: 19

# merge keeps spans open across rows; floor closes them down to the
# background at the end of every row.
carry: merge
"##;

/// Conversion options loaded from mfm.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Image to convert.
    pub input: Option<PathBuf>,

    pub resize_width: i64,
    pub resize_height: i64,
    pub smooth_repeat: u32,
    pub color_division: f64,
    pub mode: DigitMode,

    /// Background colour as hex, or "none".
    pub background: Option<String>,

    pub flatten_background: bool,

    pub scales: Vec<String>,
    pub scale_index: i64,

    pub spaces: Vec<String>,
    pub space_index: i64,

    pub max_depth: i64,
    pub carry: CarryPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: None,
            resize_width: -1,
            resize_height: -1,
            smooth_repeat: 0,
            color_division: 1.0,
            mode: DigitMode::default(),
            background: None,
            flatten_background: false,
            scales: vec!["0.7".to_string()],
            scale_index: 0,
            spaces: vec!["\u{3000}".to_string()],
            space_index: 0,
            max_depth: 19,
            carry: CarryPolicy::default(),
        }
    }
}

impl Options {
    /// Load options from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MfmError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read options: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse options from YAML.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| MfmError::Parse {
            message: format!("Invalid options: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Background colour, or None when disabled.
    ///
    /// Modes without an alpha digit always get an opaque background.
    pub fn background_colour(&self) -> Result<Option<Colour>> {
        let Some(hex) = self.background.as_deref() else {
            return Ok(None);
        };
        if hex.trim().eq_ignore_ascii_case("none") {
            return Ok(None);
        }

        let colour = Colour::from_hex(hex)?;
        match self.mode {
            DigitMode::ShortAlpha => Ok(Some(colour)),
            DigitMode::Full | DigitMode::Short => Ok(Some(colour.with_alpha(255))),
        }
    }

    /// Preprocessing settings.
    pub fn source_options(&self) -> Result<SourceOptions> {
        let flatten = if self.flatten_background {
            self.background_colour()?
        } else {
            None
        };

        Ok(SourceOptions {
            resize_width: self.resize_width,
            resize_height: self.resize_height,
            flatten,
            smooth_repeat: self.smooth_repeat,
            color_division: self.color_division,
        })
    }

    /// Encoder settings, plus warnings for presets that fell back.
    pub fn encode_config(&self) -> Result<(EncodeConfig, Diagnostics)> {
        let mut diagnostics = Diagnostics::new();

        let scale = select_preset(&self.scales, self.scale_index, "scale", &mut diagnostics)?;
        let space = select_preset(&self.spaces, self.space_index, "space", &mut diagnostics)?;

        let mut chars = space.chars();
        let filler = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(MfmError::Config {
                    message: format!("Space preset {:?} must be exactly one character", space),
                    help: None,
                })
            }
        };

        let config = EncodeConfig {
            mode: self.mode,
            max_depth: usize::try_from(self.max_depth).unwrap_or(0),
            background: self.background_colour()?,
            filler,
            scale: scale.to_string(),
            carry: self.carry,
        };

        Ok((config, diagnostics))
    }
}

/// Pick `presets[index]`, falling back to the first preset with a warning.
fn select_preset<'a>(
    presets: &'a [String],
    index: i64,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<&'a str> {
    let Some(first) = presets.first() else {
        return Err(MfmError::Config {
            message: format!("No {} presets configured", name),
            help: Some(format!("Add at least one entry to {}s", name)),
        });
    };

    match usize::try_from(index).ok().and_then(|i| presets.get(i)) {
        Some(preset) => Ok(preset.as_str()),
        None => {
            diagnostics.warning(
                "img2mfm::config::preset-index",
                format!(
                    "Invalid {} index {}, using {:?}",
                    name, index, first
                ),
            );
            Ok(first.as_str())
        }
    }
}
