//! MFM encoder.
//!
//! Turns a [`ColourGrid`] into nested `$[bg.color=...]` spans:
//! - `token` - colour to token text
//! - `stack` - the open-span stack
//! - `row` - the per-row state machine
//! - `document` - drives rows, retries, and wraps the result

mod document;
mod markup;
mod row;
mod stack;
mod token;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{MfmError, Result};
use crate::types::{Colour, ColourGrid};

pub use document::{Document, DocumentAssembler, DEFAULT_RETRY_LIMIT};
pub use markup::{open_colour, open_scale, CLOSE};
pub use row::{EncoderState, RowEncoder, RowOutcome};
pub use stack::SpanStack;
pub use token::{tokenize, AlphaClass, ColourToken, DigitMode};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 19;

/// What happens to open spans at the end of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CarryPolicy {
    /// Keep every span open; the next row decides what continues.
    #[default]
    Merge,
    /// Close down to the background span at the end of every row.
    Floor,
}

impl fmt::Display for CarryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarryPolicy::Merge => write!(f, "merge"),
            CarryPolicy::Floor => write!(f, "floor"),
        }
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeConfig {
    /// Token digit width.
    pub mode: DigitMode,
    /// Maximum simultaneously open colour spans. 0 selects the default.
    pub max_depth: usize,
    /// Background painted under the whole document, if any.
    pub background: Option<Colour>,
    /// Character emitted once per pixel.
    pub filler: char,
    /// Value of the `scale.y` wrapper.
    pub scale: String,
    /// End-of-row behaviour.
    pub carry: CarryPolicy,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            mode: DigitMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            background: None,
            filler: '\u{3000}',
            scale: "0.7".to_string(),
            carry: CarryPolicy::default(),
        }
    }
}

impl EncodeConfig {
    /// Nesting limit after defaulting.
    pub fn effective_max_depth(&self) -> usize {
        if self.max_depth == 0 {
            DEFAULT_MAX_DEPTH
        } else {
            self.max_depth
        }
    }

    /// Token of the background span, or None when the background is disabled.
    pub fn background_token(&self) -> Option<ColourToken> {
        let colour = self.background.filter(|c| !c.is_transparent())?;
        let token = tokenize(colour, self.mode);
        (token.alpha() != AlphaClass::Transparent).then_some(token)
    }

    /// Reject settings that would corrupt the markup.
    pub fn validate(&self) -> Result<()> {
        if self.filler.is_control() || matches!(self.filler, '$' | '[' | ']') {
            return Err(MfmError::Config {
                message: format!("Invalid filler character {:?}", self.filler),
                help: Some("Use a printable character that is not part of the MFM syntax".to_string()),
            });
        }

        if self.scale.is_empty()
            || self
                .scale
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '$' | '[' | ']'))
        {
            return Err(MfmError::Config {
                message: format!("Invalid scale value {:?}", self.scale),
                help: Some("Use a plain number such as 0.7".to_string()),
            });
        }

        Ok(())
    }
}

/// Encode a grid with the default retry limit.
pub fn encode(grid: &ColourGrid, config: &EncodeConfig) -> Result<Document> {
    DocumentAssembler::new(config).assemble(grid)
}
