//! img2mfm - Image to MFM markup converter
//!
//! A library for turning raster images into nested `$[bg.color=...]` MFM
//! spans, merging runs of one colour horizontally and across rows while
//! keeping the nesting depth bounded.

pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod encoder;
pub mod error;
pub mod output;
pub mod source;
pub mod types;

pub use config::{Options, CONFIG_FILENAME};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use encoder::{
    encode, tokenize, AlphaClass, CarryPolicy, ColourToken, DigitMode, Document,
    DocumentAssembler, EncodeConfig, EncoderState, RowEncoder, RowOutcome, SpanStack,
};
pub use error::{MfmError, Result};
pub use source::{load_image, prepare, SourceOptions};
pub use types::{Colour, ColourGrid};
