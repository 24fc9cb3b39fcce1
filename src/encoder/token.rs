//! Colour tokens: the hex text a colour is written as inside `bg.color=`.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::Colour;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Digit-width scheme used to turn a colour into a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DigitMode {
    /// Six digits, `rrggbb`. Alpha is ignored.
    Full,
    /// Three digits, the high nibble of each of red, green and blue.
    Short,
    /// Three digits plus an alpha digit, dropped when alpha is `f`.
    #[default]
    ShortAlpha,
}

impl fmt::Display for DigitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigitMode::Full => write!(f, "full"),
            DigitMode::Short => write!(f, "short"),
            DigitMode::ShortAlpha => write!(f, "short-alpha"),
        }
    }
}

/// Transparency of a token, read from its alpha digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaClass {
    Opaque,
    Translucent,
    Transparent,
}

/// Canonical text of a colour under a [`DigitMode`].
///
/// Equality is string equality, so colours that share a short token share
/// a span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColourToken {
    text: String,
    alpha: AlphaClass,
}

impl ColourToken {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn alpha(&self) -> AlphaClass {
        self.alpha
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for ColourToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenize a colour.
pub fn tokenize(colour: Colour, mode: DigitMode) -> ColourToken {
    let mut text = String::with_capacity(6);

    match mode {
        DigitMode::Full => {
            for channel in [colour.r, colour.g, colour.b] {
                text.push(high_nibble(channel));
                text.push(HEX_DIGITS[(channel & 0x0f) as usize] as char);
            }
        }
        DigitMode::Short | DigitMode::ShortAlpha => {
            for channel in [colour.r, colour.g, colour.b] {
                text.push(high_nibble(channel));
            }
        }
    }

    let mut alpha = AlphaClass::Opaque;
    if mode == DigitMode::ShortAlpha {
        match colour.a >> 4 {
            0xf => {}
            0 => {
                alpha = AlphaClass::Transparent;
                text.push('0');
            }
            _ => {
                alpha = AlphaClass::Translucent;
                text.push(high_nibble(colour.a));
            }
        }
    }

    ColourToken { text, alpha }
}

fn high_nibble(channel: u8) -> char {
    HEX_DIGITS[(channel >> 4) as usize] as char
}
