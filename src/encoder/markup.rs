//! MFM tag grammar.

use super::token::ColourToken;

/// Closes the innermost open span.
pub const CLOSE: char = ']';

/// Opening marker for a background-colour span.
pub fn open_colour(token: &ColourToken) -> String {
    format!("$[bg.color={} ", token)
}

/// Opening marker for the scale span wrapping the whole document.
pub fn open_scale(scale: &str) -> String {
    format!("$[scale.y={} ", scale)
}

/// Append `count` close markers.
pub fn push_closes(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(CLOSE).take(count));
}
