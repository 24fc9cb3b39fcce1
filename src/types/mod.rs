//! Core domain types for img2mfm.
//!
//! - `Colour` - RGBA pixel values
//! - `ColourGrid` - the validated rectangular grid the encoder consumes

mod colour;
mod grid;

pub use colour::Colour;
pub use grid::ColourGrid;
