//! Image loading and preprocessing.
//!
//! Turns an image file into the [`ColourGrid`] the encoder consumes:
//! resize, optional flatten onto the background, neighbour smoothing and
//! channel division, in that order.

mod flatten;
mod reduce;

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{MfmError, Result};
use crate::types::{Colour, ColourGrid};

pub use flatten::flatten;
pub use reduce::{divide, smooth};

/// Preprocessing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOptions {
    /// Target width; zero or negative derives it from `resize_height`.
    pub resize_width: i64,
    /// Target height; zero or negative derives it from `resize_width`.
    pub resize_height: i64,
    /// Background to composite onto, if flattening.
    pub flatten: Option<Colour>,
    /// Smoothing passes.
    pub smooth_repeat: u32,
    /// Channel divisor, at least 1.
    pub color_division: f64,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            resize_width: -1,
            resize_height: -1,
            flatten: None,
            smooth_repeat: 0,
            color_division: 1.0,
        }
    }
}

/// Load an image file as RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|e| MfmError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read image: {}", e),
    })?;
    Ok(image.to_rgba8())
}

/// Target size for a resize request, or None to keep the current size.
///
/// When only one side is requested the other follows the aspect ratio,
/// truncated.
pub fn resize_dimensions(size: (u32, u32), requested: (i64, i64)) -> Result<Option<(u32, u32)>> {
    let (width, height) = size;
    let (req_width, req_height) = requested;

    let (new_width, new_height) = match (req_width > 0, req_height > 0) {
        (true, true) => (req_width, req_height),
        (false, false) => return Ok(None),
        (false, true) => {
            let ratio = width as f64 / height as f64;
            ((req_height as f64 * ratio) as i64, req_height)
        }
        (true, false) => {
            let ratio = height as f64 / width as f64;
            (req_width, (req_width as f64 * ratio) as i64)
        }
    };

    match (u32::try_from(new_width), u32::try_from(new_height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Some((w, h))),
        _ => Err(MfmError::Config {
            message: format!(
                "Cannot resize {}x{} to {}x{}",
                width, height, new_width, new_height
            ),
            help: Some("Choose a larger resize_width or resize_height".to_string()),
        }),
    }
}

/// Copy an image into a grid.
pub fn grid_from_image(image: &RgbaImage) -> Result<ColourGrid> {
    let rows = image
        .rows()
        .map(|row| row.map(|pixel| Colour::from(pixel.0)).collect())
        .collect();
    ColourGrid::new(rows)
}

/// Run the preprocessing steps over a loaded image.
pub fn prepare(image: &RgbaImage, options: &SourceOptions) -> Result<ColourGrid> {
    let resized;
    let image = match resize_dimensions(
        image.dimensions(),
        (options.resize_width, options.resize_height),
    )? {
        Some((w, h)) if (w, h) != image.dimensions() => {
            resized = imageops::resize(image, w, h, FilterType::CatmullRom);
            &resized
        }
        _ => image,
    };

    let mut grid = grid_from_image(image)?;

    if let Some(background) = options.flatten {
        grid = flatten(&grid, background);
    }

    for _ in 0..options.smooth_repeat {
        grid = smooth(&grid);
    }

    divide(&grid, options.color_division)
}
