//! Compositing onto the background colour.

use palette::blend::Compose;
use palette::Srgba;

use crate::types::{Colour, ColourGrid};

/// Composite every pixel over `background` with sRGB source-over.
pub fn flatten(grid: &ColourGrid, background: Colour) -> ColourGrid {
    let under = to_float(background);
    grid.map_rows(|row| row.iter().map(|&c| over(c, under)).collect())
}

fn over(colour: Colour, under: Srgba<f32>) -> Colour {
    if colour.is_opaque() {
        colour
    } else if colour.is_transparent() {
        from_float(under)
    } else {
        from_float(to_float(colour).over(under))
    }
}

fn to_float(colour: Colour) -> Srgba<f32> {
    Srgba::new(colour.r, colour.g, colour.b, colour.a).into_format::<f32, f32>()
}

fn from_float(colour: Srgba<f32>) -> Colour {
    let srgb: Srgba<u8> = colour.into_format();
    Colour::new(srgb.red, srgb.green, srgb.blue, srgb.alpha)
}
