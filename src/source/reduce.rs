//! Colour reduction passes.

use crate::error::{MfmError, Result};
use crate::types::{Colour, ColourGrid};

/// One horizontal smoothing pass.
///
/// Each non-transparent pixel becomes the truncated mean, over all four
/// channels, of itself and its non-transparent left and right neighbours.
/// Transparent pixels are left alone.
pub fn smooth(grid: &ColourGrid) -> ColourGrid {
    grid.map_rows(|row| {
        (0..row.len())
            .map(|x| {
                let current = row[x];
                if current.is_transparent() {
                    return current;
                }

                let left = x.checked_sub(1).map(|i| row[i]);
                let right = row.get(x + 1).copied();
                let samples: Vec<Colour> = std::iter::once(current)
                    .chain(left.into_iter().chain(right).filter(|c| !c.is_transparent()))
                    .collect();

                mean(&samples)
            })
            .collect()
    })
}

fn mean(samples: &[Colour]) -> Colour {
    let n = samples.len() as u32;
    let channel = |f: fn(&Colour) -> u8| -> u8 {
        (samples.iter().map(|c| f(c) as u32).sum::<u32>() / n) as u8
    };
    Colour::new(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b), channel(|c| c.a))
}

/// Quantize red, green and blue to multiples of `division`, offset to the
/// middle of each step. Alpha is kept.
pub fn divide(grid: &ColourGrid, division: f64) -> Result<ColourGrid> {
    // Also rejects NaN.
    if !(division >= 1.0) {
        return Err(MfmError::Config {
            message: format!("color_division must be 1 or greater, got {}", division),
            help: Some("Use 1 to keep colours unchanged".to_string()),
        });
    }
    if division == 1.0 {
        return Ok(grid.clone());
    }

    let offset = (division / 2.0).trunc();
    let step = |channel: u8| -> u8 {
        let bucket = (channel as f64 / division).trunc();
        ((bucket * division).trunc() + offset).min(255.0) as u8
    };

    Ok(grid.map_rows(|row| {
        row.iter()
            .map(|c| Colour::new(step(c.r), step(c.g), step(c.b), c.a))
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(colours: &[Colour]) -> ColourGrid {
        ColourGrid::new(vec![colours.to_vec()]).unwrap()
    }

    #[test]
    fn test_smooth_averages_neighbours() {
        let grid = row(&[
            Colour::rgb(0, 0, 0),
            Colour::rgb(30, 60, 90),
            Colour::rgb(90, 0, 0),
        ]);
        let smoothed = smooth(&grid);

        assert_eq!(smoothed.get(0, 0), Some(Colour::rgb(15, 30, 45)));
        assert_eq!(smoothed.get(1, 0), Some(Colour::rgb(40, 20, 30)));
        assert_eq!(smoothed.get(2, 0), Some(Colour::rgb(60, 30, 45)));
    }

    #[test]
    fn test_smooth_reads_unsmoothed_row() {
        let grid = row(&[Colour::rgb(100, 0, 0), Colour::rgb(0, 0, 0), Colour::rgb(0, 0, 0)]);
        let smoothed = smooth(&grid);

        // The middle pixel sees the unsmoothed left neighbour.
        assert_eq!(smoothed.get(1, 0), Some(Colour::rgb(33, 0, 0)));
    }

    #[test]
    fn test_smooth_skips_transparent() {
        let grid = row(&[
            Colour::rgb(100, 100, 100),
            Colour::TRANSPARENT,
            Colour::new(50, 50, 50, 101),
        ]);
        let smoothed = smooth(&grid);

        assert_eq!(smoothed.get(0, 0), Some(Colour::rgb(100, 100, 100)));
        assert_eq!(smoothed.get(1, 0), Some(Colour::TRANSPARENT));
        assert_eq!(smoothed.get(2, 0), Some(Colour::new(50, 50, 50, 101)));
    }

    #[test]
    fn test_smooth_averages_alpha() {
        let grid = row(&[Colour::new(0, 0, 0, 255), Colour::new(0, 0, 0, 100)]);
        let smoothed = smooth(&grid);
        assert_eq!(smoothed.get(1, 0).unwrap().a, 177);
    }

    #[test]
    fn test_divide_identity() {
        let grid = row(&[Colour::rgb(1, 2, 3)]);
        assert_eq!(divide(&grid, 1.0).unwrap(), grid);
    }

    #[test]
    fn test_divide_buckets() {
        let grid = row(&[Colour::new(0, 17, 255, 7)]);
        let divided = divide(&grid, 16.0).unwrap();
        // 0 -> 0+8, 17 -> 16+8, 255 -> 240+8; alpha kept
        assert_eq!(divided.get(0, 0), Some(Colour::new(8, 24, 248, 7)));
    }

    #[test]
    fn test_divide_clamps() {
        let grid = row(&[Colour::rgb(255, 255, 255)]);
        let divided = divide(&grid, 200.0).unwrap();
        // 255 -> 200 + 100, clamped
        assert_eq!(divided.get(0, 0), Some(Colour::rgb(255, 255, 255)));
    }

    #[test]
    fn test_divide_fractional() {
        let grid = row(&[Colour::rgb(10, 0, 0)]);
        let divided = divide(&grid, 2.5).unwrap();
        // trunc(10 / 2.5) = 4, trunc(4 * 2.5) = 10, + trunc(1.25) = 11
        assert_eq!(divided.get(0, 0), Some(Colour::rgb(11, 1, 1)));
    }

    #[test]
    fn test_divide_rejects_small() {
        let grid = row(&[Colour::BLACK]);
        assert!(divide(&grid, 0.9).is_err());
        assert!(divide(&grid, f64::NAN).is_err());
    }
}
