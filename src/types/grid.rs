//! Rectangular colour grid handed to the encoder.

use crate::error::{MfmError, Result};

use super::Colour;

/// A validated, rectangular grid of pixel colours (row-major: `rows[y][x]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourGrid {
    rows: Vec<Vec<Colour>>,
    width: usize,
}

impl ColourGrid {
    /// Build a grid, rejecting empty and ragged input.
    pub fn new(rows: Vec<Vec<Colour>>) -> Result<Self> {
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            Some(_) => {
                return Err(MfmError::Grid {
                    message: "Grid rows have zero width".to_string(),
                    help: None,
                })
            }
            None => {
                return Err(MfmError::Grid {
                    message: "Grid has no rows".to_string(),
                    help: Some("Check the source image is not empty".to_string()),
                })
            }
        };

        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(MfmError::Grid {
                message: format!(
                    "Row {} has {} pixels, expected {}",
                    y,
                    row.len(),
                    width
                ),
                help: Some("Every row of the grid must have the same length".to_string()),
            });
        }

        Ok(Self { rows, width })
    }

    /// Build a grid of one repeated colour.
    pub fn filled(width: usize, height: usize, colour: Colour) -> Result<Self> {
        Self::new(vec![vec![colour; width]; height])
    }

    /// Apply a per-row transform that preserves the grid shape.
    pub(crate) fn map_rows<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[Colour]) -> Vec<Colour>,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mapped = f(row);
                debug_assert_eq!(mapped.len(), self.width);
                mapped
            })
            .collect();

        Self {
            rows,
            width: self.width,
        }
    }

    /// Get the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height in pixels.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Get a pixel at the given position.
    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Get a reference to the rows.
    pub fn rows(&self) -> &[Vec<Colour>] {
        &self.rows
    }
}
