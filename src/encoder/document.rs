//! Whole-image encoding.

use std::fmt;

use super::markup::{self, CLOSE};
use super::row::{EncoderState, RowEncoder, RowOutcome};
use super::EncodeConfig;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::types::ColourGrid;

/// Attempts per row after the first before the row is given up.
pub const DEFAULT_RETRY_LIMIT: usize = 10;

/// Encoded markup, one entry per image row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    scale: String,
    rows: Vec<String>,
    failed_rows: Vec<usize>,
}

impl Document {
    /// Row markup, without the scale wrapper.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Rows that could not be encoded and were left empty.
    pub fn failed_rows(&self) -> &[usize] {
        &self.failed_rows
    }

    pub fn is_complete(&self) -> bool {
        self.failed_rows.is_empty()
    }

    /// The full markup text.
    pub fn text(&self) -> String {
        let mut text = markup::open_scale(&self.scale);
        text.push_str(&self.rows.join("\n"));
        text.push(CLOSE);
        text
    }

    /// Length of [`text`](Self::text) in characters.
    pub fn char_count(&self) -> usize {
        self.text().chars().count()
    }

    /// One warning covering every failed row.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let message = match self.failed_rows.as_slice() {
            [] => return diagnostics,
            [y] => format!("Row {} exceeded the nesting limit and was left empty", y),
            rows => {
                let list: Vec<String> = rows.iter().map(|y| y.to_string()).collect();
                format!(
                    "Rows {} exceeded the nesting limit and were left empty",
                    list.join(", ")
                )
            }
        };
        diagnostics.push(
            Diagnostic::warning("img2mfm::encode::row-overflow", message)
                .with_help("Raise max_depth or reduce colours with color_division"),
        );
        diagnostics
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Drives a [`RowEncoder`] over every row of a grid.
pub struct DocumentAssembler<'a> {
    config: &'a EncodeConfig,
    retry_limit: usize,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a EncodeConfig) -> Self {
        Self {
            config,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }

    pub fn with_retry_limit(mut self, retry_limit: usize) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub fn assemble(&self, grid: &ColourGrid) -> Result<Document> {
        self.config.validate()?;

        let encoder = RowEncoder::new(self.config);
        let mut state = EncoderState::new();
        let mut rows: Vec<String> = Vec::with_capacity(grid.height());
        let mut failed_rows = Vec::new();

        for (y, row) in grid.rows().iter().enumerate() {
            let mut retries = 0;
            loop {
                let outcome = encoder.encode(row, &mut state);

                // Spans given up by this row close at the end of the one above.
                let released = state.take_released();
                if let Some(previous) = rows.last_mut() {
                    markup::push_closes(previous, released);
                }

                match outcome {
                    RowOutcome::Encoded(text) => {
                        rows.push(text);
                        break;
                    }
                    RowOutcome::RetryRequired if retries < self.retry_limit => retries += 1,
                    RowOutcome::RetryRequired => {
                        failed_rows.push(y);
                        rows.push(String::new());
                        break;
                    }
                }
            }
        }

        if let Some(last) = rows.last_mut() {
            state.close_all(last);
        }

        Ok(Document {
            scale: self.config.scale.clone(),
            rows,
            failed_rows,
        })
    }
}
