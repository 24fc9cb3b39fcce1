//! Per-row span state machine.
//!
//! A row is encoded left to right against the stack left open by the rows
//! above it. Spans still open from an earlier row are "carried": the row may
//! keep painting inside them, which is what merges identical columns across
//! line breaks. When a row needs to close a carried span, the close marker
//! goes at the end of the previous row instead (reported through
//! [`EncoderState::take_released`]) and, if this row already wrote cells
//! painted by that span, the span is reopened at the start of this row.

use super::markup;
use super::stack::{retained, SpanStack};
use super::token::{tokenize, AlphaClass, ColourToken};
use super::{CarryPolicy, EncodeConfig};
use crate::types::Colour;

/// Span state shared by consecutive rows of one document.
#[derive(Debug, Clone, Default)]
pub struct EncoderState {
    stack: SpanStack,
    carry: Option<usize>,
    released: usize,
}

impl EncoderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently open spans.
    pub fn stack(&self) -> &SpanStack {
        &self.stack
    }

    /// Deepest span opened by an earlier row that is still open.
    pub fn carry(&self) -> Option<usize> {
        self.carry
    }

    /// Take the close markers owed to the end of the previous row.
    pub fn take_released(&mut self) -> usize {
        std::mem::take(&mut self.released)
    }

    /// Close every open span, writing the markers to `out`.
    pub fn close_all(&mut self, out: &mut String) {
        self.stack.close_down_to(None, out);
        self.carry = None;
    }

    /// Give up carried spans deeper than `depth`.
    fn reconcile(&mut self, depth: Option<usize>, line: &mut RowText) {
        let Some(carried) = self.carry else {
            return;
        };
        if depth >= Some(carried) {
            return;
        }

        let keep = retained(depth);
        self.released += carried + 1 - keep;

        if line.has_content() {
            let reopened: String = self
                .stack
                .range(keep, carried)
                .iter()
                .map(markup::open_colour)
                .collect();
            line.prepend(&reopened);
        } else {
            // Nothing on this row was painted by them yet.
            self.stack.truncate(keep);
        }

        self.carry = depth;
    }

    /// Reconcile, then close down to `depth` on the current row.
    fn release_to(&mut self, depth: Option<usize>, line: &mut RowText) {
        self.reconcile(depth, line);
        self.stack.close_down_to(depth, &mut line.text);
    }
}

/// Result of encoding one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row's markup. Carried spans stay open.
    Encoded(String),
    /// The row overflowed while spans from the previous row were open. They
    /// have been released; encode the row again.
    RetryRequired,
}

struct NeedsRetry;

/// Text of the row being encoded.
struct RowText {
    text: String,
    pending: usize,
    filler: char,
}

impl RowText {
    fn new(filler: char) -> Self {
        Self {
            text: String::new(),
            pending: 0,
            filler,
        }
    }

    fn has_content(&self) -> bool {
        !self.text.is_empty()
    }

    fn prepend(&mut self, s: &str) {
        self.text.insert_str(0, s);
    }

    fn open(&mut self, token: &ColourToken) {
        let pending = std::mem::take(&mut self.pending);
        self.text
            .extend(std::iter::repeat(self.filler).take(pending));
        self.text.push_str(&markup::open_colour(token));
    }

    /// One cell. Unpainted cells wait until something is opened after them.
    fn fill(&mut self, painted: bool) {
        if painted {
            self.text.push(self.filler);
        } else {
            self.pending += 1;
        }
    }

    /// Trailing unpainted cells are dropped.
    fn finish(self) -> String {
        self.text
    }
}

/// Encodes single rows for a [`DocumentAssembler`](super::DocumentAssembler).
pub struct RowEncoder<'a> {
    config: &'a EncodeConfig,
    background: Option<ColourToken>,
    max_depth: usize,
}

impl<'a> RowEncoder<'a> {
    pub fn new(config: &'a EncodeConfig) -> Self {
        Self {
            config,
            background: config.background_token(),
            max_depth: config.effective_max_depth(),
        }
    }

    /// Encode one row, updating `state` for the next.
    pub fn encode(&self, row: &[Colour], state: &mut EncoderState) -> RowOutcome {
        let mut line = RowText::new(self.config.filler);

        match self.encode_cells(row, state, &mut line) {
            Ok(()) => RowOutcome::Encoded(line.finish()),
            Err(NeedsRetry) => RowOutcome::RetryRequired,
        }
    }

    fn encode_cells(
        &self,
        row: &[Colour],
        state: &mut EncoderState,
        line: &mut RowText,
    ) -> Result<(), NeedsRetry> {
        let tokens: Vec<ColourToken> = row
            .iter()
            .map(|&colour| tokenize(colour, self.config.mode))
            .collect();

        if let Some(background) = &self.background {
            self.restore_background(background, tokens.first(), state, line);
        }

        for (x, token) in tokens.iter().enumerate() {
            if let Some(depth) = state.stack.index_of(token) {
                state.release_to(Some(depth), line);
            } else {
                match token.alpha() {
                    AlphaClass::Transparent => {
                        if !bridges(&tokens, x, &state.stack) {
                            let floor = self.floor(&state.stack);
                            state.release_to(floor, line);
                        }
                    }
                    AlphaClass::Translucent => {
                        state.release_to(None, line);
                        self.open(token, state, line)?;
                    }
                    AlphaClass::Opaque => self.open(token, state, line)?,
                }
            }

            line.fill(!state.stack.is_empty());
        }

        if self.config.carry == CarryPolicy::Floor {
            let floor = self.floor(&state.stack);
            state.release_to(floor, line);
        }
        state.carry = state.stack.top();

        Ok(())
    }

    /// Put the background back at depth 0 before the row starts.
    ///
    /// Carried spans not resting on the background are released to the end
    /// of the previous row. A row that starts translucent would close the
    /// background immediately, so it is not reopened there.
    fn restore_background(
        &self,
        background: &ColourToken,
        first: Option<&ColourToken>,
        state: &mut EncoderState,
        line: &mut RowText,
    ) {
        if self.floor(&state.stack).is_some() {
            return;
        }
        state.release_to(None, line);

        let starts_translucent =
            first.is_some_and(|t| t.alpha() == AlphaClass::Translucent && t != background);
        if !starts_translucent {
            line.open(background);
            state.stack.push(background.clone());
        }
    }

    /// Open a new innermost span, recovering from overflow first.
    fn open(
        &self,
        token: &ColourToken,
        state: &mut EncoderState,
        line: &mut RowText,
    ) -> Result<(), NeedsRetry> {
        if state.stack.len() >= self.max_depth {
            if state.carry.is_some() {
                state.reconcile(None, line);
                state.stack.reset();
                return Err(NeedsRetry);
            }
            state.stack.close_down_to(None, &mut line.text);
        }

        line.open(token);
        state.stack.push(token.clone());
        Ok(())
    }

    /// Depth transparent cells fall back to: the background span if it is
    /// the outermost open span, otherwise nothing.
    fn floor(&self, stack: &SpanStack) -> Option<usize> {
        match (&self.background, stack.get(0)) {
            (Some(background), Some(outer)) if background == outer => Some(0),
            _ => None,
        }
    }
}

/// A lone transparent cell between two cells of the innermost colour.
fn bridges(tokens: &[ColourToken], x: usize, stack: &SpanStack) -> bool {
    let left = x.checked_sub(1).and_then(|i| tokens.get(i));
    let right = tokens.get(x + 1);

    match (left, right) {
        (Some(left), Some(right)) => {
            left == right
                && right.alpha() != AlphaClass::Transparent
                && stack.innermost() == Some(left)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::DigitMode;
    use pretty_assertions::assert_eq;

    const RED: Colour = Colour::rgb(255, 0, 0);
    const GREEN: Colour = Colour::rgb(0, 255, 0);
    const BLUE: Colour = Colour::rgb(0, 0, 255);
    const HALF_BLUE: Colour = Colour::new(0, 0, 255, 0x80);
    const CLEAR: Colour = Colour::TRANSPARENT;

    fn config(mode: DigitMode) -> EncodeConfig {
        EncodeConfig {
            mode,
            filler: '.',
            scale: "1".to_string(),
            ..Default::default()
        }
    }

    fn encoded(outcome: RowOutcome) -> String {
        match outcome {
            RowOutcome::Encoded(text) => text,
            RowOutcome::RetryRequired => panic!("unexpected retry"),
        }
    }

    #[test]
    fn test_runs_share_one_span() {
        let config = config(DigitMode::Short);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, RED, BLUE], &mut state));

        assert_eq!(text, "$[bg.color=f00 ..$[bg.color=00f .");
        assert_eq!(state.carry(), Some(1));
        assert_eq!(state.take_released(), 0);
    }

    #[test]
    fn test_returning_colour_closes_down_to_it() {
        let config = config(DigitMode::Short);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, BLUE, RED], &mut state));

        assert_eq!(text, "$[bg.color=f00 .$[bg.color=00f .].");
        assert_eq!(state.stack().len(), 1);
    }

    #[test]
    fn test_carried_span_reopened_when_already_painted() {
        let config = config(DigitMode::Short);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        encoded(encoder.encode(&[RED, BLUE], &mut state));
        let text = encoded(encoder.encode(&[BLUE, RED], &mut state));

        // Blue is closed at the end of the row above and reopened here.
        assert_eq!(text, "$[bg.color=00f .].");
        assert_eq!(state.take_released(), 1);
        assert_eq!(state.carry(), Some(0));
    }

    #[test]
    fn test_carried_span_dropped_before_row_paints() {
        let config = config(DigitMode::Short);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        encoded(encoder.encode(&[RED, GREEN, BLUE], &mut state));
        let text = encoded(encoder.encode(&[GREEN, GREEN, GREEN], &mut state));

        assert_eq!(text, "...");
        assert_eq!(state.take_released(), 1);
        assert_eq!(state.stack().len(), 2);
        assert_eq!(state.carry(), Some(1));
    }

    #[test]
    fn test_reconcile_twice_reopens_outermost_first() {
        let config = config(DigitMode::Short);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        encoded(encoder.encode(&[RED, GREEN, BLUE], &mut state));
        let text = encoded(encoder.encode(&[BLUE, GREEN, RED], &mut state));

        assert_eq!(text, "$[bg.color=0f0 $[bg.color=00f .].].");
        assert_eq!(state.take_released(), 2);
    }

    #[test]
    fn test_intrinsic_overflow_restarts_stack() {
        let config = EncodeConfig {
            max_depth: 2,
            ..config(DigitMode::Short)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, GREEN, BLUE], &mut state));

        assert_eq!(
            text,
            "$[bg.color=f00 .$[bg.color=0f0 .]]$[bg.color=00f ."
        );
        assert_eq!(state.stack().len(), 1);
    }

    #[test]
    fn test_overflow_with_carry_requests_retry() {
        let config = EncodeConfig {
            max_depth: 2,
            ..config(DigitMode::Short)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        encoded(encoder.encode(&[RED, GREEN], &mut state));
        assert_eq!(encoder.encode(&[BLUE], &mut state), RowOutcome::RetryRequired);

        assert_eq!(state.take_released(), 2);
        assert!(state.stack().is_empty());
        assert_eq!(state.carry(), None);

        let text = encoded(encoder.encode(&[BLUE], &mut state));
        assert_eq!(text, "$[bg.color=00f .");
    }

    #[test]
    fn test_translucent_starts_fresh_stack() {
        let config = config(DigitMode::ShortAlpha);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, HALF_BLUE, RED], &mut state));

        assert_eq!(
            text,
            "$[bg.color=f00 .]$[bg.color=00f8 .$[bg.color=f00 ."
        );
        assert_eq!(state.stack().len(), 2);
    }

    #[test]
    fn test_translucent_releases_carry() {
        let config = config(DigitMode::ShortAlpha);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        encoded(encoder.encode(&[RED], &mut state));
        let text = encoded(encoder.encode(&[HALF_BLUE], &mut state));

        assert_eq!(text, "$[bg.color=00f8 .");
        assert_eq!(state.take_released(), 1);
    }

    #[test]
    fn test_transparent_cells_are_unpainted() {
        let config = config(DigitMode::ShortAlpha);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[CLEAR, RED, CLEAR, CLEAR, RED, CLEAR], &mut state));

        assert_eq!(text, ".$[bg.color=f00 .]..$[bg.color=f00 .]");
        assert!(state.stack().is_empty());
        assert_eq!(state.carry(), None);
    }

    #[test]
    fn test_single_transparent_cell_bridged() {
        let config = config(DigitMode::ShortAlpha);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, CLEAR, RED], &mut state));

        assert_eq!(text, "$[bg.color=f00 ...");
    }

    #[test]
    fn test_transparent_cell_between_different_colours_not_bridged() {
        let config = config(DigitMode::ShortAlpha);
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, CLEAR, BLUE], &mut state));

        assert_eq!(text, "$[bg.color=f00 .].$[bg.color=00f .");
    }

    #[test]
    fn test_background_opened_and_used_as_floor() {
        let config = EncodeConfig {
            background: Some(Colour::WHITE),
            ..config(DigitMode::ShortAlpha)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, CLEAR, CLEAR], &mut state));

        assert_eq!(text, "$[bg.color=fff $[bg.color=f00 .]..");
        assert_eq!(state.carry(), Some(0));
    }

    #[test]
    fn test_background_reopened_after_translucent_row() {
        let config = EncodeConfig {
            background: Some(Colour::WHITE),
            carry: CarryPolicy::Floor,
            ..config(DigitMode::ShortAlpha)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        // A translucent first cell would close the background at once.
        let first = encoded(encoder.encode(&[HALF_BLUE], &mut state));
        assert_eq!(first, "$[bg.color=00f8 .]");
        assert!(state.stack().is_empty());

        let second = encoded(encoder.encode(&[RED], &mut state));
        assert_eq!(second, "$[bg.color=fff $[bg.color=f00 .]");
        assert_eq!(state.carry(), Some(0));
    }

    #[test]
    fn test_merge_restores_background_under_carried_spans() {
        let config = EncodeConfig {
            background: Some(Colour::WHITE),
            ..config(DigitMode::ShortAlpha)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let first = encoded(encoder.encode(&[RED, HALF_BLUE], &mut state));
        assert_eq!(first, "$[bg.color=fff $[bg.color=f00 .]]$[bg.color=00f8 .");
        assert_eq!(state.carry(), Some(0));

        // The translucent span is carried but does not rest on the background.
        let second = encoded(encoder.encode(&[RED], &mut state));
        assert_eq!(second, "$[bg.color=fff $[bg.color=f00 .");
        assert_eq!(state.take_released(), 1);
        assert_eq!(state.stack().get(0).map(ColourToken::as_str), Some("fff"));
    }

    #[test]
    fn test_background_kept_when_already_outermost() {
        let config = EncodeConfig {
            background: Some(Colour::WHITE),
            ..config(DigitMode::ShortAlpha)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        encoded(encoder.encode(&[RED, RED], &mut state));
        let second = encoded(encoder.encode(&[CLEAR, RED], &mut state));

        // Only the red span is released; the carried background stays open.
        assert_eq!(second, ".$[bg.color=f00 .");
        assert_eq!(state.take_released(), 1);
        assert_eq!(state.carry(), Some(1));
        assert_eq!(state.stack().get(0).map(ColourToken::as_str), Some("fff"));
    }

    #[test]
    fn test_floor_policy_closes_row() {
        let config = EncodeConfig {
            carry: CarryPolicy::Floor,
            ..config(DigitMode::Short)
        };
        let encoder = RowEncoder::new(&config);
        let mut state = EncoderState::new();

        let text = encoded(encoder.encode(&[RED, RED, BLUE], &mut state));

        assert_eq!(text, "$[bg.color=f00 ..$[bg.color=00f .]]");
        assert_eq!(state.carry(), None);
    }

    #[test]
    fn test_bridges_requires_neighbours() {
        let mode = DigitMode::ShortAlpha;
        let tokens: Vec<ColourToken> = [CLEAR, RED].iter().map(|&c| tokenize(c, mode)).collect();
        assert!(!bridges(&tokens, 0, &SpanStack::new()));
    }
}
