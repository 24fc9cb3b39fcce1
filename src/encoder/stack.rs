//! The stack of currently open colour spans.
//!
//! Depths are indices into the stack: 0 is the outermost span. "No depth"
//! (`None`) means nothing open, so `close_down_to(None, ..)` closes all.

use super::markup;
use super::token::ColourToken;

/// Open colour spans, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanStack {
    spans: Vec<ColourToken>,
}

/// Number of spans left open when closing down to `depth`.
pub(crate) fn retained(depth: Option<usize>) -> usize {
    depth.map_or(0, |d| d + 1)
}

impl SpanStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new innermost span. Capacity is the caller's concern.
    pub fn push(&mut self, token: ColourToken) {
        self.spans.push(token);
    }

    /// Close every span deeper than `depth`, writing one close marker each.
    ///
    /// Returns the number of spans closed.
    pub fn close_down_to(&mut self, depth: Option<usize>, out: &mut String) -> usize {
        let keep = retained(depth).min(self.spans.len());
        let closed = self.spans.len() - keep;
        markup::push_closes(out, closed);
        self.spans.truncate(keep);
        closed
    }

    /// Shallowest depth at which `token` is open.
    pub fn index_of(&self, token: &ColourToken) -> Option<usize> {
        self.spans.iter().position(|t| t == token)
    }

    /// Forget every open span without writing anything.
    pub fn reset(&mut self) {
        self.spans.clear();
    }

    /// Forget spans beyond the first `len`, without writing anything.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.spans.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Depth of the innermost span.
    pub fn top(&self) -> Option<usize> {
        self.spans.len().checked_sub(1)
    }

    /// The innermost span's token.
    pub fn innermost(&self) -> Option<&ColourToken> {
        self.spans.last()
    }

    pub fn get(&self, depth: usize) -> Option<&ColourToken> {
        self.spans.get(depth)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColourToken> {
        self.spans.iter()
    }

    /// Tokens at depths `from..=to`, outermost first.
    pub(crate) fn range(&self, from: usize, to: usize) -> &[ColourToken] {
        &self.spans[from..=to]
    }
}
