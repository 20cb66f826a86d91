//! Immutable views over parser input.
//!
//! [`SourceCursor`] is the value type every [`crate::parser::Parser`] advances
//! through. It never owns its text directly — the text and a lazily built
//! line-start index are shared behind an [`Rc`] ([`SourceText`]) so that
//! cloning a cursor (which combinators do constantly: alternatives retry from
//! the same starting cursor, lookahead/lookbehind roll back) is a pointer
//! bump plus two integers, never a string copy.

use once_cell::unsync::OnceCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// The maximum nesting depth a block parser may recurse to before the
/// per-format fallback (flat, non-recursive) parser takes over.
///
/// Recommended by spec §4.1; concrete markup grammars may override it per
/// format, but the crate ships this as the default.
pub const DEFAULT_MAX_NEST_LEVEL: usize = 12;

/// Shared, reference-counted backing storage for a parse run: the raw input
/// plus a lazily computed index of line-start byte offsets.
struct SourceText {
    input: String,
    line_starts: OnceCell<Vec<usize>>,
}

impl SourceText {
    fn line_starts(&self) -> &[usize] {
        self.line_starts
            .get_or_init(|| {
                let mut starts = vec![0];
                starts.extend(
                    self.input
                        .char_indices()
                        .filter(|(_, c)| *c == '\n')
                        .map(|(i, _)| i + 1),
                );
                starts
            })
            .as_slice()
    }
}

/// One line/column position, computed on demand from a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An immutable view into `input` at `offset`, carrying the current block
/// nesting depth for the recursion guard described in spec §4.1.
///
/// Invariant: `0 <= offset <= input.len()`, and `offset` always lands on a
/// char boundary of `input`.
#[derive(Clone)]
pub struct SourceCursor {
    text: Rc<SourceText>,
    offset: usize,
    depth: usize,
}

impl SourceCursor {
    /// Build a cursor positioned at the start of `input`.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            text: Rc::new(SourceText {
                input: input.into(),
                line_starts: OnceCell::new(),
            }),
            offset: 0,
            depth: 0,
        }
    }

    fn input(&self) -> &str {
        &self.text.input
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.input().len()
    }

    /// The remaining, unconsumed slice of input.
    pub fn remaining(&self) -> &str {
        &self.input()[self.offset..]
    }

    /// The character `k` positions ahead of the cursor (0 = current), or
    /// `None` past the end of input.
    pub fn char(&self, k: usize) -> Option<char> {
        self.remaining().chars().nth(k)
    }

    /// Capture the next `n` characters as a `&str` without consuming them.
    /// Returns fewer than `n` characters if input runs out first.
    pub fn capture(&self, n: usize) -> &str {
        match self.remaining().char_indices().nth(n) {
            Some((byte_idx, _)) => &self.remaining()[..byte_idx],
            None => self.remaining(),
        }
    }

    /// Advance the cursor by `n` characters, returning the new cursor. Never
    /// advances past the end of input.
    #[must_use]
    pub fn consume(&self, n: usize) -> SourceCursor {
        let advance = self.capture(n).len();
        SourceCursor {
            text: self.text.clone(),
            offset: self.offset + advance,
            depth: self.depth,
        }
    }

    /// Move the cursor backwards by `k` characters (for lookbehind). Returns
    /// `None` if `k` would move before the start of input.
    #[must_use]
    pub fn drop(&self, k: usize) -> Option<SourceCursor> {
        let prefix = &self.input()[..self.offset];
        let mut char_count = 0usize;
        let mut byte_idx = self.offset;
        for (idx, _) in prefix.char_indices().rev() {
            if char_count == k {
                byte_idx = idx;
                break;
            }
            char_count += 1;
            byte_idx = idx;
        }
        if char_count < k {
            return None;
        }
        Some(SourceCursor {
            text: self.text.clone(),
            offset: byte_idx,
            depth: self.depth,
        })
    }

    /// Return a cursor with nesting depth incremented by one, used by block
    /// parsers before recursing into a nested block.
    #[must_use]
    pub fn nest(&self) -> SourceCursor {
        SourceCursor {
            text: self.text.clone(),
            offset: self.offset,
            depth: self.depth + 1,
        }
    }

    /// Whether `nest()` would exceed `max_nest_level`.
    pub fn nest_limit_reached(&self, max_nest_level: usize) -> bool {
        self.depth >= max_nest_level
    }

    /// Compute the (line, column) of this cursor's offset.
    pub fn position(&self) -> Position {
        self.text.position_at(self.offset)
    }

    /// The full contents of the line the cursor currently sits on, used by
    /// diagnostics to render a caret under the failure column.
    pub fn line_content(&self) -> &str {
        self.text.line_content_at(self.offset)
    }

    /// Render `line_content()` with a `^` caret under the current column,
    /// e.g. for embedding in a [`crate::error::ParserFailure`] message.
    pub fn line_content_with_caret(&self) -> String {
        let pos = self.position();
        let line = self.line_content();
        let caret_col = pos.column.saturating_sub(1);
        format!("{line}\n{}^", " ".repeat(caret_col))
    }
}

impl SourceText {
    fn position_at(&self, offset: usize) -> Position {
        let starts = self.line_starts();
        let line_idx = match starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = starts[line_idx];
        let column = self.input[line_start..offset].chars().count() + 1;
        Position::new(line_idx + 1, column)
    }

    fn line_content_at(&self, offset: usize) -> &str {
        let starts = self.line_starts();
        let line_idx = match starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = starts[line_idx];
        let end = starts
            .get(line_idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.input.len());
        let end = end.max(start);
        &self.input[start..end.min(self.input.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_in_bounds() {
        let c = SourceCursor::new("hello");
        let n = c.consume(3);
        assert_eq!(n.offset(), 3);
        assert!(n.offset() >= c.offset());
    }

    #[test]
    fn consume_clamps_at_end() {
        let c = SourceCursor::new("hi");
        let n = c.consume(10);
        assert!(n.at_end());
        assert_eq!(n.offset(), 2);
    }

    #[test]
    fn position_tracks_lines() {
        let c = SourceCursor::new("aaa\nbbb\nccc");
        let at_c = c.consume(9); // "aaa\nbbb\nc"
        let pos = at_c.position();
        assert_eq!(pos, Position::new(3, 2));
    }

    #[test]
    fn drop_moves_back_for_lookbehind() {
        let c = SourceCursor::new("hello world");
        let at5 = c.consume(5);
        let back = at5.drop(5).unwrap();
        assert_eq!(back.offset(), 0);
        assert!(at5.drop(6).is_none());
    }

    #[test]
    fn line_content_with_caret_formats() {
        let c = SourceCursor::new("abc\ndefg");
        let at = c.consume(6); // points at 'f' on line 2
        let rendered = at.line_content_with_caret();
        assert!(rendered.starts_with("defg"));
        assert!(rendered.ends_with('^'));
    }
}
