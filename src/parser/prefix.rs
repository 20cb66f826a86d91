//! Per-start-character dispatch (spec §4.1, "Prefix dispatch").
//!
//! Inline (span-level) parsing would otherwise try every registered parser
//! at every position. A [`PrefixedParser`] instead declares the set of
//! characters it can possibly start on, so [`InlineDispatch`] can look the
//! current character up in a table and only attempt the handful of parsers
//! that could plausibly match.

use super::{Parser, Parsed};
use crate::source::SourceCursor;
use std::collections::BTreeMap;

/// A parser paired with the non-empty set of characters it may start on.
#[derive(Clone)]
pub struct PrefixedParser<T> {
    prefixes: Vec<char>,
    parser: Parser<T>,
}

impl<T: 'static> PrefixedParser<T> {
    /// Build a prefixed parser. `prefixes` must be non-empty — spec §3
    /// specifies a `NonEmptySet<Char>`, so an empty slice is a programming
    /// error in the caller's grammar definition, not a recoverable parse
    /// failure.
    pub fn new(prefixes: impl IntoIterator<Item = char>, parser: Parser<T>) -> Self {
        let prefixes: Vec<char> = prefixes.into_iter().collect();
        assert!(!prefixes.is_empty(), "PrefixedParser requires a non-empty prefix set");
        Self { prefixes, parser }
    }

    pub fn prefixes(&self) -> &[char] {
        &self.prefixes
    }

    pub fn parser(&self) -> &Parser<T> {
        &self.parser
    }

    /// Merge with another prefixed parser sharing (or not) prefix
    /// characters: on each shared character, `self` is tried first, then
    /// `other`, matching spec §4.1's "merges parsers sharing a prefix
    /// character with `|` in registration order".
    pub fn or(self, other: PrefixedParser<T>) -> PrefixedParser<T>
    where
        T: Clone,
    {
        let mut prefixes = self.prefixes.clone();
        for c in &other.prefixes {
            if !prefixes.contains(c) {
                prefixes.push(*c);
            }
        }
        let combined = self.parser.or(other.parser);
        PrefixedParser { prefixes, parser: combined }
    }
}

/// Builds the O(1)-dispatch inline-span parser described in spec §4.1: a
/// map `{char -> Parser<T>}` assembled from registered [`PrefixedParser`]s,
/// plus a constructor turning any run of ordinary text into a `T` so that
/// unmatched stretches of input become plain text spans.
pub struct InlineDispatch<T> {
    dispatch: BTreeMap<char, Parser<T>>,
    registration_order: Vec<char>,
    text_ctor: std::rc::Rc<dyn Fn(String) -> T>,
}

impl<T: Clone + 'static> InlineDispatch<T> {
    pub fn new(text_ctor: impl Fn(String) -> T + 'static) -> Self {
        Self {
            dispatch: BTreeMap::new(),
            registration_order: Vec::new(),
            text_ctor: std::rc::Rc::new(text_ctor),
        }
    }

    /// Register a prefixed parser. Parsers registered earlier for a shared
    /// prefix character are tried first (spec §4.1: "in registration
    /// order").
    pub fn register(&mut self, prefixed: PrefixedParser<T>) {
        for &c in prefixed.prefixes() {
            match self.dispatch.remove(&c) {
                Some(existing) => {
                    self.dispatch.insert(c, existing.or(prefixed.parser().clone()));
                }
                None => {
                    self.dispatch.insert(c, prefixed.parser().clone());
                    self.registration_order.push(c);
                }
            }
        }
    }

    /// Build the assembled inline parser: it consumes ordinary text up to
    /// the next character present in the dispatch table, tries the mapped
    /// parser there, and on failure emits that one character as text and
    /// resumes — per spec §4.1.
    pub fn build(self) -> Parser<Vec<T>> {
        let dispatch = self.dispatch;
        let text_ctor = self.text_ctor;

        Parser::new(move |at: &SourceCursor| {
            let mut spans = Vec::new();
            let mut plain = String::new();
            let mut cursor = at.clone();

            loop {
                match cursor.char(0).and_then(|c| dispatch.get(&c).map(|p| (c, p))) {
                    Some((c, candidate)) => match candidate.run(&cursor) {
                        Parsed::Success { value, next } => {
                            if !plain.is_empty() {
                                spans.push(text_ctor(std::mem::take(&mut plain)));
                            }
                            spans.push(value);
                            cursor = next;
                        }
                        Parsed::Failure { .. } => {
                            plain.push(c);
                            cursor = cursor.consume(1);
                        }
                    },
                    None => match cursor.char(0) {
                        None => break,
                        Some(c) => {
                            plain.push(c);
                            cursor = cursor.consume(1);
                        }
                    },
                }
            }

            if !plain.is_empty() {
                spans.push(text_ctor(plain));
            }

            Parsed::success(spans, cursor)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::text::{any_while, ch, delimited_by};

    #[derive(Clone, Debug, PartialEq)]
    enum Span {
        Text(String),
        Strong(String),
    }

    fn strong_parser() -> PrefixedParser<Span> {
        let inner = ch('*')
            .right(delimited_by(&["*"]).parser())
            .left(ch('*'))
            .map(Span::Strong);
        PrefixedParser::new(['*'], inner)
    }

    #[test]
    fn dispatch_builds_mixed_text_and_spans() {
        let mut dispatch = InlineDispatch::new(Span::Text);
        dispatch.register(strong_parser());
        let parser = dispatch.build();

        let at = SourceCursor::new("hello *world* bye");
        match parser.run(&at) {
            Parsed::Success { value, next } => {
                assert!(next.at_end());
                assert_eq!(
                    value,
                    vec![
                        Span::Text("hello ".into()),
                        Span::Strong("world".into()),
                        Span::Text(" bye".into()),
                    ]
                );
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn failed_candidate_falls_back_to_text() {
        let mut dispatch = InlineDispatch::new(Span::Text);
        dispatch.register(strong_parser());
        let parser = dispatch.build();

        // Unterminated '*' never matches the Strong parser, so it is kept
        // as a single literal text character and parsing resumes after it.
        let at = SourceCursor::new("a * b");
        match parser.run(&at) {
            Parsed::Success { value, .. } => {
                assert_eq!(value, vec![Span::Text("a * b".into())]);
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn merging_prefixes_preserves_registration_order() {
        let a = PrefixedParser::new(['*'], any_while(|c| c == 'a').take(1).map(|_| Span::Text("A".into())));
        let b = PrefixedParser::new(['*'], any_while(|c| c == 'b').take(1).map(|_| Span::Text("B".into())));
        let merged = a.or(b);
        let at = SourceCursor::new("b");
        // "a" parser is tried first and fails (wrong char); "b" parser then matches.
        match merged.parser().run(&at) {
            Parsed::Success { value, .. } => assert_eq!(value, Span::Text("B".into())),
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }
}
