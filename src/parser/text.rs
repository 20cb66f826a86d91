//! Low-level character-class, delimited-text and anchor primitives
//! (spec §4.1, "Text primitives").

use super::{LazyMessage, Parsed, Parser};
use crate::source::SourceCursor;
use std::rc::Rc;

/// A named predicate over `char`, the building block for `any_of`,
/// `any_but`, `any_in` and `any_while`. A `CharClass` is not itself a
/// parser — it is a small builder exposing `.take`/`.min`/`.max`, matching
/// spec §4.1's "each exposes `.take(n)`, `.min(n)`, `.max(n)`".
#[derive(Clone)]
pub struct CharClass {
    predicate: Rc<dyn Fn(char) -> bool>,
    label: Rc<str>,
}

impl CharClass {
    fn new(label: impl Into<Rc<str>>, predicate: impl Fn(char) -> bool + 'static) -> Self {
        Self { predicate: Rc::new(predicate), label: label.into() }
    }

    fn matches(&self, c: char) -> bool {
        (self.predicate)(c)
    }

    /// Exactly `n` characters of this class; fails if fewer are available.
    pub fn take(&self, n: usize) -> Parser<String> {
        self.min_max(n, Some(n))
    }

    /// At least `n` characters of this class, greedy.
    pub fn min(&self, n: usize) -> Parser<String> {
        self.min_max(n, None)
    }

    /// Up to `n` characters of this class; always succeeds (possibly with
    /// an empty string).
    pub fn max(&self, n: usize) -> Parser<String> {
        self.min_max(0, Some(n))
    }

    /// Zero or more characters of this class; always succeeds.
    pub fn any(&self) -> Parser<String> {
        self.min_max(0, None)
    }

    /// One or more characters of this class.
    pub fn some(&self) -> Parser<String> {
        self.min_max(1, None)
    }

    fn min_max(&self, min: usize, max: Option<usize>) -> Parser<String> {
        let class = self.clone();
        Parser::new(move |at: &SourceCursor| {
            let mut taken = String::new();
            let mut cursor = at.clone();
            while max.map_or(true, |m| taken.chars().count() < m) {
                match cursor.char(0) {
                    Some(c) if class.matches(c) => {
                        taken.push(c);
                        cursor = cursor.consume(1);
                    }
                    _ => break,
                }
            }
            if taken.chars().count() < min {
                let label = class.label.clone();
                Parsed::failure(
                    at.clone(),
                    LazyMessage::new(move |at| {
                        format!("expected at least {min} characters of {label} at {}", at.position())
                    }),
                )
            } else {
                Parsed::success(taken, cursor)
            }
        })
    }
}

/// A class matching any character in `chars`.
pub fn any_of(chars: &str) -> CharClass {
    let set: Vec<char> = chars.chars().collect();
    CharClass::new(format!("any of \"{chars}\""), move |c| set.contains(&c))
}

/// A class matching any character *not* in `chars`.
pub fn any_but(chars: &str) -> CharClass {
    let set: Vec<char> = chars.chars().collect();
    CharClass::new(format!("any but \"{chars}\""), move |c| !set.contains(&c))
}

/// A class matching any character within one of the given inclusive
/// `(low, high)` ranges.
pub fn any_in(ranges: &[(char, char)]) -> CharClass {
    let ranges = ranges.to_vec();
    CharClass::new("any in ranges", move |c| ranges.iter().any(|&(lo, hi)| c >= lo && c <= hi))
}

/// A class matching any character for which `predicate` holds.
pub fn any_while(predicate: impl Fn(char) -> bool + 'static) -> CharClass {
    CharClass::new("matching predicate", predicate)
}

/// Builder for `delimited_by(delim…)`: finds the earliest occurrence of any
/// of the given delimiters and returns the text preceding it.
pub struct DelimitedBy {
    delimiters: Vec<String>,
    keep_delimiter: bool,
    non_empty: bool,
    fail_on: Option<CharClass>,
}

/// `delimited_by(delim…)`: scans forward for the earliest occurrence of any
/// delimiter in `delimiters`.
pub fn delimited_by(delimiters: &[&str]) -> DelimitedBy {
    DelimitedBy {
        delimiters: delimiters.iter().map(|s| s.to_string()).collect(),
        keep_delimiter: false,
        non_empty: false,
        fail_on: None,
    }
}

impl DelimitedBy {
    /// Include the matched delimiter in the returned text (otherwise the
    /// cursor stops right before it).
    pub fn keep_delimiter(mut self, keep: bool) -> Self {
        self.keep_delimiter = keep;
        self
    }

    /// Require at least one character before the delimiter.
    pub fn non_empty(mut self, non_empty: bool) -> Self {
        self.non_empty = non_empty;
        self
    }

    /// Fail outright (rather than reaching EOF) if a character from `class`
    /// is seen before any delimiter — used e.g. to stop a delimited scan at
    /// an unescaped newline.
    pub fn fail_on(mut self, class: CharClass) -> Self {
        self.fail_on = Some(class);
        self
    }

    pub fn parser(&self) -> Parser<String> {
        let delimiters = self.delimiters.clone();
        let keep_delimiter = self.keep_delimiter;
        let non_empty = self.non_empty;
        let fail_on = self.fail_on.clone();

        Parser::new(move |at: &SourceCursor| {
            let mut cursor = at.clone();
            loop {
                if let Some(class) = &fail_on {
                    if let Some(c) = cursor.char(0) {
                        if class.matches(c) {
                            return Parsed::failure(
                                cursor.clone(),
                                LazyMessage::constant("delimited scan hit a disallowed character"),
                            );
                        }
                    }
                }
                if let Some(delim) = delimiters.iter().find(|d| cursor.remaining().starts_with(d.as_str())) {
                    let text_len = cursor.offset() - at.offset();
                    if non_empty && text_len == 0 {
                        return Parsed::failure(
                            at.clone(),
                            LazyMessage::constant("expected non-empty text before delimiter"),
                        );
                    }
                    let text_end = if keep_delimiter {
                        cursor.consume(delim.chars().count())
                    } else {
                        cursor.clone()
                    };
                    let taken = &at.remaining()[..text_end.offset() - at.offset()];
                    return Parsed::success(taken.to_string(), text_end);
                }
                if cursor.at_end() {
                    return Parsed::failure(
                        cursor.clone(),
                        LazyMessage::new({
                            let delimiters = delimiters.clone();
                            move |at| {
                                format!(
                                    "expected one of {:?} before end of input at {}",
                                    delimiters,
                                    at.position()
                                )
                            }
                        }),
                    );
                }
                cursor = cursor.consume(1);
            }
        })
    }
}

/// Matches a literal string exactly.
pub fn literal(text: &str) -> Parser<String> {
    let text = text.to_string();
    Parser::new(move |at: &SourceCursor| {
        if at.remaining().starts_with(text.as_str()) {
            Parsed::success(text.clone(), at.consume(text.chars().count()))
        } else {
            let expected = text.clone();
            Parsed::failure(
                at.clone(),
                LazyMessage::new(move |at| format!("expected \"{expected}\" at {}", at.position())),
            )
        }
    })
}

/// Matches text against a compiled regular expression, anchored at the
/// cursor's current position (spec §4.1's character-class primitives,
/// generalized to arbitrary patterns). Compiles the pattern once, rejects
/// one that can match an empty string, and requires the match to start
/// exactly at the current position rather than scanning ahead.
pub fn regex(pattern: &str) -> Result<Parser<String>, String> {
    let regexp =
        regex::Regex::new(pattern).map_err(|err| format!("'{pattern}' is not a valid regular expression: {err}"))?;
    if regexp.is_match("") {
        return Err(format!("regex pattern '{pattern}' must not match an empty string"));
    }
    Ok(Parser::new(move |at: &SourceCursor| match regexp.find(at.remaining()) {
        Some(m) if m.start() == 0 => {
            let text = m.as_str().to_string();
            let advance = text.chars().count();
            Parsed::success(text, at.consume(advance))
        }
        _ => {
            let pattern = pattern.to_string();
            Parsed::failure(at.clone(), LazyMessage::new(move |at| format!("expected /{pattern}/ at {}", at.position())))
        }
    }))
}

/// Matches a single character exactly.
pub fn ch(expected: char) -> Parser<char> {
    Parser::new(move |at: &SourceCursor| match at.char(0) {
        Some(c) if c == expected => Parsed::success(c, at.consume(1)),
        _ => Parsed::failure(
            at.clone(),
            LazyMessage::new(move |at| format!("expected '{expected}' at {}", at.position())),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::eof;

    #[test]
    fn any_while_digits_take() {
        let p = any_while(|c| c.is_ascii_digit()).take(3);
        let at = SourceCursor::new("12345");
        match p.run(&at) {
            Parsed::Success { value, next } => {
                assert_eq!(value, "123");
                assert_eq!(next.offset(), 3);
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn min_requires_count() {
        let p = any_of("ab").min(3);
        let at = SourceCursor::new("ab");
        assert!(p.run(&at).is_failure());
    }

    #[test]
    fn max_always_succeeds() {
        let p = any_of("x").max(5);
        let at = SourceCursor::new("");
        assert!(p.run(&at).is_success());
    }

    #[test]
    fn delimited_by_stops_at_earliest_delimiter() {
        let p = delimited_by(&["]]", ")"]).parser();
        let at = SourceCursor::new("abc)def]]");
        match p.run(&at) {
            Parsed::Success { value, next } => {
                assert_eq!(value, "abc");
                assert_eq!(next.offset(), 3);
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn delimited_by_keep_delimiter() {
        let p = delimited_by(&["@:@"]).keep_delimiter(true).parser();
        let at = SourceCursor::new("body@:@rest");
        match p.run(&at) {
            Parsed::Success { value, next } => {
                assert_eq!(value, "body@:@");
                assert_eq!(next.remaining(), "rest");
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn consume_all_roundtrip() {
        let p = literal("abc").left(eof());
        let at = SourceCursor::new("abc");
        assert!(p.run(&at).is_success());
    }

    #[test]
    fn regex_matches_anchored_at_cursor() {
        let p = regex(r"[0-9]+").unwrap();
        let at = SourceCursor::new("123abc");
        match p.run(&at) {
            Parsed::Success { value, next } => {
                assert_eq!(value, "123");
                assert_eq!(next.offset(), 3);
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn regex_does_not_scan_ahead() {
        let p = regex(r"[0-9]+").unwrap();
        let at = SourceCursor::new("abc123");
        assert!(p.run(&at).is_failure());
    }

    #[test]
    fn regex_rejects_patterns_matching_empty_string() {
        assert!(regex(r"a*").is_err());
    }
}
