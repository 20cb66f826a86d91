//! The allocation-conscious combinator core (spec §4.1).
//!
//! A [`Parser<T>`] is, conceptually, a function `SourceCursor -> Parsed<T>`.
//! It is represented here as a cheaply-cloneable `Rc<dyn Fn>` wrapper rather
//! than a bare closure or a trait object hierarchy, so that a parser can be
//! built once (e.g. as a `static`-ish value constructed during bundle setup)
//! and shared across every document parsed in a run without re-allocating
//! its combinator tree per call.
//!
//! Failures are values, never panics or exceptions: see [`Parsed::Failure`]
//! and the crate-level note in spec §4.1 ("Parsers never throw").

pub mod prefix;
pub mod text;

#[cfg(test)]
mod __tests__;

use crate::source::SourceCursor;
use std::fmt;
use std::rc::Rc;

/// A failure message, built lazily from the cursor at which the failure is
/// reported. Many failures are produced by alternatives tried speculatively
/// and then discarded; eagerly formatting their message would waste work
/// that is only needed when a failure actually escapes to the caller.
#[derive(Clone)]
pub struct LazyMessage(Rc<dyn Fn(&SourceCursor) -> String>);

impl LazyMessage {
    pub fn new(f: impl Fn(&SourceCursor) -> String + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn constant(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| message.clone())
    }

    pub fn render(&self, at: &SourceCursor) -> String {
        (self.0)(at)
    }
}

impl fmt::Debug for LazyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyMessage(..)")
    }
}

/// The result of applying a [`Parser`] to a cursor.
///
/// Invariant (spec §8): on `Success`, `next.offset() >= in.offset()`; on
/// `Failure`, `next.offset() <= len(input)`.
#[derive(Clone)]
pub enum Parsed<T> {
    Success {
        value: T,
        next: SourceCursor,
    },
    Failure {
        message: LazyMessage,
        next: SourceCursor,
        /// Set by [`Parser::commit`]: tells an enclosing `or` not to
        /// backtrack to its alternative even though no input was consumed.
        committed: bool,
    },
}

impl<T> Parsed<T> {
    pub fn success(value: T, next: SourceCursor) -> Self {
        Parsed::Success { value, next }
    }

    pub fn failure(next: SourceCursor, message: LazyMessage) -> Self {
        Parsed::Failure { message, next, committed: false }
    }

    fn failure_raw(message: LazyMessage, next: SourceCursor, committed: bool) -> Self {
        Parsed::Failure { message, next, committed }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Parsed::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Parsed::Failure { .. })
    }

    /// The cursor to resume parsing from, regardless of outcome.
    pub fn next(&self) -> &SourceCursor {
        match self {
            Parsed::Success { next, .. } => next,
            Parsed::Failure { next, .. } => next,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        match self {
            Parsed::Success { value, next } => Parsed::Success { value: f(value), next },
            Parsed::Failure { message, next, committed } => {
                Parsed::Failure { message, next, committed }
            }
        }
    }

    /// Convert this result into a plain `Option`, discarding failure detail.
    pub fn ok(self) -> Option<T> {
        match self {
            Parsed::Success { value, .. } => Some(value),
            Parsed::Failure { .. } => None,
        }
    }
}

/// A parser of `T`: a shareable function from a cursor to a [`Parsed<T>`].
#[derive(Clone)]
pub struct Parser<T>(Rc<dyn Fn(&SourceCursor) -> Parsed<T>>);

impl<T: 'static> Parser<T> {
    pub fn new(f: impl Fn(&SourceCursor) -> Parsed<T> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn run(&self, at: &SourceCursor) -> Parsed<T> {
        (self.0)(at)
    }

    /// Parser that always fails at the given cursor with the given message,
    /// without inspecting input. Used as the alternative identity
    /// (`p | fail` behaves as `p`).
    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        Parser::new(move |at| Parsed::failure(at.clone(), LazyMessage::constant(message.clone())))
    }

    /// Parser that always succeeds with `value` without consuming input.
    pub fn pure(value: T) -> Self
    where
        T: Clone,
    {
        Parser::new(move |at| Parsed::success(value.clone(), at.clone()))
    }

    /// `p.map(f)`: transform a successful value, leaving failures untouched.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Parser<U> {
        Parser::new(move |at| self.run(at).map(&f))
    }

    /// `p >> f`: run `p`, then feed its value into a parser-producing
    /// function and run that parser from where `p` left off.
    pub fn flat_map<U: 'static>(self, f: impl Fn(T) -> Parser<U> + 'static) -> Parser<U> {
        Parser::new(move |at| match self.run(at) {
            Parsed::Success { value, next } => f(value).run(&next),
            Parsed::Failure { message, next, committed } => {
                Parsed::Failure { message, next, committed }
            }
        })
    }

    /// `p ~ q`: sequence two parsers, producing a pair. On failure of `q`
    /// the combined failure is reported at `q`'s offset (spec §4.1).
    pub fn seq<U: 'static>(self, q: Parser<U>) -> Parser<(T, U)>
    where
        T: Clone,
    {
        Parser::new(move |at| match self.run(at) {
            Parsed::Success { value: a, next } => match q.run(&next) {
                Parsed::Success { value: b, next } => Parsed::success((a, b), next),
                Parsed::Failure { message, next, committed } => {
                    Parsed::Failure { message, next, committed }
                }
            },
            Parsed::Failure { message, next, committed } => {
                Parsed::Failure { message, next, committed }
            }
        })
    }

    /// `p <~ q`: sequence, keeping only `p`'s value.
    pub fn left<U: 'static>(self, q: Parser<U>) -> Parser<T>
    where
        T: Clone,
    {
        self.seq(q).map(|(a, _)| a)
    }

    /// `p ~> q`: sequence, keeping only `q`'s value.
    pub fn right<U: 'static>(self, q: Parser<U>) -> Parser<U>
    where
        T: Clone,
    {
        self.seq(q).map(|(_, b)| b)
    }

    /// `p | q`: try `p`; if it fails without consuming input beyond the
    /// starting cursor (and was not [`commit`](Parser::commit)ted), try `q`
    /// at the original cursor. By default alternatives backtrack freely.
    pub fn or(self, q: Parser<T>) -> Parser<T> {
        Parser::new(move |at| match self.run(at) {
            success @ Parsed::Success { .. } => success,
            Parsed::Failure { next, committed, .. }
                if !committed && next.offset() == at.offset() =>
            {
                q.run(at)
            }
            failed => failed,
        })
    }

    /// Mark this parser as committed: once it fails, an enclosing `or` will
    /// not backtrack to its alternative, even though no input was consumed.
    /// Used to spell out combinators that must commit on partial
    /// consumption, per spec §4.1.
    pub fn commit(self) -> Self {
        Parser::new(move |at| match self.run(at) {
            Parsed::Failure { message, next, .. } => {
                Parsed::failure_raw(message, next, true)
            }
            other => other,
        })
    }

    /// `opt(p)`: always succeeds, with `Some(value)` if `p` succeeded or
    /// `None` (without consuming input) if it failed.
    pub fn opt(self) -> Parser<Option<T>> {
        Parser::new(move |at| match self.run(at) {
            Parsed::Success { value, next } => Parsed::success(Some(value), next),
            Parsed::Failure { next, committed, .. }
                if !committed && next.offset() == at.offset() =>
            {
                Parsed::success(None, at.clone())
            }
            Parsed::Failure { message, next, committed } => {
                Parsed::Failure { message, next, committed }
            }
        })
    }

    /// `not(p)`: succeeds, consuming nothing, iff `p` fails.
    pub fn negate(self) -> Parser<()> {
        Parser::new(move |at| match self.run(at) {
            Parsed::Success { .. } => Parsed::failure(
                at.clone(),
                LazyMessage::constant("expected negated parser to fail"),
            ),
            Parsed::Failure { .. } => Parsed::success((), at.clone()),
        })
    }

    /// `look_ahead(p)`: run `p`, but never consume input — succeeds at the
    /// original cursor with `p`'s value if `p` would have succeeded.
    pub fn look_ahead(self) -> Self {
        Parser::new(move |at| match self.run(at) {
            Parsed::Success { value, .. } => Parsed::success(value, at.clone()),
            Parsed::Failure { message, committed, .. } => {
                Parsed::failure_raw(message, at.clone(), committed)
            }
        })
    }

    /// `consume_all(p)`: requires `p` to consume to end-of-input, reporting
    /// "unconsumed input" otherwise.
    pub fn consume_all(self) -> Self {
        Parser::new(move |at| match self.run(at) {
            Parsed::Success { value, next } if next.at_end() => Parsed::success(value, next),
            Parsed::Success { next, .. } => Parsed::failure(
                next.clone(),
                LazyMessage::new(|at| format!("unconsumed input at {}", at.position())),
            ),
            failed => failed,
        })
    }
}

/// `look_behind(k, p)`: run `p` against the cursor moved back `k`
/// characters, without consuming anything in the forward direction. Fails
/// if the cursor is within `k` characters of the start of input.
pub fn look_behind<T: 'static>(k: usize, p: Parser<T>) -> Parser<T> {
    Parser::new(move |at| match at.drop(k) {
        None => Parsed::failure(
            at.clone(),
            LazyMessage::new(move |at| {
                format!("not enough input to look behind {k} chars at {}", at.position())
            }),
        ),
        Some(behind) => match p.run(&behind) {
            Parsed::Success { value, .. } => Parsed::success(value, at.clone()),
            Parsed::Failure { message, committed, .. } => {
                Parsed::failure_raw(message, at.clone(), committed)
            }
        },
    })
}

/// `rep(p)`: zero or more repetitions, greedy until `p` fails without
/// consuming input (a `p` that fails while having consumed input is a hard
/// error, propagated up).
pub fn rep<T: 'static>(p: Parser<T>) -> Parser<Vec<T>> {
    rep_max(usize::MAX, p)
}

/// `rep_min(n, p)`: succeeds iff at least `n` repetitions of `p` match.
pub fn rep_min<T: 'static>(n: usize, p: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |at| {
        let mut values = Vec::new();
        let mut cursor = at.clone();
        loop {
            match p.run(&cursor) {
                Parsed::Success { value, next } => {
                    let consumed = next.offset() > cursor.offset();
                    values.push(value);
                    cursor = next;
                    if !consumed {
                        // Nullable repeated parser: stop to avoid an infinite loop.
                        break;
                    }
                }
                Parsed::Failure { message, next, committed } => {
                    if values.len() >= n {
                        break;
                    }
                    return Parsed::Failure { message, next, committed };
                }
            }
        }
        Parsed::success(values, cursor)
    })
}

/// `rep_max(n, p)`: always succeeds, matching up to `n` repetitions.
pub fn rep_max<T: 'static>(n: usize, p: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |at| {
        let mut values = Vec::new();
        let mut cursor = at.clone();
        while values.len() < n {
            match p.run(&cursor) {
                Parsed::Success { value, next } => {
                    let consumed = next.offset() > cursor.offset();
                    values.push(value);
                    cursor = next;
                    if !consumed {
                        break;
                    }
                }
                Parsed::Failure { .. } => break,
            }
        }
        Parsed::success(values, cursor)
    })
}

/// `rep_n(n, p)`: exactly `n` repetitions, no more, no fewer.
pub fn rep_n<T: 'static>(n: usize, p: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |at| {
        let mut values = Vec::with_capacity(n);
        let mut cursor = at.clone();
        for _ in 0..n {
            match p.run(&cursor) {
                Parsed::Success { value, next } => {
                    values.push(value);
                    cursor = next;
                }
                Parsed::Failure { message, next, committed } => {
                    return Parsed::Failure { message, next, committed }
                }
            }
        }
        Parsed::success(values, cursor)
    })
}

/// Succeeds, consuming nothing, at end of input.
pub fn eof() -> Parser<()> {
    Parser::new(|at| {
        if at.at_end() {
            Parsed::success((), at.clone())
        } else {
            Parsed::failure(at.clone(), LazyMessage::constant("expected end of input"))
        }
    })
}

/// Succeeds, consuming nothing, at the start of input.
pub fn sof() -> Parser<()> {
    Parser::new(|at| {
        if at.offset() == 0 {
            Parsed::success((), at.clone())
        } else {
            Parsed::failure(at.clone(), LazyMessage::constant("expected start of input"))
        }
    })
}

/// Succeeds, consuming nothing, at end-of-line (a `\n`, a `\r\n`, or EOF).
pub fn eol() -> Parser<()> {
    Parser::new(|at| {
        if at.at_end() {
            return Parsed::success((), at.clone());
        }
        match at.char(0) {
            Some('\n') => Parsed::success((), at.clone()),
            Some('\r') if at.char(1) == Some('\n') => Parsed::success((), at.clone()),
            _ => Parsed::failure(at.clone(), LazyMessage::constant("expected end of line")),
        }
    })
}
