//! Property-style tests for the combinator laws listed in spec §8.

use super::text::{ch, literal};
use super::*;
use crate::source::SourceCursor;

fn run<T>(p: &Parser<T>, input: &str) -> Parsed<T> {
    p.run(&SourceCursor::new(input))
}

#[test]
fn success_offset_never_decreases() {
    let p = literal("abc");
    match run(&p, "abcdef") {
        Parsed::Success { next, .. } => assert!(next.offset() >= 0),
        Parsed::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn failure_offset_within_bounds() {
    let p = literal("xyz");
    match run(&p, "abc") {
        Parsed::Failure { next, .. } => assert!(next.offset() <= 3),
        Parsed::Success { .. } => panic!("expected failure"),
    }
}

#[test]
fn alternative_identity_right() {
    // `p | fail` behaves as `p`.
    let p = literal("ab");
    let combined = p.clone().or(Parser::fail("never"));
    let at = SourceCursor::new("ab");
    match (p.run(&at), combined.run(&at)) {
        (Parsed::Success { value: a, next: na }, Parsed::Success { value: b, next: nb }) => {
            assert_eq!(a, b);
            assert_eq!(na.offset(), nb.offset());
        }
        _ => panic!("both should succeed identically"),
    }
}

#[test]
fn alternative_identity_left() {
    // `fail | p` behaves as `p`.
    let p = literal("ab");
    let combined = Parser::<String>::fail("never").or(p.clone());
    let at = SourceCursor::new("ab");
    match (p.run(&at), combined.run(&at)) {
        (Parsed::Success { value: a, next: na }, Parsed::Success { value: b, next: nb }) => {
            assert_eq!(a, b);
            assert_eq!(na.offset(), nb.offset());
        }
        _ => panic!("both should succeed identically"),
    }
}

#[test]
fn map_identity_law() {
    let p = literal("ab");
    let mapped = p.clone().map(|s| s);
    let at = SourceCursor::new("ab");
    match (p.run(&at), mapped.run(&at)) {
        (Parsed::Success { value: a, .. }, Parsed::Success { value: b, .. }) => assert_eq!(a, b),
        _ => panic!("expected both to succeed"),
    }
}

#[test]
fn seq_map_fst_equals_left() {
    let p = literal("a").seq(literal("b"));
    let fst = p.clone().map(|(a, _)| a);
    let left = literal("a").left(literal("b"));
    let at = SourceCursor::new("ab");
    match (fst.run(&at), left.run(&at)) {
        (Parsed::Success { value: a, next: na }, Parsed::Success { value: b, next: nb }) => {
            assert_eq!(a, b);
            assert_eq!(na.offset(), nb.offset());
        }
        _ => panic!("expected both to succeed"),
    }
}

#[test]
fn consume_all_succeeds_only_at_end() {
    let p = literal("ab").consume_all();
    assert!(run(&p, "ab").is_success());
    assert!(run(&p, "abc").is_failure());
}

#[test]
fn look_behind_consumes_nothing_forward() {
    let p = ch('a').right(look_behind(1, ch('a')));
    let at = SourceCursor::new("aa");
    match p.run(&at) {
        Parsed::Success { next, .. } => assert_eq!(next.offset(), 1),
        Parsed::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn look_behind_fails_near_start() {
    let p = look_behind(5, ch('a'));
    let at = SourceCursor::new("ab");
    assert!(p.run(&at).is_failure());
}

#[test]
fn rep_terminates_on_zero_width_match() {
    // A nullable repeated parser (here: `opt` of a failing parser) must not
    // loop forever; `rep` stops as soon as no input is consumed.
    let nullable = ch('z').opt();
    let p = rep(nullable);
    let at = SourceCursor::new("abc");
    match p.run(&at) {
        Parsed::Success { value, next } => {
            assert_eq!(value.len(), 1);
            assert_eq!(next.offset(), 0);
        }
        Parsed::Failure { .. } => panic!("rep must always succeed"),
    }
}

#[test]
fn rep_min_requires_count() {
    let p = rep_min(3, ch('a'));
    assert!(run(&p, "aa").is_failure());
    assert!(run(&p, "aaa").is_success());
}

#[test]
fn rep_n_requires_exact_count() {
    let p = rep_n(2, ch('a'));
    match run(&p, "aaa") {
        Parsed::Success { value, next } => {
            assert_eq!(value.len(), 2);
            assert_eq!(next.offset(), 2);
        }
        Parsed::Failure { .. } => panic!("expected success"),
    }
}

#[test]
fn not_succeeds_only_when_inner_fails() {
    let p = ch('a').negate();
    assert!(run(&p, "b").is_success());
    assert!(run(&p, "a").is_failure());
}

#[test]
fn opt_never_fails() {
    let p = ch('x').opt();
    match run(&p, "y") {
        Parsed::Success { value, next } => {
            assert!(value.is_none());
            assert_eq!(next.offset(), 0);
        }
        Parsed::Failure { .. } => panic!("opt must always succeed"),
    }
}

#[test]
fn commit_prevents_backtracking_on_zero_width_failure() {
    // `look_ahead` resets the reported failure cursor back to the start,
    // making it look like a zero-width failure to an enclosing `or` — the
    // scenario `commit` exists for: once committed, `or` must not retry its
    // alternative even though the failure now appears to consume nothing.
    let committed = literal("foo")
        .right(Parser::<()>::fail("boom"))
        .commit()
        .look_ahead();
    let fallback: Parser<()> = Parser::pure(());
    let combined = committed.or(fallback);
    assert!(combined.run(&SourceCursor::new("foo")).is_failure());
}

#[test]
fn uncommitted_zero_width_failure_still_backtracks() {
    let uncommitted = literal("foo").right(Parser::<()>::fail("boom")).look_ahead();
    let fallback: Parser<()> = Parser::pure(());
    let combined = uncommitted.or(fallback);
    assert!(combined.run(&SourceCursor::new("foo")).is_success());
}
