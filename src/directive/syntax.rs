//! Directive wire syntax (spec §6): new-style `@:name { attrs } body @:@`
//! and legacy `:name attrs : body`, parsed into a [`DirectiveInput`] using
//! the combinator core.

use super::parts::{check_duplicate_attributes, DirectiveInput};
use crate::parser::text::{any_in, any_of, any_while, ch, delimited_by, literal};
use crate::parser::{rep, Parser};
use std::collections::BTreeMap;

const IDENTIFIER_CHARS: &[(char, char)] = &[('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_'), ('-', '-')];

fn identifier() -> Parser<String> {
    any_in(IDENTIFIER_CHARS).some()
}

fn whitespace() -> Parser<String> {
    any_of(" \t").any()
}

fn quoted_string() -> Parser<String> {
    ch('"').right(delimited_by(&["\""]).parser()).left(ch('"'))
}

fn attribute_value() -> Parser<String> {
    quoted_string().or(any_while(|c| !c.is_whitespace() && c != ',' && c != '}').some())
}

/// `{ key = value, key2 = "value two" }`, as the raw pairs in source order —
/// duplicates kept, so `attributes_map` can see them before deduplicating.
fn new_syntax_attribute_pairs() -> Parser<Vec<(String, String)>> {
    let pair = identifier()
        .left(whitespace())
        .left(ch('='))
        .left(whitespace())
        .seq(attribute_value());
    let separator = whitespace().right(ch(',')).right(whitespace());
    let pairs = pair.clone().seq(rep(separator.right(pair))).map(|(first, rest)| {
        let mut all = vec![first];
        all.extend(rest);
        all
    });
    ch('{')
        .right(whitespace())
        .right(pairs.opt().map(Option::unwrap_or_default))
        .left(whitespace())
        .left(ch('}'))
}

/// `attr="value" attr2="value"` (no braces, legacy form), raw pairs in
/// source order.
fn legacy_attribute_pairs() -> Parser<Vec<(String, String)>> {
    let pair = whitespace().right(identifier()).left(ch('=')).seq(quoted_string());
    rep(pair)
}

/// Turn raw, possibly-duplicate attribute pairs into the final map, failing
/// the parse if the same key was supplied twice (spec §8: "a directive with
/// duplicate attribute keys is rejected").
fn attributes_map(pairs: Vec<(String, String)>) -> Parser<BTreeMap<String, String>> {
    let keys: Vec<String> = pairs.iter().map(|(k, _)| k.clone()).collect();
    match check_duplicate_attributes(&keys) {
        Ok(()) => Parser::pure(pairs.into_iter().collect()),
        Err(error) => Parser::fail(error.to_string()),
    }
}

/// An optional `{ ... }` attribute section. Probed with a zero-width
/// lookahead first, since a plain `.opt()` around "skip whitespace, then
/// parse attributes" would see the whitespace it already consumed and
/// refuse to backtrack when there is no attribute section at all.
fn optional_attribute_pairs() -> Parser<Option<Vec<(String, String)>>> {
    let probe = whitespace().right(ch('{')).look_ahead();
    probe.opt().flat_map(|found| match found {
        Some(_) => whitespace().right(new_syntax_attribute_pairs()).map(Some),
        None => Parser::pure(None),
    })
}

/// Parse the new-style invocation `@:name { attrs } body fence`, where
/// `fence` is the configurable closing marker (spec §6: "the fence `@:@`
/// may be customized per-invocation").
pub fn new_syntax(fence: &str) -> Parser<DirectiveInput> {
    let fence = fence.to_string();
    let header = literal("@:").right(identifier()).seq(optional_attribute_pairs());
    header.flat_map(move |(name, raw_fields)| {
        let fence = fence.clone();
        let validated = match raw_fields {
            Some(pairs) => attributes_map(pairs),
            None => Parser::pure(BTreeMap::new()),
        };
        validated.flat_map(move |fields| {
            let name = name.clone();
            let fence = fence.clone();
            whitespace().right(delimited_by(&[&fence]).keep_delimiter(true).parser()).map(move |body| {
                let trimmed = body.strip_suffix(fence.as_str()).unwrap_or(&body).to_string();
                DirectiveInput {
                    name: name.clone(),
                    positional: Vec::new(),
                    fields: fields.clone(),
                    body: Some(trimmed),
                }
            })
        })
    })
}

/// Parse the legacy invocation `:name attr="value" : body`.
pub fn legacy_syntax() -> Parser<DirectiveInput> {
    let header = ch(':').right(identifier()).seq(legacy_attribute_pairs());
    header.flat_map(|(name, raw_fields)| {
        attributes_map(raw_fields).flat_map(move |fields| {
            let name = name.clone();
            ch(':').right(delimited_by(&["\n"]).parser().opt()).map(move |body| DirectiveInput {
                name: name.clone(),
                positional: Vec::new(),
                fields: fields.clone(),
                body,
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parsed;
    use crate::source::SourceCursor;

    #[test]
    fn new_syntax_parses_name_attributes_and_body() {
        let at = SourceCursor::new(r#"@:image { width = "80", alt = wide } a picture @:@"#);
        match new_syntax("@:@").run(&at) {
            Parsed::Success { value, next } => {
                assert!(next.at_end());
                assert_eq!(value.name, "image");
                assert_eq!(value.fields.get("width").map(String::as_str), Some("80"));
                assert_eq!(value.fields.get("alt").map(String::as_str), Some("wide"));
                assert_eq!(value.body.as_deref(), Some("a picture "));
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn new_syntax_allows_no_attributes() {
        let at = SourceCursor::new("@:note hello @:@");
        match new_syntax("@:@").run(&at) {
            Parsed::Success { value, .. } => {
                assert_eq!(value.name, "note");
                assert!(value.fields.is_empty());
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn legacy_syntax_parses_name_and_attributes() {
        let at = SourceCursor::new(r#":figure class="wide":"#);
        match legacy_syntax().run(&at) {
            Parsed::Success { value, .. } => {
                assert_eq!(value.name, "figure");
                assert_eq!(value.fields.get("class").map(String::as_str), Some("wide"));
            }
            Parsed::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn new_syntax_rejects_duplicate_attribute_keys() {
        let at = SourceCursor::new(r#"@:image { width = "80", width = "90" } a picture @:@"#);
        match new_syntax("@:@").run(&at) {
            Parsed::Failure { .. } => {}
            Parsed::Success { .. } => panic!("expected failure on duplicate attribute key"),
        }
    }

    #[test]
    fn legacy_syntax_rejects_duplicate_attribute_keys() {
        let at = SourceCursor::new(r#":figure class="wide" class="narrow":"#);
        match legacy_syntax().run(&at) {
            Parsed::Failure { .. } => {}
            Parsed::Success { .. } => panic!("expected failure on duplicate attribute key"),
        }
    }
}
