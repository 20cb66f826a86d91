//! The directive DSL (spec §4.4): typed parts assembled into a validated
//! directive parser, in the same "combine, then map" style as
//! [`crate::parser`].

pub mod parts;
pub mod syntax;

use crate::error::DirectiveError;
use parts::{DirectiveInput, Part, Remaining};
use std::rc::Rc;

/// A directive assembled from typed parts, producing a `T` (usually an AST
/// element) from a [`DirectiveInput`].
#[derive(Clone)]
pub struct Directive<T> {
    run: Rc<dyn Fn(&DirectiveInput) -> Result<T, DirectiveError>>,
}

impl<T: 'static> Directive<T> {
    pub fn run(&self, input: &DirectiveInput) -> Result<T, DirectiveError> {
        (self.run)(input)
    }

    /// Run this directive, turning any failure into an `InvalidElement`
    /// payload via `on_error` instead of propagating it — the "never fail
    /// catastrophically" contract from spec §4.4.
    pub fn run_or_invalid(&self, input: &DirectiveInput, on_error: impl Fn(DirectiveError) -> T) -> T {
        match self.run(input) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("directive '{}' failed validation: {error}", input.name);
                on_error(error)
            }
        }
    }
}

/// Build a directive from a single part.
pub fn directive1<A: Clone + 'static, T: 'static>(a: Part<A>, build: impl Fn(A) -> T + 'static) -> Directive<T> {
    Directive {
        run: Rc::new(move |input| {
            let mut remaining = Remaining::new(input);
            let a = a.run(input, &mut remaining)?.ok_or_else(|| {
                DirectiveError::MissingRequiredPart(a.label().to_string())
            })?;
            Ok(build(a))
        }),
    }
}

/// Build a directive from two parts, run in order so later parts see
/// attributes already claimed by earlier ones (spec §4.4: "Parts compose
/// with a combinator that collects results into a tuple").
pub fn directive2<A: Clone + 'static, B: Clone + 'static, T: 'static>(
    a: Part<A>,
    b: Part<B>,
    build: impl Fn(A, B) -> T + 'static,
) -> Directive<T> {
    Directive {
        run: Rc::new(move |input| {
            let mut remaining = Remaining::new(input);
            let a_label = a.label().to_string();
            let a = a.run(input, &mut remaining)?.ok_or(DirectiveError::MissingRequiredPart(a_label))?;
            let b_label = b.label().to_string();
            let b = b.run(input, &mut remaining)?.ok_or(DirectiveError::MissingRequiredPart(b_label))?;
            Ok(build(a, b))
        }),
    }
}

/// Build a directive from three parts.
pub fn directive3<A: Clone + 'static, B: Clone + 'static, C: Clone + 'static, T: 'static>(
    a: Part<A>,
    b: Part<B>,
    c: Part<C>,
    build: impl Fn(A, B, C) -> T + 'static,
) -> Directive<T> {
    Directive {
        run: Rc::new(move |input| {
            let mut remaining = Remaining::new(input);
            let a_label = a.label().to_string();
            let a = a.run(input, &mut remaining)?.ok_or(DirectiveError::MissingRequiredPart(a_label))?;
            let b_label = b.label().to_string();
            let b = b.run(input, &mut remaining)?.ok_or(DirectiveError::MissingRequiredPart(b_label))?;
            let c_label = c.label().to_string();
            let c = c.run(input, &mut remaining)?.ok_or(DirectiveError::MissingRequiredPart(c_label))?;
            Ok(build(a, b, c))
        }),
    }
}

/// Build a directive from an optional part alone — the common shape for
/// directives whose only required thing is their body.
pub fn directive_opt<A: Clone + 'static, T: 'static>(
    a: Part<A>,
    build: impl Fn(Option<A>) -> T + 'static,
) -> Directive<T> {
    Directive {
        run: Rc::new(move |input| {
            let mut remaining = Remaining::new(input);
            let a = a.run(input, &mut remaining)?;
            Ok(build(a))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parts::{argument, check_duplicate_attributes, field, opt_field};

    fn input(name: &str, positional: &[&str], fields: &[(&str, &str)]) -> DirectiveInput {
        DirectiveInput {
            name: name.to_string(),
            positional: positional.iter().map(|s| s.to_string()).collect(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: None,
        }
    }

    #[test]
    fn missing_required_argument_is_reported() {
        let directive = directive1(argument::<String>("title", |s| Ok(s.to_string())), |title| title);
        let result = directive.run(&input("image", &[], &[]));
        assert_eq!(result, Err(DirectiveError::MissingRequiredPart("title".to_string())));
    }

    #[test]
    fn two_positional_arguments_claim_distinct_slots() {
        let directive = directive2(
            argument::<String>("src", |s| Ok(s.to_string())),
            argument::<String>("alt", |s| Ok(s.to_string())),
            |src, alt| (src, alt),
        );
        let result = directive.run(&input("image", &["cat.png", "a cat"], &[])).unwrap();
        assert_eq!(result, ("cat.png".to_string(), "a cat".to_string()));
    }

    #[test]
    fn converter_failure_becomes_converter_failed() {
        let directive = directive1(field::<i64>("width", |s| s.parse().map_err(|_| "not a number".to_string())), |w| w);
        let result = directive.run(&input("image", &[], &[("width", "wide")]));
        assert_eq!(
            result,
            Err(DirectiveError::ConverterFailed { part: "width".to_string(), message: "not a number".to_string() })
        );
    }

    #[test]
    fn optional_field_defaults_to_none_when_absent() {
        let directive = directive1(opt_field::<String>("alt", |s| Ok(s.to_string())), |alt| alt);
        let result = directive.run(&input("image", &[], &[])).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn duplicate_attribute_keys_are_rejected() {
        let keys = vec!["width".to_string(), "height".to_string(), "width".to_string()];
        assert_eq!(check_duplicate_attributes(&keys), Err(DirectiveError::DuplicateAttribute("width".to_string())));
    }

    #[test]
    fn run_or_invalid_never_propagates_an_error() {
        let directive = directive1(argument::<String>("title", |s| Ok(s.to_string())), |title| title);
        let value = directive.run_or_invalid(&input("image", &[], &[]), |e| format!("invalid: {e}"));
        assert_eq!(value, "invalid: missing required part 'title'");
    }
}
