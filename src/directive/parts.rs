//! Typed directive parts (spec §4.4: "a directive parser is constructed
//! declaratively from typed *parts*").

use crate::error::DirectiveError;
use std::collections::BTreeMap;
use std::rc::Rc;

/// The raw attributes and body text a directive invocation was written
/// with, before any part has validated or converted them.
#[derive(Debug, Clone, Default)]
pub struct DirectiveInput {
    pub name: String,
    pub positional: Vec<String>,
    pub fields: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// What is still unclaimed as parts run in declaration order: named
/// attributes not yet consumed, and how many leading positional arguments
/// have already been claimed by an earlier `argument`/`opt_argument` part.
#[derive(Debug, Clone, Default)]
pub struct Remaining {
    pub fields: BTreeMap<String, String>,
    positional_used: usize,
}

impl Remaining {
    pub fn new(input: &DirectiveInput) -> Self {
        Self { fields: input.fields.clone(), positional_used: 0 }
    }

    fn next_positional(&mut self, input: &DirectiveInput) -> Option<String> {
        let value = input.positional.get(self.positional_used).cloned();
        if value.is_some() {
            self.positional_used += 1;
        }
        value
    }
}

/// One typed component of a directive's declared shape. `extract` pulls
/// this part's raw value(s) out of a [`DirectiveInput`], converts it, and
/// marks what it consumed so duplicate-detection and "unused attribute"
/// checks can run afterward.
pub struct Part<T> {
    label: String,
    required: bool,
    extract: Rc<dyn Fn(&DirectiveInput, &mut Remaining) -> Result<Option<T>, DirectiveError>>,
}

impl<T: Clone + 'static> Part<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Run this part against an invocation, removing any fields or
    /// positional slots it consumes from `remaining` (used to flag
    /// leftover/unknown attributes, and to let a second `argument` part
    /// see the next unclaimed positional slot instead of the first).
    pub fn run(&self, input: &DirectiveInput, remaining: &mut Remaining) -> Result<Option<T>, DirectiveError> {
        let value = (self.extract)(input, remaining)?;
        if self.required && value.is_none() {
            return Err(DirectiveError::MissingRequiredPart(self.label.clone()));
        }
        Ok(value)
    }
}

/// A required positional argument, converted by `convert`. Positional
/// arguments are claimed left-to-right in declaration order: the first
/// `argument`/`opt_argument` part in a directive sees `positional[0]`, the
/// next sees `positional[1]`, and so on.
pub fn argument<T: Clone + 'static>(
    label: impl Into<String>,
    convert: impl Fn(&str) -> Result<T, String> + 'static,
) -> Part<T> {
    let label = label.into();
    let convert = Rc::new(convert);
    let label_for_extract = label.clone();
    Part {
        label,
        required: true,
        extract: Rc::new(move |input, remaining| match remaining.next_positional(input) {
            Some(raw) => convert(&raw)
                .map(Some)
                .map_err(|message| DirectiveError::ConverterFailed { part: label_for_extract.clone(), message }),
            None => Ok(None),
        }),
    }
}

/// An optional positional argument.
pub fn opt_argument<T: Clone + 'static>(
    label: impl Into<String>,
    convert: impl Fn(&str) -> Result<T, String> + 'static,
) -> Part<T> {
    let mut part = argument(label, convert);
    part.required = false;
    part
}

/// A required named attribute, e.g. `{ width = 80 }`.
pub fn field<T: Clone + 'static>(
    name: impl Into<String>,
    convert: impl Fn(&str) -> Result<T, String> + 'static,
) -> Part<T> {
    let name = name.into();
    let convert = Rc::new(convert);
    let name_for_extract = name.clone();
    Part {
        label: name.clone(),
        required: true,
        extract: Rc::new(move |_input, remaining| match remaining.fields.remove(&name) {
            Some(raw) => convert(&raw)
                .map(Some)
                .map_err(|message| DirectiveError::ConverterFailed { part: name_for_extract.clone(), message }),
            None => Ok(None),
        }),
    }
}

/// An optional named attribute.
pub fn opt_field<T: Clone + 'static>(
    name: impl Into<String>,
    convert: impl Fn(&str) -> Result<T, String> + 'static,
) -> Part<T> {
    let mut part = field(name, convert);
    part.required = false;
    part
}

/// The directive's body, converted as a whole by `convert` (e.g. parsed as
/// nested block content).
pub fn content<T: Clone + 'static>(convert: impl Fn(&str) -> Result<T, String> + 'static) -> Part<T> {
    let convert = Rc::new(convert);
    Part {
        label: "content".to_string(),
        required: true,
        extract: Rc::new(move |input, _remaining| match &input.body {
            Some(body) => convert(body)
                .map(Some)
                .map_err(|message| DirectiveError::ConverterFailed { part: "content".to_string(), message }),
            None => Ok(None),
        }),
    }
}

/// Body content parsed as block elements, via `parse`.
pub fn block_content<T: Clone + 'static>(parse: impl Fn(&str) -> Result<T, String> + 'static) -> Part<T> {
    content(parse)
}

/// Body content parsed as span elements, via `parse`.
pub fn span_content<T: Clone + 'static>(parse: impl Fn(&str) -> Result<T, String> + 'static) -> Part<T> {
    content(parse)
}

/// Detect attribute keys that were supplied more than once by the raw
/// invocation syntax (spec §8: "A directive with duplicate attribute keys
/// is rejected"). Takes the raw, not-yet-deduplicated key list the syntax
/// parser produced.
pub fn check_duplicate_attributes(raw_keys: &[String]) -> Result<(), DirectiveError> {
    let mut seen = std::collections::BTreeSet::new();
    for key in raw_keys {
        if !seen.insert(key.clone()) {
            return Err(DirectiveError::DuplicateAttribute(key.clone()));
        }
    }
    Ok(())
}
