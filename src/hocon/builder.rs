//! The interim, unresolved HOCON tree (spec §3, "HOCON builder tree").
//!
//! A [`BuilderValue`] is what the HOCON syntax parser (an external
//! collaborator, spec §1 non-goals) produces; the [resolver](super::resolver)
//! turns it into a [`ConfigValue`](super::value::ConfigValue) tree.

use super::key::Key;
use super::origin::Origin;
use std::fmt::{Display, Formatter};

/// An already-resolved scalar value — the payload of `ResolvedBuilder` and
/// the scalar half of `ConfigValue`.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    Str(String),
}

impl SimpleValue {
    /// Render to the textual form used by string concatenation (spec §4.2,
    /// "simple values are rendered to their textual form").
    pub fn render(&self) -> String {
        match self {
            SimpleValue::Null => "null".to_string(),
            SimpleValue::Boolean(b) => b.to_string(),
            SimpleValue::Long(n) => n.to_string(),
            SimpleValue::Double(d) => d.to_string(),
            SimpleValue::Str(s) => s.clone(),
        }
    }
}

/// The four include resource kinds named in spec §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeResource {
    Url(String),
    File(String),
    Classpath(String),
    /// `include "resource"` with no explicit kind — the loader decides
    /// which concrete kind to attempt, and in what order (spec §6).
    Any(String),
}

impl IncludeResource {
    pub fn resource_id(&self) -> &str {
        match self {
            IncludeResource::Url(s)
            | IncludeResource::File(s)
            | IncludeResource::Classpath(s)
            | IncludeResource::Any(s) => s,
        }
    }
}

/// A key segment that failed to parse, carried alongside the field's value
/// so structural errors can be collected in one pass (spec §4.2 stage 2).
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidString {
    pub value: String,
    pub failure: String,
}

/// `Field{key: Either<InvalidString, Key>, value: BuilderValue}` (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKey {
    Valid(Key),
    Invalid(InvalidString),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: FieldKey,
    pub value: BuilderValue,
}

impl Field {
    pub fn new(key: Key, value: BuilderValue) -> Self {
        Self { key: FieldKey::Valid(key), value }
    }

    pub fn invalid(value: impl Into<String>, failure: impl Into<String>, builder_value: BuilderValue) -> Self {
        Self {
            key: FieldKey::Invalid(InvalidString { value: value.into(), failure: failure.into() }),
            value: builder_value,
        }
    }
}

/// `{ whitespace: String, value: BuilderValue }` — one part of a
/// `ConcatValue`'s `rest`, preserving the inter-part whitespace HOCON's
/// concatenation syntax is whitespace-sensitive about.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatPart {
    pub whitespace: String,
    pub value: BuilderValue,
}

/// The sum of interim node kinds described in spec §3.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderValue {
    Object(ObjectBuilder),
    Array(Vec<BuilderValue>),
    /// An already-resolved scalar, e.g. literal `7` or `"text"` in the
    /// source, carrying its provenance.
    Resolved(SimpleValue, Origin),
    /// String/array/object concatenation, preserving inter-part whitespace.
    Concat { first: Box<BuilderValue>, rest: Vec<ConcatPart> },
    /// "Last wins" with object-deep-merge, produced by stage-4 merging.
    Merged(Vec<BuilderValue>),
    Substitution { path: Key, optional: bool },
    /// A reference to an earlier definition under the *same* key, produced
    /// while folding repeated fields (e.g. `a = 1; a = ${a} + 2`).
    SelfReference,
    Include { resource: IncludeResource, required: bool },
    /// An error carrier: propagates a single failure to the final report
    /// instead of aborting the whole tree walk (spec §4.2 stage 2).
    Invalid { attempted: Box<BuilderValue>, failure: String },
}

impl BuilderValue {
    pub fn object(fields: Vec<Field>) -> Self {
        BuilderValue::Object(ObjectBuilder { fields })
    }

    pub fn string(value: impl Into<String>, origin: Origin) -> Self {
        BuilderValue::Resolved(SimpleValue::Str(value.into()), origin)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, BuilderValue::Invalid { .. })
    }
}

/// `ObjectBuilder{fields: Vec<Field>}` (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectBuilder {
    pub fields: Vec<Field>,
}

impl ObjectBuilder {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Display for BuilderValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderValue::Object(o) => write!(f, "object({} fields)", o.fields.len()),
            BuilderValue::Array(a) => write!(f, "array({} values)", a.len()),
            BuilderValue::Resolved(v, _) => write!(f, "{}", v.render()),
            BuilderValue::Concat { .. } => write!(f, "concat"),
            BuilderValue::Merged(values) => write!(f, "merged({} values)", values.len()),
            BuilderValue::Substitution { path, optional } => {
                if *optional {
                    write!(f, "${{?{path}}}")
                } else {
                    write!(f, "${{{path}}}")
                }
            }
            BuilderValue::SelfReference => write!(f, "<self-reference>"),
            BuilderValue::Include { resource, required } => {
                write!(f, "include({}required={})", resource.resource_id(), required)
            }
            BuilderValue::Invalid { failure, .. } => write!(f, "<invalid: {failure}>"),
        }
    }
}
