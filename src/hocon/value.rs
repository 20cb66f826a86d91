//! The resolved configuration tree (spec §3, "resolved `ConfigValue` tree").
//!
//! Unlike [`BuilderValue`](super::builder::BuilderValue), every node here is
//! final: no substitutions, no concatenation, no merging left to do. Fields
//! stay sorted by [`Key`] (spec §3: "resolved object fields are kept
//! sorted").

use super::builder::SimpleValue;
use super::key::Key;
use super::origin::Origin;
use std::fmt::{Display, Formatter};

/// One resolved field: a key segment, its value, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub key: Key,
    pub value: ConfigValue,
    pub origin: Origin,
}

/// `ResolvedObject{fields: Vec<ResolvedField>}`, kept sorted by key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedObject {
    fields: Vec<ResolvedField>,
}

impl ResolvedObject {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from fields, sorting by key as spec §3 requires.
    pub fn new(mut fields: Vec<ResolvedField>) -> Self {
        fields.sort_by(|a, b| a.key.cmp(&b.key));
        Self { fields }
    }

    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    pub fn get(&self, key: &Key) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| &f.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// The final, fully-resolved value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Simple(SimpleValue),
    Array(Vec<ConfigValue>),
    Object(ResolvedObject),
}

impl ConfigValue {
    pub fn null() -> Self {
        ConfigValue::Simple(SimpleValue::Null)
    }

    pub fn string(value: impl Into<String>) -> Self {
        ConfigValue::Simple(SimpleValue::Str(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        ConfigValue::Simple(SimpleValue::Boolean(value))
    }

    pub fn long(value: i64) -> Self {
        ConfigValue::Simple(SimpleValue::Long(value))
    }

    pub fn double(value: f64) -> Self {
        ConfigValue::Simple(SimpleValue::Double(value))
    }

    pub fn object(fields: Vec<ResolvedField>) -> Self {
        ConfigValue::Object(ResolvedObject::new(fields))
    }

    pub fn as_object(&self) -> Option<&ResolvedObject> {
        match self {
            ConfigValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleValue> {
        match self {
            ConfigValue::Simple(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a dotted path, descending through nested objects.
    pub fn select(&self, path: &Key) -> Option<&ConfigValue> {
        if path.is_root() {
            return Some(self);
        }
        let mut current = self;
        for segment in path.segments() {
            let object = current.as_object()?;
            current = &object.get(&Key::single(segment.clone()))?.value;
        }
        Some(current)
    }

    /// Render the textual form used when this value participates in a
    /// string concatenation (spec §4.2).
    pub fn render(&self) -> String {
        match self {
            ConfigValue::Simple(s) => s.render(),
            ConfigValue::Array(items) => {
                format!("[{}]", items.iter().map(|v| v.render()).collect::<Vec<_>>().join(","))
            }
            ConfigValue::Object(o) => {
                format!(
                    "{{{}}}",
                    o.fields()
                        .iter()
                        .map(|f| format!("{}:{}", f.key, f.value.render()))
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
        }
    }
}

impl Display for ConfigValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
