//! The public configuration façade (spec §6): a resolved tree plus typed
//! access through the [`Decoder`] family.

use super::builder::{BuilderValue, SimpleValue};
use super::error::HoconError;
use super::key::Key;
use super::origin::Origin;
use super::resolver;
use super::value::ConfigValue;

/// A fully resolved configuration, with typed lookups layered on top of the
/// raw [`ConfigValue`] tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: ConfigValue,
    /// The provenance of this `Config` as a whole — distinct from the
    /// per-field [`Origin`] tracked in `ConfigValue::Object` (spec §6:
    /// `with_origin`). Defaults to [`Origin::User`].
    root_origin: Origin,
}

impl Config {
    /// Resolve a builder tree (see [`resolver::resolve`]) into a `Config`.
    pub fn resolve(tree: BuilderValue) -> Result<Config, HoconError> {
        Ok(Config { root: resolver::resolve(tree)?, root_origin: Origin::User })
    }

    pub fn from_resolved(root: ConfigValue) -> Config {
        Config { root, root_origin: Origin::User }
    }

    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    /// This `Config`'s own provenance (spec §6: `with_origin`), as opposed
    /// to a single field's — see [`Config::origin`] for that.
    pub fn root_origin(&self) -> Origin {
        self.root_origin
    }

    /// Re-tag this `Config` with a new top-level provenance, without
    /// touching any field (spec §6: `with_origin(origin)`).
    pub fn with_origin(self, origin: Origin) -> Config {
        Config { root_origin: origin, ..self }
    }

    /// Typed lookup (spec §6: `get<T>(key)`), an alias for [`Config::decode`]
    /// under the name the public façade uses.
    pub fn get_typed<D: Decoder>(&self, key: &Key) -> Result<D, HoconError> {
        self.decode(key)
    }

    /// Typed lookup that reports absence as `Ok(None)` instead of an error
    /// (spec §6: `get_opt<T>(key)`).
    pub fn get_opt<D: Decoder>(&self, key: &Key) -> Result<Option<D>, HoconError> {
        match self.get(key) {
            Some(value) => D::decode(value).map(Some),
            None => Ok(None),
        }
    }

    /// Layer `self` over `fallback`: values present in `self` win, absent
    /// keys fall back to `fallback` — object values deep-merge, anything
    /// else is a plain override (spec §6: `with_fallback(other)`).
    pub fn with_fallback(&self, fallback: &Config) -> Config {
        let merged_root = merge_values(&self.root, &fallback.root);
        Config { root: merged_root, root_origin: self.root_origin }
    }

    /// Set (or override) the value at `key`, creating intermediate objects
    /// as needed (spec §6: `with_value<T>(key, value)`).
    pub fn with_value(&self, key: &Key, value: ConfigValue) -> Config {
        let root = set_path(&self.root, key.segments(), value, self.root_origin);
        Config { root, root_origin: self.root_origin }
    }

    /// Provenance of the value at `key`, if present (spec §6).
    pub fn origin(&self, key: &Key) -> Option<&Origin> {
        let object = self.root.as_object()?;
        let mut current = object;
        let mut segments = key.segments().iter().peekable();
        loop {
            let segment = segments.next()?;
            let field = current.get(&Key::single(segment.clone()))?;
            if segments.peek().is_none() {
                return Some(&field.origin);
            }
            current = field.value.as_object()?;
        }
    }

    pub fn get(&self, key: &Key) -> Option<&ConfigValue> {
        self.root.select(key)
    }

    pub fn has_path(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Decode the value at `key` using `D`, failing with [`HoconError::NotFound`]
    /// if the path is absent.
    pub fn decode<D: Decoder>(&self, key: &Key) -> Result<D, HoconError> {
        let value = self.get(key).ok_or_else(|| HoconError::NotFound(key.clone()))?;
        D::decode(value)
    }

    /// Like [`Config::decode`], but a missing path yields `default` instead
    /// of an error.
    pub fn decode_or<D: Decoder>(&self, key: &Key, default: D) -> Result<D, HoconError> {
        match self.get(key) {
            Some(value) => D::decode(value),
            None => Ok(default),
        }
    }

    /// Re-home this config's root under `new_root`, for the rare case where
    /// a fragment resolved standalone needs to be attached to a different
    /// parent afterwards (spec §6).
    pub fn with_root(self, new_root: ConfigValue) -> Config {
        Config { root: new_root, ..self }
    }
}

/// Field-wise fallback merge used by [`Config::with_fallback`]: objects
/// deep-merge field by field (`primary` wins on a shared key), anything
/// else is a plain override.
fn merge_values(primary: &ConfigValue, fallback: &ConfigValue) -> ConfigValue {
    match (primary.as_object(), fallback.as_object()) {
        (Some(a), Some(b)) => {
            let mut fields: Vec<super::value::ResolvedField> = b.fields().to_vec();
            for field in a.fields() {
                match fields.iter().position(|f| f.key == field.key) {
                    Some(index) => {
                        fields[index] = super::value::ResolvedField {
                            key: field.key.clone(),
                            value: merge_values(&field.value, &fields[index].value),
                            origin: field.origin,
                        };
                    }
                    None => fields.push(field.clone()),
                }
            }
            ConfigValue::object(fields)
        }
        _ => primary.clone(),
    }
}

/// Set `value` at the nested path `segments`, creating intermediate objects
/// as needed and overwriting any existing field sharing the leading
/// segment, used by [`Config::with_value`].
fn set_path(root: &ConfigValue, segments: &[String], value: ConfigValue, origin: Origin) -> ConfigValue {
    let Some((first, rest)) = segments.split_first() else {
        return value;
    };
    let mut fields = root.as_object().map(|o| o.fields().to_vec()).unwrap_or_default();
    let key = Key::single(first.clone());
    let nested = if rest.is_empty() {
        value
    } else {
        let existing = fields.iter().find(|f| f.key == key).map(|f| f.value.clone()).unwrap_or_else(ConfigValue::null);
        set_path(&existing, rest, value, origin)
    };
    fields.retain(|f| f.key != key);
    fields.push(super::value::ResolvedField { key, value: nested, origin });
    ConfigValue::object(fields)
}

fn type_name(value: &ConfigValue) -> &'static str {
    match value {
        ConfigValue::Simple(SimpleValue::Null) => "null",
        ConfigValue::Simple(SimpleValue::Boolean(_)) => "boolean",
        ConfigValue::Simple(SimpleValue::Long(_)) => "long",
        ConfigValue::Simple(SimpleValue::Double(_)) => "double",
        ConfigValue::Simple(SimpleValue::Str(_)) => "string",
        ConfigValue::Array(_) => "array",
        ConfigValue::Object(_) => "object",
    }
}

fn wrong_type(value: &ConfigValue, expected: &'static str) -> HoconError {
    HoconError::WrongType { key: Key::root(), expected, found: type_name(value) }
}

/// Decodes a [`ConfigValue`] into a concrete Rust type. Implement this for
/// application-specific settings structs the way `serde::Deserialize` is
/// implemented for JSON — by composing the primitive impls below.
pub trait Decoder: Sized {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError>;
}

impl Decoder for String {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError> {
        match value {
            ConfigValue::Simple(SimpleValue::Str(s)) => Ok(s.clone()),
            other => Ok(other.render()),
        }
    }
}

impl Decoder for bool {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError> {
        match value {
            ConfigValue::Simple(SimpleValue::Boolean(b)) => Ok(*b),
            other => Err(wrong_type(other, "boolean")),
        }
    }
}

impl Decoder for i64 {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError> {
        match value {
            ConfigValue::Simple(SimpleValue::Long(n)) => Ok(*n),
            other => Err(wrong_type(other, "long")),
        }
    }
}

impl Decoder for f64 {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError> {
        match value {
            ConfigValue::Simple(SimpleValue::Long(n)) => Ok(*n as f64),
            ConfigValue::Simple(SimpleValue::Double(d)) => Ok(*d),
            other => Err(wrong_type(other, "double")),
        }
    }
}

impl<T: Decoder> Decoder for Vec<T> {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError> {
        match value {
            ConfigValue::Array(items) => items.iter().map(T::decode).collect(),
            other => Err(wrong_type(other, "array")),
        }
    }
}

impl<T: Decoder> Decoder for Option<T> {
    fn decode(value: &ConfigValue) -> Result<Self, HoconError> {
        match value {
            ConfigValue::Simple(SimpleValue::Null) => Ok(None),
            other => T::decode(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hocon::builder::Field;

    fn simple_tree() -> BuilderValue {
        BuilderValue::object(vec![
            Field::new(Key::single("title"), BuilderValue::string("hi", Origin::User)),
            Field::new(Key::single("count"), BuilderValue::Resolved(SimpleValue::Long(3), Origin::User)),
            Field::new(
                Key::single("tags"),
                BuilderValue::Array(vec![
                    BuilderValue::string("a", Origin::User),
                    BuilderValue::string("b", Origin::User),
                ]),
            ),
        ])
    }

    #[test]
    fn decode_primitives_and_collections() {
        let config = Config::resolve(simple_tree()).unwrap();
        assert_eq!(config.decode::<String>(&Key::parse("title")).unwrap(), "hi");
        assert_eq!(config.decode::<i64>(&Key::parse("count")).unwrap(), 3);
        assert_eq!(config.decode::<Vec<String>>(&Key::parse("tags")).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn decode_or_falls_back_when_absent() {
        let config = Config::resolve(simple_tree()).unwrap();
        assert_eq!(config.decode_or::<i64>(&Key::parse("missing"), 42).unwrap(), 42);
    }

    #[test]
    fn origin_is_tracked_per_field() {
        let config = Config::resolve(simple_tree()).unwrap();
        assert_eq!(config.origin(&Key::parse("title")), Some(&Origin::User));
    }

    #[test]
    fn wrong_type_is_reported() {
        let config = Config::resolve(simple_tree()).unwrap();
        assert!(matches!(config.decode::<bool>(&Key::parse("title")), Err(HoconError::WrongType { .. })));
    }

    #[test]
    fn get_opt_reports_none_for_absent_path() {
        let config = Config::resolve(simple_tree()).unwrap();
        assert_eq!(config.get_opt::<i64>(&Key::parse("missing")).unwrap(), None);
        assert_eq!(config.get_opt::<i64>(&Key::parse("count")).unwrap(), Some(3));
    }

    #[test]
    fn with_fallback_prefers_primary_and_deep_merges_objects() {
        let primary = Config::resolve(simple_tree()).unwrap();
        let fallback = Config::resolve(BuilderValue::object(vec![
            Field::new(Key::single("title"), BuilderValue::string("fallback", Origin::Theme)),
            Field::new(Key::single("subtitle"), BuilderValue::string("kept", Origin::Theme)),
        ]))
        .unwrap();

        let merged = primary.with_fallback(&fallback);
        assert_eq!(merged.decode::<String>(&Key::parse("title")).unwrap(), "hi");
        assert_eq!(merged.decode::<String>(&Key::parse("subtitle")).unwrap(), "kept");
    }

    #[test]
    fn with_value_sets_a_nested_path() {
        let config = Config::resolve(simple_tree()).unwrap();
        let updated = config.with_value(&Key::parse("nested.flag"), ConfigValue::boolean(true));
        assert_eq!(updated.decode::<bool>(&Key::parse("nested.flag")).unwrap(), true);
        assert_eq!(updated.decode::<String>(&Key::parse("title")).unwrap(), "hi");
    }

    #[test]
    fn with_origin_retags_the_whole_config_without_touching_fields() {
        let config = Config::resolve(simple_tree()).unwrap();
        let retagged = config.with_origin(Origin::Theme);
        assert_eq!(retagged.root_origin(), Origin::Theme);
        assert_eq!(retagged.origin(&Key::parse("title")), Some(&Origin::User));
    }
}
