//! Deferred field references (spec §4.3): a [`FieldRef`] tree remembers a
//! path into a *not-yet-chosen* parent [`Config`](super::config::Config)
//! instead of holding a resolved value directly, so the same fragment
//! (e.g. a theme's default settings) can be re-homed under different
//! parents without re-parsing it.

use super::key::Key;
use super::value::ConfigValue;
use crate::error::ResolverFailed;
use std::cell::RefCell;
use std::collections::HashSet;

/// A node in the deferred-resolution tree. Unlike [`ConfigValue`], a
/// `FieldRef` tree can still contain substitutions that have not yet been
/// matched against a parent configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    /// Already resolved — a cached leaf value, or the result of a prior
    /// `resolve` call.
    ResolvedRef(ConfigValue),
    /// A substitution whose target is only known once this tree is
    /// attached to a parent [`Config`](super::config::Config).
    UnresolvedRef(Key),
    /// An object whose fields are themselves deferred, kept as a tree
    /// rather than collapsed into a [`ConfigValue`] so a deep merge can stay
    /// lazy (spec §4.3: "deep merges are lazy unless both sides are fully
    /// resolved `ObjectRef`s").
    ObjectRef(Vec<(String, FieldRef)>),
    /// An optional substitution whose target did not exist. Distinct from
    /// `ResolvedRef(ConfigValue::null())`: object views elide this field
    /// entirely instead of emitting `null`.
    MissingOptionalRef,
}

impl FieldRef {
    pub fn resolved(value: ConfigValue) -> Self {
        FieldRef::ResolvedRef(value)
    }

    pub fn path(path: impl Into<Key>) -> Self {
        FieldRef::UnresolvedRef(path.into())
    }

    pub fn object(fields: Vec<(String, FieldRef)>) -> Self {
        FieldRef::ObjectRef(fields)
    }

    /// Deep-merge `self` under `base`: later fields win, missing ones
    /// inherit. Two `ObjectRef`s merge field-by-field, regardless of
    /// whether their own fields are still deferred; each field's resolution
    /// stays lazy until `resolve` is actually called on it.
    pub fn merge(self, base: FieldRef) -> FieldRef {
        match (self, base) {
            (FieldRef::ObjectRef(overlay), FieldRef::ObjectRef(under)) => {
                let mut fields = under;
                for (key, value) in overlay {
                    fields.retain(|(k, _)| k != &key);
                    fields.push((key, value));
                }
                FieldRef::ObjectRef(fields)
            }
            (overlay, _base) => overlay,
        }
    }

    /// Select `key` out of this tree, returning `None` only when the key
    /// does not exist at all. An existing but missing-optional field
    /// resolves to `Some(FieldRef::MissingOptionalRef)`, which object views
    /// then elide (spec §4.3).
    pub fn select(&self, key: &Key, ctx: &ResolverContext) -> Option<FieldRef> {
        match self {
            FieldRef::ObjectRef(fields) => {
                let mut segments = key.segments().iter();
                let first = segments.next()?;
                let (_, child) = fields.iter().find(|(k, _)| k == first)?;
                let rest: Vec<_> = segments.cloned().collect();
                if rest.is_empty() {
                    Some(child.clone())
                } else {
                    child.select(&Key::from_segments(rest), ctx)
                }
            }
            FieldRef::ResolvedRef(value) => value.select(key).cloned().map(FieldRef::ResolvedRef),
            FieldRef::UnresolvedRef(_) => ctx.resolve(self).ok().and_then(|resolved| {
                FieldRef::ResolvedRef(resolved).select(key, ctx)
            }),
            FieldRef::MissingOptionalRef => None,
        }
    }

    /// Collapse this tree into a plain [`ConfigValue`], resolving any
    /// remaining substitutions against `ctx`. Object views drop any field
    /// that resolves to `MissingOptionalRef`.
    pub fn resolve(&self, ctx: &ResolverContext) -> Result<ConfigValue, ResolverFailed> {
        match self {
            FieldRef::ResolvedRef(value) => Ok(value.clone()),
            FieldRef::MissingOptionalRef => Ok(ConfigValue::null()),
            FieldRef::UnresolvedRef(path) => ctx.resolve_path(path),
            FieldRef::ObjectRef(fields) => {
                let mut resolved = Vec::with_capacity(fields.len());
                for (key, value) in fields {
                    if matches!(value, FieldRef::MissingOptionalRef) {
                        continue;
                    }
                    let value = value.resolve(ctx)?;
                    resolved.push(super::value::ResolvedField {
                        key: Key::single(key.clone()),
                        value,
                        origin: super::origin::Origin::User,
                    });
                }
                Ok(ConfigValue::object(resolved))
            }
        }
    }
}

/// Carries the root a batch of [`FieldRef`]s should resolve against, plus
/// the set of paths currently mid-resolution so a substitution that
/// (directly or transitively) depends on itself is reported instead of
/// looping forever (spec §4.3: "cycles are detected via the `lookups` field
/// of the `ResolverContext`").
pub struct ResolverContext<'a> {
    root: &'a ConfigValue,
    lookups: RefCell<HashSet<Key>>,
}

impl<'a> ResolverContext<'a> {
    pub fn new(root: &'a ConfigValue) -> Self {
        Self { root, lookups: RefCell::new(HashSet::new()) }
    }

    /// Resolve a single reference, following `UnresolvedRef` against `root`.
    pub fn resolve(&self, reference: &FieldRef) -> Result<ConfigValue, ResolverFailed> {
        reference.resolve(self)
    }

    fn resolve_path(&self, path: &Key) -> Result<ConfigValue, ResolverFailed> {
        if !self.lookups.borrow_mut().insert(path.clone()) {
            return Err(ResolverFailed(format!("cycle detected resolving deferred reference '{path}'")));
        }
        let resolved = self.root.select(path).cloned();
        self.lookups.borrow_mut().remove(path);
        Ok(resolved.unwrap_or_else(ConfigValue::null))
    }

    /// Select a reference, failing loudly if it selects nothing (and never
    /// materializing `MissingOptionalRef` as a present-but-null value).
    pub fn require(&self, reference: &FieldRef) -> Option<ConfigValue> {
        match reference {
            FieldRef::ResolvedRef(value) => Some(value.clone()),
            FieldRef::MissingOptionalRef => None,
            FieldRef::UnresolvedRef(path) => self.root.select(path).cloned(),
            FieldRef::ObjectRef(_) => reference.resolve(self).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hocon::origin::Origin;
    use crate::hocon::value::{ResolvedField, ResolvedObject};

    fn sample_root() -> ConfigValue {
        ConfigValue::Object(ResolvedObject::new(vec![ResolvedField {
            key: Key::single("title"),
            value: ConfigValue::string("hello"),
            origin: Origin::User,
        }]))
    }

    #[test]
    fn path_reference_resolves_against_attached_root() {
        let root = sample_root();
        let ctx = ResolverContext::new(&root);
        let reference = FieldRef::path(Key::parse("title"));
        assert_eq!(reference.resolve(&ctx), Ok(ConfigValue::string("hello")));
    }

    #[test]
    fn missing_path_resolves_to_null_but_require_reports_none() {
        let root = sample_root();
        let reference = FieldRef::path(Key::parse("missing"));

        let ctx = ResolverContext::new(&root);
        assert_eq!(reference.resolve(&ctx), Ok(ConfigValue::null()));
        assert_eq!(ctx.require(&reference), None);
    }

    #[test]
    fn missing_optional_ref_is_elided_from_object_resolution() {
        let root = sample_root();
        let ctx = ResolverContext::new(&root);
        let tree = FieldRef::object(vec![
            ("kept".to_string(), FieldRef::path(Key::parse("title"))),
            ("dropped".to_string(), FieldRef::MissingOptionalRef),
        ]);
        let resolved = tree.resolve(&ctx).unwrap();
        let object = resolved.as_object().unwrap();
        assert!(object.get(&Key::single("kept")).is_some());
        assert!(object.get(&Key::single("dropped")).is_none());
    }

    #[test]
    fn merge_prefers_overlay_fields_over_base() {
        let base = FieldRef::object(vec![
            ("a".to_string(), FieldRef::resolved(ConfigValue::long(1))),
            ("b".to_string(), FieldRef::resolved(ConfigValue::long(2))),
        ]);
        let overlay = FieldRef::object(vec![("a".to_string(), FieldRef::resolved(ConfigValue::long(99)))]);
        let merged = overlay.merge(base);
        match merged {
            FieldRef::ObjectRef(fields) => {
                let a = fields.iter().find(|(k, _)| k == "a").unwrap();
                assert_eq!(a.1, FieldRef::resolved(ConfigValue::long(99)));
                assert!(fields.iter().any(|(k, _)| k == "b"));
            }
            _ => panic!("expected ObjectRef"),
        }
    }

    #[test]
    fn select_returns_none_only_when_key_is_absent() {
        let root = sample_root();
        let ctx = ResolverContext::new(&root);
        let tree = FieldRef::object(vec![("present".to_string(), FieldRef::MissingOptionalRef)]);
        assert!(tree.select(&Key::parse("present"), &ctx).is_some());
        assert!(tree.select(&Key::parse("absent"), &ctx).is_none());
    }
}
