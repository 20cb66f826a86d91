//! The five-stage resolver (spec §4.2): include expansion, error extraction,
//! path expansion, object merging, and finally resolution of substitutions
//! and concatenations against the merged tree.

use super::builder::{BuilderValue, ConcatPart, Field, FieldKey, ObjectBuilder, SimpleValue};
use super::error::ConfigResolverError;
use super::key::Key;
use super::origin::Origin;
use super::value::{ConfigValue, ResolvedField, ResolvedObject};
use std::cell::RefCell;
use std::collections::HashSet;

/// Resolve a builder tree produced by the HOCON syntax parser into a final
/// [`ConfigValue`] tree.
pub fn resolve(root: BuilderValue) -> Result<ConfigValue, ConfigResolverError> {
    let root = expand_includes(root);
    extract_errors(&root, &Key::root())?;
    let root = expand_paths(root);
    let root = merge_objects(root);
    let resolver = Resolver::new(&root);
    let resolved = resolver.resolve_value(&Key::root(), &root)?;
    Ok(resolved.unwrap_or_else(ConfigValue::null))
}

/// Stage 1: replace `Include` nodes with their loaded contents.
///
/// This crate does not own a resource loader (spec non-goals: "file system
/// and classpath access for includes"); an optional include with nothing to
/// load resolves to an empty object, and a required one is left in place so
/// stage 5 reports [`ConfigResolverError::UnresolvedInclude`].
fn expand_includes(value: BuilderValue) -> BuilderValue {
    match value {
        BuilderValue::Include { required: false, .. } => BuilderValue::object(Vec::new()),
        BuilderValue::Object(ObjectBuilder { fields }) => {
            BuilderValue::object(fields.into_iter().map(expand_includes_field).collect())
        }
        BuilderValue::Array(items) => BuilderValue::Array(items.into_iter().map(expand_includes).collect()),
        other => other,
    }
}

fn expand_includes_field(field: Field) -> Field {
    Field { key: field.key, value: expand_includes(field.value) }
}

/// Stage 2: walk the tree and surface the first `Invalid` node found, so a
/// malformed fragment is reported once instead of cascading into unrelated
/// substitution failures downstream.
fn extract_errors(value: &BuilderValue, path: &Key) -> Result<(), ConfigResolverError> {
    match value {
        BuilderValue::Invalid { failure, .. } => {
            Err(ConfigResolverError::InvalidValue { path: path.clone(), failure: failure.clone() })
        }
        BuilderValue::Object(o) => {
            for field in &o.fields {
                let child = match &field.key {
                    FieldKey::Valid(k) => path_join(path, k),
                    FieldKey::Invalid(invalid) => {
                        return Err(ConfigResolverError::InvalidValue {
                            path: path.clone(),
                            failure: invalid.failure.clone(),
                        });
                    }
                };
                extract_errors(&field.value, &child)?;
            }
            Ok(())
        }
        BuilderValue::Array(items) => {
            for item in items {
                extract_errors(item, path)?;
            }
            Ok(())
        }
        BuilderValue::Concat { first, rest } => {
            extract_errors(first, path)?;
            for part in rest {
                extract_errors(&part.value, path)?;
            }
            Ok(())
        }
        BuilderValue::Merged(values) => {
            for value in values {
                extract_errors(value, path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn path_join(path: &Key, suffix: &Key) -> Key {
    suffix.segments().iter().fold(path.clone(), |acc, segment| acc.child(segment.clone()))
}

/// Stage 3: rewrite dotted field keys (`a.b = 1`) into nested single-segment
/// objects (`a { b = 1 }`), which is how the merge and resolve stages expect
/// every object level to look.
fn expand_paths(value: BuilderValue) -> BuilderValue {
    match value {
        BuilderValue::Object(ObjectBuilder { fields }) => {
            let expanded = fields.into_iter().flat_map(expand_field_path).collect();
            BuilderValue::object(expanded)
        }
        BuilderValue::Array(items) => BuilderValue::Array(items.into_iter().map(expand_paths).collect()),
        BuilderValue::Concat { first, rest } => BuilderValue::Concat {
            first: Box::new(expand_paths(*first)),
            rest: rest
                .into_iter()
                .map(|part| ConcatPart { whitespace: part.whitespace, value: expand_paths(part.value) })
                .collect(),
        },
        BuilderValue::Merged(values) => BuilderValue::Merged(values.into_iter().map(expand_paths).collect()),
        other => other,
    }
}

fn expand_field_path(field: Field) -> Vec<Field> {
    let key = match field.key {
        FieldKey::Invalid(_) => return vec![field],
        FieldKey::Valid(key) => key,
    };
    let value = expand_paths(field.value);
    let mut segments = key.segments().iter();
    let Some(first) = segments.next() else {
        return vec![Field::new(Key::root(), value)];
    };
    let nested = segments.rev().fold(value, |inner, segment| {
        BuilderValue::object(vec![Field::new(Key::single(segment.clone()), inner)])
    });
    vec![Field::new(Key::single(first.clone()), nested)]
}

/// Stage 4: within one object level, fold fields sharing a key into a single
/// field — deep-merging consecutive object values, and otherwise keeping
/// "last wins" while letting a later value's self-reference see the earlier
/// one (spec §4.2, §8 scenario 4).
fn merge_objects(value: BuilderValue) -> BuilderValue {
    match value {
        BuilderValue::Object(ObjectBuilder { fields }) => {
            let mut merged: Vec<Field> = Vec::new();
            for field in fields {
                let key = match &field.key {
                    FieldKey::Valid(k) => Some(k.clone()),
                    FieldKey::Invalid(_) => None,
                };
                let folded_value = merge_objects(field.value);
                let existing = key
                    .as_ref()
                    .and_then(|k| merged.iter().position(|f| matches!(&f.key, FieldKey::Valid(ek) if ek == k)));
                match (key, existing) {
                    (Some(own_key), Some(index)) => {
                        let prior = merged.remove(index);
                        let combined = merge_two(&own_key, prior.value, folded_value);
                        merged.insert(index, Field { key: prior.key, value: combined });
                    }
                    (_, _) => merged.push(Field { key: field.key, value: folded_value }),
                }
            }
            BuilderValue::object(merged)
        }
        BuilderValue::Array(items) => BuilderValue::Array(items.into_iter().map(merge_objects).collect()),
        BuilderValue::Concat { first, rest } => BuilderValue::Concat {
            first: Box::new(merge_objects(*first)),
            rest: rest
                .into_iter()
                .map(|part| ConcatPart { whitespace: part.whitespace, value: merge_objects(part.value) })
                .collect(),
        },
        other => other,
    }
}

fn merge_two(own_key: &Key, prior: BuilderValue, later: BuilderValue) -> BuilderValue {
    match (&prior, &later) {
        (BuilderValue::Object(a), BuilderValue::Object(b)) => {
            let mut fields = a.fields.clone();
            fields.extend(b.fields.clone());
            merge_objects(BuilderValue::object(fields))
        }
        _ => substitute_self(own_key, later, &prior),
    }
}

/// Replace `SelfReference` leaves, and substitutions targeting this same
/// field's own key, in `value` with `prior` — without descending into
/// nested objects, since a self-reference only ever points at the same
/// field's earlier definition, not at a sibling's.
fn substitute_self(own_key: &Key, value: BuilderValue, prior: &BuilderValue) -> BuilderValue {
    match value {
        BuilderValue::SelfReference => prior.clone(),
        BuilderValue::Substitution { path, .. } if &path == own_key => prior.clone(),
        BuilderValue::Concat { first, rest } => BuilderValue::Concat {
            first: Box::new(substitute_self(own_key, *first, prior)),
            rest: rest
                .into_iter()
                .map(|part| ConcatPart {
                    whitespace: part.whitespace,
                    value: substitute_self(own_key, part.value, prior),
                })
                .collect(),
        },
        BuilderValue::Array(items) => {
            BuilderValue::Array(items.into_iter().map(|v| substitute_self(own_key, v, prior)).collect())
        }
        BuilderValue::Merged(values) => {
            BuilderValue::Merged(values.into_iter().map(|v| substitute_self(own_key, v, prior)).collect())
        }
        other => other,
    }
}

/// Stage 5 state: tracks which keys are mid-resolution (cycle detection)
/// and caches already-resolved keys so a substitution referenced from
/// multiple places is only walked once.
struct Resolver<'a> {
    root: &'a BuilderValue,
    active_fields: RefCell<HashSet<Key>>,
    started_objects: RefCell<HashSet<Key>>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a BuilderValue) -> Self {
        Self { root, active_fields: RefCell::new(HashSet::new()), started_objects: RefCell::new(HashSet::new()) }
    }

    fn resolve_value(&self, path: &Key, value: &BuilderValue) -> Result<Option<ConfigValue>, ConfigResolverError> {
        match value {
            BuilderValue::Resolved(v, _origin) => Ok(Some(ConfigValue::Simple(v.clone()))),
            BuilderValue::Object(o) => self.resolve_object(path, o).map(Some),
            BuilderValue::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = self.resolve_value(path, item)? {
                        resolved.push(value);
                    }
                }
                Ok(Some(ConfigValue::Array(resolved)))
            }
            BuilderValue::Concat { first, rest } => self.resolve_concat(path, first, rest),
            BuilderValue::Merged(values) => {
                let mut last = None;
                for value in values {
                    if let Some(resolved) = self.resolve_value(path, value)? {
                        last = Some(resolved);
                    }
                }
                Ok(last)
            }
            BuilderValue::Substitution { path: target, optional } => {
                self.resolve_substitution(path, target, *optional)
            }
            BuilderValue::SelfReference => Err(ConfigResolverError::DanglingSelfReference(path.clone())),
            BuilderValue::Include { resource, required: true } => {
                Err(ConfigResolverError::UnresolvedInclude(resource.resource_id().to_string()))
            }
            BuilderValue::Include { required: false, .. } => Ok(Some(ConfigValue::object(Vec::new()))),
            BuilderValue::Invalid { failure, .. } => {
                Err(ConfigResolverError::InvalidValue { path: path.clone(), failure: failure.clone() })
            }
        }
    }

    fn resolve_object(&self, path: &Key, object: &ObjectBuilder) -> Result<ConfigValue, ConfigResolverError> {
        if !self.started_objects.borrow_mut().insert(path.clone()) {
            log::warn!("cycle detected while resolving object at '{path}'");
            return Err(ConfigResolverError::CycleDetected { from: path.clone(), to: path.clone() });
        }
        let mut fields = Vec::with_capacity(object.fields.len());
        for field in &object.fields {
            let FieldKey::Valid(segment) = &field.key else {
                continue;
            };
            let child_path = path.child(segment.last().unwrap_or_default().to_string());
            if !self.active_fields.borrow_mut().insert(child_path.clone()) {
                log::warn!("cycle detected while resolving field '{child_path}'");
                return Err(ConfigResolverError::CycleDetected { from: path.clone(), to: child_path });
            }
            let resolved = self.resolve_value(&child_path, &field.value);
            self.active_fields.borrow_mut().remove(&child_path);
            if let Some(value) = resolved? {
                fields.push(ResolvedField { key: segment.clone(), value, origin: Origin::User });
            }
        }
        self.started_objects.borrow_mut().remove(path);
        Ok(ConfigValue::Object(ResolvedObject::new(fields)))
    }

    /// Concatenation semantics on resolved values (spec.md:115): all-objects
    /// deep-merge, all-arrays concat, all-scalars string-concat with
    /// preserved whitespace, `Null ++ Array` promotes to the array, and any
    /// other combination of kinds is an invalid path.
    fn resolve_concat(
        &self,
        path: &Key,
        first: &BuilderValue,
        rest: &[ConcatPart],
    ) -> Result<Option<ConfigValue>, ConfigResolverError> {
        let first_resolved = self.resolve_value(path, first)?;
        if rest.is_empty() {
            return Ok(first_resolved);
        }

        let mut parts: Vec<(String, Option<ConfigValue>)> = vec![(String::new(), first_resolved)];
        for part in rest {
            parts.push((part.whitespace.clone(), self.resolve_value(path, &part.value)?));
        }
        let present: Vec<&ConfigValue> = parts.iter().filter_map(|(_, v)| v.as_ref()).collect();
        if present.is_empty() {
            return Ok(None);
        }

        if present.iter().all(|v| matches!(v, ConfigValue::Object(_))) {
            let mut merged = ResolvedObject::empty();
            for value in &present {
                if let ConfigValue::Object(object) = value {
                    merged = deep_merge_resolved(merged, object.clone());
                }
            }
            return Ok(Some(ConfigValue::Object(merged)));
        }

        if present.iter().all(|v| matches!(v, ConfigValue::Array(_))) {
            let mut items = Vec::new();
            for value in &present {
                if let ConfigValue::Array(array) = value {
                    items.extend(array.clone());
                }
            }
            return Ok(Some(ConfigValue::Array(items)));
        }

        if present.iter().all(|v| matches!(v, ConfigValue::Array(_) | ConfigValue::Simple(SimpleValue::Null))) {
            let mut items = Vec::new();
            for value in &present {
                if let ConfigValue::Array(array) = value {
                    items.extend(array.clone());
                }
            }
            return Ok(Some(ConfigValue::Array(items)));
        }

        if present.iter().all(|v| matches!(v, ConfigValue::Simple(_))) {
            let mut text = String::new();
            for (whitespace, value) in &parts {
                if let Some(value) = value {
                    text.push_str(whitespace);
                    text.push_str(&value.render());
                }
            }
            return Ok(Some(ConfigValue::Simple(SimpleValue::Str(text))));
        }

        Err(ConfigResolverError::InvalidValue {
            path: path.clone(),
            failure: format!("cannot concatenate mismatched value kinds at '{path}'"),
        })
    }

    fn resolve_substitution(
        &self,
        from: &Key,
        target: &Key,
        optional: bool,
    ) -> Result<Option<ConfigValue>, ConfigResolverError> {
        // A substitution referencing its own field's path (e.g. `a = ${?a}`,
        // or a nested field substituting its own containing path) can never
        // see a value "to its left" here — stage 4 already resolved every
        // same-key self-reference it could find against a prior sibling
        // definition. What remains is unresolved, not a cycle (spec §4.2
        // stage 5, substitution rule (a)).
        if target == from {
            return if optional {
                Ok(Some(ConfigValue::null()))
            } else {
                Err(ConfigResolverError::DanglingSelfReference(from.clone()))
            };
        }
        if self.active_fields.borrow().contains(target) {
            log::warn!("cycle detected: '{from}' substitutes '{target}', already being resolved");
            return Err(ConfigResolverError::CycleDetected { from: from.clone(), to: target.clone() });
        }
        match lookup(self.root, target) {
            None => {
                if optional {
                    log::debug!("optional substitution '{target}' has no target, omitting field");
                    Ok(None)
                } else {
                    Err(ConfigResolverError::MissingSubstitution(target.clone()))
                }
            }
            Some(found) => {
                self.active_fields.borrow_mut().insert(target.clone());
                let resolved = self.resolve_value(target, found);
                self.active_fields.borrow_mut().remove(target);
                resolved
            }
        }
    }
}

/// Deep-merge two already-resolved objects for concatenation (spec.md:115):
/// `b`'s fields win on a shared key, except where both sides hold a nested
/// object, which recurses instead of overwriting.
fn deep_merge_resolved(a: ResolvedObject, b: ResolvedObject) -> ResolvedObject {
    let mut fields: Vec<ResolvedField> = a.fields().to_vec();
    for field in b.fields().to_vec() {
        match fields.iter().position(|f| f.key == field.key) {
            Some(index) => {
                let prior = fields.remove(index);
                let merged_value = match (prior.value, field.value) {
                    (ConfigValue::Object(pa), ConfigValue::Object(pb)) => ConfigValue::Object(deep_merge_resolved(pa, pb)),
                    (_, later) => later,
                };
                fields.insert(index, ResolvedField { key: field.key, value: merged_value, origin: field.origin });
            }
            None => fields.push(field),
        }
    }
    ResolvedObject::new(fields)
}

/// Walk `root` along `path`'s segments, returning the builder node at that
/// position, if any. Assumes stage 3 has already expanded dotted keys into
/// single-segment nesting.
fn lookup<'a>(root: &'a BuilderValue, path: &Key) -> Option<&'a BuilderValue> {
    let mut current = root;
    for segment in path.segments() {
        let object = match current {
            BuilderValue::Object(o) => o,
            _ => return None,
        };
        let field = object.fields.iter().find(|f| matches!(&f.key, FieldKey::Valid(k) if k.segments() == [segment.clone()]))?;
        current = &field.value;
    }
    Some(current)
}
