//! Dotted configuration paths (spec §3, "A `Key` is an ordered sequence of
//! segments").

use std::fmt::{Display, Formatter};

/// An ordered path into a configuration tree, e.g. `a.b.c`.
///
/// `Key`s compare lexicographically on their segments (the derived `Ord` on
/// `Vec<String>` already does this: shorter prefixes sort before their
/// extensions, then segments compare element-wise), which is what spec §3
/// requires for keeping resolved object fields sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// The empty key — `Key.root` in spec §3.
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn single(segment: impl Into<String>) -> Self {
        Self { segments: vec![segment.into()] }
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Parse a dotted path like `a.b.c` into its segments. An empty string
    /// parses to the root key.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self { segments: path.split('.').map(|s| s.to_string()).collect() }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extend this key with one more segment.
    pub fn child(&self, name: impl Into<String>) -> Key {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Key { segments }
    }

    /// The parent of this key, or `None` for the root key.
    pub fn parent(&self) -> Option<Key> {
        if self.segments.is_empty() {
            None
        } else {
            Key { segments: self.segments[..self.segments.len() - 1].to_vec() }.into()
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Whether `ancestor` is a (non-strict) prefix of this key — i.e.
    /// whether `self` is `ancestor`'s child (spec §3: "`isChild(other)`
    /// tests prefix").
    pub fn is_child(&self, ancestor: &Key) -> bool {
        self.segments.len() >= ancestor.segments.len()
            && self.segments[..ancestor.segments.len()] == ancestor.segments[..]
    }

    /// Drop the leading segments shared with `ancestor`, returning the
    /// remainder relative to it. `None` if `ancestor` is not a prefix.
    pub fn relative_to(&self, ancestor: &Key) -> Option<Key> {
        if !self.is_child(ancestor) {
            return None;
        }
        Some(Key { segments: self.segments[ancestor.segments.len()..].to_vec() })
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::parse(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::parse(&value)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
