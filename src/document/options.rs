//! The shared per-element record (spec §3: "each carrying an options
//! record (id, styles, custom attributes)").

use std::collections::BTreeMap;

/// Id, styles, and custom attributes carried by every block/span/template
/// element, regardless of its concrete variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementOptions {
    pub id: Option<String>,
    pub styles: Vec<String>,
    pub attributes: BTreeMap<String, String>,
}

impl ElementOptions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.styles.push(style.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.styles.iter().any(|s| s == style)
    }
}
