//! Extension bundle merge (spec §4.5): ordered composition of user,
//! library, theme, and parser contributions into one [`OperationConfig`].

use crate::hocon::builder::BuilderValue;
use crate::hocon::Origin;
use crate::rewrite::{RewritePhase, RuleSet};
use std::rc::Rc;

/// A partial function attached to one bundle that can adjust *another*
/// bundle's behavior — e.g. a user bundle tightening a library bundle's
/// rules (spec §4.5). Given the other bundle, returns its replacement, or
/// `None` to leave it unchanged.
pub type ProcessExtension = Rc<dyn Fn(&ExtensionBundle) -> Option<ExtensionBundle>>;

/// One bundle's partial contribution to a parse/render operation
/// (spec §3). Most fields are optional — an empty `ExtensionBundle` is the
/// merge identity.
#[derive(Clone)]
pub struct ExtensionBundle {
    pub name: String,
    pub origin: Origin,
    /// Base configuration values this bundle contributes, merged under
    /// user-supplied values (lowest precedence).
    pub base_config: Option<BuilderValue>,
    /// Rewrite rule factories, keyed by the phase they contribute to.
    pub rewrite_rules: Vec<(RewritePhase, Rc<dyn Fn() -> RuleSet>)>,
    pub process_extension: Option<ProcessExtension>,
    /// Whether this bundle participates under `BundleFilter{strict: true}`.
    pub strict_mode: StrictMode,
    /// Whether this bundle participates under `accept_raw_content: false`.
    pub raw_content: RawContentMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrictMode {
    /// Participate unchanged in strict mode.
    Unchanged,
    /// Replaced by a restricted view in strict mode.
    Restricted,
    /// Dropped entirely in strict mode.
    Excluded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawContentMode {
    Unchanged,
    Disabled,
}

impl ExtensionBundle {
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            origin,
            base_config: None,
            rewrite_rules: Vec::new(),
            process_extension: None,
            strict_mode: StrictMode::Unchanged,
            raw_content: RawContentMode::Unchanged,
        }
    }

    pub fn with_base_config(mut self, config: BuilderValue) -> Self {
        self.base_config = Some(config);
        self
    }

    pub fn with_rewrite_rules(mut self, phase: RewritePhase, factory: impl Fn() -> RuleSet + 'static) -> Self {
        self.rewrite_rules.push((phase, Rc::new(factory)));
        self
    }

    pub fn with_process_extension(mut self, hook: impl Fn(&ExtensionBundle) -> Option<ExtensionBundle> + 'static) -> Self {
        self.process_extension = Some(Rc::new(hook));
        self
    }

    /// "Later overrides earlier, missing contributions inherit" merge
    /// (spec §4.5: `withBase`).
    pub fn with_base(self, base: &ExtensionBundle) -> ExtensionBundle {
        ExtensionBundle {
            name: self.name,
            origin: self.origin,
            base_config: self.base_config.or_else(|| base.base_config.clone()),
            rewrite_rules: {
                let mut rules = base.rewrite_rules.clone();
                rules.extend(self.rewrite_rules);
                rules
            },
            process_extension: self.process_extension.or_else(|| base.process_extension.clone()),
            strict_mode: self.strict_mode,
            raw_content: self.raw_content,
        }
    }

    fn for_strict_mode(&self) -> Option<ExtensionBundle> {
        match self.strict_mode {
            StrictMode::Unchanged => Some(self.clone()),
            StrictMode::Restricted => Some(ExtensionBundle {
                rewrite_rules: Vec::new(),
                process_extension: None,
                ..self.clone()
            }),
            StrictMode::Excluded => None,
        }
    }

    fn raw_content_disabled(&self) -> ExtensionBundle {
        match self.raw_content {
            RawContentMode::Unchanged => self.clone(),
            RawContentMode::Disabled => ExtensionBundle { rewrite_rules: Vec::new(), ..self.clone() },
        }
    }
}

/// Filters applied before merge (spec §3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BundleFilter {
    pub strict: bool,
    pub accept_raw_content: bool,
}

impl BundleFilter {
    pub fn apply(&self, bundles: Vec<ExtensionBundle>) -> Vec<ExtensionBundle> {
        bundles
            .into_iter()
            .filter_map(|b| {
                let b = if self.strict { b.for_strict_mode()? } else { b };
                Some(if self.accept_raw_content { b } else { b.raw_content_disabled() })
            })
            .collect()
    }
}

/// Sort bundles by origin (`Library, Parser, Theme, Mixed, User`, stable
/// within each origin), let each bundle's `processExtension` hook adjust
/// every *other* bundle in the set, then fold right-to-left with
/// `withBase` (spec §4.5).
pub fn merge_bundles(mut bundles: Vec<ExtensionBundle>) -> ExtensionBundle {
    bundles.sort_by_key(|b| b.origin);
    log::trace!(
        "merging bundles in order: {}",
        bundles.iter().map(|b| format!("{}({:?})", b.name, b.origin)).collect::<Vec<_>>().join(", ")
    );

    let mut working = bundles.clone();
    for i in 0..bundles.len() {
        let Some(hook) = bundles[i].process_extension.clone() else {
            continue;
        };
        for j in 0..working.len() {
            if i == j {
                continue;
            }
            if let Some(replacement) = hook(&working[j]) {
                working[j] = replacement;
            }
        }
    }

    // `working` is ordered Library..User (ascending precedence); each
    // later bundle becomes the new `self` overriding everything folded so
    // far, so the final accumulator has User's contributions on top.
    working
        .into_iter()
        .reduce(|acc, bundle| bundle.with_base(&acc))
        .unwrap_or_else(|| ExtensionBundle::new("empty", Origin::Synthetic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundles_sort_by_origin_before_merge() {
        let user = ExtensionBundle::new("user", Origin::User);
        let library = ExtensionBundle::new("library", Origin::Library);
        let mut bundles = vec![user.clone(), library.clone()];
        bundles.sort_by_key(|b| b.origin);
        assert_eq!(bundles[0].name, "library");
        assert_eq!(bundles[1].name, "user");
    }

    #[test]
    fn with_base_inherits_missing_contributions() {
        let base = ExtensionBundle::new("base", Origin::Library)
            .with_base_config(BuilderValue::object(Vec::new()));
        let overlay = ExtensionBundle::new("overlay", Origin::User);
        let merged = overlay.with_base(&base);
        assert!(merged.base_config.is_some());
    }

    #[test]
    fn strict_mode_excludes_bundle_entirely() {
        let mut bundle = ExtensionBundle::new("debug-only", Origin::Parser);
        bundle.strict_mode = StrictMode::Excluded;
        let filtered = BundleFilter { strict: true, accept_raw_content: true }.apply(vec![bundle]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn merge_produces_identity_for_empty_input() {
        let merged = merge_bundles(Vec::new());
        assert_eq!(merged.name, "empty");
    }

    #[test]
    fn process_extension_hook_adjusts_another_bundle() {
        let library = ExtensionBundle::new("library", Origin::Library)
            .with_rewrite_rules(RewritePhase::Build, || RuleSet::new(Vec::new()));
        let user = ExtensionBundle::new("user", Origin::User).with_process_extension(|other| {
            if other.name == "library" {
                let mut stripped = other.clone();
                stripped.rewrite_rules.clear();
                Some(stripped)
            } else {
                None
            }
        });

        let merged = merge_bundles(vec![library, user]);
        // `user`'s hook stripped `library`'s rewrite rule contribution
        // before the fold, so none survive into the merged bundle.
        assert!(merged.rewrite_rules.is_empty());
    }
}
