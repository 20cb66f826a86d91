//! Document pipeline glue (spec §4.6): parse, assemble an unresolved
//! document, resolve configuration, rewrite, hand off to a renderer.

pub mod cursor;
pub mod options;
pub mod tree;

use crate::bundle::{BundleFilter, ExtensionBundle};
use crate::error::PipelineError;
use crate::hocon::builder::BuilderValue;
use crate::hocon::{Config, Key};
use crate::message::MessageFilters;
use crate::rewrite::{rewrite_tree, RewritePhase, RuleSet};
use tree::{DocumentTree, NodeId};

/// A parsed document paired with its not-yet-resolved configuration header
/// (spec §3, §4.6 step 4).
pub struct UnresolvedDocument {
    pub tree: DocumentTree,
    pub root: NodeId,
    /// The document's own configuration header, still unresolved; it is
    /// resolved against the surrounding tree configuration as a fallback
    /// (spec §4.6 step 5).
    pub config_header: Option<BuilderValue>,
    /// Named sub-trees extracted from the root (spec §4.6 step 3).
    pub fragments: std::collections::BTreeMap<String, NodeId>,
}

impl UnresolvedDocument {
    pub fn new(tree: DocumentTree, root: NodeId) -> Self {
        Self { tree, root, config_header: None, fragments: Default::default() }
    }

    /// Resolve this document's configuration against `fallback` (the
    /// surrounding tree's configuration), then run the rewrite phases in
    /// order.
    pub fn resolve(self, fallback: &Config, rules_by_phase: &[(RewritePhase, RuleSet)]) -> Result<Document, PipelineError> {
        let own_config = match self.config_header {
            Some(header) => Config::resolve(header)?,
            None => fallback.clone(),
        };
        let merged = own_config.with_fallback(fallback);

        let mut tree = self.tree;
        let mut root = self.root;
        for (phase, rules) in rules_by_phase {
            log::debug!("entering rewrite phase {phase}");
            let rewritten = rewrite_tree(&tree, root, &merged, rules)?;
            root = NodeId::from_index(rewritten.len() - 1);
            tree = rewritten;
            log::debug!("exiting rewrite phase {phase}");
        }

        Ok(Document { tree, root, config: merged, fragments: self.fragments })
    }
}

/// A resolved document: a rewritten tree plus its final configuration
/// (spec §4.6 step 7 hands this to a renderer, an external collaborator).
pub struct Document {
    pub tree: DocumentTree,
    pub root: NodeId,
    pub config: Config,
    pub fragments: std::collections::BTreeMap<String, NodeId>,
}

/// Static assets and styles composed with a tree of documents
/// (spec §3: `DocumentTreeRoot`).
pub struct DocumentTreeRoot {
    pub documents: Vec<Document>,
    pub static_assets: Vec<String>,
    pub styles: Vec<String>,
}

impl DocumentTreeRoot {
    pub fn new() -> Self {
        Self { documents: Vec::new(), static_assets: Vec::new(), styles: Vec::new() }
    }

    pub fn get(&self, path: &Key) -> Option<&Document> {
        let name = path.to_string();
        self.documents.iter().find(|d| d.config.get(&Key::single("title")).map(|v| v.render()) == Some(name.clone()))
    }
}

impl Default for DocumentTreeRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// The merged configuration for one parse/render operation (spec §3).
pub struct OperationConfig {
    pub bundles: Vec<ExtensionBundle>,
    pub filter: BundleFilter,
    pub user_config: BuilderValue,
    pub message_filters: MessageFilters,
}

impl OperationConfig {
    pub fn new(bundles: Vec<ExtensionBundle>) -> Self {
        Self {
            bundles,
            filter: BundleFilter::default(),
            user_config: BuilderValue::object(Vec::new()),
            message_filters: MessageFilters::defaults(),
        }
    }

    pub fn merged_bundle(&self) -> ExtensionBundle {
        crate::bundle::merge_bundles(self.filter.apply(self.bundles.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hocon::builder::Field;
    use crate::hocon::Origin;

    #[test]
    fn merge_with_fallback_prefers_primary_values() {
        let primary = Config::resolve(BuilderValue::object(vec![Field::new(
            Key::single("title"),
            BuilderValue::string("primary", Origin::User),
        )]))
        .unwrap();
        let secondary = Config::resolve(BuilderValue::object(vec![
            Field::new(Key::single("title"), BuilderValue::string("secondary", Origin::Theme)),
            Field::new(Key::single("subtitle"), BuilderValue::string("kept", Origin::Theme)),
        ]))
        .unwrap();

        let merged = primary.with_fallback(&secondary);
        assert_eq!(merged.get(&Key::parse("title")).unwrap().render(), "primary");
        assert_eq!(merged.get(&Key::parse("subtitle")).unwrap().render(), "kept");
    }

    #[test]
    fn directive_with_missing_required_argument_becomes_an_invalid_block() {
        use crate::directive::directive1;
        use crate::directive::parts::{argument, DirectiveInput};
        use crate::document::tree::Block;

        let directive = directive1(argument::<String>("title", |s| Ok(s.to_string())), |title| title);
        let input = DirectiveInput { name: "oneArg".to_string(), positional: Vec::new(), fields: Default::default(), body: None };

        let block = directive.run_or_invalid(&input, |error| {
            Block::InvalidBlock {
                message: error.to_string(),
                source: ":oneArg:".to_string(),
                options: options::ElementOptions::none(),
            }
        });

        match block {
            Block::InvalidBlock { message, source, .. } => {
                assert_eq!(message, "missing required part 'title'");
                assert_eq!(source, ":oneArg:");
            }
            _ => panic!("expected InvalidBlock"),
        }
    }
}
