//! The phased, bottom-up rewrite engine (spec §4.4).

use crate::document::cursor::DocumentCursor;
use crate::document::tree::{DocumentTree, Element, NodeId};
use crate::error::RewriteError;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// The target format a `Render` phase is specialized for, e.g. `"html"` or
/// `"epub"`. Kept as a plain string since the concrete set of renderers is
/// an external collaborator (spec §1 non-goals).
pub type RenderFormat = String;

/// The three ordered phases a rewrite rule can contribute to (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RewritePhase {
    /// Structural: resolve link references, collate fragments.
    Build,
    /// Cross-document: table of contents, bibliographies.
    Resolve,
    /// Format-specific: raw-content rules, path translation.
    Render(RenderFormat),
}

impl Display for RewritePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RewritePhase::Build => f.write_str("build"),
            RewritePhase::Resolve => f.write_str("resolve"),
            RewritePhase::Render(format) => write!(f, "render({format})"),
        }
    }
}

/// What a rewrite rule decides to do with the node it was given
/// (spec §4.4, §8: "each node receives exactly one action per phase").
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteAction {
    Retain,
    Replace(Element),
    Remove,
}

/// A rewrite rule: a partial function `Element -> Option<RewriteAction>`
/// (spec §9). Returning `None` means the rule does not apply to this node
/// (try the next rule); returning `Some(Retain)` is an explicit no-op,
/// distinct from "did not match".
pub struct RewriteRule {
    name: String,
    apply: Rc<dyn Fn(&DocumentCursor) -> Result<Option<RewriteAction>, RewriteError>>,
}

impl RewriteRule {
    pub fn new(
        name: impl Into<String>,
        apply: impl Fn(&DocumentCursor) -> Result<Option<RewriteAction>, RewriteError> + 'static,
    ) -> Self {
        Self { name: name.into(), apply: Rc::new(apply) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, cursor: &DocumentCursor) -> Result<Option<RewriteAction>, RewriteError> {
        (self.apply)(cursor)
    }
}

/// An ordered set of rules for one phase, tried in registration order; the
/// first rule that matches (returns `Some`) decides the node's fate.
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    fn apply(&self, cursor: &DocumentCursor) -> Result<RewriteAction, RewriteError> {
        for rule in &self.rules {
            if let Some(action) = rule.run(cursor)? {
                return Ok(action);
            }
        }
        Ok(RewriteAction::Retain)
    }
}

/// Rewrite an entire tree for one phase, bottom-up: children are rewritten
/// to a fixpoint before the rule set sees their parent (spec §8: "for any
/// container `C(c1..cn)` and rule `r`, the rule is first applied to
/// `c1..cn`... then to the rewritten container").
pub fn rewrite_tree(
    tree: &DocumentTree,
    root: NodeId,
    config: &crate::hocon::Config,
    rules: &RuleSet,
) -> Result<DocumentTree, RewriteError> {
    let mut output = DocumentTree::new();
    rewrite_node(tree, root, config, rules, &mut output)?;
    Ok(output)
}

fn rewrite_node(
    source: &DocumentTree,
    id: NodeId,
    config: &crate::hocon::Config,
    rules: &RuleSet,
    output: &mut DocumentTree,
) -> Result<Option<NodeId>, RewriteError> {
    let element = source.get(id).clone();
    let rewritten_children: Vec<(NodeId, Option<NodeId>)> = element
        .children()
        .into_iter()
        .map(|child| rewrite_node(source, child, config, rules, output).map(|new_id| (child, new_id)))
        .collect::<Result<_, _>>()?;

    let rewritten_element = splice_children(&element, &rewritten_children);
    let new_id = output.insert(rewritten_element);

    // Rules see the node as freshly written into `output`; ancestor context
    // beyond the immediate node is not reconstructed during this bottom-up
    // pass. Rules that need full ancestor access should run in `Resolve`,
    // against the finished tree, where a cursor can carry a real chain.
    //
    // A `Replace` result is fed back through the rule set against the same
    // node id until a pass retains it (spec §8: a rule applies to a
    // container only after its children, and to a rewritten container
    // itself, to fixpoint) — a replacement that itself matches another rule
    // must not be left unexamined.
    loop {
        let cursor = DocumentCursor::root(output, new_id, config);
        match rules.apply(&cursor)? {
            RewriteAction::Retain => return Ok(Some(new_id)),
            RewriteAction::Replace(replacement) => {
                output.set(new_id, replacement);
            }
            RewriteAction::Remove => return Ok(None),
        }
    }
}

/// Rebuild `element` with its child node-id lists replaced by the
/// post-rewrite ids, dropping any child a rule removed.
fn splice_children(element: &Element, rewritten: &[(NodeId, Option<NodeId>)]) -> Element {
    use crate::document::tree::Block;
    use crate::document::tree::Span;
    use crate::document::tree::TemplateSpan;

    let map = |ids: &[NodeId]| -> Vec<NodeId> {
        ids.iter()
            .filter_map(|old| rewritten.iter().find(|(o, _)| o == old).and_then(|(_, new)| *new))
            .collect()
    };

    match element {
        Element::Block(Block::Paragraph { spans, options }) => {
            Element::Block(Block::Paragraph { spans: map(spans), options: options.clone() })
        }
        Element::Block(Block::QuotedBlock { children, options }) => {
            Element::Block(Block::QuotedBlock { children: map(children), options: options.clone() })
        }
        Element::Block(Block::BulletList { items, options }) => {
            Element::Block(Block::BulletList { items: map(items), options: options.clone() })
        }
        Element::Block(Block::ListItem { children, options }) => {
            Element::Block(Block::ListItem { children: map(children), options: options.clone() })
        }
        Element::Block(Block::Section { title, children, options }) => Element::Block(Block::Section {
            title: map(title),
            children: map(children),
            options: options.clone(),
        }),
        Element::Span(Span::Emphasis { children, options }) => {
            Element::Span(Span::Emphasis { children: map(children), options: options.clone() })
        }
        Element::Span(Span::Strong { children, options }) => {
            Element::Span(Span::Strong { children: map(children), options: options.clone() })
        }
        Element::TemplateSpan(TemplateSpan::TemplateElement { children, options }) => {
            Element::TemplateSpan(TemplateSpan::TemplateElement { children: map(children), options: options.clone() })
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::options::ElementOptions;
    use crate::document::tree::{Block, Span};
    use crate::hocon::Config;

    fn empty_config() -> Config {
        Config::resolve(crate::hocon::builder::BuilderValue::object(Vec::new())).unwrap()
    }

    #[test]
    fn bottom_up_rewrite_visits_children_before_parent() {
        let mut tree = DocumentTree::new();
        let text = tree.insert(Element::Span(Span::Text("hello".into())));
        let paragraph =
            tree.insert(Element::Block(Block::Paragraph { spans: vec![text], options: ElementOptions::none() }));

        let visited = Rc::new(std::cell::RefCell::new(Vec::new()));
        let visited_for_rule = visited.clone();
        let rule = RewriteRule::new("track", move |cursor| {
            let label = match cursor.node() {
                Element::Span(Span::Text(t)) => format!("span:{t}"),
                Element::Block(Block::Paragraph { .. }) => "paragraph".to_string(),
                _ => "other".to_string(),
            };
            visited_for_rule.borrow_mut().push(label);
            Ok(Some(RewriteAction::Retain))
        });
        let rules = RuleSet::new(vec![rule]);
        let config = empty_config();

        rewrite_tree(&tree, paragraph, &config, &rules).unwrap();
        assert_eq!(visited.borrow().as_slice(), &["span:hello".to_string(), "paragraph".to_string()]);
    }

    #[test]
    fn replacement_is_reexamined_against_the_rule_set() {
        // "a" -> "b" -> "c", each via a separate rule; a single pass over a
        // freshly-replaced node must not stop at "b".
        let mut tree = DocumentTree::new();
        let text = tree.insert(Element::Span(Span::Text("a".into())));

        let a_to_b = RewriteRule::new("a-to-b", |cursor| match cursor.node() {
            Element::Span(Span::Text(t)) if t == "a" => Ok(Some(RewriteAction::Replace(Element::Span(Span::Text("b".into()))))),
            _ => Ok(None),
        });
        let b_to_c = RewriteRule::new("b-to-c", |cursor| match cursor.node() {
            Element::Span(Span::Text(t)) if t == "b" => Ok(Some(RewriteAction::Replace(Element::Span(Span::Text("c".into()))))),
            _ => Ok(None),
        });
        let rules = RuleSet::new(vec![a_to_b, b_to_c]);
        let config = empty_config();

        let output = rewrite_tree(&tree, text, &config, &rules).unwrap();
        let new_root = NodeId::from_index(output.len() - 1);
        match output.get(new_root) {
            Element::Span(Span::Text(t)) => assert_eq!(t, "c"),
            _ => panic!("expected text span"),
        }
    }

    #[test]
    fn remove_drops_node_from_parent_children() {
        let mut tree = DocumentTree::new();
        let keep = tree.insert(Element::Span(Span::Text("keep".into())));
        let drop = tree.insert(Element::Span(Span::Text("drop".into())));
        let paragraph = tree.insert(Element::Block(Block::Paragraph {
            spans: vec![keep, drop],
            options: ElementOptions::none(),
        }));

        let rule = RewriteRule::new("drop-drop", |cursor| match cursor.node() {
            Element::Span(Span::Text(t)) if t == "drop" => Ok(Some(RewriteAction::Remove)),
            _ => Ok(Some(RewriteAction::Retain)),
        });
        let rules = RuleSet::new(vec![rule]);
        let config = empty_config();

        let output = rewrite_tree(&tree, paragraph, &config, &rules).unwrap();
        let new_root = NodeId::from_index(output.len() - 1);
        match output.get(new_root) {
            Element::Block(Block::Paragraph { spans, .. }) => assert_eq!(spans.len(), 1),
            _ => panic!("expected paragraph"),
        }
    }
}
