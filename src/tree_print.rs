//! AST and resolved-configuration pretty-printing (spec §4.7).
//!
//! The hot path — building the indented string most callers actually want —
//! never touches `ptree`: it walks a small local [`PrintNode`] trait instead
//! of allocating a `ptree::Style` per node. `ptree` itself is kept for the
//! one public entry point that writes straight to a `Write`r.

use crate::document::tree::{Block, DocumentTree, Element, NodeId, Span, TemplateSpan};
use crate::hocon::value::ConfigValue;
use std::io;

/// Anything this module can lay out as an indented tree. Distinct from
/// `ptree::TreeItem`: no `Style`, no `Cow`, just a label and owned children.
trait PrintNode: Sized {
    fn label(&self) -> String;
    fn print_children(&self) -> Vec<Self>;
}

fn write_indented<T: PrintNode>(node: &T, out: &mut String, prefix: &str, is_root: bool, is_last: bool) {
    if is_root {
        out.push_str(&node.label());
        out.push('\n');
    } else {
        out.push_str(prefix);
        out.push_str(if is_last { "`-- " } else { "|-- " });
        out.push_str(&node.label());
        out.push('\n');
    }
    let child_prefix = if is_root { String::new() } else { format!("{prefix}{}", if is_last { "    " } else { "|   " }) };
    let children = node.print_children();
    let last_index = children.len().saturating_sub(1);
    for (i, child) in children.iter().enumerate() {
        write_indented(child, out, &child_prefix, false, i == last_index);
    }
}

fn to_tree_string<T: PrintNode>(node: &T) -> String {
    let mut out = String::new();
    write_indented(node, &mut out, "", true, true);
    out
}

/// A document node paired with the arena it belongs to, so children (stored
/// as bare `NodeId`s) can be followed without a raw parent pointer anywhere.
#[derive(Clone, Copy)]
pub struct DocumentNode<'a> {
    tree: &'a DocumentTree,
    id: NodeId,
}

impl<'a> DocumentNode<'a> {
    pub fn new(tree: &'a DocumentTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn to_tree_string(&self) -> String {
        to_tree_string(self)
    }

    pub fn print(&self) -> io::Result<()> {
        ptree::print_tree(self)
    }
}

impl PrintNode for DocumentNode<'_> {
    fn label(&self) -> String {
        element_label(self.tree.get(self.id))
    }

    fn print_children(&self) -> Vec<Self> {
        self.tree.get(self.id).children().into_iter().map(|id| DocumentNode { tree: self.tree, id }).collect()
    }
}

impl ptree::TreeItem for DocumentNode<'_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &ptree::Style) -> io::Result<()> {
        write!(f, "{}", self.label())
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(self.print_children())
    }
}

fn element_label(element: &Element) -> String {
    match element {
        Element::Block(Block::Paragraph { spans, .. }) => format!("Paragraph ({} spans)", spans.len()),
        Element::Block(Block::QuotedBlock { children, .. }) => format!("QuotedBlock ({} children)", children.len()),
        Element::Block(Block::BulletList { items, .. }) => format!("BulletList ({} items)", items.len()),
        Element::Block(Block::ListItem { children, .. }) => format!("ListItem ({} children)", children.len()),
        Element::Block(Block::Section { children, .. }) => format!("Section ({} children)", children.len()),
        Element::Block(Block::InvalidBlock { message, .. }) => format!("InvalidBlock: {message}"),
        Element::Span(Span::Text(text)) => format!("Text({text:?})"),
        Element::Span(Span::Emphasis { .. }) => "Emphasis".to_string(),
        Element::Span(Span::Strong { .. }) => "Strong".to_string(),
        Element::Span(Span::Literal { text, .. }) => format!("Literal({text:?})"),
        Element::Span(Span::InvalidSpan { message, .. }) => format!("InvalidSpan: {message}"),
        Element::TemplateSpan(TemplateSpan::TemplateString(text)) => format!("TemplateString({text:?})"),
        Element::TemplateSpan(TemplateSpan::TemplateSubstitution { path, optional }) => {
            format!("TemplateSubstitution(${{{path}{}}})", if *optional { "?" } else { "" })
        }
        Element::TemplateSpan(TemplateSpan::TemplateElement { .. }) => "TemplateElement".to_string(),
    }
}

/// A resolved config value paired with the key or index it is reached by
/// from its parent, so objects and arrays print with their field names.
#[derive(Clone)]
pub struct ConfigNode<'a> {
    name: Option<String>,
    value: &'a ConfigValue,
}

impl<'a> ConfigNode<'a> {
    pub fn new(value: &'a ConfigValue) -> Self {
        Self { name: None, value }
    }

    pub fn to_tree_string(&self) -> String {
        to_tree_string(self)
    }

    pub fn print(&self) -> io::Result<()> {
        ptree::print_tree(self)
    }
}

impl PrintNode for ConfigNode<'_> {
    fn label(&self) -> String {
        match (&self.name, self.value) {
            (Some(name), ConfigValue::Simple(s)) => format!("{name} = {}", s.render()),
            (None, ConfigValue::Simple(s)) => s.render(),
            (Some(name), ConfigValue::Object(_)) => format!("{name} {{}}"),
            (None, ConfigValue::Object(_)) => "{}".to_string(),
            (Some(name), ConfigValue::Array(items)) => format!("{name} [{}]", items.len()),
            (None, ConfigValue::Array(items)) => format!("[{}]", items.len()),
        }
    }

    fn print_children(&self) -> Vec<Self> {
        match self.value {
            ConfigValue::Object(object) => object
                .fields()
                .iter()
                .map(|field| ConfigNode { name: Some(field.key.to_string()), value: &field.value })
                .collect(),
            ConfigValue::Array(items) => {
                items.iter().enumerate().map(|(i, value)| ConfigNode { name: Some(format!("[{i}]")), value }).collect()
            }
            ConfigValue::Simple(_) => Vec::new(),
        }
    }
}

impl ptree::TreeItem for ConfigNode<'_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &ptree::Style) -> io::Result<()> {
        write!(f, "{}", self.label())
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(self.print_children())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::options::ElementOptions;
    use crate::hocon::origin::Origin;
    use crate::hocon::value::{ResolvedField, ResolvedObject};
    use crate::hocon::Key;

    #[test]
    fn document_tree_string_nests_children_under_their_parent() {
        let mut tree = DocumentTree::new();
        let text = tree.insert(Element::Span(Span::Text("hi".into())));
        let paragraph =
            tree.insert(Element::Block(Block::Paragraph { spans: vec![text], options: ElementOptions::none() }));

        let rendered = DocumentNode::new(&tree, paragraph).to_tree_string();
        assert!(rendered.starts_with("Paragraph (1 spans)\n"));
        assert!(rendered.contains("Text(\"hi\")"));
    }

    #[test]
    fn config_tree_string_shows_field_names() {
        let object = ConfigValue::Object(ResolvedObject::new(vec![ResolvedField {
            key: Key::single("width"),
            value: ConfigValue::long(80),
            origin: Origin::User,
        }]));
        let rendered = ConfigNode::new(&object).to_tree_string();
        assert!(rendered.contains("width = 80"));
    }

    #[test]
    fn invalid_block_label_carries_its_message() {
        let mut tree = DocumentTree::new();
        let invalid = tree.insert(Element::Block(Block::InvalidBlock {
            message: "missing required part 'title'".to_string(),
            source: ":image:".to_string(),
            options: ElementOptions::none(),
        }));
        let rendered = DocumentNode::new(&tree, invalid).to_tree_string();
        assert!(rendered.contains("InvalidBlock: missing required part 'title'"));
    }
}
