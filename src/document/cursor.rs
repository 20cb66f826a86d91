//! A traversal context into a [`DocumentTree`], carried alongside a node
//! instead of being stored on it (spec §9: "Never store raw parent
//! pointers on nodes").

use super::tree::{DocumentTree, Element, NodeId};
use crate::hocon::Config;

/// `{arena: &Tree, index: NodeId, parent_chain: Vec<NodeId>}` (spec §9),
/// plus the root configuration so rewrite rules can resolve references
/// anywhere in the document (spec §4.4: "enabling rules like 'resolve link
/// references' to look up targets anywhere in the document tree").
pub struct DocumentCursor<'a> {
    arena: &'a DocumentTree,
    index: NodeId,
    parent_chain: Vec<NodeId>,
    config: &'a Config,
}

impl<'a> DocumentCursor<'a> {
    pub fn root(arena: &'a DocumentTree, index: NodeId, config: &'a Config) -> Self {
        Self { arena, index, parent_chain: Vec::new(), config }
    }

    pub fn node(&self) -> &'a Element {
        self.arena.get(self.index)
    }

    pub fn node_id(&self) -> NodeId {
        self.index
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent_chain.last().copied()
    }

    pub fn parent_chain(&self) -> &[NodeId] {
        &self.parent_chain
    }

    /// Resolve any node in the arena by id, for rules that need to look up
    /// a target elsewhere in the document (e.g. link references).
    pub fn lookup(&self, id: NodeId) -> &'a Element {
        self.arena.get(id)
    }

    /// Descend into `child`, extending the parent chain.
    pub fn child(&self, child: NodeId) -> DocumentCursor<'a> {
        let mut parent_chain = self.parent_chain.clone();
        parent_chain.push(self.index);
        DocumentCursor { arena: self.arena, index: child, parent_chain, config: self.config }
    }
}
