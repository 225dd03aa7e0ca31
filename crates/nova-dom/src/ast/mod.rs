//! The public node arena.
//!
//! Nodes are allocated bottom-up: a node's payload names its children, and
//! allocating it attaches them. Attaching is where the tree's ownership rules
//! are enforced; breaking them is a bug in the converter, so it panics.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use nova_core::{TextRange, TextSize};

mod node;

pub use node::*;

static NEXT_TREE: AtomicU32 = AtomicU32::new(1);

/// Handle of a node. Only valid for the [`Ast`] that allocated it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u32,
    index: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}:{})", self.tree, self.index)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Built by best-effort recovery from input that did not validate.
        const MALFORMED = 1 << 0;
        /// The front-end recovered from a syntax error inside this node.
        const RECOVERED = 1 << 1;
        const ORIGINAL = 1 << 2;
        const PROTECT = 1 << 3;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub node: Node,
    pub parent: Option<NodeId>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug)]
pub struct Ast {
    tree: u32,
    nodes: Vec<NodeData>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            tree: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(|index| NodeId {
            tree: self.tree,
            index,
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.tree && id.index() < self.nodes.len()
    }

    /// Allocate `node` and attach every child its payload names.
    ///
    /// Children whose range escapes `range` are clamped into it (recursively)
    /// and flagged [`NodeFlags::MALFORMED`].
    pub fn alloc(&mut self, node: impl Into<Node>, range: TextRange) -> NodeId {
        let node = node.into();
        let children = node.children();
        let id = NodeId {
            tree: self.tree,
            index: self.nodes.len() as u32,
        };
        for &child in &children {
            self.check_attachable(id, child);
        }
        self.nodes.push(NodeData {
            node,
            parent: None,
            range,
            flags: NodeFlags::empty(),
        });
        for child in children {
            self.nodes[child.index()].parent = Some(id);
            self.clamp_into(child, range);
        }
        id
    }

    /// Record `parent` as the owner of `child`.
    ///
    /// # Panics
    ///
    /// If either node belongs to another tree, `child` already has a parent,
    /// or `parent` is `child` or one of its descendants.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.check_foreign(parent);
        if parent.index() >= self.nodes.len() {
            panic!("dangling node handle {parent:?}");
        }
        self.check_attachable(parent, child);
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                panic!("attaching {child:?} under {parent:?} would create a cycle");
            }
            cursor = self.nodes[current.index()].parent;
        }
        self.nodes[child.index()].parent = Some(parent);
    }

    fn check_foreign(&self, id: NodeId) {
        if id.tree != self.tree {
            panic!(
                "{id:?} belongs to tree {} but was used with tree {}",
                id.tree, self.tree
            );
        }
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) {
        self.check_foreign(child);
        let Some(data) = self.nodes.get(child.index()) else {
            panic!("dangling node handle {child:?}");
        };
        if let Some(existing) = data.parent {
            panic!("{child:?} already has parent {existing:?}; cannot attach it to {parent:?}");
        }
    }

    fn clamp_into(&mut self, id: NodeId, outer: TextRange) {
        let range = self.nodes[id.index()].range;
        if outer.contains_range(range) {
            return;
        }
        let start = range.start().clamp(outer.start(), outer.end());
        let end = range.end().clamp(start, outer.end());
        let clamped = TextRange::new(start, end);
        tracing::debug!(
            node = ?id,
            kind = self.nodes[id.index()].node.kind().name(),
            from = ?range,
            to = ?clamped,
            "clamped child range into parent"
        );
        let data = &mut self.nodes[id.index()];
        data.range = clamped;
        data.flags |= NodeFlags::MALFORMED;
        for child in data.node.children() {
            self.clamp_into(child, clamped);
        }
    }

    /// # Panics
    ///
    /// On a handle from another tree or one that was never allocated.
    pub fn get(&self, id: NodeId) -> &NodeData {
        if !self.contains(id) {
            panic!("{id:?} does not belong to tree {}", self.tree);
        }
        &self.nodes[id.index()]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.get(id).node
    }

    pub fn add_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if !self.contains(id) {
            panic!("{id:?} does not belong to tree {}", self.tree);
        }
        self.nodes[id.index()].flags |= flags;
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.get(id).range
    }

    /// Smallest range covering all of `ids`, or an empty range at `fallback`.
    pub fn cover(&self, ids: &[NodeId], fallback: TextSize) -> TextRange {
        ids.iter()
            .map(|id| self.range(*id))
            .reduce(|a, b| a.cover(b))
            .unwrap_or_else(|| TextRange::empty(fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(ast: &mut Ast, text: &str, start: u32) -> NodeId {
        ast.alloc(
            SimpleName {
                identifier: text.into(),
            },
            TextRange::at(start.into(), (text.len() as u32).into()),
        )
    }

    #[test]
    fn alloc_links_children_to_parent() {
        let mut ast = Ast::new();
        let a = name(&mut ast, "a", 0);
        let b = name(&mut ast, "b", 2);
        let q = ast.alloc(
            QualifiedName {
                qualifier: a,
                name: b,
            },
            TextRange::new(0.into(), 3.into()),
        );
        assert_eq!(ast.get(a).parent, Some(q));
        assert_eq!(ast.get(b).parent, Some(q));
        assert_eq!(ast.get(q).parent, None);
        assert_eq!(ast.node(q).children(), vec![a, b]);
    }

    #[test]
    fn escaping_children_are_clamped_and_malformed() {
        let mut ast = Ast::new();
        let inner = name(&mut ast, "inner", 10);
        let ty = ast.alloc(
            SimpleType {
                annotations: Vec::new(),
                name: inner,
            },
            TextRange::new(0.into(), 12.into()),
        );
        assert_eq!(ast.range(inner), TextRange::new(10.into(), 12.into()));
        assert!(ast.get(inner).flags.contains(NodeFlags::MALFORMED));
        assert!(!ast.get(ty).flags.contains(NodeFlags::MALFORMED));
    }

    #[test]
    #[should_panic(expected = "already has parent")]
    fn reparenting_panics() {
        let mut ast = Ast::new();
        let a = name(&mut ast, "a", 0);
        ast.alloc(
            SimpleType {
                annotations: Vec::new(),
                name: a,
            },
            TextRange::new(0.into(), 1.into()),
        );
        ast.alloc(
            SimpleType {
                annotations: Vec::new(),
                name: a,
            },
            TextRange::new(0.into(), 1.into()),
        );
    }

    #[test]
    #[should_panic(expected = "belongs to tree")]
    fn cross_tree_attach_panics() {
        let mut first = Ast::new();
        let mut second = Ast::new();
        let a = name(&mut first, "a", 0);
        second.alloc(
            SimpleType {
                annotations: Vec::new(),
                name: a,
            },
            TextRange::new(0.into(), 1.into()),
        );
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn cyclic_attach_panics() {
        let mut ast = Ast::new();
        let a = name(&mut ast, "a", 0);
        let ty = ast.alloc(
            SimpleType {
                annotations: Vec::new(),
                name: a,
            },
            TextRange::new(0.into(), 1.into()),
        );
        ast.attach(a, ty);
    }
}
