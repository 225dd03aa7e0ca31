use std::collections::HashMap;

use nova_core::LineIndex;
use nova_hir::{CompilationUnit, ResolvedUnit};
use nova_types::{Diagnostic, SymbolTable};

use crate::ast::{Ast, Node, NodeData, NodeFlags, NodeId, NodeKind};
use crate::bindings::BindingDb;
use crate::convert::{self, Declared, Origin};
use crate::{printer, ConvertError, ConvertOptions, InvariantViolation};

/// Something wrong with the source, attached to the node it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub node: NodeId,
    pub diagnostic: Diagnostic,
}

/// The converted tree of one compilation unit, together with everything
/// needed to answer binding queries about it.
///
/// A `Dom` is immutable once built. Bindings handed out by it borrow it and
/// are only meaningful for this tree.
#[derive(Debug)]
pub struct Dom {
    pub(crate) input: ResolvedUnit,
    pub(crate) options: ConvertOptions,
    pub(crate) ast: Ast,
    pub(crate) root: NodeId,
    pub(crate) origins: HashMap<NodeId, Origin>,
    pub(crate) declarations: HashMap<Declared, NodeId>,
    pub(crate) problems: Vec<Problem>,
    pub(crate) line_index: LineIndex,
    pub(crate) bindings: BindingDb,
}

impl Dom {
    pub(crate) fn build(input: ResolvedUnit, options: ConvertOptions) -> Result<Dom, ConvertError> {
        let converted = convert::convert_unit(&input, &options)?;
        let line_index = LineIndex::new(&input.source);
        Ok(Dom {
            input,
            options,
            ast: converted.ast,
            root: converted.root,
            origins: converted.origins,
            declarations: converted.declarations,
            problems: converted.problems,
            line_index,
            bindings: BindingDb::default(),
        })
    }

    pub(crate) fn symbols(&self) -> &SymbolTable {
        &self.input.symbols
    }

    pub(crate) fn unit(&self) -> &CompilationUnit {
        &self.input.unit
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// The `CompilationUnit` node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// # Panics
    ///
    /// If `node` belongs to another tree.
    pub fn node(&self, node: NodeId) -> &Node {
        self.ast.node(node)
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        self.ast.get(node)
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.ast.get(node).parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children()
    }

    /// Ancestors of `node`, nearest first, excluding `node` itself.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |current| self.parent(*current))
    }

    /// All nodes of the subtree rooted at `node`, in preorder.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    /// Byte offset of the node's first token.
    pub fn start_position(&self, node: NodeId) -> usize {
        u32::from(self.ast.range(node).start()) as usize
    }

    pub fn length(&self, node: NodeId) -> usize {
        u32::from(self.ast.range(node).len()) as usize
    }

    pub fn flags(&self, node: NodeId) -> NodeFlags {
        self.ast.get(node).flags
    }

    pub fn is_malformed(&self, node: NodeId) -> bool {
        self.flags(node).contains(NodeFlags::MALFORMED)
    }

    /// The subtree in canonical surface form. Comments and original
    /// formatting are not preserved.
    pub fn to_source_string(&self, node: NodeId) -> String {
        printer::print(self, node)
    }

    /// One-based line of byte `position`, `None` past the end of the source.
    pub fn line_number(&self, position: usize) -> Option<u32> {
        self.line_index.line_number(u32::try_from(position).ok()?)
    }

    /// Zero-based column of byte `position`, `None` past the end of the source.
    pub fn column_number(&self, position: usize) -> Option<u32> {
        self.line_index.column_number(u32::try_from(position).ok()?)
    }

    /// Problems found while converting, in discovery order.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Verify the structural invariants of the tree: every parent link
    /// agrees with the parent's payload, every range lies inside the
    /// source, and every child's range lies inside its parent's.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let len = self.input.source.len();
        let violation = |node: NodeId, message: String| Err(InvariantViolation { node, message });
        if self.parent(self.root).is_some() {
            return violation(self.root, "the root has a parent".to_string());
        }
        for node in self.ast.ids() {
            let data = self.ast.get(node);
            let end = u32::from(data.range.end()) as usize;
            if end > len {
                return violation(
                    node,
                    format!("range {:?} exceeds a source of {len} bytes", data.range),
                );
            }
            for child in data.node.children() {
                let child_data = self.ast.get(child);
                if child_data.parent != Some(node) {
                    return violation(
                        child,
                        format!("parent link {:?} disagrees with {node:?}", child_data.parent),
                    );
                }
                if !data.range.contains_range(child_data.range) {
                    return violation(
                        child,
                        format!(
                            "range {:?} escapes parent {node:?} at {:?}",
                            child_data.range, data.range
                        ),
                    );
                }
            }
        }
        Ok(())
    }
}
