//! Debug-only tree rendering, built on the same tree-pretty-printing crate this codebase's
//! teacher (`lang-pt`) already depends on for its own `ASTNode::print`.
//!
//! A parsed tree is threaded through arena-relative [NodeId]s rather than owned, nested
//! structs, so unlike the teacher's `impl TreeItem for ASTNode` (which borrows a `Vec` field
//! directly) [NodeView::children] has to *build* a fresh `Vec` of views on every call — there
//! is no owned child list anywhere to borrow from. Everything here goes through the node
//! model's public navigation API (§4.3); it has no special access to arena internals.

use crate::arena::{Arena, NodeId};
use crate::message::{Diagnostic, MessageList};
use std::borrow::Cow;
use std::io;

/// A read-only view of one node within its [Arena], suitable for [ptree::print_tree] or
/// [ptree::write_tree]. Cheap to copy: it's just a reference and an index.
#[derive(Clone, Copy)]
pub struct NodeView<'a, 's> {
    arena: &'a Arena<'s>,
    node: NodeId,
}

impl<'a, 's> NodeView<'a, 's> {
    pub fn new(arena: &'a Arena<'s>, node: NodeId) -> Self {
        Self { arena, node }
    }

    /// Render `self`'s subtree as an indented tree to standard output.
    pub fn print(&self) -> io::Result<()> {
        ptree::print_tree(self)
    }

    /// Render `self`'s subtree as an indented tree into `f`, for snapshot tests that want
    /// the text rather than a printed side effect.
    pub fn write_to<W: io::Write>(&self, f: &mut W) -> io::Result<()> {
        ptree::write_tree(self, f)
    }
}

impl ptree::TreeItem for NodeView<'_, '_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &ptree::Style) -> io::Result<()> {
        let node = self.arena.node(self.node);
        if node.string.is_empty() {
            write!(f, "{:?} {:?}", node.kind, node.flags.get())
        } else {
            write!(f, "{:?} {:?} {:?}", node.kind, node.flags.get(), node.string)
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        let mut kids: Vec<Self> = self.arena.children(self.node).map(|id| NodeView::new(self.arena, id)).collect();
        kids.extend(self.arena.tags(self.node).map(|id| NodeView::new(self.arena, id)));
        Cow::Owned(kids)
    }
}

/// Render every message in `messages` as a `FILE:LINE:COLUMN: KIND: MESSAGE` line (§6),
/// one per line, in source order.
pub fn format_messages(arena: &Arena<'_>, messages: &MessageList) -> String {
    messages
        .iter(arena)
        .map(|message| Diagnostic::new(arena, message).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
