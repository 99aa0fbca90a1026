//! The node model: [Node], [NodeKind], and the [Arena] methods that build and walk trees of
//! them.
//!
//! Every link field on a [Node] (`parent`, `first_child`, `next`, `first_tag`, `ref_target`,
//! and so on) is a [NodeId] relative to the [Arena] that owns the node, wrapped in a `Cell`
//! so the parser can link a node to its later siblings without needing `&mut` access to
//! earlier ones. A [Reference](NodeKind::Reference) node's `ref_target` is restricted to the
//! same arena as the reference itself; a caller aggregating nodes parsed from several files
//! into one set of references should parse them all into a single shared `Arena`.

use crate::arena::{Arena, NodeId};
use crate::flags::{MatchFlags, NodeFlags};
use crate::string_view::StringView;
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The reserved sentinel every arena allocates at index 0.
    Nil,
    /// The root of a whole parsed file.
    File,
    /// Stands in for a node the parser could not build, so the tree stays walkable after
    /// an error.
    ErrorMarker,
    /// An identifier, number, string, or symbol label — the common case.
    Main,
    /// A `@tag(...)` annotation attached to another node.
    Tag,
    /// A user-constructed aggregate of [Reference] nodes; never produced by the parser
    /// itself. See [Arena::make_list].
    List,
    /// Points at another node, possibly in a different arena; see
    /// [Arena::push_new_reference].
    Reference,
}

pub struct Node<'s> {
    pub kind: NodeKind,
    pub flags: Cell<NodeFlags>,
    pub string: StringView<'s>,
    pub raw_string: StringView<'s>,
    pub string_hash: u64,
    /// Set once parsing has looked far enough ahead to know whether a comment attaches;
    /// see [crate::parser], which is the only writer after construction.
    pub prev_comment: Cell<StringView<'s>>,
    pub next_comment: Cell<StringView<'s>>,
    pub offset: usize,

    pub parent: Cell<NodeId>,
    pub first_child: Cell<NodeId>,
    pub last_child: Cell<NodeId>,
    pub next: Cell<NodeId>,
    pub prev: Cell<NodeId>,
    pub first_tag: Cell<NodeId>,
    pub last_tag: Cell<NodeId>,

    /// Set only on [Reference](NodeKind::Reference) nodes, by [Arena::push_new_reference].
    /// [NodeId::NIL] otherwise.
    pub ref_target: Cell<NodeId>,
}

impl<'s> Arena<'s> {
    /// Walk the sibling chain starting at `first`, stopping before `one_past_last` (exclusive),
    /// looking for a node whose `string` matches `needle` under `flags`. Pass [NodeId::NIL] as
    /// `one_past_last` to scan to the natural end of the chain. With [MatchFlags::FIND_LAST]
    /// the walk continues past the first hit and returns the last one instead.
    pub fn node_from_string(&self, first: NodeId, one_past_last: NodeId, needle: StringView<'_>, flags: MatchFlags) -> NodeId {
        let mut found = NodeId::NIL;
        let mut current = first;
        while !current.is_nil() && current != one_past_last {
            let node = self.node(current);
            if node.string.matches(&needle, flags) {
                found = current;
                if !flags.intersects(MatchFlags::FIND_LAST) {
                    break;
                }
            }
            current = node.next.get();
        }
        found
    }

    /// The `index`-th node in the sibling chain starting at `first`, stopping before
    /// `one_past_last` (exclusive), or nil if the bounded chain is shorter than `index`. Pass
    /// [NodeId::NIL] as `one_past_last` to scan to the natural end of the chain.
    pub fn node_from_index(&self, first: NodeId, one_past_last: NodeId, index: usize) -> NodeId {
        let mut current = first;
        for _ in 0..index {
            if current.is_nil() || current == one_past_last {
                return NodeId::NIL;
            }
            current = self.node(current).next.get();
        }
        if current == one_past_last {
            NodeId::NIL
        } else {
            current
        }
    }

    pub fn child_from_string(&self, node: NodeId, needle: StringView<'_>, flags: MatchFlags) -> NodeId {
        self.node_from_string(self.node(node).first_child.get(), NodeId::NIL, needle, flags)
    }

    pub fn child_from_index(&self, node: NodeId, index: usize) -> NodeId {
        self.node_from_index(self.node(node).first_child.get(), NodeId::NIL, index)
    }

    pub fn tag_from_string(&self, node: NodeId, needle: StringView<'_>, flags: MatchFlags) -> NodeId {
        self.node_from_string(self.node(node).first_tag.get(), NodeId::NIL, needle, flags)
    }

    pub fn tag_from_index(&self, node: NodeId, index: usize) -> NodeId {
        self.node_from_index(self.node(node).first_tag.get(), NodeId::NIL, index)
    }

    /// The `index`-th argument of a `@tag(arg0, arg1, ...)` node — i.e. the `index`-th child
    /// of the tag node itself.
    pub fn tag_arg_from_index(&self, tag: NodeId, index: usize) -> NodeId {
        self.node_from_index(self.node(tag).first_child.get(), NodeId::NIL, index)
    }

    pub fn tag_arg_from_string(&self, tag: NodeId, needle: StringView<'_>, flags: MatchFlags) -> NodeId {
        self.node_from_string(self.node(tag).first_child.get(), NodeId::NIL, needle, flags)
    }

    pub fn node_has_tag(&self, node: NodeId, needle: StringView<'_>, flags: MatchFlags) -> bool {
        !self.tag_from_string(node, needle, flags).is_nil()
    }

    pub fn child_count_from_node(&self, node: NodeId) -> usize {
        self.count_chain(self.node(node).first_child.get())
    }

    pub fn tag_count_from_node(&self, node: NodeId) -> usize {
        self.count_chain(self.node(node).first_tag.get())
    }

    fn count_chain(&self, first: NodeId) -> usize {
        let mut count = 0;
        let mut current = first;
        while !current.is_nil() {
            count += 1;
            current = self.node(current).next.get();
        }
        count
    }

    /// Walk `parent` links up to the outermost ancestor (the [NodeKind::File] node for a
    /// whole-file parse).
    pub fn root_from_node(&self, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let parent = self.node(current).parent.get();
            if parent.is_nil() {
                return current;
            }
            current = parent;
        }
    }

    /// An iterator over `node`'s children, in order.
    pub fn children(&self, node: NodeId) -> Chain<'_, 's> {
        Chain {
            arena: self,
            current: self.node(node).first_child.get(),
        }
    }

    /// An iterator over `node`'s tags, in order.
    pub fn tags(&self, node: NodeId) -> Chain<'_, 's> {
        Chain {
            arena: self,
            current: self.node(node).first_tag.get(),
        }
    }

    /// Allocate an empty [NodeKind::List] node, meant to hold [Reference] children pushed
    /// with [Arena::push_new_reference].
    pub fn make_list(&mut self) -> NodeId {
        self.alloc_node(NodeKind::List, StringView::empty(), StringView::empty(), 0)
    }

    /// Allocate a [NodeKind::Reference] node pointing at `target` (which must belong to
    /// `self`) and append it to `list`.
    pub fn push_new_reference(&mut self, list: NodeId, target: NodeId) -> NodeId {
        let targeted = self.node(target);
        let (string, raw_string, offset) = (targeted.string, targeted.raw_string, targeted.offset);
        let reference = self.alloc_node(NodeKind::Reference, string, raw_string, offset);
        self.node(reference).ref_target.set(target);
        self.push_child(list, reference);
        reference
    }
}

/// Iterator over a sibling chain (children or tags), yielded by [Arena::children] and
/// [Arena::tags].
pub struct Chain<'a, 's> {
    arena: &'a Arena<'s>,
    current: NodeId,
}

impl<'a, 's> Iterator for Chain<'a, 's> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_nil() {
            return None;
        }
        let id = self.current;
        self.current = self.arena.node(id).next.get();
        Some(id)
    }
}
