//! User-constructed [List](crate::node::NodeKind::List)/[Reference](crate::node::NodeKind::Reference)
//! nodes, for aggregating trees parsed from multiple files without copying them.
//!
//! [Arena::make_list] and [Arena::push_new_reference] (in [node]) build the structure; this
//! module adds the read side — transparently dereferencing a [Reference] node back to the
//! tree it points at, so code walking a list never has to special-case reference nodes.

use crate::arena::{Arena, NodeId};
use crate::node::NodeKind;

impl<'s> Arena<'s> {
    /// If `node` is a [Reference](NodeKind::Reference), its target; otherwise `node` itself.
    /// Mirrors the reference implementation's for-loop helper that walks a list of
    /// references as though it were a list of the targets directly.
    pub fn node_from_reference(&self, node: NodeId) -> NodeId {
        if self.node(node).kind == NodeKind::Reference {
            self.node(node).ref_target.get()
        } else {
            node
        }
    }

    /// An iterator over `list`'s children with each [Reference] already dereferenced to its
    /// target. Non-reference children (which should not normally appear in a node built by
    /// [Arena::make_list], but are tolerated) pass through unchanged.
    pub fn references(&self, list: NodeId) -> ReferenceIter<'_, 's> {
        ReferenceIter {
            arena: self,
            current: self.node(list).first_child.get(),
        }
    }
}

pub struct ReferenceIter<'a, 's> {
    arena: &'a Arena<'s>,
    current: NodeId,
}

impl<'a, 's> Iterator for ReferenceIter<'a, 's> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_nil() {
            return None;
        }
        let reference = self.current;
        self.current = self.arena.node(reference).next.get();
        Some(self.arena.node_from_reference(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::string_view::StringView;

    #[test]
    fn references_iterator_yields_targets_not_reference_nodes() {
        let mut arena = Arena::new();
        let target_a = arena.alloc_node(NodeKind::Main, StringView::from("a"), StringView::from("a"), 0);
        let target_b = arena.alloc_node(NodeKind::Main, StringView::from("b"), StringView::from("b"), 1);
        let list = arena.make_list();
        arena.push_new_reference(list, target_a);
        arena.push_new_reference(list, target_b);

        let collected: Vec<NodeId> = arena.references(list).collect();
        assert_eq!(collected, vec![target_a, target_b]);
    }

    #[test]
    fn node_from_reference_passes_through_non_reference_nodes() {
        let mut arena = Arena::new();
        let plain = arena.alloc_node(NodeKind::Main, StringView::from("x"), StringView::from("x"), 0);
        assert_eq!(arena.node_from_reference(plain), plain);
    }

    #[test]
    fn references_across_aggregated_files_point_at_original_nodes() {
        let mut arena = Arena::new();
        let file_a = arena.alloc_node(NodeKind::File, StringView::from("a.md"), StringView::empty(), 0);
        let node_a = arena.alloc_node(NodeKind::Main, StringView::from("foo"), StringView::from("foo"), 0);
        arena.push_child(file_a, node_a);

        let file_b = arena.alloc_node(NodeKind::File, StringView::from("b.md"), StringView::empty(), 0);
        let node_b = arena.alloc_node(NodeKind::Main, StringView::from("bar"), StringView::from("bar"), 0);
        arena.push_child(file_b, node_b);

        let aggregate = arena.make_list();
        arena.push_new_reference(aggregate, node_a);
        arena.push_new_reference(aggregate, node_b);

        let collected: Vec<NodeId> = arena.references(aggregate).collect();
        assert_eq!(collected, vec![node_a, node_b]);
        assert_eq!(arena.root_from_node(collected[0]), file_a);
        assert_eq!(arena.root_from_node(collected[1]), file_b);
    }
}
