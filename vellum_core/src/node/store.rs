// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and style data.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, NodeId};
use super::traverse::{Ancestors, Children};
use crate::dirty;
use crate::resource::{ResourceId, ResourceKind, ResourceReferences};
use crate::tree::RenderTree;

/// Struct-of-arrays storage for a render tree.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies a
/// slot in parallel arrays. Destroyed nodes are recycled via a free list, and
/// generation counters prevent stale handle access.
///
/// The store holds only what the resource graph reads through
/// [`RenderTree`]: topology, computed resource references, the definition a
/// container node carries, and object bounding boxes. Requests issued through
/// [`RenderTree`] are recorded as dirty marks and collected with
/// [`drain_requests`](Self::drain_requests).
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Style data (set by callers) --
    pub(crate) references: Vec<ResourceReferences>,
    pub(crate) definition: Vec<Option<(ResourceId, ResourceKind)>>,
    pub(crate) object_bbox: Vec<Rect>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            references: Vec::new(),
            definition: Vec::new(),
            object_bbox: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts with no references, no resource definition, an empty
    /// bounding box, and no parent.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.references[idx as usize] = ResourceReferences::new();
            self.definition[idx as usize] = None;
            self.object_bbox[idx as usize] = Rect::ZERO;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.references.push(ResourceReferences::new());
            self.definition.push(None);
            self.object_bbox.push(Rect::ZERO);
            self.generation.push(0);
            idx
        };

        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.handle(idx)
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// Detach the node from the resource graph first
    /// ([`ResourceGraph::node_detached`](crate::resource::ResourceGraph::node_detached)),
    /// otherwise bundles and client sets keep a stale handle.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.remove_from_parent(id);
        }

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Parent layout depends on its children.
        let _ = self.dirty.add_dependency(p, c, dirty::LAYOUT);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(p, c, dirty::LAYOUT);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over the ancestors of a node, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns `node` followed by all of its descendants in pre-order.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        let mut out = Vec::new();
        let mut stack = alloc::vec![id.idx];
        while let Some(idx) = stack.pop() {
            out.push(self.handle(idx));
            // Push children in reverse so the first child is visited first.
            let start = stack.len();
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            stack[start..].reverse();
        }
        out
    }

    // -- Style data API --

    /// Returns the computed resource references of a node.
    #[must_use]
    pub fn references(&self, id: NodeId) -> &ResourceReferences {
        self.validate(id);
        &self.references[id.idx as usize]
    }

    /// Replaces the computed resource references of a node.
    ///
    /// The caller reports the change to the resource graph with
    /// [`ResourceGraph::client_style_changed`](crate::resource::ResourceGraph::client_style_changed).
    pub fn set_references(&mut self, id: NodeId, references: ResourceReferences) {
        self.validate(id);
        self.references[id.idx as usize] = references;
    }

    /// Returns the resource this node defines, if it is a container node.
    #[must_use]
    pub fn definition(&self, id: NodeId) -> Option<(&ResourceId, ResourceKind)> {
        self.validate(id);
        self.definition[id.idx as usize]
            .as_ref()
            .map(|(rid, kind)| (rid, *kind))
    }

    /// Makes the node define a resource of `kind` under `resource_id`.
    pub fn set_definition(&mut self, id: NodeId, resource_id: ResourceId, kind: ResourceKind) {
        self.validate(id);
        self.definition[id.idx as usize] = Some((resource_id, kind));
    }

    /// Returns the object bounding box of a node in its local space.
    #[must_use]
    pub fn object_bounding_box(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.object_bbox[id.idx as usize]
    }

    /// Sets the object bounding box of a node.
    pub fn set_object_bounding_box(&mut self, id: NodeId, bbox: Rect) {
        self.validate(id);
        self.object_bbox[id.idx as usize] = bbox;
    }

    // -- Internal helpers --

    /// Returns the live handle for raw slot `idx`.
    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

impl RenderTree for NodeStore {
    fn resource_references(&self, node: NodeId) -> ResourceReferences {
        self.references(node).clone()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        Self::children(self, node)
    }

    fn container_kind(&self, node: NodeId) -> Option<ResourceKind> {
        self.definition(node).map(|(_, kind)| kind)
    }

    fn resource_id(&self, node: NodeId) -> Option<ResourceId> {
        self.definition(node).map(|(id, _)| id.clone())
    }

    fn object_bounding_box(&self, node: NodeId) -> Rect {
        Self::object_bounding_box(self, node)
    }

    fn request_relayout(&mut self, node: NodeId) {
        self.validate(node);
        self.dirty.mark_with(node.idx, dirty::LAYOUT, &EagerPolicy);
    }

    fn request_bounds_update(&mut self, node: NodeId) {
        self.validate(node);
        self.dirty.mark(node.idx, dirty::BOUNDS);
    }

    fn request_repaint(&mut self, node: NodeId) {
        self.validate(node);
        self.dirty.mark(node.idx, dirty::REPAINT);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert!(store.is_alive(id));
        store.destroy_node(id);
        assert!(!store.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_node();
        store.destroy_node(id1);
        let id2 = store.create_node();
        // id2 reuses the same slot but has a different generation.
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn reused_slot_starts_clean() {
        let mut store = NodeStore::new();
        let id1 = store.create_node();
        store.set_definition(id1, ResourceId::new("a"), ResourceKind::Masker);
        store.destroy_node(id1);
        let id2 = store.create_node();
        assert_eq!(store.definition(id2), None);
        assert!(store.references(id2).is_empty());
    }

    #[test]
    fn add_child_and_query() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child1 = store.create_node();
        let child2 = store.create_node();

        store.add_child(parent, child1);
        store.add_child(parent, child2);

        assert_eq!(store.parent(child1), Some(parent));
        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![child1, child2]);
    }

    #[test]
    fn remove_from_parent_works() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();

        store.add_child(parent, child);
        store.remove_from_parent(child);
        assert_eq!(store.parent(child), None);
        assert!(store.children(parent).next().is_none());
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let mid = store.create_node();
        let leaf = store.create_node();
        store.add_child(root, mid);
        store.add_child(mid, leaf);

        let chain: Vec<_> = store.ancestors(leaf).collect();
        assert_eq!(chain, vec![mid, root]);
        assert!(store.ancestors(root).next().is_none());
    }

    #[test]
    fn subtree_is_preorder() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let a = store.create_node();
        let a1 = store.create_node();
        let b = store.create_node();
        store.add_child(root, a);
        store.add_child(a, a1);
        store.add_child(root, b);

        assert_eq!(store.subtree(root), vec![root, a, a1, b]);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.destroy_node(id);
        let _ = store.parent(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_request() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.destroy_node(id);
        store.request_repaint(id);
    }

    #[test]
    fn render_tree_reports_definition() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert_eq!(RenderTree::container_kind(&store, id), None);
        store.set_definition(id, ResourceId::new("grad"), ResourceKind::LinearGradient);
        assert_eq!(
            RenderTree::container_kind(&store, id),
            Some(ResourceKind::LinearGradient)
        );
        assert_eq!(
            RenderTree::resource_id(&store, id),
            Some(ResourceId::new("grad"))
        );
    }
}
