// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draining recorded render requests.
//!
//! Requests issued through [`RenderTree`](crate::tree::RenderTree) are dirty
//! marks. [`NodeStore::drain_requests`] collects them per channel:
//!
//! 1. **LAYOUT**: requested nodes and, through the parent-depends-on-child
//!    edges, all of their ancestors.
//! 2. **BOUNDS** / **REPAINT**: requested nodes only.
//! 3. **TOPOLOGY**: drained and reduced to a flag.
//!
//! [`RenderRequests`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles, matching the store's SoA layout.
//!
//! [`NodeId`]: super::NodeId

use alloc::vec::Vec;

use understory_dirty::Channel;

use super::store::NodeStore;
use crate::dirty;

/// The requests recorded since the previous [`NodeStore::drain_requests`].
///
/// Each list holds the raw slot indices of the affected nodes, in
/// deterministic order, each index at most once.
#[derive(Clone, Debug, Default)]
pub struct RenderRequests {
    /// Nodes that need layout.
    pub relayout: Vec<u32>,
    /// Nodes whose bounding boxes need recomputation.
    pub bounds: Vec<u32>,
    /// Nodes that need repainting.
    pub repaint: Vec<u32>,
    /// Whether the tree topology changed.
    pub topology_changed: bool,
}

impl RenderRequests {
    /// Returns `true` if nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relayout.is_empty()
            && self.bounds.is_empty()
            && self.repaint.is_empty()
            && !self.topology_changed
    }
}

impl NodeStore {
    /// Drains all recorded requests.
    pub fn drain_requests(&mut self) -> RenderRequests {
        RenderRequests {
            relayout: self.drain_channel(dirty::LAYOUT),
            bounds: self.drain_channel(dirty::BOUNDS),
            repaint: self.drain_channel(dirty::REPAINT),
            topology_changed: !self.drain_channel(dirty::TOPOLOGY).is_empty(),
        }
    }

    fn drain_channel(&mut self, channel: Channel) -> Vec<u32> {
        self.dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeStore;
    use crate::tree::RenderTree;

    #[test]
    fn relayout_reaches_ancestors() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let mid = store.create_node();
        let leaf = store.create_node();
        store.add_child(root, mid);
        store.add_child(mid, leaf);
        let _ = store.drain_requests();

        store.request_relayout(leaf);
        let requests = store.drain_requests();
        assert!(requests.relayout.contains(&leaf.index()));
        assert!(requests.relayout.contains(&mid.index()));
        assert!(requests.relayout.contains(&root.index()));
        assert!(requests.bounds.is_empty(), "bounds are requested separately");
    }

    #[test]
    fn bounds_and_repaint_stay_local() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let leaf = store.create_node();
        store.add_child(root, leaf);
        let _ = store.drain_requests();

        store.request_bounds_update(leaf);
        store.request_repaint(leaf);
        let requests = store.drain_requests();
        assert_eq!(requests.bounds, [leaf.index()]);
        assert_eq!(requests.repaint, [leaf.index()]);
        assert!(requests.relayout.is_empty(), "no layout was requested");
    }

    #[test]
    fn drain_resets_state() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.request_repaint(id);
        let first = store.drain_requests();
        assert!(first.topology_changed);
        assert!(!first.repaint.is_empty());
        assert!(store.drain_requests().is_empty());
    }
}
