// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The resource graph facade.

use super::bundle::ResourceBundle;
use super::cache::{ResourceCache, SlotState};
use super::container::{ContainerStore, ResourceContainer};
use super::id::ContainerId;
use super::kind::ResourceSlot;
use super::registry::ResourceRegistry;
use crate::node::NodeId;
use crate::trace::Tracer;
use crate::tree::RenderTree;

/// Document-scoped state for resource references.
///
/// Owns the id registry, every live container, and the per-consumer bundle
/// cache. The host render tree is passed to each operation and is only read,
/// except for the `request_*` calls issued during invalidation.
///
/// The lifecycle hooks are [`node_attached`](Self::node_attached),
/// [`node_detached`](Self::node_detached),
/// [`client_style_changed`](Self::client_style_changed),
/// [`client_layout_changed`](Self::client_layout_changed),
/// [`container_id_changed`](Self::container_id_changed), and
/// [`container_content_changed`](Self::container_content_changed).
#[derive(Debug, Default)]
pub struct ResourceGraph {
    pub(crate) registry: ResourceRegistry,
    pub(crate) containers: ContainerStore,
    pub(crate) cache: ResourceCache,
    pub(crate) tracer: Tracer,
}

impl ResourceGraph {
    /// Creates an empty graph with tracing disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph that reports to `tracer`.
    #[must_use]
    pub fn with_tracer(tracer: Tracer) -> Self {
        Self {
            tracer,
            ..Self::default()
        }
    }

    /// Replaces the tracer.
    pub fn set_tracer(&mut self, tracer: Tracer) {
        self.tracer = tracer;
    }

    /// Returns the id registry and pending table.
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Returns the live containers.
    #[must_use]
    pub fn containers(&self) -> &ContainerStore {
        &self.containers
    }

    /// Returns the bundle cache.
    #[must_use]
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Returns the container for `id`, or `None` if the handle is stale.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&ResourceContainer> {
        self.containers.get(id)
    }

    /// Mutable access to a container's per-client data.
    #[must_use]
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut ResourceContainer> {
        self.containers.get_mut(id)
    }

    /// Returns the bundle of `consumer`.
    #[must_use]
    pub fn bundle(&self, consumer: NodeId) -> Option<&ResourceBundle> {
        self.cache.get(consumer)
    }

    /// Returns the resolution state of one slot of `consumer`.
    #[must_use]
    pub fn slot_state(&self, consumer: NodeId, slot: ResourceSlot) -> SlotState {
        self.cache.slot_state(consumer, slot)
    }

    /// Brings a node that entered the tree into the graph.
    ///
    /// A container node is attached and registered first, then the node's
    /// own references are resolved.
    pub fn node_attached<T: RenderTree>(&mut self, tree: &mut T, node: NodeId) {
        if tree.container_kind(node).is_some() && self.containers.by_node(node).is_none() {
            let _ = self.attach_container(tree, node);
        }
        let _ = self.rebuild(&*tree, node);
    }

    /// Removes a node that is leaving the tree.
    ///
    /// A container node is destroyed first (its clients fall back to
    /// pending), then the node's own bundle is dropped.
    pub fn node_detached<T: RenderTree>(&mut self, tree: &mut T, node: NodeId) {
        self.detach_container(tree, node);
        self.remove_bundle(node);
    }

    /// Reports that the computed references of `node` changed.
    ///
    /// The bundle is rebuilt and the node is asked to lay out again.
    pub fn client_style_changed<T: RenderTree>(&mut self, tree: &mut T, node: NodeId) {
        let _ = self.rebuild(&*tree, node);
        tree.request_relayout(node);
    }

    /// Drops all registrations, containers, and bundles.
    ///
    /// Issues no requests. Every outstanding [`ContainerId`] becomes stale.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.containers.clear();
        self.registry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStore;
    use crate::resource::{ResourceId, ResourceKind, ResourceReferences};

    #[test]
    fn attach_detach_lifecycle() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let marker = tree.create_node();
        tree.set_definition(marker, ResourceId::new("arrow"), ResourceKind::Marker);
        let path = tree.create_node();
        tree.set_references(
            path,
            ResourceReferences::new()
                .with(ResourceSlot::MarkerStart, "arrow")
                .with(ResourceSlot::MarkerEnd, "arrow"),
        );

        graph.node_attached(&mut tree, marker);
        graph.node_attached(&mut tree, path);
        let container = graph.containers().by_node(marker).expect("marker registered");
        assert_eq!(graph.slot_state(path, ResourceSlot::MarkerEnd), SlotState::Resolved(container));
        assert_eq!(graph.container(container).map(|c| c.client_count()), Some(1));

        graph.node_detached(&mut tree, path);
        assert!(graph.bundle(path).is_none());
        assert_eq!(graph.container(container).map(|c| c.client_count()), Some(0));

        graph.node_detached(&mut tree, marker);
        assert!(graph.container(container).is_none());
        assert_eq!(graph.registry().lookup(&ResourceId::new("arrow")), None);
    }

    #[test]
    fn style_change_requests_relayout() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let shape = tree.create_node();
        let _ = tree.drain_requests();
        tree.set_references(shape, ResourceReferences::new().with(ResourceSlot::Stroke, "s"));
        graph.client_style_changed(&mut tree, shape);
        assert_eq!(
            graph.slot_state(shape, ResourceSlot::Stroke),
            SlotState::PendingLookup
        );
        assert_eq!(tree.drain_requests().relayout, [shape.index()]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let clip = tree.create_node();
        tree.set_definition(clip, ResourceId::new("c"), ResourceKind::Clipper);
        graph.node_attached(&mut tree, clip);
        let shape = tree.create_node();
        tree.set_references(shape, ResourceReferences::new().with(ResourceSlot::Clipper, "c"));
        graph.node_attached(&mut tree, shape);

        graph.clear();
        assert!(graph.containers().is_empty());
        assert!(graph.cache().is_empty());
        assert_eq!(graph.registry().registrations().count(), 0);
    }
}
