// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Propagating container changes to clients.

use alloc::vec;

use hashbrown::HashSet;

use super::container::ContainerState;
use super::graph::ResourceGraph;
use super::id::ContainerId;
use super::kind::ResourceKind;
use crate::node::NodeId;
use crate::trace::{InvalidationEvent, InvalidationSkippedEvent};
use crate::tree::RenderTree;

/// How far a container change reaches into its clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationScope {
    /// Clients lay out again and recompute their bounds.
    LayoutAndBounds,
    /// Clients recompute their bounds.
    BoundsOnly,
    /// Clients repaint.
    RepaintOnly,
    /// Only container clients are notified, and only so that they drop
    /// their cached per-client data. Other clients receive nothing.
    ParentOnly,
}

enum Step {
    Enter(ContainerId, InvalidationScope),
    Exit(ContainerId),
}

impl ResourceGraph {
    /// Propagates a change of `container` to its clients.
    ///
    /// Clients that are themselves containers are invalidated with the same
    /// scope; every other client receives the host request matching
    /// `scope`. Each container is entered at most once per call, even when
    /// it is reachable along several paths, and a container already
    /// propagating an invalidation ignores further ones until it is done, so
    /// reference loops terminate. Every visited container drops its
    /// per-client cache when its propagation finishes.
    ///
    /// Propagation runs on an explicit work stack and does not recurse.
    pub fn invalidate<T: RenderTree>(
        &mut self,
        tree: &mut T,
        container: ContainerId,
        scope: InvalidationScope,
    ) {
        let mut stack = vec![Step::Enter(container, scope)];
        let mut visited: HashSet<ContainerId> = HashSet::new();
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(current, scope) => {
                    let Some(rc) = self.containers.get_mut(current) else {
                        continue;
                    };
                    if rc.state == ContainerState::Invalidating || !visited.insert(current) {
                        self.tracer
                            .invalidation_skipped(&InvalidationSkippedEvent {
                                container: current,
                                scope,
                            });
                        continue;
                    }
                    rc.state = ContainerState::Invalidating;
                    let clients = rc.clients();
                    self.tracer.invalidation(&InvalidationEvent {
                        container: current,
                        scope,
                        clients: clients.len(),
                    });

                    stack.push(Step::Exit(current));
                    // Reverse so nested containers are entered in handle order.
                    for &client in clients.iter().rev() {
                        if let Some(nested) = self.containers.by_node(client) {
                            stack.push(Step::Enter(nested, scope));
                        }
                    }
                    for client in clients {
                        if self.containers.by_node(client).is_none() {
                            request(tree, client, scope);
                        }
                    }
                }
                Step::Exit(current) => {
                    if let Some(rc) = self.containers.get_mut(current) {
                        rc.clear_client_caches();
                        rc.state = ContainerState::Idle;
                    }
                }
            }
        }
    }

    /// Reports that `node` was laid out again.
    ///
    /// Every container `node` references drops what it cached for `node` and
    /// the matching request is issued: a bounds update when the container
    /// shapes the node's extent (clip, mask, filter), a repaint otherwise.
    /// The nearest ancestor container, whose content just changed, is
    /// invalidated with [`InvalidationScope::RepaintOnly`].
    pub fn client_layout_changed<T: RenderTree>(&mut self, tree: &mut T, node: NodeId) {
        if let Some(bundle) = self.cache.get(node).copied() {
            let mut bounds = false;
            let mut repaint = false;
            for container in bundle.containers() {
                let Some(rc) = self.containers.get_mut(container) else {
                    continue;
                };
                rc.remove_client_from_cache(node);
                match rc.kind() {
                    ResourceKind::Clipper | ResourceKind::Masker | ResourceKind::Filter => {
                        bounds = true;
                    }
                    _ => repaint = true,
                }
            }
            if bounds {
                tree.request_bounds_update(node);
            }
            if repaint {
                tree.request_repaint(node);
            }
        }
        self.invalidate_enclosing_container(tree, node);
    }

    /// Invalidates the nearest container above `node` with
    /// [`InvalidationScope::RepaintOnly`].
    pub(crate) fn invalidate_enclosing_container<T: RenderTree>(
        &mut self,
        tree: &mut T,
        node: NodeId,
    ) {
        let mut cursor = tree.parent(node);
        while let Some(ancestor) = cursor {
            if let Some(container) = self.containers.by_node(ancestor) {
                self.invalidate(tree, container, InvalidationScope::RepaintOnly);
                return;
            }
            cursor = tree.parent(ancestor);
        }
    }
}

fn request<T: RenderTree>(tree: &mut T, client: NodeId, scope: InvalidationScope) {
    match scope {
        InvalidationScope::LayoutAndBounds => {
            tree.request_relayout(client);
            tree.request_bounds_update(client);
        }
        InvalidationScope::BoundsOnly => tree.request_bounds_update(client),
        InvalidationScope::RepaintOnly => tree.request_repaint(client),
        InvalidationScope::ParentOnly => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStore;
    use crate::resource::{ResourceId, ResourceReferences, ResourceSlot};

    fn gradient_with_client(
        tree: &mut NodeStore,
        graph: &mut ResourceGraph,
    ) -> (ContainerId, NodeId) {
        let gradient = tree.create_node();
        tree.set_definition(gradient, ResourceId::new("g"), ResourceKind::RadialGradient);
        let container = graph
            .attach_container(tree, gradient)
            .expect("gradient has an id");
        let shape = tree.create_node();
        tree.set_references(shape, ResourceReferences::new().with(ResourceSlot::Fill, "g"));
        let _ = graph.rebuild(&*tree, shape);
        let _ = tree.drain_requests();
        (container, shape)
    }

    #[test]
    fn scopes_map_to_requests() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let (container, shape) = gradient_with_client(&mut tree, &mut graph);

        graph.invalidate(&mut tree, container, InvalidationScope::BoundsOnly);
        let requests = tree.drain_requests();
        assert_eq!(requests.bounds, vec![shape.index()]);
        assert!(requests.relayout.is_empty());
        assert!(requests.repaint.is_empty());

        graph.invalidate(&mut tree, container, InvalidationScope::RepaintOnly);
        let requests = tree.drain_requests();
        assert_eq!(requests.repaint, vec![shape.index()]);

        graph.invalidate(&mut tree, container, InvalidationScope::ParentOnly);
        assert!(tree.drain_requests().is_empty());

        graph.invalidate(&mut tree, container, InvalidationScope::LayoutAndBounds);
        let requests = tree.drain_requests();
        assert_eq!(requests.relayout, vec![shape.index()]);
        assert_eq!(requests.bounds, vec![shape.index()]);
    }

    #[test]
    fn parent_only_clears_nested_client_caches() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let (outer, shape) = gradient_with_client(&mut tree, &mut graph);
        let pattern = tree.create_node();
        tree.set_definition(pattern, ResourceId::new("p"), ResourceKind::Pattern);
        tree.set_references(pattern, ResourceReferences::new().with(ResourceSlot::Fill, "g"));
        let inner = graph
            .attach_container(&mut tree, pattern)
            .expect("pattern has an id");
        let _ = graph.rebuild(&tree, pattern);
        let user = tree.create_node();
        tree.set_references(user, ResourceReferences::new().with(ResourceSlot::Stroke, "p"));
        let _ = graph.rebuild(&tree, user);
        let _ = tree.drain_requests();

        let rc = graph.container_mut(outer).expect("live container");
        assert!(rc.set_client_data(pattern, 1_u8));
        let rc = graph.container_mut(inner).expect("live container");
        assert!(rc.set_client_data(user, 2_u8));

        graph.invalidate(&mut tree, outer, InvalidationScope::ParentOnly);
        assert!(tree.drain_requests().is_empty());
        let rc = graph.container(outer).expect("live container");
        assert_eq!(rc.client_data::<u8>(pattern), None);
        assert!(rc.has_client(shape));
        let rc = graph.container(inner).expect("live container");
        assert_eq!(rc.client_data::<u8>(user), None);
        assert!(rc.has_client(user));
        assert_eq!(rc.state(), ContainerState::Idle);
    }

    #[test]
    fn invalidation_drops_client_data_and_returns_idle() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let (container, shape) = gradient_with_client(&mut tree, &mut graph);
        let rc = graph.container_mut(container).expect("live container");
        assert!(rc.set_client_data(shape, 42_u8));

        graph.invalidate(&mut tree, container, InvalidationScope::RepaintOnly);
        let rc = graph.container(container).expect("live container");
        assert_eq!(rc.client_data::<u8>(shape), None);
        assert_eq!(rc.state(), ContainerState::Idle);
        assert!(rc.has_client(shape));
    }

    #[test]
    fn layout_change_repaints_paint_server_clients() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let (container, shape) = gradient_with_client(&mut tree, &mut graph);
        let rc = graph.container_mut(container).expect("live container");
        assert!(rc.set_client_data(shape, 1_u8));

        graph.client_layout_changed(&mut tree, shape);
        let requests = tree.drain_requests();
        assert_eq!(requests.repaint, vec![shape.index()]);
        assert!(requests.bounds.is_empty());
        let rc = graph.container(container).expect("live container");
        assert_eq!(rc.client_data::<u8>(shape), None);
    }

    #[test]
    fn layout_change_inside_container_repaints_its_clients() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let clip = tree.create_node();
        let path = tree.create_node();
        tree.add_child(clip, path);
        tree.set_definition(clip, ResourceId::new("c"), ResourceKind::Clipper);
        let _ = graph.attach_container(&mut tree, clip);
        let shape = tree.create_node();
        tree.set_references(shape, ResourceReferences::new().with(ResourceSlot::Clipper, "c"));
        let _ = graph.rebuild(&tree, shape);
        let _ = tree.drain_requests();

        graph.client_layout_changed(&mut tree, path);
        assert_eq!(tree.drain_requests().repaint, vec![shape.index()]);
    }
}
