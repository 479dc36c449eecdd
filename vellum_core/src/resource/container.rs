// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource containers, their arena, and container lifecycle.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use kurbo::{Affine, Rect};

use super::graph::ResourceGraph;
use super::id::{ContainerId, ResourceId};
use super::invalidate::InvalidationScope;
use super::kind::ResourceKind;
use crate::node::NodeId;
use crate::trace::{RegisteredEvent, UnregisteredEvent};
use crate::tree::RenderTree;

/// Coordinate system a resource's own geometry is declared in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Units {
    /// Absolute coordinates in the consumer's user space.
    #[default]
    UserSpaceOnUse,
    /// Fractions of the consumer's object bounding box.
    ObjectBoundingBox,
}

/// The geometry a container's content occupies, as computed by the host's
/// layout of the container subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceGeometry {
    /// Unit mode of `content_bounds`.
    pub units: Units,
    /// Bounds of the container's content before any mapping.
    pub content_bounds: Rect,
    /// The container's own transform (for example `clipPath`'s `transform`).
    pub transform: Affine,
}

impl Default for ResourceGeometry {
    fn default() -> Self {
        Self {
            units: Units::UserSpaceOnUse,
            content_bounds: Rect::ZERO,
            transform: Affine::IDENTITY,
        }
    }
}

impl ResourceGeometry {
    /// Maps the content bounds into the local space of a consumer whose
    /// object bounding box is `object_bbox`.
    #[must_use]
    pub fn bounding_box_for(&self, object_bbox: Rect) -> Rect {
        let content = self.transform.transform_rect_bbox(self.content_bounds);
        match self.units {
            Units::UserSpaceOnUse => content,
            Units::ObjectBoundingBox => {
                let to_bbox = Affine::translate(object_bbox.origin().to_vec2())
                    * Affine::scale_non_uniform(object_bbox.width(), object_bbox.height());
                to_bbox.transform_rect_bbox(content)
            }
        }
    }
}

/// Where a container is in its invalidation cycle.
///
/// A container is `Invalidating` from the moment it starts walking its
/// clients until every nested propagation it started has finished. A second
/// invalidation arriving in that window is ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerState {
    /// Not propagating.
    #[default]
    Idle,
    /// Propagating an invalidation to its clients.
    Invalidating,
}

/// Derived data a container keeps for one client.
#[derive(Default)]
struct ClientEntry {
    bounding_box: Option<Rect>,
    data: Option<Box<dyn Any>>,
}

impl fmt::Debug for ClientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientEntry")
            .field("bounding_box", &self.bounding_box)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// A node that defines a reusable effect.
///
/// The container is owned by the graph on behalf of its defining node and is
/// addressed everywhere else by [`ContainerId`]. It knows its clients (the
/// consumers whose bundle references it) and caches per-client derived
/// data until its content changes or the client leaves.
#[derive(Debug)]
pub struct ResourceContainer {
    id: ResourceId,
    kind: ResourceKind,
    node: NodeId,
    registered: bool,
    pub(crate) state: ContainerState,
    clients: HashSet<NodeId>,
    cache: HashMap<NodeId, ClientEntry>,
    geometry: ResourceGeometry,
}

impl ResourceContainer {
    fn new(id: ResourceId, kind: ResourceKind, node: NodeId) -> Self {
        Self {
            id,
            kind,
            node,
            registered: false,
            state: ContainerState::Idle,
            clients: HashSet::new(),
            cache: HashMap::new(),
            geometry: ResourceGeometry::default(),
        }
    }

    /// Returns the id this container was defined with.
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Returns the kind of effect this container defines.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the defining node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns `true` while the registry maps this container's id to it.
    ///
    /// A container displaced by a later definition with the same id stays
    /// alive but unregistered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Returns the invalidation state.
    #[must_use]
    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Returns the content geometry.
    #[must_use]
    pub fn geometry(&self) -> &ResourceGeometry {
        &self.geometry
    }

    /// Returns the number of clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if `consumer` is a client.
    #[must_use]
    pub fn has_client(&self, consumer: NodeId) -> bool {
        self.clients.contains(&consumer)
    }

    /// Returns the clients in handle order.
    #[must_use]
    pub fn clients(&self) -> Vec<NodeId> {
        let mut clients: Vec<NodeId> = self.clients.iter().copied().collect();
        clients.sort_unstable();
        clients
    }

    /// Returns the bounding box of this resource in the local space of
    /// `consumer`.
    ///
    /// The content bounds are mapped through the container's own transform
    /// and, in [`Units::ObjectBoundingBox`] mode, through
    /// `translate(bbox.origin) * scale(bbox.size)` of the consumer's object
    /// bounding box. The result is cached for clients until the container's
    /// content changes or the client's layout changes.
    pub fn resource_bounding_box<T: RenderTree>(&mut self, tree: &T, consumer: NodeId) -> Rect {
        if let Some(bbox) = self.cache.get(&consumer).and_then(|e| e.bounding_box) {
            return bbox;
        }
        let bbox = self
            .geometry
            .bounding_box_for(tree.object_bounding_box(consumer));
        if self.clients.contains(&consumer) {
            self.cache.entry(consumer).or_default().bounding_box = Some(bbox);
        }
        bbox
    }

    /// Stores derived data (a rendered mask, a shader, ...) for a client.
    ///
    /// Returns `false` and drops `data` if `consumer` is not a client.
    pub fn set_client_data<D: Any>(&mut self, consumer: NodeId, data: D) -> bool {
        if !self.clients.contains(&consumer) {
            return false;
        }
        self.cache.entry(consumer).or_default().data = Some(Box::new(data));
        true
    }

    /// Returns the derived data stored for `consumer`, if it has type `D`.
    #[must_use]
    pub fn client_data<D: Any>(&self, consumer: NodeId) -> Option<&D> {
        self.cache
            .get(&consumer)
            .and_then(|e| e.data.as_ref())
            .and_then(|d| d.downcast_ref::<D>())
    }

    /// Drops everything cached for `consumer` without removing it as a
    /// client.
    pub fn remove_client_from_cache(&mut self, consumer: NodeId) {
        self.cache.remove(&consumer);
    }

    pub(crate) fn add_client(&mut self, consumer: NodeId) -> bool {
        self.clients.insert(consumer)
    }

    pub(crate) fn remove_client(&mut self, consumer: NodeId) -> bool {
        self.cache.remove(&consumer);
        self.clients.remove(&consumer)
    }

    pub(crate) fn clear_client_caches(&mut self) {
        self.cache.clear();
    }

    pub(crate) fn set_geometry(&mut self, geometry: ResourceGeometry) {
        self.geometry = geometry;
        for entry in self.cache.values_mut() {
            entry.bounding_box = None;
        }
    }
}

/// Arena of live containers with generational handles.
#[derive(Debug, Default)]
pub struct ContainerStore {
    slots: Vec<Option<ResourceContainer>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    by_node: HashMap<NodeId, ContainerId>,
}

impl ContainerStore {
    /// Returns the container for `id`, or `None` if the handle is stale.
    #[must_use]
    pub fn get(&self, id: ContainerId) -> Option<&ResourceContainer> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_ref()
    }

    /// Mutable variant of [`get`](Self::get).
    #[must_use]
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut ResourceContainer> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_mut()
    }

    /// Returns the container defined by `node`.
    #[must_use]
    pub fn by_node(&self, node: NodeId) -> Option<ContainerId> {
        self.by_node.get(&node).copied()
    }

    /// Returns the number of live containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    /// Returns `true` if there are no live containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Iterates live containers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ContainerId, &ResourceContainer)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let idx = u32::try_from(idx).ok()?;
            slot.as_ref().map(|c| {
                (
                    ContainerId {
                        idx,
                        generation: self.generation[idx as usize],
                    },
                    c,
                )
            })
        })
    }

    /// Returns the live container for `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub(crate) fn validated_mut(&mut self, id: ContainerId) -> &mut ResourceContainer {
        let current = self.generation.get(id.idx as usize).copied();
        match self.get_mut(id) {
            Some(container) => container,
            None => panic!(
                "stale ContainerId: {id:?} (current gen: {})",
                current.unwrap_or(u32::MAX)
            ),
        }
    }

    fn insert(&mut self, container: ResourceContainer) -> ContainerId {
        let node = container.node;
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(container);
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            assert!(idx != u32::MAX, "container arena exhausted");
            self.slots.push(Some(container));
            self.generation.push(0);
            idx
        };
        let id = ContainerId {
            idx,
            generation: self.generation[idx as usize],
        };
        self.by_node.insert(node, id);
        id
    }

    fn remove(&mut self, id: ContainerId) -> Option<ResourceContainer> {
        self.get(id)?;
        let removed = self.slots[id.idx as usize].take()?;
        self.by_node.remove(&removed.node);
        // Bump generation so old handles immediately fail validation.
        self.generation[id.idx as usize] += 1;
        self.free_list.push(id.idx);
        Some(removed)
    }

    pub(crate) fn clear(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.generation[idx] += 1;
                self.free_list.push(u32::try_from(idx).unwrap_or(u32::MAX));
            }
        }
        self.by_node.clear();
    }
}

impl ResourceGraph {
    /// Creates and registers the container defined by `node`.
    ///
    /// The id and kind are read from the tree. A node that is not a
    /// container node, or whose id is empty, defines nothing and `None` is
    /// returned. Consumers pending on the id are rebuilt and asked to lay
    /// out again.
    ///
    /// If the id was already registered to another container, the newest
    /// registration wins: the displaced container is unregistered (it stays
    /// alive for its node), its clients are invalidated with
    /// [`InvalidationScope::LayoutAndBounds`] and rebuilt so they bind to
    /// the new container.
    ///
    /// # Panics
    ///
    /// Panics if `node` already defines a live container.
    pub fn attach_container<T: RenderTree>(
        &mut self,
        tree: &mut T,
        node: NodeId,
    ) -> Option<ContainerId> {
        assert!(
            self.containers.by_node(node).is_none(),
            "node {node:?} already defines a container"
        );
        let kind = tree.container_kind(node)?;
        let id = tree.resource_id(node).filter(|id| !id.is_empty())?;
        let container = self
            .containers
            .insert(ResourceContainer::new(id, kind, node));
        self.register_container(tree, container);
        Some(container)
    }

    /// Destroys the container defined by `node`, if any.
    ///
    /// Every client has the affected slots cleared, waits on the container's
    /// id in the pending table, and receives one bounds-update request. The
    /// id is unregistered if it still maps to this container. The
    /// container's own references are dropped as well.
    pub fn detach_container<T: RenderTree>(&mut self, tree: &mut T, node: NodeId) {
        let Some(container) = self.containers.by_node(node) else {
            return;
        };
        self.resource_destroyed(tree, container);

        let id = self.containers.validated_mut(container).id().clone();
        if self.registry.lookup(&id) == Some(container) {
            self.registry.unregister(&id);
            self.tracer.unregistered(&UnregisteredEvent {
                id: &id,
                container,
            });
        }
        self.remove_bundle(node);

        #[cfg(debug_assertions)]
        self.debug_assert_unreferenced(container);
        self.containers.remove(container);
    }

    /// Re-reads the definition of a container node after its id (or kind)
    /// changed.
    ///
    /// Clients are invalidated with [`InvalidationScope::LayoutAndBounds`],
    /// the old id is unregistered, and the container registers under the
    /// new id. Former clients are rebuilt right away: references to the old
    /// id fall back to pending, and consumers pending on the new id bind to
    /// this container. A kind change, or an id that became empty, replaces
    /// the container entirely.
    pub fn container_id_changed<T: RenderTree>(&mut self, tree: &mut T, node: NodeId) {
        let Some(container) = self.containers.by_node(node) else {
            // The node may have gained a usable id.
            let _ = self.attach_container(tree, node);
            return;
        };
        let new_id = tree.resource_id(node).filter(|id| !id.is_empty());
        let new_kind = tree.container_kind(node);
        let current = self.containers.validated_mut(container);
        let (old_id, old_kind) = (current.id().clone(), current.kind());

        match (new_id, new_kind) {
            (Some(new_id), Some(kind)) if kind == old_kind => {
                if new_id == old_id {
                    return;
                }
                self.invalidate(tree, container, InvalidationScope::LayoutAndBounds);
                let former = self.containers.validated_mut(container).clients();
                if self.registry.lookup(&old_id) == Some(container) {
                    self.registry.unregister(&old_id);
                    self.tracer.unregistered(&UnregisteredEvent {
                        id: &old_id,
                        container,
                    });
                }
                let current = self.containers.validated_mut(container);
                current.id = new_id;
                current.registered = false;
                for client in former {
                    let _ = self.rebuild(tree, client);
                }
                self.register_container(tree, container);
            }
            _ => {
                self.detach_container(tree, node);
                let _ = self.attach_container(tree, node);
                let _ = self.rebuild(tree, node);
            }
        }
    }

    /// Replaces the content geometry of the container defined by `node` and
    /// invalidates its clients with [`InvalidationScope::LayoutAndBounds`].
    pub fn container_content_changed<T: RenderTree>(
        &mut self,
        tree: &mut T,
        node: NodeId,
        geometry: ResourceGeometry,
    ) {
        let Some(container) = self.containers.by_node(node) else {
            return;
        };
        self.containers.validated_mut(container).set_geometry(geometry);
        self.invalidate(tree, container, InvalidationScope::LayoutAndBounds);
    }

    fn register_container<T: RenderTree>(&mut self, tree: &mut T, container: ContainerId) {
        let current = self.containers.validated_mut(container);
        current.registered = true;
        let (id, kind) = (current.id().clone(), current.kind());

        let registration = self.registry.register(id.clone(), container);
        self.tracer.registered(&RegisteredEvent {
            id: &id,
            container,
            kind,
            displaced: registration.displaced,
            waiting: registration.waiting.len(),
        });

        if let Some(displaced) = registration.displaced {
            if let Some(old) = self.containers.get_mut(displaced) {
                old.registered = false;
                self.invalidate(tree, displaced, InvalidationScope::LayoutAndBounds);
                let clients = self.containers.validated_mut(displaced).clients();
                for client in clients {
                    let _ = self.rebuild(tree, client);
                }
            }
        }

        for consumer in registration.waiting {
            let _ = self.rebuild(tree, consumer);
            tree.request_relayout(consumer);
        }
    }

    #[cfg(debug_assertions)]
    fn debug_assert_unreferenced(&self, container: ContainerId) {
        if let Some(c) = self.containers.get(container) {
            debug_assert!(
                c.client_count() == 0,
                "container {container:?} destroyed with {} clients",
                c.client_count()
            );
        }
        debug_assert!(
            self.cache.iter().all(|(_, b)| !b.references(container)),
            "a bundle still references destroyed container {container:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_bounding_box_units_map_unit_square() {
        let geometry = ResourceGeometry {
            units: Units::ObjectBoundingBox,
            content_bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
            transform: Affine::IDENTITY,
        };
        let bbox = Rect::from_origin_size((10.0, 20.0), (100.0, 50.0));
        assert_eq!(
            geometry.bounding_box_for(bbox),
            Rect::new(10.0, 20.0, 110.0, 70.0)
        );
    }

    #[test]
    fn user_space_units_apply_own_transform_only() {
        let geometry = ResourceGeometry {
            units: Units::UserSpaceOnUse,
            content_bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            transform: Affine::translate((5.0, -5.0)),
        };
        let bbox = Rect::from_origin_size((100.0, 100.0), (3.0, 3.0));
        assert_eq!(
            geometry.bounding_box_for(bbox),
            Rect::new(5.0, -5.0, 15.0, 5.0)
        );
    }

    #[test]
    fn client_data_requires_membership() {
        let node = NodeId::from_raw(0, 0);
        let client = NodeId::from_raw(1, 0);
        let mut container = ResourceContainer::new(ResourceId::new("m"), ResourceKind::Masker, node);
        assert!(!container.set_client_data(client, 7_u32));
        assert!(container.add_client(client));
        assert!(container.set_client_data(client, 7_u32));
        assert_eq!(container.client_data::<u32>(client), Some(&7));
        assert_eq!(container.client_data::<i64>(client), None);

        assert!(container.remove_client(client));
        assert_eq!(container.client_data::<u32>(client), None);
        assert_eq!(container.client_count(), 0);
    }

    #[test]
    fn store_detects_stale_handles() {
        let mut store = ContainerStore::default();
        let node = NodeId::from_raw(0, 0);
        let id = store.insert(ResourceContainer::new(
            ResourceId::new("c"),
            ResourceKind::Clipper,
            node,
        ));
        assert_eq!(store.by_node(node), Some(id));
        assert!(store.remove(id).is_some());
        assert!(store.get(id).is_none());
        assert_eq!(store.by_node(node), None);

        let reused = store.insert(ResourceContainer::new(
            ResourceId::new("c"),
            ResourceKind::Clipper,
            node,
        ));
        assert_eq!(reused.idx, id.idx);
        assert_ne!(reused.generation, id.generation);
        assert!(store.get(id).is_none());
    }

    #[test]
    #[should_panic(expected = "stale ContainerId")]
    fn validated_mut_panics_on_stale_handle() {
        let mut store = ContainerStore::default();
        let id = store.insert(ResourceContainer::new(
            ResourceId::new("c"),
            ResourceKind::Filter,
            NodeId::from_raw(0, 0),
        ));
        let _ = store.remove(id);
        let _ = store.validated_mut(id);
    }
}
