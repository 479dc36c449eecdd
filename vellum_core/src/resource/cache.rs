// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-consumer bundle cache and the rebuild / teardown operations on it.

use alloc::vec::Vec;

use hashbrown::HashMap;

use super::bundle::{BuiltBundle, ResourceBundle};
use super::graph::ResourceGraph;
use super::id::{ContainerId, ResourceId};
use super::kind::ResourceSlot;
use crate::node::NodeId;
use crate::trace::{ClientPendingEvent, ClientResolvedEvent, ContainerDestroyedEvent};
use crate::tree::RenderTree;

/// Resolution state of one reference slot of a consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// The consumer does not reference anything through this slot.
    Unresolved,
    /// The consumer references an id that no acceptable container satisfies
    /// yet; it waits in the pending table.
    PendingLookup,
    /// The slot is bound to a live container.
    Resolved(ContainerId),
    /// The reference resolved, but binding it would have closed a cycle, so
    /// the slot was left empty when the bundle was built.
    CycleBroken,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CacheEntry {
    pub(crate) bundle: ResourceBundle,
    pub(crate) pending: Vec<(ResourceSlot, ResourceId)>,
    /// Slots cleared by the cycle breaker.
    pub(crate) broken: Vec<ResourceSlot>,
}

/// Maps each consumer with at least one resource reference to its bundle.
///
/// Consumers with no references have no entry.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<NodeId, CacheEntry>,
}

impl ResourceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bundle of `consumer`.
    #[must_use]
    pub fn get(&self, consumer: NodeId) -> Option<&ResourceBundle> {
        self.entries.get(&consumer).map(|e| &e.bundle)
    }

    /// Returns the references of `consumer` that are waiting for an id.
    #[must_use]
    pub fn pending_references(&self, consumer: NodeId) -> &[(ResourceSlot, ResourceId)] {
        self.entries
            .get(&consumer)
            .map_or(&[][..], |e| e.pending.as_slice())
    }

    /// Returns the resolution state of one slot of `consumer`.
    #[must_use]
    pub fn slot_state(&self, consumer: NodeId, slot: ResourceSlot) -> SlotState {
        let Some(entry) = self.entries.get(&consumer) else {
            return SlotState::Unresolved;
        };
        if let Some(container) = entry.bundle.get(slot) {
            SlotState::Resolved(container)
        } else if entry.pending.iter().any(|(s, _)| *s == slot) {
            SlotState::PendingLookup
        } else if entry.broken.contains(&slot) {
            SlotState::CycleBroken
        } else {
            SlotState::Unresolved
        }
    }

    /// Returns `true` if `consumer` has an entry.
    #[must_use]
    pub fn contains(&self, consumer: NodeId) -> bool {
        self.entries.contains_key(&consumer)
    }

    /// Returns the number of cached consumers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no consumer is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(consumer, bundle)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ResourceBundle)> + '_ {
        self.entries.iter().map(|(&n, e)| (n, &e.bundle))
    }

    pub(crate) fn entry_mut(&mut self, consumer: NodeId) -> Option<&mut CacheEntry> {
        self.entries.get_mut(&consumer)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl ResourceGraph {
    /// Rebuilds the bundle of `consumer` from its current references.
    ///
    /// The previous bundle is dropped first: `consumer` leaves the client set
    /// of every container it referenced and its pending entries are removed.
    /// The new bundle is stored before cycles are checked, so the cycle
    /// breaker sees it, and `consumer` joins the client set of every
    /// container that survives.
    ///
    /// Rebuilding with unchanged references yields the same bundle and the
    /// same client sets. Returns the new bundle, or `None` if the consumer
    /// references nothing.
    pub fn rebuild<T: RenderTree>(&mut self, tree: &T, consumer: NodeId) -> Option<ResourceBundle> {
        let references = tree.resource_references(consumer);
        self.remove_bundle(consumer);

        let BuiltBundle { bundle, pending } =
            ResourceBundle::build(&mut self.registry, &self.containers, consumer, &references);
        for (slot, id) in &pending {
            self.tracer.client_pending(&ClientPendingEvent {
                consumer,
                slot: *slot,
                id,
            });
        }
        if bundle.is_empty() && pending.is_empty() {
            return None;
        }
        self.cache.entries.insert(
            consumer,
            CacheEntry {
                bundle,
                pending,
                broken: Vec::new(),
            },
        );

        self.resolve_cycles(tree, consumer);

        let bundle = self.cache.get(consumer).copied().unwrap_or_default();
        for (slot, container) in bundle.iter() {
            self.containers
                .validated_mut(container)
                .add_client(consumer);
            self.tracer.client_resolved(&ClientResolvedEvent {
                consumer,
                slot,
                container,
            });
        }
        Some(bundle)
    }

    /// Drops the bundle of `consumer`.
    ///
    /// `consumer` leaves every client set and every pending entry. Call this
    /// when a consumer is destroyed; [`node_detached`](Self::node_detached)
    /// does so as part of its work.
    pub fn remove_bundle(&mut self, consumer: NodeId) {
        let Some(entry) = self.cache.entries.remove(&consumer) else {
            return;
        };
        for container in entry.bundle.containers() {
            let removed = self
                .containers
                .get_mut(container)
                .is_some_and(|c| c.remove_client(consumer));
            debug_assert!(
                removed,
                "{consumer:?} was not a client of bundled container {container:?}"
            );
        }
        for (_, id) in &entry.pending {
            self.registry.remove_pending_client(id, consumer);
        }
    }

    /// Demotes every client of `container` to pending on its id.
    ///
    /// Each client has the slots referencing `container` cleared, is recorded
    /// as pending on the container's id, and receives exactly one
    /// bounds-update request. The container ends with no clients.
    pub(crate) fn resource_destroyed<T: RenderTree>(&mut self, tree: &mut T, container: ContainerId) {
        let current = self.containers.validated_mut(container);
        let id = current.id().clone();
        let clients = current.clients();
        for &client in &clients {
            let _ = current.remove_client(client);
        }

        for &client in &clients {
            if let Some(entry) = self.cache.entry_mut(client) {
                for slot in entry.bundle.clear_container(container) {
                    entry.pending.push((slot, id.clone()));
                }
                self.registry.add_pending_client(&id, client);
            }
            tree.request_bounds_update(client);
        }

        self.tracer.container_destroyed(&ContainerDestroyedEvent {
            id: &id,
            container,
            clients: clients.len(),
        });
    }
}
