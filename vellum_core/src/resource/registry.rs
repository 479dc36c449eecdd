// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-scoped id directory and pending table.

use alloc::vec::Vec;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use super::id::{ContainerId, ResourceId};
use crate::node::NodeId;

/// The outcome of [`ResourceRegistry::register`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registration {
    /// The container that held the id before, if it was a different one.
    pub displaced: Option<ContainerId>,
    /// Consumers that were waiting for the id, in the order they started
    /// waiting. The pending entry has been cleared; each of them needs a
    /// rebuild.
    pub waiting: Vec<NodeId>,
}

/// Maps resource ids to their defining containers and tracks consumers whose
/// references do not resolve yet.
///
/// The registry does not rebuild anything itself.
/// [`ResourceGraph`](super::ResourceGraph) acts on the [`Registration`]
/// returned by [`register`](Self::register).
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    containers: HashMap<ResourceId, ContainerId>,
    /// Consumers waiting on each id, keyed to the sequence number of the
    /// insertion that added them.
    pending: HashMap<ResourceId, HashMap<NodeId, u64>>,
    next_seq: u64,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `id` to `container`, replacing any earlier mapping, and takes the
    /// consumers pending on `id`.
    pub fn register(&mut self, id: ResourceId, container: ContainerId) -> Registration {
        let waiting = self.take_pending_clients(&id);
        let displaced = self
            .containers
            .insert(id, container)
            .filter(|&previous| previous != container);
        Registration { displaced, waiting }
    }

    /// Removes the mapping for `id`, returning the container it pointed to.
    pub fn unregister(&mut self, id: &ResourceId) -> Option<ContainerId> {
        self.containers.remove(id)
    }

    /// Returns the container registered under `id`.
    #[must_use]
    pub fn lookup(&self, id: &ResourceId) -> Option<ContainerId> {
        self.containers.get(id).copied()
    }

    /// Records that `consumer` references `id` but nothing satisfies it.
    ///
    /// Adding the same consumer twice keeps a single entry at its first
    /// position.
    pub fn add_pending_client(&mut self, id: &ResourceId, consumer: NodeId) {
        let seq = self.next_seq;
        let waiting = self.pending.entry(id.clone()).or_default();
        if let Entry::Vacant(slot) = waiting.entry(consumer) {
            slot.insert(seq);
            self.next_seq += 1;
        }
    }

    /// Removes `consumer` from the consumers pending on `id`.
    pub fn remove_pending_client(&mut self, id: &ResourceId, consumer: NodeId) {
        if let Some(waiting) = self.pending.get_mut(id) {
            waiting.remove(&consumer);
            if waiting.is_empty() {
                self.pending.remove(id);
            }
        }
    }

    /// Removes and returns every consumer pending on `id`, in the order they
    /// started waiting.
    pub fn take_pending_clients(&mut self, id: &ResourceId) -> Vec<NodeId> {
        self.pending
            .remove(id)
            .map(|waiting| in_order(&waiting))
            .unwrap_or_default()
    }

    /// Returns the consumers pending on `id`, in the order they started
    /// waiting.
    #[must_use]
    pub fn pending_clients(&self, id: &ResourceId) -> Vec<NodeId> {
        self.pending.get(id).map(in_order).unwrap_or_default()
    }

    /// Returns the number of consumers pending on `id`.
    #[must_use]
    pub fn pending_count(&self, id: &ResourceId) -> usize {
        self.pending.get(id).map_or(0, HashMap::len)
    }

    /// Returns `true` if `consumer` is pending on `id`.
    #[must_use]
    pub fn is_pending(&self, id: &ResourceId, consumer: NodeId) -> bool {
        self.pending
            .get(id)
            .is_some_and(|waiting| waiting.contains_key(&consumer))
    }

    /// Iterates the registered `(id, container)` pairs in arbitrary order.
    pub fn registrations(&self) -> impl Iterator<Item = (&ResourceId, ContainerId)> + '_ {
        self.containers.iter().map(|(id, &c)| (id, c))
    }

    /// Iterates the pending ids in arbitrary order, each with its waiting
    /// consumers in the order they started waiting.
    pub fn pending(&self) -> impl Iterator<Item = (&ResourceId, Vec<NodeId>)> + '_ {
        self.pending.iter().map(|(id, w)| (id, in_order(w)))
    }

    /// Drops every registration and pending entry.
    pub fn clear(&mut self) {
        self.containers.clear();
        self.pending.clear();
    }
}

fn in_order(waiting: &HashMap<NodeId, u64>) -> Vec<NodeId> {
    let mut entries: Vec<(u64, NodeId)> = waiting.iter().map(|(&n, &seq)| (seq, n)).collect();
    entries.sort_unstable();
    entries.into_iter().map(|(_, n)| n).collect()
}
