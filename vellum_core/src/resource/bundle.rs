// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved resource references of one consumer.

use alloc::vec::Vec;

use super::container::ContainerStore;
use super::id::{ContainerId, ResourceId};
use super::kind::ResourceSlot;
use super::references::ResourceReferences;
use super::registry::ResourceRegistry;
use crate::node::NodeId;

/// The containers one consumer currently draws with, one optional handle
/// per [`ResourceSlot`].
///
/// Bundles are owned by the [`ResourceCache`](super::ResourceCache) and only
/// ever hold handles of live containers: a container clears every slot that
/// points at it before it is destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    slots: [Option<ContainerId>; ResourceSlot::COUNT],
}

/// A freshly built bundle plus the references that could not be bound.
#[derive(Clone, Debug, Default)]
pub(crate) struct BuiltBundle {
    pub(crate) bundle: ResourceBundle,
    pub(crate) pending: Vec<(ResourceSlot, ResourceId)>,
}

impl ResourceBundle {
    /// Resolves `references` for `consumer`.
    ///
    /// A reference binds when a container is registered under its id and the
    /// container's kind is accepted by the slot. Every other reference is
    /// recorded as pending in `registry` and leaves its slot empty. Paint
    /// slots that end up empty are drawn with the consumer's fallback colour
    /// by the paint pipeline.
    ///
    /// Client sets are not touched here; the cache joins them once cycles
    /// have been broken.
    pub(crate) fn build(
        registry: &mut ResourceRegistry,
        containers: &ContainerStore,
        consumer: NodeId,
        references: &ResourceReferences,
    ) -> BuiltBundle {
        let mut built = BuiltBundle::default();
        for (slot, id) in references.iter() {
            let matching = registry
                .lookup(id)
                .filter(|&c| containers.get(c).is_some_and(|rc| slot.accepts(rc.kind())));
            match matching {
                Some(container) => built.bundle.slots[slot.index()] = Some(container),
                None => {
                    registry.add_pending_client(id, consumer);
                    built.pending.push((slot, id.clone()));
                }
            }
        }
        built
    }

    /// Returns the container bound to `slot`.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: ResourceSlot) -> Option<ContainerId> {
        self.slots[slot.index()]
    }

    /// Returns the clip path container.
    #[must_use]
    pub fn clipper(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::Clipper)
    }

    /// Returns the mask container.
    #[must_use]
    pub fn masker(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::Masker)
    }

    /// Returns the filter container.
    #[must_use]
    pub fn filter(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::Filter)
    }

    /// Returns the start marker container.
    #[must_use]
    pub fn marker_start(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::MarkerStart)
    }

    /// Returns the mid marker container.
    #[must_use]
    pub fn marker_mid(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::MarkerMid)
    }

    /// Returns the end marker container.
    #[must_use]
    pub fn marker_end(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::MarkerEnd)
    }

    /// Returns the fill paint server.
    #[must_use]
    pub fn fill(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::Fill)
    }

    /// Returns the stroke paint server.
    #[must_use]
    pub fn stroke(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::Stroke)
    }

    /// Returns the container this one inherits attributes from.
    #[must_use]
    pub fn linked_resource(&self) -> Option<ContainerId> {
        self.get(ResourceSlot::LinkedResource)
    }

    /// Returns `true` if no slot is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates the bound slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceSlot, ContainerId)> + '_ {
        ResourceSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|c| (slot, c)))
    }

    /// Returns the distinct containers referenced, in first-slot order.
    #[must_use]
    pub fn containers(&self) -> Vec<ContainerId> {
        let mut out: Vec<ContainerId> = Vec::with_capacity(ResourceSlot::COUNT);
        for (_, c) in self.iter() {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    /// Returns `true` if any slot refers to `container`.
    #[must_use]
    pub fn references(&self, container: ContainerId) -> bool {
        self.slots.contains(&Some(container))
    }

    /// Returns `true` if any referenced container is in `set`.
    pub(crate) fn intersects(&self, set: &[ContainerId]) -> bool {
        self.iter().any(|(_, c)| set.contains(&c))
    }

    /// Clears every slot bound to `container`, returning the cleared slots.
    pub(crate) fn clear_container(&mut self, container: ContainerId) -> Vec<ResourceSlot> {
        let mut cleared = Vec::new();
        for slot in ResourceSlot::ALL {
            if self.slots[slot.index()] == Some(container) {
                self.slots[slot.index()] = None;
                cleared.push(slot);
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(idx: u32) -> ContainerId {
        ContainerId { idx, generation: 0 }
    }

    #[test]
    fn containers_are_deduplicated() {
        let mut bundle = ResourceBundle::default();
        bundle.slots[ResourceSlot::MarkerStart.index()] = Some(container(1));
        bundle.slots[ResourceSlot::MarkerEnd.index()] = Some(container(1));
        bundle.slots[ResourceSlot::Clipper.index()] = Some(container(0));
        assert_eq!(bundle.containers(), [container(0), container(1)]);
        assert_eq!(bundle.marker_start(), bundle.marker_end());
        assert_eq!(bundle.marker_mid(), None);
    }

    #[test]
    fn clear_container_reports_every_slot() {
        let mut bundle = ResourceBundle::default();
        bundle.slots[ResourceSlot::Fill.index()] = Some(container(2));
        bundle.slots[ResourceSlot::Stroke.index()] = Some(container(2));
        bundle.slots[ResourceSlot::Filter.index()] = Some(container(3));

        let cleared = bundle.clear_container(container(2));
        assert_eq!(cleared, [ResourceSlot::Fill, ResourceSlot::Stroke]);
        assert!(!bundle.references(container(2)));
        assert_eq!(bundle.filter(), Some(container(3)));
    }

    #[test]
    fn empty_bundle_intersects_nothing() {
        let bundle = ResourceBundle::default();
        assert!(bundle.is_empty());
        assert!(!bundle.intersects(&[container(0)]));
    }
}
