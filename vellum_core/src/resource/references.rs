// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Computed resource references of a consumer node.

use super::id::ResourceId;
use super::kind::ResourceSlot;

/// The nine optional resource ids produced by style resolution for one node.
///
/// This is the input to [`ResourceBundle::build`](super::ResourceBundle::build).
/// An empty id is normalized to "no reference".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceReferences {
    ids: [Option<ResourceId>; ResourceSlot::COUNT],
}

impl ResourceReferences {
    /// Creates a set with no references.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `self` with `slot` referencing `id`.
    #[must_use]
    pub fn with(mut self, slot: ResourceSlot, id: impl Into<ResourceId>) -> Self {
        self.set(slot, Some(id.into()));
        self
    }

    /// Sets or clears the reference in `slot`.
    pub fn set(&mut self, slot: ResourceSlot, id: Option<ResourceId>) {
        self.ids[slot.index()] = id.filter(|id| !id.is_empty());
    }

    /// Returns the id referenced from `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: ResourceSlot) -> Option<&ResourceId> {
        self.ids[slot.index()].as_ref()
    }

    /// Returns `true` if no slot carries a reference.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.iter().all(Option::is_none)
    }

    /// Iterates the non-empty references in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceSlot, &ResourceId)> + '_ {
        ResourceSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|id| (slot, id)))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn empty_ids_are_dropped() {
        let refs = ResourceReferences::new().with(ResourceSlot::Fill, "");
        assert!(refs.is_empty());
        assert_eq!(refs.get(ResourceSlot::Fill), None);
    }

    #[test]
    fn iter_yields_slot_order() {
        let refs = ResourceReferences::new()
            .with(ResourceSlot::Stroke, "s")
            .with(ResourceSlot::Clipper, "c");
        let slots: Vec<_> = refs.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, [ResourceSlot::Clipper, ResourceSlot::Stroke]);
    }
}
