// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breaking reference cycles as bundles are built.
//!
//! A freshly built bundle of consumer `X` is checked against the *combined
//! set*: the containers `X` references, the containers among `X`'s tree
//! ancestors, and `X`'s own container if `X` defines one. A referenced
//! container `R` is dropped from the bundle when
//!
//! - `R` is itself an ancestor of `X` (the effect would apply to its own
//!   content), or
//! - `R`'s own bundle, or the bundle of any node below `R`, references a
//!   container in the combined set.
//!
//! The check looks one level into the containers `X` touches. It does not
//! follow their references transitively, so longer loops can still form;
//! invalidation terminates on those through its re-entrancy guard.

use alloc::vec::Vec;

use super::graph::ResourceGraph;
use super::id::ContainerId;
use crate::node::NodeId;
use crate::trace::CycleBrokenEvent;
use crate::tree::RenderTree;

impl ResourceGraph {
    /// Clears every slot of `consumer`'s cached bundle that would close a
    /// cycle.
    pub(crate) fn resolve_cycles<T: RenderTree>(&mut self, tree: &T, consumer: NodeId) {
        let Some(local) = self.cache.get(consumer).map(|b| b.containers()) else {
            return;
        };
        if local.is_empty() {
            return;
        }

        let mut ancestors: Vec<ContainerId> = Vec::new();
        let mut cursor = tree.parent(consumer);
        while let Some(node) = cursor {
            if let Some(c) = self.containers.by_node(node) {
                ancestors.push(c);
            }
            cursor = tree.parent(node);
        }

        let mut combined = local.clone();
        for &c in ancestors
            .iter()
            .chain(self.containers.by_node(consumer).as_ref())
        {
            if !combined.contains(&c) {
                combined.push(c);
            }
        }

        let offending: Vec<ContainerId> = local
            .into_iter()
            .filter(|r| ancestors.contains(r) || self.contains_cycle(tree, *r, &combined))
            .collect();

        let Some(entry) = self.cache.entry_mut(consumer) else {
            return;
        };
        for container in offending {
            for slot in entry.bundle.clear_container(container) {
                entry.broken.push(slot);
                self.tracer.cycle_broken(&CycleBrokenEvent {
                    consumer,
                    slot,
                    container,
                });
            }
        }
    }

    /// Returns `true` if `resource`'s own bundle or any bundle in its subtree
    /// references a container in `combined`.
    fn contains_cycle<T: RenderTree>(
        &self,
        tree: &T,
        resource: ContainerId,
        combined: &[ContainerId],
    ) -> bool {
        let Some(container) = self.containers.get(resource) else {
            return false;
        };
        let hits = |node: NodeId| {
            self.cache
                .get(node)
                .is_some_and(|bundle| bundle.intersects(combined))
        };

        let root = container.node();
        if hits(root) {
            return true;
        }
        let mut stack: Vec<NodeId> = tree.children(root).collect();
        while let Some(node) = stack.pop() {
            if hits(node) {
                return true;
            }
            stack.extend(tree.children(node));
        }
        false
    }
}
