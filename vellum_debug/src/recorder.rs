// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends an owned
//! [`RecordedEvent`] per call. Clones share one log, so a test can keep a
//! clone, hand the other to a [`Tracer`](vellum_core::trace::Tracer), and
//! read the events afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use vellum_core::node::NodeId;
use vellum_core::resource::{ContainerId, InvalidationScope, ResourceId, ResourceKind, ResourceSlot};
use vellum_core::trace::{
    ClientPendingEvent, ClientResolvedEvent, ContainerDestroyedEvent, CycleBrokenEvent,
    InvalidationEvent, InvalidationSkippedEvent, RegisteredEvent, TraceSink, UnregisteredEvent,
};

/// An owned copy of one trace event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A container was registered.
    Registered {
        /// The id registered.
        id: ResourceId,
        /// The registered container.
        container: ContainerId,
        /// Its kind.
        kind: ResourceKind,
        /// Container that held the id before.
        displaced: Option<ContainerId>,
        /// Number of consumers that were waiting.
        waiting: usize,
    },
    /// An id mapping was removed.
    Unregistered {
        /// The id removed.
        id: ResourceId,
        /// The container it mapped to.
        container: ContainerId,
    },
    /// A reference was left pending.
    ClientPending {
        /// The consumer.
        consumer: NodeId,
        /// The slot.
        slot: ResourceSlot,
        /// The id waited for.
        id: ResourceId,
    },
    /// A reference bound to a container.
    ClientResolved {
        /// The consumer.
        consumer: NodeId,
        /// The slot.
        slot: ResourceSlot,
        /// The container bound.
        container: ContainerId,
    },
    /// A reference was dropped to break a cycle.
    CycleBroken {
        /// The consumer.
        consumer: NodeId,
        /// The cleared slot.
        slot: ResourceSlot,
        /// The container dropped.
        container: ContainerId,
    },
    /// A container started propagating an invalidation.
    Invalidation {
        /// The container.
        container: ContainerId,
        /// The scope.
        scope: InvalidationScope,
        /// Number of clients.
        clients: usize,
    },
    /// A re-entrant invalidation was ignored.
    InvalidationSkipped {
        /// The container.
        container: ContainerId,
        /// The ignored scope.
        scope: InvalidationScope,
    },
    /// A container was destroyed.
    ContainerDestroyed {
        /// Its id.
        id: ResourceId,
        /// The container.
        container: ContainerId,
        /// Number of clients demoted to pending.
        clients: usize,
    },
}

/// A [`TraceSink`] that keeps every event in a shared in-memory log.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    log: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.log.borrow().clone()
    }

    /// Returns the number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    fn push(&self, event: RecordedEvent) {
        self.log.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_registered(&mut self, e: &RegisteredEvent<'_>) {
        self.push(RecordedEvent::Registered {
            id: e.id.clone(),
            container: e.container,
            kind: e.kind,
            displaced: e.displaced,
            waiting: e.waiting,
        });
    }

    fn on_unregistered(&mut self, e: &UnregisteredEvent<'_>) {
        self.push(RecordedEvent::Unregistered {
            id: e.id.clone(),
            container: e.container,
        });
    }

    fn on_client_pending(&mut self, e: &ClientPendingEvent<'_>) {
        self.push(RecordedEvent::ClientPending {
            consumer: e.consumer,
            slot: e.slot,
            id: e.id.clone(),
        });
    }

    fn on_client_resolved(&mut self, e: &ClientResolvedEvent) {
        self.push(RecordedEvent::ClientResolved {
            consumer: e.consumer,
            slot: e.slot,
            container: e.container,
        });
    }

    fn on_cycle_broken(&mut self, e: &CycleBrokenEvent) {
        self.push(RecordedEvent::CycleBroken {
            consumer: e.consumer,
            slot: e.slot,
            container: e.container,
        });
    }

    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        self.push(RecordedEvent::Invalidation {
            container: e.container,
            scope: e.scope,
            clients: e.clients,
        });
    }

    fn on_invalidation_skipped(&mut self, e: &InvalidationSkippedEvent) {
        self.push(RecordedEvent::InvalidationSkipped {
            container: e.container,
            scope: e.scope,
        });
    }

    fn on_container_destroyed(&mut self, e: &ContainerDestroyedEvent<'_>) {
        self.push(RecordedEvent::ContainerDestroyed {
            id: e.id.clone(),
            container: e.container,
            clients: e.clients,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::node::NodeStore;
    use vellum_core::resource::{ResourceGraph, ResourceReferences};
    use vellum_core::trace::Tracer;

    #[test]
    fn clones_share_the_log() {
        let recorder = RecorderSink::new();
        let mut other = recorder.clone();
        other.on_invalidation_skipped(&InvalidationSkippedEvent {
            container: dummy_container(),
            scope: InvalidationScope::ParentOnly,
        });
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.take().len(), 1);
        assert!(other.is_empty());
    }

    fn dummy_container() -> ContainerId {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let node = tree.create_node();
        tree.set_definition(node, ResourceId::new("d"), ResourceKind::Clipper);
        graph.attach_container(&mut tree, node).unwrap()
    }

    #[test]
    fn records_cycle_break_and_destroy() {
        let recorder = RecorderSink::new();
        let mut graph = ResourceGraph::with_tracer(Tracer::new(Box::new(recorder.clone())));
        let mut tree = NodeStore::new();

        let clip = tree.create_node();
        let inner = tree.create_node();
        tree.add_child(clip, inner);
        tree.set_definition(clip, ResourceId::new("clip1"), ResourceKind::Clipper);
        tree.set_references(inner, ResourceReferences::new().with(ResourceSlot::Clipper, "clip1"));
        graph.node_attached(&mut tree, clip);
        graph.node_attached(&mut tree, inner);
        let c = graph.containers().by_node(clip).unwrap();

        let events = recorder.take();
        assert!(events.contains(&RecordedEvent::CycleBroken {
            consumer: inner,
            slot: ResourceSlot::Clipper,
            container: c,
        }));

        graph.node_detached(&mut tree, inner);
        graph.node_detached(&mut tree, clip);
        assert_eq!(
            recorder.events(),
            [
                RecordedEvent::ContainerDestroyed {
                    id: ResourceId::new("clip1"),
                    container: c,
                    clients: 0,
                },
                RecordedEvent::Unregistered {
                    id: ResourceId::new("clip1"),
                    container: c,
                },
            ]
        );
    }
}
