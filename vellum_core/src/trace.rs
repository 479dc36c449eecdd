// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the resource graph.
//!
//! This module provides a [`TraceSink`] trait with one method per event that
//! [`ResourceGraph`](crate::resource::ResourceGraph) emits. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Events borrow from the graph, so constructing one costs nothing when
//! tracing is disabled.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use crate::node::NodeId;
use crate::resource::{ContainerId, InvalidationScope, ResourceId, ResourceKind, ResourceSlot};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a container is registered under an id.
#[derive(Clone, Copy, Debug)]
pub struct RegisteredEvent<'a> {
    /// The id registered.
    pub id: &'a ResourceId,
    /// The registered container.
    pub container: ContainerId,
    /// Kind of the registered container.
    pub kind: ResourceKind,
    /// Container that previously held the id, if any.
    pub displaced: Option<ContainerId>,
    /// Number of pending consumers that will be rebuilt.
    pub waiting: usize,
}

/// Emitted when an id mapping is removed.
#[derive(Clone, Copy, Debug)]
pub struct UnregisteredEvent<'a> {
    /// The id removed.
    pub id: &'a ResourceId,
    /// The container it mapped to.
    pub container: ContainerId,
}

/// Emitted when a consumer's reference cannot be resolved and waits in the
/// pending table.
#[derive(Clone, Copy, Debug)]
pub struct ClientPendingEvent<'a> {
    /// The consumer.
    pub consumer: NodeId,
    /// The reference slot.
    pub slot: ResourceSlot,
    /// The id it waits for.
    pub id: &'a ResourceId,
}

/// Emitted when a consumer's reference binds to a container.
#[derive(Clone, Copy, Debug)]
pub struct ClientResolvedEvent {
    /// The consumer.
    pub consumer: NodeId,
    /// The reference slot.
    pub slot: ResourceSlot,
    /// The container bound.
    pub container: ContainerId,
}

/// Emitted when a freshly built reference is dropped to break a cycle.
#[derive(Clone, Copy, Debug)]
pub struct CycleBrokenEvent {
    /// The consumer whose bundle was built.
    pub consumer: NodeId,
    /// The cleared slot.
    pub slot: ResourceSlot,
    /// The container that would have closed the cycle.
    pub container: ContainerId,
}

/// Emitted when a container starts propagating an invalidation.
#[derive(Clone, Copy, Debug)]
pub struct InvalidationEvent {
    /// The invalidated container.
    pub container: ContainerId,
    /// The propagation scope.
    pub scope: InvalidationScope,
    /// Number of clients at the time of the call.
    pub clients: usize,
}

/// Emitted when an invalidation reaches a container that is already
/// propagating one and is ignored.
#[derive(Clone, Copy, Debug)]
pub struct InvalidationSkippedEvent {
    /// The container that was re-entered.
    pub container: ContainerId,
    /// The scope of the ignored call.
    pub scope: InvalidationScope,
}

/// Emitted when a container is destroyed and its clients are demoted to
/// pending.
#[derive(Clone, Copy, Debug)]
pub struct ContainerDestroyedEvent<'a> {
    /// The container's id.
    pub id: &'a ResourceId,
    /// The destroyed container.
    pub container: ContainerId,
    /// Number of clients demoted.
    pub clients: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the resource graph.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a container is registered.
    fn on_registered(&mut self, e: &RegisteredEvent<'_>) {
        _ = e;
    }

    /// Called when an id mapping is removed.
    fn on_unregistered(&mut self, e: &UnregisteredEvent<'_>) {
        _ = e;
    }

    /// Called when a reference is left pending.
    fn on_client_pending(&mut self, e: &ClientPendingEvent<'_>) {
        _ = e;
    }

    /// Called when a reference binds to a container.
    fn on_client_resolved(&mut self, e: &ClientResolvedEvent) {
        _ = e;
    }

    /// Called when a reference is dropped to break a cycle.
    fn on_cycle_broken(&mut self, e: &CycleBrokenEvent) {
        _ = e;
    }

    /// Called when a container begins propagating an invalidation.
    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        _ = e;
    }

    /// Called when a re-entrant invalidation is ignored.
    fn on_invalidation_skipped(&mut self, e: &InvalidationSkippedEvent) {
        _ = e;
    }

    /// Called when a container is destroyed.
    fn on_container_destroyed(&mut self, e: &ContainerDestroyedEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional boxed [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing and
/// the sink passed to [`new`](Self::new) is dropped immediately. When **on**,
/// each method checks the inner `Option` (one branch) before dispatching.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`RegisteredEvent`].
    #[inline]
    pub fn registered(&mut self, e: &RegisteredEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_registered(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UnregisteredEvent`].
    #[inline]
    pub fn unregistered(&mut self, e: &UnregisteredEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_unregistered(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClientPendingEvent`].
    #[inline]
    pub fn client_pending(&mut self, e: &ClientPendingEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_client_pending(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClientResolvedEvent`].
    #[inline]
    pub fn client_resolved(&mut self, e: &ClientResolvedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_client_resolved(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CycleBrokenEvent`].
    #[inline]
    pub fn cycle_broken(&mut self, e: &CycleBrokenEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cycle_broken(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InvalidationEvent`].
    #[inline]
    pub fn invalidation(&mut self, e: &InvalidationEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_invalidation(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InvalidationSkippedEvent`].
    #[inline]
    pub fn invalidation_skipped(&mut self, e: &InvalidationSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_invalidation_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ContainerDestroyedEvent`].
    #[inline]
    pub fn container_destroyed(&mut self, e: &ContainerDestroyedEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_container_destroyed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_container() -> ContainerId {
        ContainerId {
            idx: 3,
            generation: 1,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        let id = ResourceId::new("clip1");
        sink.on_registered(&RegisteredEvent {
            id: &id,
            container: sample_container(),
            kind: ResourceKind::Clipper,
            displaced: None,
            waiting: 0,
        });
        sink.on_invalidation(&InvalidationEvent {
            container: sample_container(),
            scope: InvalidationScope::RepaintOnly,
            clients: 2,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_enabled());
        tracer.cycle_broken(&CycleBrokenEvent {
            consumer: NodeId::from_raw(0, 0),
            slot: ResourceSlot::Clipper,
            container: sample_container(),
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            scopes: Rc<RefCell<Vec<InvalidationScope>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_invalidation(&mut self, e: &InvalidationEvent) {
                self.scopes.borrow_mut().push(e.scope);
            }
        }

        let scopes = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::new(Box::new(RecordingSink {
            scopes: Rc::clone(&scopes),
        }));
        assert!(tracer.is_enabled());
        tracer.invalidation(&InvalidationEvent {
            container: sample_container(),
            scope: InvalidationScope::BoundsOnly,
            clients: 1,
        });
        assert_eq!(*scopes.borrow(), [InvalidationScope::BoundsOnly]);
    }
}
