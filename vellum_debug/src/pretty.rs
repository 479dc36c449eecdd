// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use vellum_core::resource::ContainerId;
use vellum_core::trace::{
    ClientPendingEvent, ClientResolvedEvent, ContainerDestroyedEvent, CycleBrokenEvent,
    InvalidationEvent, InvalidationSkippedEvent, RegisteredEvent, TraceSink, UnregisteredEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn container(c: ContainerId) -> String {
    format!("c{}@{}", c.index(), c.generation())
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_registered(&mut self, e: &RegisteredEvent<'_>) {
        let displaced = e
            .displaced
            .map_or_else(|| "-".to_owned(), container);
        let _ = writeln!(
            self.writer,
            "[register] {} -> {} kind={:?} displaced={} waiting={}",
            e.id,
            container(e.container),
            e.kind,
            displaced,
            e.waiting,
        );
    }

    fn on_unregistered(&mut self, e: &UnregisteredEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[unregister] {} -x {}",
            e.id,
            container(e.container),
        );
    }

    fn on_client_pending(&mut self, e: &ClientPendingEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[pending] node={} {} waits for {}",
            e.consumer.index(),
            e.slot.name(),
            e.id,
        );
    }

    fn on_client_resolved(&mut self, e: &ClientResolvedEvent) {
        let _ = writeln!(
            self.writer,
            "[resolve] node={} {} -> {}",
            e.consumer.index(),
            e.slot.name(),
            container(e.container),
        );
    }

    fn on_cycle_broken(&mut self, e: &CycleBrokenEvent) {
        let _ = writeln!(
            self.writer,
            "[cycle] node={} {} dropped {}",
            e.consumer.index(),
            e.slot.name(),
            container(e.container),
        );
    }

    fn on_invalidation(&mut self, e: &InvalidationEvent) {
        let _ = writeln!(
            self.writer,
            "[invalidate] {} scope={:?} clients={}",
            container(e.container),
            e.scope,
            e.clients,
        );
    }

    fn on_invalidation_skipped(&mut self, e: &InvalidationSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[invalidate:skip] {} scope={:?} (already invalidating)",
            container(e.container),
            e.scope,
        );
    }

    fn on_container_destroyed(&mut self, e: &ContainerDestroyedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[destroy] {} {} demoted={}",
            e.id,
            container(e.container),
            e.clients,
        );
    }
}
