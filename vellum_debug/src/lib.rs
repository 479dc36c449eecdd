// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and JSON snapshot export for vellum
//! diagnostics.
//!
//! This crate provides [`TraceSink`](vellum_core::trace::TraceSink)
//! implementations and inspection helpers for development and post-mortem
//! analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: an in-memory event log that stays readable
//!   after the sink has been handed to a
//!   [`Tracer`](vellum_core::trace::Tracer).
//! - [`snapshot::export`]: writes the registry, pending table, containers,
//!   and bundles of a [`ResourceGraph`](vellum_core::resource::ResourceGraph)
//!   as JSON.

pub mod pretty;
pub mod recorder;
pub mod snapshot;
