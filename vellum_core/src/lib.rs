// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource reference resolution for retained vector-graphics render trees.
//!
//! Visual effects (gradients, patterns, clip paths, masks, filters, markers)
//! are declared by id on a styled node and defined by a *resource container*
//! somewhere else in the same tree. `vellum_core` keeps the graph of those
//! references consistent while the tree mutates: forward references wait in a
//! pending table, cycles are broken when a reference is created, and content
//! changes are propagated to every consumer exactly once per container.
//!
//! `vellum_core` is `no_std` compatible (with `alloc`). Every cross-reference
//! is a generational handle, so a destroyed container is observed as a stale
//! handle rather than a dangling pointer.
//!
//! # Architecture
//!
//! ```text
//!   style change / attach
//!       │
//!       ▼
//!   ResourceGraph::rebuild ──► ResourceBundle::build ──► resolve_cycles
//!       │                         │ (ResourceRegistry,        │
//!       │                         │  pending table)           │
//!       ▼                         ▼                           ▼
//!   ResourceCache  ◄──────── client sets on ResourceContainer
//!       ▲
//!       │ content change / destroy
//!   ResourceGraph::invalidate ──► RenderTree::request_*()
//! ```
//!
//! **[`resource`]**: Registry, containers, bundles, the cache, cycle
//! breaking, and invalidation, tied together by
//! [`ResourceGraph`](resource::ResourceGraph).
//!
//! **[`tree`]**: The [`RenderTree`](tree::RenderTree) contract the
//! resource graph needs from its host render tree.
//!
//! **[`node`]**: A struct-of-arrays render tree with generational handles
//! that implements [`RenderTree`](tree::RenderTree).
//!
//! **[`dirty`]**: Request channels (layout, bounds, repaint, topology) backed
//! by `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! resource-graph instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod node;
pub mod resource;
pub mod trace;
pub mod tree;
