// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource references, containers, and their invalidation.
//!
//! A *container* is a node that defines a reusable effect under an id: a
//! gradient, pattern, clip path, mask, filter, marker, or solid color. A
//! *consumer* is any node whose computed style names containers by id in
//! one of nine [`ResourceSlot`]s.
//!
//! - [`ResourceRegistry`] maps ids to containers and keeps the *pending
//!   table* of consumers whose ids do not resolve yet.
//! - [`ResourceBundle`] is one consumer's resolved view: a [`ContainerId`]
//!   per slot.
//! - [`ResourceCache`] owns the bundles, one per consumer.
//! - [`ResourceContainer`] knows its clients and caches per-client data.
//! - [`ResourceGraph`] ties them together and exposes the lifecycle hooks.
//!
//! Every container handle in a bundle is live and every live handle has the
//! consumer in its client set. Cycles are broken as bundles are built;
//! [`InvalidationScope`] propagation visits each container at most once per
//! call.

mod bundle;
mod cache;
mod container;
mod cycle;
mod graph;
mod id;
mod invalidate;
mod kind;
mod references;
mod registry;

pub use bundle::ResourceBundle;
pub use cache::{ResourceCache, SlotState};
pub use container::{ContainerState, ContainerStore, ResourceContainer, ResourceGeometry, Units};
pub use graph::ResourceGraph;
pub use id::{ContainerId, ResourceId};
pub use invalidate::InvalidationScope;
pub use kind::{ResourceKind, ResourceSlot};
pub use references::ResourceReferences;
pub use registry::{Registration, ResourceRegistry};
