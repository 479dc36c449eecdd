// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for render requests.
//!
//! [`NodeStore`](crate::node::NodeStore) records the requests issued by the
//! resource graph through [`RenderTree`](crate::tree::RenderTree) as marks on
//! [`understory_dirty`] channels. Each channel is an independent category of
//! follow-up work for the host's layout and paint passes.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`LAYOUT`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges from
//!   parent to child. A relayout request on a node marks every ancestor too,
//!   since a container's geometry depends on the geometry of its content.
//!
//! - **Local-only**: [`BOUNDS`] and [`REPAINT`] are marked with the default
//!   policy. Only the requested node appears in the drain output.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on topology mutations
//!   (add/remove child, create/destroy node).
//!
//! # Consumption
//!
//! [`NodeStore::drain_requests`](crate::node::NodeStore::drain_requests)
//! drains all channels and surfaces the results as
//! [`RenderRequests`](crate::node::RenderRequests).

use understory_dirty::Channel;

/// Relayout requested: propagates to ancestors.
pub const LAYOUT: Channel = Channel::new(0);

/// Bounding-box update requested: no propagation.
pub const BOUNDS: Channel = Channel::new(1);

/// Repaint requested: no propagation.
pub const REPAINT: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
