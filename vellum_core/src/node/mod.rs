// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render tree data model.
//!
//! A *node* is an element of a retained vector-graphics render tree. Each
//! node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree.
//! - **Style data** set by the caller:
//!   [`references`](NodeStore::set_references) (the computed `clip-path`,
//!   `mask`, `filter`, marker, paint, and `href` ids),
//!   [`definition`](NodeStore::set_definition) (the resource a container
//!   node defines), and the
//!   [`object bounding box`](NodeStore::set_object_bounding_box).
//!
//! [`NodeStore`] implements [`RenderTree`](crate::tree::RenderTree), so it can
//! host a [`ResourceGraph`](crate::resource::ResourceGraph) directly. Requests
//! the graph issues are collected with
//! [`drain_requests`](NodeStore::drain_requests).

mod id;
mod requests;
mod store;
mod traverse;

pub use id::{INVALID, NodeId};
pub use requests::RenderRequests;
pub use store::NodeStore;
pub use traverse::{Ancestors, Children};
