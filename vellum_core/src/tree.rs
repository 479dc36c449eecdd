// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the resource graph and its host render tree.
//!
//! The resource graph owns no nodes. It reads structure and style from the
//! host and writes back nothing but requests:
//!
//! - **Style**: [`resource_references`](RenderTree::resource_references)
//!   yields the nine computed reference ids of a node;
//!   [`container_kind`](RenderTree::container_kind) and
//!   [`resource_id`](RenderTree::resource_id) describe the definition a
//!   container node carries.
//!
//! - **Structure**: [`parent`](RenderTree::parent) and
//!   [`children`](RenderTree::children) are walked by the cycle breaker and by
//!   ancestor invalidation.
//!
//! - **Geometry**: [`object_bounding_box`](RenderTree::object_bounding_box)
//!   feeds bounding-box unit mode.
//!
//! - **Requests**: [`request_relayout`](RenderTree::request_relayout),
//!   [`request_bounds_update`](RenderTree::request_bounds_update), and
//!   [`request_repaint`](RenderTree::request_repaint) are issued while
//!   propagating an invalidation. They must not call back into the resource
//!   graph; hosts queue them and act in their next layout or paint pass.
//!
//! [`NodeStore`](crate::node::NodeStore) is the in-crate implementation.

use kurbo::Rect;

use crate::node::NodeId;
use crate::resource::{ResourceId, ResourceKind, ResourceReferences};

/// The render-tree operations the resource graph depends on.
pub trait RenderTree {
    /// Returns the computed resource references of `node`.
    fn resource_references(&self, node: NodeId) -> ResourceReferences;

    /// Returns the parent of `node`, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the children of `node` in document order.
    fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_;

    /// Returns the kind of resource `node` defines, or `None` if it is not a
    /// resource container node.
    fn container_kind(&self, node: NodeId) -> Option<ResourceKind>;

    /// Returns the id under which a container node registers.
    fn resource_id(&self, node: NodeId) -> Option<ResourceId>;

    /// Returns the object bounding box of `node` in its local space.
    fn object_bounding_box(&self, node: NodeId) -> Rect;

    /// Asks the host to lay `node` out again.
    fn request_relayout(&mut self, node: NodeId);

    /// Asks the host to recompute the bounding boxes of `node`.
    fn request_bounds_update(&mut self, node: NodeId);

    /// Asks the host to repaint `node`.
    fn request_repaint(&mut self, node: NodeId);
}
