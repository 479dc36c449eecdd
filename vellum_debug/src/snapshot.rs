// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshot of a resource graph.
//!
//! [`export`] writes one JSON object describing the current state of a
//! [`ResourceGraph`]: registered ids, the pending table, every live container
//! with its clients, and every cached bundle. Entries are sorted so two
//! snapshots of the same state compare equal as text.

use std::io::{self, Write};

use kurbo::Rect;
use serde_json::{Map, Value, json};

use vellum_core::node::NodeId;
use vellum_core::resource::{ContainerId, ResourceGraph, Units};

/// Writes a pretty-printed JSON snapshot of `graph` to `writer`.
pub fn export(graph: &ResourceGraph, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_value(graph))?;
    Ok(())
}

/// Builds the snapshot as a [`Value`].
#[must_use]
pub fn to_value(graph: &ResourceGraph) -> Value {
    let mut registrations: Vec<(String, ContainerId)> = graph
        .registry()
        .registrations()
        .map(|(id, c)| (id.as_str().to_owned(), c))
        .collect();
    registrations.sort();
    let registry: Map<String, Value> = registrations
        .into_iter()
        .map(|(id, c)| (id, container_ref(c)))
        .collect();

    let mut pending: Vec<(String, Vec<NodeId>)> = graph
        .registry()
        .pending()
        .map(|(id, waiting)| (id.as_str().to_owned(), waiting))
        .collect();
    pending.sort();
    let pending: Map<String, Value> = pending
        .into_iter()
        .map(|(id, waiting)| (id, waiting.into_iter().map(node_ref).collect()))
        .collect();

    let containers: Vec<Value> = graph
        .containers()
        .iter()
        .map(|(c, container)| {
            let geometry = container.geometry();
            json!({
                "container": container_ref(c),
                "id": container.id().as_str(),
                "kind": format!("{:?}", container.kind()),
                "node": node_ref(container.node()),
                "registered": container.is_registered(),
                "units": match geometry.units {
                    Units::UserSpaceOnUse => "userSpaceOnUse",
                    Units::ObjectBoundingBox => "objectBoundingBox",
                },
                "content_bounds": rect(geometry.content_bounds),
                "clients": container.clients().into_iter().map(node_ref).collect::<Vec<_>>(),
            })
        })
        .collect();

    let mut consumers: Vec<NodeId> = graph.cache().iter().map(|(n, _)| n).collect();
    consumers.sort_unstable();
    let bundles: Vec<Value> = consumers
        .into_iter()
        .map(|consumer| {
            let mut slots = Map::new();
            if let Some(bundle) = graph.bundle(consumer) {
                for (slot, c) in bundle.iter() {
                    slots.insert(slot.name().to_owned(), container_ref(c));
                }
            }
            for (slot, id) in graph.cache().pending_references(consumer) {
                slots.insert(slot.name().to_owned(), json!({ "pending": id.as_str() }));
            }
            json!({
                "consumer": node_ref(consumer),
                "slots": slots,
            })
        })
        .collect();

    json!({
        "registry": registry,
        "pending": pending,
        "containers": containers,
        "bundles": bundles,
    })
}

fn container_ref(c: ContainerId) -> Value {
    json!(format!("c{}@{}", c.index(), c.generation()))
}

fn node_ref(n: NodeId) -> Value {
    json!(format!("n{}@{}", n.index(), n.generation()))
}

fn rect(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::node::NodeStore;
    use vellum_core::resource::{ResourceId, ResourceKind, ResourceReferences, ResourceSlot};

    #[test]
    fn export_empty_graph() {
        let graph = ResourceGraph::new();
        let mut out = Vec::new();
        export(&graph, &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["registry"], json!({}));
        assert_eq!(parsed["containers"], json!([]));
        assert_eq!(parsed["bundles"], json!([]));
    }

    #[test]
    fn export_reports_resolved_and_pending_slots() {
        let mut tree = NodeStore::new();
        let mut graph = ResourceGraph::new();
        let gradient = tree.create_node();
        tree.set_definition(gradient, ResourceId::new("g"), ResourceKind::LinearGradient);
        let shape = tree.create_node();
        tree.set_references(
            shape,
            ResourceReferences::new()
                .with(ResourceSlot::Fill, "g")
                .with(ResourceSlot::Masker, "missing"),
        );
        graph.node_attached(&mut tree, gradient);
        graph.node_attached(&mut tree, shape);

        let value = to_value(&graph);
        assert_eq!(value["registry"]["g"], "c0@0");
        assert_eq!(value["pending"]["missing"], json!(["n1@0"]));
        assert_eq!(value["containers"][0]["clients"], json!(["n1@0"]));
        assert_eq!(value["containers"][0]["kind"], "LinearGradient");
        let slots = &value["bundles"][0]["slots"];
        assert_eq!(slots["fill"], "c0@0");
        assert_eq!(slots["mask"]["pending"], "missing");
    }
}
