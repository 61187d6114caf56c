//! Property-graph export (node and edge tables) for graph-store bulk import.
//!
//! Nodes come from every modeled entity; edges from the structural links the
//! model implies plus every explicit relation. Both tables are deduplicated
//! and sorted so repeated runs produce identical files.

use crate::emit::text::push_csv_row;
use crate::model::{CompiledModel, IdIndex, canonicalize};
use std::collections::{BTreeMap, BTreeSet};

pub const NODES_HEADER: [&str; 5] = ["id:ID", "label", "name", "type", "domain"];
pub const EDGES_HEADER: [&str; 3] = [":START_ID", ":END_ID", "type"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRow {
    pub id: String,
    pub label: &'static str,
    pub name: String,
    pub node_type: String,
    pub domain: String,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeRow {
    pub start: String,
    pub end: String,
    pub kind: String,
}

#[derive(Clone, Debug, Default)]
pub struct PropertyGraph {
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
}

#[derive(Default)]
struct EdgeSet(BTreeSet<EdgeRow>);

impl EdgeSet {
    fn add(&mut self, from: &str, to: &str, kind: &str) {
        self.0.insert(EdgeRow {
            start: canonicalize(from),
            end: canonicalize(to),
            kind: kind.to_string(),
        });
    }
}

/// Synthesize the node and edge tables.
///
/// A node id reachable through several kinds keeps the first kind in
/// synthesis order; its name and capability domain come from `index`, which
/// applies the same first-declaration rule. Edges are unique per
/// (start, end, type).
pub fn emit_property_graph(model: &CompiledModel, index: &IdIndex) -> PropertyGraph {
    let mut nodes: BTreeMap<String, NodeRow> = BTreeMap::new();
    for entity in model.entities() {
        let identity = entity.identity();
        if nodes.contains_key(&identity.id) {
            continue;
        }
        let name = index.display_name(&identity.id).unwrap_or(identity.name);
        let domain = match identity.domain {
            Some(_) => index.capability_domain(identity.raw_id).unwrap_or_default(),
            None => "",
        };
        nodes.insert(
            identity.id.clone(),
            NodeRow {
                label: identity.kind.label(),
                name: name.to_string(),
                node_type: identity.entity_type.unwrap_or_default().to_string(),
                domain: domain.to_string(),
                id: identity.id,
            },
        );
    }

    let mut edges = EdgeSet::default();
    for cap in &model.capabilities {
        edges.add(&cap.id, &cap.domain, "IN_DOMAIN");
    }
    for flow in &model.flows {
        if let Some(actor) = &flow.actor {
            edges.add(&flow.id, actor, "ACTOR");
        }
        for cap in &flow.capabilities {
            edges.add(&flow.id, cap, "USES");
        }
    }
    for component in &model.components {
        if let Some(parent) = &component.parent {
            edges.add(&component.id, parent, "PART_OF");
        }
    }
    for service in &model.services {
        for cap in &service.implements {
            edges.add(&service.id, cap, "IMPLEMENTS");
        }
        for component in &service.provided_by {
            edges.add(&service.id, component, "PROVIDED_BY");
        }
    }
    for event in &model.events {
        if let Some(producer) = &event.producer {
            edges.add(producer, &event.id, "PRODUCES");
        }
        for consumer in &event.consumers {
            edges.add(consumer, &event.id, "CONSUMES");
        }
    }
    for relation in &model.relations {
        edges.add(&relation.from, &relation.to, &relation.kind);
    }

    PropertyGraph {
        nodes: nodes.into_values().collect(),
        edges: edges.0.into_iter().collect(),
    }
}

impl PropertyGraph {
    pub fn nodes_csv(&self) -> String {
        let mut out = String::new();
        push_csv_row(&mut out, &NODES_HEADER);
        for node in &self.nodes {
            push_csv_row(
                &mut out,
                &[
                    node.id.as_str(),
                    node.label,
                    node.name.as_str(),
                    node.node_type.as_str(),
                    node.domain.as_str(),
                ],
            );
        }
        out
    }

    pub fn edges_csv(&self) -> String {
        let mut out = String::new();
        push_csv_row(&mut out, &EDGES_HEADER);
        for edge in &self.edges {
            push_csv_row(
                &mut out,
                &[edge.start.as_str(), edge.end.as_str(), edge.kind.as_str()],
            );
        }
        out
    }
}
