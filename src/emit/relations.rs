//! Relationship graph built from the relations layer only.
//!
//! Only ids that appear in some relation become diagram nodes. Labels use the
//! display name of the modeled entity when one exists and the id as authored
//! otherwise, so unmodeled externals still render.

use crate::emit::text::{dot_label, mermaid_label};
use crate::model::{CompiledModel, IdIndex, canonicalize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

/// Connected nodes sorted by canonical id; one edge per relation, sorted.
#[derive(Clone, Debug, Default)]
pub struct RelationsGraph {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

pub fn emit_relations_graph(model: &CompiledModel, index: &IdIndex) -> RelationsGraph {
    let mut nodes: BTreeMap<String, String> = BTreeMap::new();
    let mut edges = Vec::with_capacity(model.relations.len());
    for relation in &model.relations {
        let from = canonicalize(&relation.from);
        let to = canonicalize(&relation.to);
        for (canonical, raw) in [(&from, &relation.from), (&to, &relation.to)] {
            nodes.entry(canonical.clone()).or_insert_with(|| {
                index
                    .display_name(canonical)
                    .map(str::to_string)
                    .unwrap_or_else(|| raw.clone())
            });
        }
        edges.push(DiagramEdge {
            from,
            to,
            label: relation.kind.clone(),
        });
    }
    edges.sort();

    RelationsGraph {
        nodes: nodes
            .into_iter()
            .map(|(id, label)| DiagramNode { id, label })
            .collect(),
        edges,
    }
}

impl RelationsGraph {
    /// Graphviz source: left-to-right, box-shaped nodes keyed by canonical id.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph relations {\n  rankdir=LR;\n  node [shape=box];\n");
        for node in &self.nodes {
            let _ = writeln!(
                out,
                "  \"{}\" [label=\"{}\"];",
                dot_label(&node.id),
                dot_label(&node.label)
            );
        }
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                dot_label(&edge.from),
                dot_label(&edge.to),
                dot_label(&edge.label)
            );
        }
        out.push_str("}\n");
        out
    }

    /// Mermaid flowchart with synthetic keys `n0`, `n1`, ... in node order.
    pub fn to_mermaid(&self) -> String {
        let keys: BTreeMap<&str, String> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), format!("n{idx}")))
            .collect();

        let mut out = String::from("graph LR\n");
        for node in &self.nodes {
            let _ = writeln!(
                out,
                "  {}[\"{}\"]",
                keys[node.id.as_str()],
                mermaid_label(&node.label)
            );
        }
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "  {} -->|\"{}\"| {}",
                keys[edge.from.as_str()],
                mermaid_label(&edge.label),
                keys[edge.to.as_str()]
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compiled::fixtures::sample_model;
    use crate::model::layers::Relation;
    use crate::validate::normalize;

    #[test]
    fn only_connected_ids_become_nodes() {
        let model = sample_model();
        let normalized = normalize(&model);
        let graph = emit_relations_graph(&model, &normalized.index);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["api", "stripe", "web"]);
        assert_eq!(graph.nodes[1].label, "Stripe");
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn unknown_endpoints_keep_their_raw_spelling() {
        let mut model = sample_model();
        model.relations.push(Relation {
            from: "web".to_string(),
            to: "Mail \"Chimp\"".to_string(),
            kind: "notifies".to_string(),
        });
        let normalized = normalize(&model);
        let graph = emit_relations_graph(&model, &normalized.index);

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph relations {\n  rankdir=LR;\n  node [shape=box];\n"));
        assert!(dot.contains("\"mail-chimp-\" [label=\"Mail \\\"Chimp\\\"\"];"));
        assert!(dot.contains("\"web\" -> \"mail-chimp-\" [label=\"notifies\"];"));

        let mmd = graph.to_mermaid();
        assert!(mmd.starts_with("graph LR\n"));
        assert!(mmd.contains("[\"Mail #quot;Chimp#quot;\"]"));
        assert!(mmd.contains("-->|\"notifies\"|"));
        assert!(!mmd.contains("Mail \"Chimp\""));
    }
}
