//! Artifact emitters.
//!
//! Every emitter is a pure function of the compiled model (and the shared id
//! index where it needs lookups). `render_artifacts` fans them out on scoped
//! threads and gathers the rendered files in memory; nothing touches disk
//! until every emitter has finished.

pub mod c4;
pub mod catalog;
pub mod heatmap;
pub mod property_graph;
pub mod relations;
pub mod text;

pub use c4::{C4Diagrams, emit_c4};
pub use catalog::{Catalog, emit_catalog};
pub use heatmap::{Heatmap, HeatmapCell, emit_heatmap};
pub use property_graph::{PropertyGraph, emit_property_graph};
pub use relations::{RelationsGraph, emit_relations_graph};

use crate::error::{CompileError, Result};
use crate::model::{CompiledModel, IdIndex};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;

pub const COMPILED_JSON: &str = "compiled.json";
pub const CATALOG_JSON: &str = "catalog.json";
pub const RUNTIME_JSON: &str = "runtime.json";
pub const OWNERSHIP_JSON: &str = "ownership.json";
pub const ROADMAP_JSON: &str = "roadmap.json";
pub const HEATMAP_JSON: &str = "heatmap.json";
pub const NODES_CSV: &str = "neo4j/nodes.csv";
pub const EDGES_CSV: &str = "neo4j/edges.csv";
pub const RELATIONS_DOT: &str = "graph/relations.dot";
pub const RELATIONS_MMD: &str = "graph/relations.mmd";
pub const C4_CONTEXT_MMD: &str = "graph/c4-context.mmd";
pub const C4_CONTAINER_MMD: &str = "graph/c4-container.mmd";

/// Every artifact a successful run writes, relative to the output directory.
pub const ARTIFACT_PATHS: [&str; 12] = [
    COMPILED_JSON,
    CATALOG_JSON,
    RUNTIME_JSON,
    OWNERSHIP_JSON,
    ROADMAP_JSON,
    HEATMAP_JSON,
    NODES_CSV,
    EDGES_CSV,
    RELATIONS_DOT,
    RELATIONS_MMD,
    C4_CONTEXT_MMD,
    C4_CONTAINER_MMD,
];

/// One rendered file, relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    fn text(path: &str, contents: String) -> Self {
        Self {
            path: PathBuf::from(path),
            contents,
        }
    }

    fn json<T: Serialize>(path: &str, value: &T) -> Result<Self> {
        let mut contents =
            serde_json::to_string_pretty(value).map_err(|source| CompileError::Emit {
                artifact: path.to_string(),
                source,
            })?;
        contents.push('\n');
        Ok(Self::text(path, contents))
    }
}

type EmitJob<'a> = Box<dyn FnOnce() -> Result<Vec<Artifact>> + Send + 'a>;

/// Render every artifact concurrently.
///
/// The jobs share nothing mutable; the output is sorted by path so callers
/// see the same order regardless of which thread finished first.
pub fn render_artifacts(model: &CompiledModel, index: &IdIndex) -> Result<Vec<Artifact>> {
    let jobs: Vec<EmitJob<'_>> = vec![
        Box::new(|| {
            Ok(vec![
                Artifact::json(COMPILED_JSON, model)?,
                Artifact::json(RUNTIME_JSON, &model.runtime)?,
                Artifact::json(OWNERSHIP_JSON, &model.ownership)?,
                Artifact::json(ROADMAP_JSON, &model.roadmap)?,
            ])
        }),
        Box::new(|| Ok(vec![Artifact::json(CATALOG_JSON, &emit_catalog(model))?])),
        Box::new(|| Ok(vec![Artifact::json(HEATMAP_JSON, &emit_heatmap(model, index))?])),
        Box::new(|| {
            let graph = emit_property_graph(model, index);
            Ok(vec![
                Artifact::text(NODES_CSV, graph.nodes_csv()),
                Artifact::text(EDGES_CSV, graph.edges_csv()),
            ])
        }),
        Box::new(|| {
            let graph = emit_relations_graph(model, index);
            Ok(vec![
                Artifact::text(RELATIONS_DOT, graph.to_dot()),
                Artifact::text(RELATIONS_MMD, graph.to_mermaid()),
            ])
        }),
        Box::new(|| {
            let diagrams = emit_c4(model);
            Ok(vec![
                Artifact::text(C4_CONTEXT_MMD, diagrams.context),
                Artifact::text(C4_CONTAINER_MMD, diagrams.container),
            ])
        }),
    ];

    let results: Vec<Result<Vec<Artifact>>> = thread::scope(|scope| {
        let handles: Vec<_> = jobs.into_iter().map(|job| scope.spawn(job)).collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut artifacts = Vec::new();
    for result in results {
        artifacts.extend(result?);
    }
    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compiled::fixtures::sample_model;
    use crate::validate::normalize;
    use std::collections::BTreeSet;

    #[test]
    fn renders_every_artifact_once() {
        let model = sample_model();
        let normalized = normalize(&model);
        let artifacts = render_artifacts(&model, &normalized.index).unwrap();
        let paths: BTreeSet<PathBuf> = artifacts.iter().map(|a| a.path.clone()).collect();
        let expected: BTreeSet<PathBuf> = ARTIFACT_PATHS.iter().map(PathBuf::from).collect();
        assert_eq!(paths, expected);
        assert_eq!(artifacts.len(), ARTIFACT_PATHS.len());
        assert!(artifacts.iter().all(|a| a.contents.ends_with('\n')));
    }

    #[test]
    fn rendering_is_deterministic() {
        let model = sample_model();
        let normalized = normalize(&model);
        let first = render_artifacts(&model, &normalized.index).unwrap();
        let second = render_artifacts(&model, &normalized.index).unwrap();
        assert_eq!(first, second);
    }
}
