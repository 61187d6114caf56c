//! Reads layer documents from the model source directory.
//!
//! One call per layer, each independent of the others. A missing, unreadable
//! or unparseable file is a load failure; a parseable file that does not fit
//! its layer contract is a shape violation. Both are fatal and surface before
//! any cross-reference validation runs.

use crate::error::{CompileError, Result};
use crate::model::CompiledModel;
use crate::model::layers::{
    ApisLayer, CapabilitiesLayer, ComponentsLayer, DomainsLayer, EventsLayer, FlowsLayer,
    InfrastructureLayer, OwnershipLayer, RelationsLayer, RoadmapLayer, RuntimeLayer,
    ServicesLayer, SlasLayer, VisionLayer,
};
use crate::schema_loader::validate_layer_document;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// Tried in order; JSON documents are also valid YAML.
const LAYER_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// The 14 layer documents, in load order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Layer {
    Vision,
    Domains,
    Capabilities,
    Flows,
    Components,
    Services,
    Apis,
    Events,
    Slas,
    Infrastructure,
    Relations,
    Runtime,
    Ownership,
    Roadmap,
}

impl Layer {
    pub const ALL: [Layer; 14] = [
        Layer::Vision,
        Layer::Domains,
        Layer::Capabilities,
        Layer::Flows,
        Layer::Components,
        Layer::Services,
        Layer::Apis,
        Layer::Events,
        Layer::Slas,
        Layer::Infrastructure,
        Layer::Relations,
        Layer::Runtime,
        Layer::Ownership,
        Layer::Roadmap,
    ];

    /// Layer name, also the file stem under the source directory.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Vision => "vision",
            Layer::Domains => "domains",
            Layer::Capabilities => "capabilities",
            Layer::Flows => "flows",
            Layer::Components => "components",
            Layer::Services => "services",
            Layer::Apis => "apis",
            Layer::Events => "events",
            Layer::Slas => "slas",
            Layer::Infrastructure => "infrastructure",
            Layer::Relations => "relations",
            Layer::Runtime => "runtime",
            Layer::Ownership => "ownership",
            Layer::Roadmap => "roadmap",
        }
    }

    /// Open layers accept unknown top-level keys and carry them through.
    pub fn is_open(self) -> bool {
        matches!(self, Layer::Runtime | Layer::Ownership | Layer::Roadmap)
    }

    /// Candidate file paths for this layer, in lookup order.
    pub fn candidate_paths(self, source_dir: &Path) -> Vec<PathBuf> {
        LAYER_EXTENSIONS
            .iter()
            .map(|ext| source_dir.join(format!("{}.{ext}", self.as_str())))
            .collect()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locate the document for `layer`, preferring `.yaml` over `.yml` over `.json`.
pub fn locate_layer(source_dir: &Path, layer: Layer) -> Result<PathBuf> {
    let candidates = layer.candidate_paths(source_dir);
    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .cloned()
        .ok_or_else(|| CompileError::Load {
            layer,
            path: candidates[0].clone(),
            reason: "file not found".to_string(),
        })
}

/// Read one layer document into its typed shape.
pub fn load_layer<T: DeserializeOwned>(source_dir: &Path, layer: Layer) -> Result<T> {
    let path = locate_layer(source_dir, layer)?;
    let text = fs::read_to_string(&path).map_err(|err| CompileError::Load {
        layer,
        path: path.clone(),
        reason: err.to_string(),
    })?;
    let document: Value = serde_yaml::from_str(&text).map_err(|err| CompileError::Load {
        layer,
        path: path.clone(),
        reason: format!("not parseable as YAML: {err}"),
    })?;

    validate_layer_document(layer, &path, &document)?;

    let typed = serde_json::from_value(document).map_err(|err| CompileError::Shape {
        layer,
        path: path.clone(),
        details: vec![format!("  {err}")],
    })?;
    debug!(layer = layer.as_str(), path = %path.display(), "layer loaded");
    Ok(typed)
}

/// Load all 14 layers; the first failure aborts the whole load.
pub fn load_model(source_dir: &Path) -> Result<CompiledModel> {
    let vision: VisionLayer = load_layer(source_dir, Layer::Vision)?;
    let domains: DomainsLayer = load_layer(source_dir, Layer::Domains)?;
    let capabilities: CapabilitiesLayer = load_layer(source_dir, Layer::Capabilities)?;
    let flows: FlowsLayer = load_layer(source_dir, Layer::Flows)?;
    let components: ComponentsLayer = load_layer(source_dir, Layer::Components)?;
    let services: ServicesLayer = load_layer(source_dir, Layer::Services)?;
    let apis: ApisLayer = load_layer(source_dir, Layer::Apis)?;
    let events: EventsLayer = load_layer(source_dir, Layer::Events)?;
    let slas: SlasLayer = load_layer(source_dir, Layer::Slas)?;
    let infrastructure: InfrastructureLayer = load_layer(source_dir, Layer::Infrastructure)?;
    let relations: RelationsLayer = load_layer(source_dir, Layer::Relations)?;
    let runtime: RuntimeLayer = load_layer(source_dir, Layer::Runtime)?;
    let ownership: OwnershipLayer = load_layer(source_dir, Layer::Ownership)?;
    let roadmap: RoadmapLayer = load_layer(source_dir, Layer::Roadmap)?;

    Ok(CompiledModel {
        vision,
        domains: domains.domains,
        capabilities: capabilities.capabilities,
        flows: flows.flows,
        components: components.components,
        services: services.services,
        apis: apis.apis,
        events: events.events,
        slas: slas.slas,
        infrastructure: infrastructure.infrastructure,
        relations: relations.relations,
        runtime,
        ownership,
        roadmap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layers::Capability;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_a_load_failure() {
        let dir = TempDir::new().unwrap();
        let err = load_layer::<DomainsLayer>(dir.path(), Layer::Domains).unwrap_err();
        match err {
            CompileError::Load { layer, path, .. } => {
                assert_eq!(layer, Layer::Domains);
                assert!(path.ends_with("domains.yaml"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unparseable_text_is_a_load_failure_not_a_shape_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("domains.yaml"), "domains: [unclosed\n").unwrap();
        let err = load_layer::<DomainsLayer>(dir.path(), Layer::Domains).unwrap_err();
        assert!(matches!(err, CompileError::Load { .. }), "got {err}");
    }

    #[test]
    fn wrong_shape_is_a_shape_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("domains.yaml"), "domains:\n  - name: nope\n").unwrap();
        let err = load_layer::<DomainsLayer>(dir.path(), Layer::Domains).unwrap_err();
        assert!(matches!(err, CompileError::Shape { layer: Layer::Domains, .. }));
        assert!(err.to_string().contains("domains layer"));
    }

    #[test]
    fn falls_back_to_json_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("capabilities.json"),
            r#"{"capabilities": [{"id": "pay.checkout", "domain": "payments"}]}"#,
        )
        .unwrap();
        let layer: CapabilitiesLayer = load_layer(dir.path(), Layer::Capabilities).unwrap();
        let caps: Vec<Capability> = layer.capabilities;
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].domain, "payments");
    }

    #[test]
    fn only_runtime_ownership_and_roadmap_are_open() {
        let open: Vec<&str> = Layer::ALL
            .iter()
            .filter(|layer| layer.is_open())
            .map(|layer| layer.as_str())
            .collect();
        assert_eq!(open, vec!["runtime", "ownership", "roadmap"]);
    }
}
