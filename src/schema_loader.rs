//! Embedded JSON Schema contracts for the layer documents.
//!
//! Each layer ships its structural contract under `schema/layers/`; the files
//! are compiled into the binary so a deployed compiler can never drift from
//! the shapes it was built against. Validation here is structural only and
//! knows nothing about cross-layer references.

use crate::error::{CompileError, Result};
use crate::loader::Layer;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::path::Path;

/// Raw schema text for a layer.
pub(crate) fn layer_schema_source(layer: Layer) -> &'static str {
    match layer {
        Layer::Vision => include_str!("../schema/layers/vision.schema.json"),
        Layer::Domains => include_str!("../schema/layers/domains.schema.json"),
        Layer::Capabilities => include_str!("../schema/layers/capabilities.schema.json"),
        Layer::Flows => include_str!("../schema/layers/flows.schema.json"),
        Layer::Components => include_str!("../schema/layers/components.schema.json"),
        Layer::Services => include_str!("../schema/layers/services.schema.json"),
        Layer::Apis => include_str!("../schema/layers/apis.schema.json"),
        Layer::Events => include_str!("../schema/layers/events.schema.json"),
        Layer::Slas => include_str!("../schema/layers/slas.schema.json"),
        Layer::Infrastructure => include_str!("../schema/layers/infrastructure.schema.json"),
        Layer::Relations => include_str!("../schema/layers/relations.schema.json"),
        Layer::Runtime => include_str!("../schema/layers/runtime.schema.json"),
        Layer::Ownership => include_str!("../schema/layers/ownership.schema.json"),
        Layer::Roadmap => include_str!("../schema/layers/roadmap.schema.json"),
    }
}

/// Parse and compile the embedded schema for `layer`.
pub(crate) fn compile_layer_schema(layer: Layer) -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(layer_schema_source(layer)).map_err(|err| CompileError::Schema {
            layer,
            reason: format!("parsing embedded schema: {err}"),
        })?;
    check_unknown_key_policy(layer, &schema)?;
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|err| CompileError::Schema {
            layer,
            reason: format!("compiling embedded schema: {err}"),
        })
}

/// Closed layers must reject unknown root keys; open layers must not.
fn check_unknown_key_policy(layer: Layer, schema: &Value) -> Result<()> {
    let rejects_unknown = schema.get("additionalProperties") == Some(&Value::Bool(false));
    if rejects_unknown == layer.is_open() {
        let expected = if layer.is_open() { "open" } else { "closed" };
        return Err(CompileError::Schema {
            layer,
            reason: format!("schema does not follow the {expected} unknown-key policy"),
        });
    }
    Ok(())
}

/// Check a parsed document against its layer contract.
///
/// Every violation is collected, not just the first, so a single run shows
/// the author everything that is wrong with the file.
pub(crate) fn validate_layer_document(layer: Layer, path: &Path, document: &Value) -> Result<()> {
    let schema = compile_layer_schema(layer)?;
    if let Err(errors) = schema.validate(document) {
        let details = errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    format!("  at /: {err}")
                } else {
                    format!("  at {pointer}: {err}")
                }
            })
            .collect::<Vec<_>>();
        return Err(CompileError::Shape {
            layer,
            path: path.to_path_buf(),
            details,
        });
    }
    Ok(())
}
