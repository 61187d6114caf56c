//! Fatal error taxonomy for a compile run.
//!
//! Load failures and shape violations abort before any validation issue is
//! collected; `Validation` is raised only after every issue has been logged.

use std::path::PathBuf;
use thiserror::Error;

use crate::loader::Layer;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to load {layer} layer from {path}: {reason}")]
    Load {
        layer: Layer,
        path: PathBuf,
        reason: String,
    },

    #[error("{layer} layer in {path} does not match its schema:\n{}", .details.join("\n"))]
    Shape {
        layer: Layer,
        path: PathBuf,
        details: Vec<String>,
    },

    #[error("embedded schema for {layer} layer is unusable: {reason}")]
    Schema { layer: Layer, reason: String },

    #[error("model has {errors} cross-reference error(s); no artifacts written")]
    Validation { errors: usize },

    #[error("failed to render {artifact}: {source}")]
    Emit {
        artifact: String,
        source: serde_json::Error,
    },

    #[error("failed to persist artifacts:\n{}", .failures.join("\n"))]
    Persist { failures: Vec<String> },

    #[error("invalid configuration: {0}")]
    Config(String),
}
