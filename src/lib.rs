//! Product-model compiler.
//!
//! Reads the layered product model (vision, domains, capabilities, flows and
//! the rest) from one source directory, checks that every cross-reference
//! resolves, and writes a fixed set of derived artifacts: JSON projections,
//! property-graph import tables and diagram sources. Public functions here
//! form the contract the `compile-model` binary and the integration tests
//! depend on.

pub mod config;
pub mod emit;
pub mod error;
pub mod loader;
pub mod model;
pub mod output;
pub mod pipeline;
pub(crate) mod schema_loader;
pub mod validate;

pub use config::{CompileConfig, ConfigOverrides, find_model_root};
pub use emit::{ARTIFACT_PATHS, Artifact, render_artifacts};
pub use error::{CompileError, Result};
pub use loader::{Layer, load_layer, load_model};
pub use model::{CompiledModel, EntityKind, IdIndex, canonicalize};
pub use output::persist_artifacts;
pub use pipeline::{Outcome, Stage, run};
pub use validate::{Issue, IssueLevel, Normalized, normalize};
