//! Product-model wiring.
//!
//! Types here mirror the layer documents under the model source directory.
//! `CompiledModel` is the loaded aggregate, `Entity` the per-kind tagged view
//! and `IdIndex` the shared id space every stage after loading consults.

pub mod compiled;
pub mod identity;
pub mod index;
pub mod layers;

pub use compiled::{CompiledModel, Entity, Identity};
pub use identity::{ComponentType, EntityKind, canonicalize};
pub use index::{DuplicateId, IdIndex};
pub use layers::{
    Api, Capability, Component, Domain, Epic, Event, Flow, InfraResource, OwnershipLayer, Persona,
    Product, Relation, RoadmapLayer, RuntimeLayer, RuntimeYear, Service, Sla, VisionLayer,
};
