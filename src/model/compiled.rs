//! The compiled model: every layer loaded, nothing mutated afterwards.
//!
//! Emitters and the normalizer only ever borrow this aggregate. Entity-kind
//! polymorphism goes through `Entity`, a borrowed tagged union with a common
//! identity projection, so no consumer needs per-kind field access to build
//! generic node shapes.

use crate::model::identity::{EntityKind, canonicalize};
use crate::model::layers::{
    Api, Capability, Component, Domain, Event, Flow, InfraResource, OwnershipLayer, Persona,
    Product, Relation, RoadmapLayer, RuntimeLayer, Service, Sla, VisionLayer,
};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
/// Fully loaded aggregate of the 14 layers, one field per layer.
pub struct CompiledModel {
    pub vision: VisionLayer,
    pub domains: Vec<Domain>,
    pub capabilities: Vec<Capability>,
    pub flows: Vec<Flow>,
    pub components: Vec<Component>,
    pub services: Vec<Service>,
    pub apis: Vec<Api>,
    pub events: Vec<Event>,
    pub slas: Vec<Sla>,
    pub infrastructure: Vec<InfraResource>,
    pub relations: Vec<Relation>,
    pub runtime: RuntimeLayer,
    pub ownership: OwnershipLayer,
    pub roadmap: RoadmapLayer,
}

/// Borrowed view of one modeled entity.
#[derive(Clone, Copy, Debug)]
pub enum Entity<'a> {
    Product(&'a Product),
    Domain(&'a Domain),
    Persona(&'a Persona),
    Capability(&'a Capability),
    Flow(&'a Flow),
    Component(&'a Component),
    Service(&'a Service),
    Api(&'a Api),
    Event(&'a Event),
}

/// Common identity projection shared by every entity kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity<'a> {
    pub kind: EntityKind,
    /// Canonical id used for every lookup and every emitted key.
    pub id: String,
    /// Id as authored, kept for display.
    pub raw_id: &'a str,
    /// Display name; falls back to the authored id.
    pub name: &'a str,
    pub entity_type: Option<&'a str>,
    /// Canonical owning domain, only set for capabilities.
    pub domain: Option<String>,
}

impl<'a> Entity<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Product(_) => EntityKind::Product,
            Entity::Domain(_) => EntityKind::Domain,
            Entity::Persona(_) => EntityKind::Persona,
            Entity::Capability(_) => EntityKind::Capability,
            Entity::Flow(_) => EntityKind::Flow,
            Entity::Component(_) => EntityKind::Component,
            Entity::Service(_) => EntityKind::Service,
            Entity::Api(_) => EntityKind::Api,
            Entity::Event(_) => EntityKind::Event,
        }
    }

    pub fn raw_id(&self) -> &'a str {
        match *self {
            Entity::Product(p) => &p.id,
            Entity::Domain(d) => &d.id,
            Entity::Persona(p) => &p.id,
            Entity::Capability(c) => &c.id,
            Entity::Flow(f) => &f.id,
            Entity::Component(c) => &c.id,
            Entity::Service(s) => &s.id,
            Entity::Api(a) => &a.id,
            Entity::Event(e) => &e.id,
        }
    }

    pub fn identity(&self) -> Identity<'a> {
        let raw_id = self.raw_id();
        let (name, entity_type, domain) = match *self {
            Entity::Product(p) => (Some(p.name.as_str()), Some(p.kind.as_str()), None),
            Entity::Domain(d) => (d.name.as_deref(), None, None),
            Entity::Persona(p) => (Some(p.name.as_str()), None, None),
            Entity::Capability(c) => (c.name.as_deref(), None, Some(canonicalize(&c.domain))),
            Entity::Flow(f) => (f.name.as_deref(), None, None),
            Entity::Component(c) => (c.name.as_deref(), Some(c.kind.as_str()), None),
            Entity::Service(s) => (s.name.as_deref(), None, None),
            Entity::Api(a) => (a.name.as_deref(), Some(a.kind.as_str()), None),
            Entity::Event(e) => (e.name.as_deref(), None, None),
        };
        Identity {
            kind: self.kind(),
            id: canonicalize(raw_id),
            raw_id,
            name: name.unwrap_or(raw_id),
            entity_type,
            domain,
        }
    }
}

impl CompiledModel {
    pub fn product(&self) -> &Product {
        &self.vision.product
    }

    pub fn personas(&self) -> &[Persona] {
        &self.vision.personas
    }

    /// Every modeled entity in synthesis order: product, domains, personas,
    /// capabilities, flows, components, services, apis, events.
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        std::iter::once(Entity::Product(&self.vision.product))
            .chain(self.domains.iter().map(Entity::Domain))
            .chain(self.vision.personas.iter().map(Entity::Persona))
            .chain(self.capabilities.iter().map(Entity::Capability))
            .chain(self.flows.iter().map(Entity::Flow))
            .chain(self.components.iter().map(Entity::Component))
            .chain(self.services.iter().map(Entity::Service))
            .chain(self.apis.iter().map(Entity::Api))
            .chain(self.events.iter().map(Entity::Event))
    }

    pub fn entity_count(&self) -> usize {
        self.entities().count()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::{Value, json};

    fn layer<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).expect("fixture layer")
    }

    /// Small but complete model shared by emitter and normalizer tests.
    pub(crate) fn sample_model() -> CompiledModel {
        CompiledModel {
            vision: layer(json!({
                "product": {"id": "Shop", "name": "Shop \"Prime\"", "type": "web-platform"},
                "personas": [{"id": "buyer", "name": "Buyer", "intent": "buy things"}]
            })),
            domains: layer(json!([
                {"id": "payments", "name": "Payments"},
                {"id": "Catalog"}
            ])),
            capabilities: layer(json!([
                {"id": "pay.checkout", "domain": "payments"},
                {"id": "pay.refund", "domain": "Payments"},
                {"id": "catalog.browse", "domain": "catalog", "name": "Browse, search"}
            ])),
            flows: layer(json!([
                {"id": "purchase", "actor": "buyer", "capabilities": ["catalog.browse", "pay.checkout"]}
            ])),
            components: layer(json!([
                {"id": "web", "type": "ui", "tech": ["react"]},
                {"id": "api", "type": "backend-module", "parent": "web"},
                {"id": "cms", "type": "content-store"},
                {"id": "stripe", "name": "Stripe", "type": "external-system", "tech": ["rest"]}
            ])),
            services: layer(json!([
                {"id": "svc-pay", "implements": ["pay.checkout"], "providedBy": ["api"]}
            ])),
            apis: layer(json!([
                {"id": "public-api", "type": "rest", "endpoints": ["/orders"]}
            ])),
            events: layer(json!([
                {"id": "order-placed", "producer": "svc-pay", "consumers": ["api"]}
            ])),
            slas: Vec::new(),
            infrastructure: Vec::new(),
            relations: layer(json!([
                {"from": "web", "to": "api", "type": "calls"},
                {"from": "api", "to": "Stripe", "type": "pays-through"}
            ])),
            runtime: RuntimeLayer::default(),
            ownership: OwnershipLayer::default(),
            roadmap: layer(json!({
                "epics": [
                    {"id": "E1", "horizon": "now", "capabilities": ["pay.checkout", "pay.refund", "catalog.browse"]},
                    {"id": "e2", "capabilities": ["PAY.CHECKOUT", "ghost.capability"]}
                ]
            })),
        }
    }
}
