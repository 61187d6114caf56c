//! Denormalized catalog projection consumed by the dashboards.
//!
//! Pure projection: flattens product identity, runtime flags and years, and
//! trimmed views of every structural layer. No validation happens here; the
//! pipeline only calls it after the normalizer reported no errors.

use crate::model::layers::{OwnershipLayer, RuntimeYear};
use crate::model::CompiledModel;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog<'a> {
    pub product: ProductEntry<'a>,
    pub feature_flags: &'a BTreeMap<String, bool>,
    pub years: &'a [RuntimeYear],
    pub domains: Vec<DomainEntry<'a>>,
    pub capabilities: Vec<CapabilityEntry<'a>>,
    pub flows: Vec<FlowEntry<'a>>,
    pub components: Vec<ComponentEntry<'a>>,
    pub services: Vec<ServiceEntry<'a>>,
    pub apis: Vec<ApiEntry<'a>>,
    pub events: Vec<EventEntry<'a>>,
    pub ownership: &'a OwnershipLayer,
    pub epics: Vec<EpicEntry<'a>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductEntry<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub homepage: Option<&'a str>,
    pub repo: Option<&'a str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DomainEntry<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct CapabilityEntry<'a> {
    pub id: &'a str,
    pub domain: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FlowEntry<'a> {
    pub id: &'a str,
    pub actor: Option<&'a str>,
    pub capabilities: &'a [String],
}

/// Component without its containment link.
#[derive(Clone, Debug, Serialize)]
pub struct ComponentEntry<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub tech: &'a [String],
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceEntry<'a> {
    pub id: &'a str,
    pub implements: &'a [String],
}

#[derive(Clone, Debug, Serialize)]
pub struct ApiEntry<'a> {
    pub id: &'a str,
    pub endpoints: &'a [String],
}

#[derive(Clone, Debug, Serialize)]
pub struct EventEntry<'a> {
    pub id: &'a str,
    pub producer: Option<&'a str>,
    pub consumers: &'a [String],
}

#[derive(Clone, Debug, Serialize)]
pub struct EpicEntry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub horizon: Option<&'a str>,
    pub capabilities: &'a [String],
    pub flows: &'a [String],
    pub kpis: &'a [String],
    pub deliverables: &'a [String],
}

pub fn emit_catalog(model: &CompiledModel) -> Catalog<'_> {
    let product = model.product();
    Catalog {
        product: ProductEntry {
            id: &product.id,
            name: &product.name,
            kind: &product.kind,
            homepage: product.homepage.as_deref(),
            repo: product.repo.as_deref(),
        },
        feature_flags: &model.runtime.feature_flags,
        years: &model.runtime.years,
        domains: model
            .domains
            .iter()
            .map(|d| DomainEntry {
                id: &d.id,
                name: d.name.as_deref().unwrap_or(&d.id),
            })
            .collect(),
        capabilities: model
            .capabilities
            .iter()
            .map(|c| CapabilityEntry {
                id: &c.id,
                domain: &c.domain,
                description: c.description.as_deref(),
            })
            .collect(),
        flows: model
            .flows
            .iter()
            .map(|f| FlowEntry {
                id: &f.id,
                actor: f.actor.as_deref(),
                capabilities: &f.capabilities,
            })
            .collect(),
        components: model
            .components
            .iter()
            .map(|c| ComponentEntry {
                id: &c.id,
                kind: &c.kind,
                tech: &c.tech,
            })
            .collect(),
        services: model
            .services
            .iter()
            .map(|s| ServiceEntry {
                id: &s.id,
                implements: &s.implements,
            })
            .collect(),
        apis: model
            .apis
            .iter()
            .map(|a| ApiEntry {
                id: &a.id,
                endpoints: &a.endpoints,
            })
            .collect(),
        events: model
            .events
            .iter()
            .map(|e| EventEntry {
                id: &e.id,
                producer: e.producer.as_deref(),
                consumers: &e.consumers,
            })
            .collect(),
        ownership: &model.ownership,
        epics: model
            .roadmap
            .epics
            .iter()
            .map(|e| EpicEntry {
                id: &e.id,
                title: e.title.as_deref().unwrap_or(&e.id),
                horizon: e.horizon.as_deref(),
                capabilities: &e.capabilities,
                flows: &e.flows,
                kpis: &e.kpis,
                deliverables: &e.deliverables,
            })
            .collect(),
    }
}
