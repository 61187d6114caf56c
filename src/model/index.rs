//! Global id index built once from a compiled model.
//!
//! One canonical id set per entity kind, a union over the referenceable
//! kinds, display names and the capability→domain lookup. The normalizer
//! builds it and every emitter that resolves ids borrows the same instance.

use crate::model::compiled::CompiledModel;
use crate::model::identity::{EntityKind, canonicalize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A second declaration of an id already seen for the same kind.
pub struct DuplicateId {
    pub kind: EntityKind,
    pub raw_id: String,
}

#[derive(Debug, Default)]
pub struct IdIndex {
    by_kind: BTreeMap<EntityKind, BTreeSet<String>>,
    known: BTreeSet<String>,
    names: BTreeMap<String, String>,
    capability_domains: BTreeMap<String, String>,
    duplicates: Vec<DuplicateId>,
}

impl IdIndex {
    /// Index every entity in the model.
    ///
    /// First declaration wins for names and capability domains; later
    /// same-kind declarations are recorded as duplicates rather than failing.
    pub fn build(model: &CompiledModel) -> Self {
        let mut index = IdIndex::default();
        for entity in model.entities() {
            let identity = entity.identity();
            let ids = index.by_kind.entry(identity.kind).or_default();
            if !ids.insert(identity.id.clone()) {
                index.duplicates.push(DuplicateId {
                    kind: identity.kind,
                    raw_id: identity.raw_id.to_string(),
                });
                continue;
            }
            if EntityKind::REFERENCEABLE.contains(&identity.kind) {
                index.known.insert(identity.id.clone());
            }
            if let Some(domain) = identity.domain {
                index.capability_domains.insert(identity.id.clone(), domain);
            }
            index
                .names
                .entry(identity.id)
                .or_insert_with(|| identity.name.to_string());
        }
        index
    }

    /// Whether `raw` names an entity of `kind`.
    pub fn contains(&self, kind: EntityKind, raw: &str) -> bool {
        self.by_kind
            .get(&kind)
            .is_some_and(|ids| ids.contains(&canonicalize(raw)))
    }

    /// Whether `raw` names any referenceable entity.
    pub fn is_known(&self, raw: &str) -> bool {
        self.known.contains(&canonicalize(raw))
    }

    /// Whether any entity of `kind` was declared.
    pub fn has_any(&self, kind: EntityKind) -> bool {
        self.by_kind.get(&kind).is_some_and(|ids| !ids.is_empty())
    }

    /// Canonical ids declared for `kind`, in sorted order.
    pub fn ids(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    /// Display name for a canonical id, if any entity declares it.
    pub fn display_name(&self, canonical: &str) -> Option<&str> {
        self.names.get(canonical).map(String::as_str)
    }

    /// Canonical owning domain of a capability reference.
    pub fn capability_domain(&self, raw_capability: &str) -> Option<&str> {
        self.capability_domains
            .get(&canonicalize(raw_capability))
            .map(String::as_str)
    }

    pub fn duplicates(&self) -> &[DuplicateId] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compiled::fixtures::sample_model;
    use crate::model::layers::Domain;

    #[test]
    fn lookups_are_spelling_insensitive() {
        let index = IdIndex::build(&sample_model());
        assert!(index.contains(EntityKind::Domain, "CATALOG"));
        assert!(index.contains(EntityKind::Capability, "Pay.Checkout"));
        assert!(!index.contains(EntityKind::Capability, "payments"));
        assert!(index.is_known("Svc_Pay"));
        assert_eq!(index.capability_domain("pay.refund"), Some("payments"));
        assert_eq!(index.display_name("stripe"), Some("Stripe"));
    }

    #[test]
    fn product_is_named_but_not_referenceable() {
        let index = IdIndex::build(&sample_model());
        assert!(index.contains(EntityKind::Product, "shop"));
        assert!(!index.is_known("shop"));
        assert_eq!(index.display_name("shop"), Some("Shop \"Prime\""));
    }

    #[test]
    fn same_kind_duplicates_are_recorded_once_indexed() {
        let mut model = sample_model();
        model.domains.push(Domain {
            id: "PAYMENTS".to_string(),
            name: Some("Shadow".to_string()),
            description: None,
        });
        let index = IdIndex::build(&model);
        assert_eq!(
            index.duplicates(),
            &[DuplicateId {
                kind: EntityKind::Domain,
                raw_id: "PAYMENTS".to_string()
            }]
        );
        assert_eq!(index.display_name("payments"), Some("Payments"));
        assert_eq!(index.ids(EntityKind::Domain).count(), 2);
    }
}
