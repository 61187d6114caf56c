//! Cross-reference validation over a compiled model.
//!
//! The normalizer indexes every entity kind once, then walks the declared
//! references and reports what does not resolve. It never mutates the model
//! and never short-circuits: every finding is returned so the pipeline can log
//! the full picture before deciding whether to abort.

use crate::model::{CompiledModel, EntityKind, IdIndex};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Warn,
    Error,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Warn => f.write_str("warn"),
            IssueLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// One validation finding.
pub struct Issue {
    pub level: IssueLevel,
    pub code: String,
    pub message: String,
}

impl Issue {
    fn error(code: &str, message: String) -> Self {
        Self {
            level: IssueLevel::Error,
            code: code.to_string(),
            message,
        }
    }

    fn warn(code: &str, message: String) -> Self {
        Self {
            level: IssueLevel::Warn,
            code: code.to_string(),
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

/// Normalizer output: the shared id index plus every finding.
#[derive(Debug)]
pub struct Normalized {
    pub index: IdIndex,
    pub issues: Vec<Issue>,
}

impl Normalized {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }
}

/// Build the id index and collect every reference issue.
///
/// Hard failures: capability→domain and flow→capability. Everything else
/// (flow actors, relation endpoints, containment, service and event wiring,
/// SLA targets, infrastructure hosts, duplicate ids) is a warning. Epic
/// references are deliberately not checked here; the heatmap skips the ones
/// that do not resolve.
pub fn normalize(model: &CompiledModel) -> Normalized {
    let index = IdIndex::build(model);
    let mut issues = Vec::new();

    for duplicate in index.duplicates() {
        let kind = duplicate.kind.as_str();
        issues.push(Issue::warn(
            &format!("{kind}.duplicate_id"),
            format!(
                "{kind} '{}' is declared more than once; the first declaration wins",
                duplicate.raw_id
            ),
        ));
    }

    for cap in &model.capabilities {
        if !index.contains(EntityKind::Domain, &cap.domain) {
            issues.push(Issue::error(
                "capability.domain.unknown",
                format!(
                    "capability '{}' references unknown domain '{}'",
                    cap.id, cap.domain
                ),
            ));
        }
    }

    // Actors are only checked once personas exist at all.
    let check_actors = index.has_any(EntityKind::Persona);
    for flow in &model.flows {
        if check_actors {
            if let Some(actor) = &flow.actor {
                if !index.contains(EntityKind::Persona, actor) {
                    issues.push(Issue::warn(
                        "flow.actor.unknown",
                        format!("flow '{}' references unknown persona '{actor}'", flow.id),
                    ));
                }
            }
        }
        for cap in &flow.capabilities {
            if !index.contains(EntityKind::Capability, cap) {
                issues.push(Issue::error(
                    "flow.capability.unknown",
                    format!("flow '{}' references unknown capability '{cap}'", flow.id),
                ));
            }
        }
    }

    for component in &model.components {
        if let Some(parent) = &component.parent {
            if !index.contains(EntityKind::Component, parent) {
                issues.push(Issue::warn(
                    "component.parent.unknown",
                    format!(
                        "component '{}' has unknown parent '{parent}'",
                        component.id
                    ),
                ));
            }
        }
    }

    for service in &model.services {
        for cap in &service.implements {
            if !index.contains(EntityKind::Capability, cap) {
                issues.push(Issue::warn(
                    "service.implements.unknown",
                    format!(
                        "service '{}' implements unknown capability '{cap}'",
                        service.id
                    ),
                ));
            }
        }
        for component in &service.provided_by {
            if !index.contains(EntityKind::Component, component) {
                issues.push(Issue::warn(
                    "service.provided_by.unknown",
                    format!(
                        "service '{}' is provided by unknown component '{component}'",
                        service.id
                    ),
                ));
            }
        }
    }

    for event in &model.events {
        if let Some(producer) = &event.producer {
            if !index.is_known(producer) {
                issues.push(Issue::warn(
                    "event.producer.unknown",
                    format!("event '{}' has unknown producer '{producer}'", event.id),
                ));
            }
        }
        for consumer in &event.consumers {
            if !index.is_known(consumer) {
                issues.push(Issue::warn(
                    "event.consumer.unknown",
                    format!("event '{}' has unknown consumer '{consumer}'", event.id),
                ));
            }
        }
    }

    for sla in &model.slas {
        if !index.is_known(&sla.target) {
            issues.push(Issue::warn(
                "sla.target.unknown",
                format!("sla '{}' targets unknown id '{}'", sla.id, sla.target),
            ));
        }
    }

    for resource in &model.infrastructure {
        for host in &resource.hosts {
            if !index.is_known(host) {
                issues.push(Issue::warn(
                    "infrastructure.host.unknown",
                    format!(
                        "infrastructure '{}' hosts unknown id '{host}'",
                        resource.id
                    ),
                ));
            }
        }
    }

    for relation in &model.relations {
        if !index.is_known(&relation.from) {
            issues.push(Issue::warn(
                "relation.from.unknown",
                format!(
                    "relation {} -[{}]-> {} starts at unknown id '{}'",
                    relation.from, relation.kind, relation.to, relation.from
                ),
            ));
        }
        if !index.is_known(&relation.to) {
            issues.push(Issue::warn(
                "relation.to.unknown",
                format!(
                    "relation {} -[{}]-> {} ends at unknown id '{}'",
                    relation.from, relation.kind, relation.to, relation.to
                ),
            ));
        }
    }

    Normalized { index, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::canonicalize;
    use crate::model::compiled::fixtures::sample_model;
    use crate::model::layers::{Capability, Relation};

    fn codes(normalized: &Normalized) -> Vec<&str> {
        normalized.issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn sample_model_is_clean() {
        let normalized = normalize(&sample_model());
        assert!(normalized.issues.is_empty(), "{:?}", normalized.issues);
    }

    #[test]
    fn unknown_capability_domain_is_an_error() {
        let mut model = sample_model();
        model.capabilities.push(Capability {
            id: "ship.track".to_string(),
            domain: "shipping".to_string(),
            name: None,
            description: None,
        });
        let normalized = normalize(&model);
        assert!(normalized.has_errors());
        assert_eq!(codes(&normalized), vec!["capability.domain.unknown"]);
        assert!(normalized.issues[0].message.contains("shipping"));
    }

    #[test]
    fn flow_capabilities_are_hard_and_actors_soft() {
        let mut model = sample_model();
        model.flows[0].capabilities.push("Missing.Cap".to_string());
        model.flows[0].actor = Some("ghost".to_string());
        let normalized = normalize(&model);
        let mut found = codes(&normalized);
        found.sort();
        assert_eq!(found, vec!["flow.actor.unknown", "flow.capability.unknown"]);
        assert_eq!(normalized.errors().count(), 1);
        assert_eq!(normalized.warnings().count(), 1);
    }

    #[test]
    fn actors_are_unchecked_without_personas() {
        let mut model = sample_model();
        model.vision.personas.clear();
        model.flows[0].actor = Some("anyone".to_string());
        assert!(normalize(&model).issues.is_empty());
    }

    #[test]
    fn relation_endpoints_only_warn() {
        let mut model = sample_model();
        model.relations.push(Relation {
            from: "WEB".to_string(),
            to: "mailchimp".to_string(),
            kind: "notifies".to_string(),
        });
        let normalized = normalize(&model);
        assert!(!normalized.has_errors());
        assert_eq!(codes(&normalized), vec!["relation.to.unknown"]);
        assert_eq!(normalized.issues[0].level, IssueLevel::Warn);
    }

    #[test]
    fn valid_model_has_referential_closure() {
        let model = sample_model();
        let normalized = normalize(&model);
        assert!(!normalized.has_errors());
        let domains: Vec<&str> = normalized.index.ids(EntityKind::Domain).collect();
        for cap in &model.capabilities {
            assert!(domains.contains(&canonicalize(&cap.domain).as_str()));
        }
    }

    #[test]
    fn supplementary_references_warn() {
        let mut model = sample_model();
        model.components[1].parent = Some("nowhere".to_string());
        model.services[0].provided_by.push("ghost-component".to_string());
        model.events[0].consumers.push("ghost-consumer".to_string());
        let normalized = normalize(&model);
        assert!(!normalized.has_errors());
        assert_eq!(
            codes(&normalized),
            vec![
                "component.parent.unknown",
                "service.provided_by.unknown",
                "event.consumer.unknown"
            ]
        );
    }

    #[test]
    fn epics_are_not_validated() {
        let model = sample_model();
        // e2 lists `ghost.capability`, which resolves nowhere.
        assert!(
            model.roadmap.epics[1]
                .capabilities
                .iter()
                .any(|cap| cap == "ghost.capability")
        );
        assert!(normalize(&model).issues.is_empty());
    }
}
