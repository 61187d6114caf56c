//! Coverage heatmap between domains and roadmap epics.
//!
//! Each epic capability is traced to its owning domain and counted into a
//! sparse (domain, epic) cell. Capabilities that do not resolve are skipped
//! without a finding; epics are not cross-checked by the normalizer either.

use crate::model::{CompiledModel, IdIndex, canonicalize};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Serialize)]
pub struct Heatmap {
    pub domains: Vec<HeatmapDomain>,
    pub epics: Vec<HeatmapEpic>,
    pub matrix: Vec<HeatmapCell>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HeatmapDomain {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct HeatmapEpic {
    pub id: String,
    pub title: String,
    pub horizon: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// One non-empty (domain, epic) cell.
pub struct HeatmapCell {
    pub domain_id: String,
    pub epic_id: String,
    pub count: usize,
    /// Capability ids as authored, sorted and deduplicated.
    pub capabilities: Vec<String>,
}

#[derive(Default)]
struct CellAccumulator {
    count: usize,
    capabilities: BTreeSet<String>,
}

/// Build the sparse coverage matrix.
///
/// Cells are keyed and sorted by `domainId::epicId`; listing the same
/// capability twice in one epic counts twice but appears once.
pub fn emit_heatmap(model: &CompiledModel, index: &IdIndex) -> Heatmap {
    let mut cells: BTreeMap<String, (String, String, CellAccumulator)> = BTreeMap::new();
    for epic in &model.roadmap.epics {
        let epic_id = canonicalize(&epic.id);
        for cap in &epic.capabilities {
            let Some(domain_id) = index.capability_domain(cap) else {
                continue;
            };
            let key = format!("{domain_id}::{epic_id}");
            let (_, _, cell) = cells.entry(key).or_insert_with(|| {
                (
                    domain_id.to_string(),
                    epic_id.clone(),
                    CellAccumulator::default(),
                )
            });
            cell.count += 1;
            cell.capabilities.insert(cap.clone());
        }
    }

    Heatmap {
        domains: model
            .domains
            .iter()
            .map(|d| HeatmapDomain {
                id: canonicalize(&d.id),
                name: d.name.clone().unwrap_or_else(|| d.id.clone()),
            })
            .collect(),
        epics: model
            .roadmap
            .epics
            .iter()
            .map(|e| HeatmapEpic {
                id: canonicalize(&e.id),
                title: e.title.clone().unwrap_or_else(|| e.id.clone()),
                horizon: e.horizon.clone(),
            })
            .collect(),
        matrix: cells
            .into_values()
            .map(|(domain_id, epic_id, cell)| HeatmapCell {
                domain_id,
                epic_id,
                count: cell.count,
                capabilities: cell.capabilities.into_iter().collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compiled::fixtures::sample_model;
    use crate::validate::normalize;
    use pretty_assertions::assert_eq;

    fn cells_for(heatmap: &Heatmap, epic: &str) -> Vec<HeatmapCell> {
        heatmap
            .matrix
            .iter()
            .filter(|cell| cell.epic_id == epic)
            .cloned()
            .collect()
    }

    #[test]
    fn traces_epics_to_domains() {
        let model = sample_model();
        let normalized = normalize(&model);
        let heatmap = emit_heatmap(&model, &normalized.index);

        assert_eq!(
            cells_for(&heatmap, "e1"),
            vec![
                HeatmapCell {
                    domain_id: "catalog".into(),
                    epic_id: "e1".into(),
                    count: 1,
                    capabilities: vec!["catalog.browse".into()],
                },
                HeatmapCell {
                    domain_id: "payments".into(),
                    epic_id: "e1".into(),
                    count: 2,
                    capabilities: vec!["pay.checkout".into(), "pay.refund".into()],
                },
            ]
        );
    }

    #[test]
    fn unresolved_capabilities_are_skipped_silently() {
        let model = sample_model();
        let normalized = normalize(&model);
        let heatmap = emit_heatmap(&model, &normalized.index);
        let e2 = cells_for(&heatmap, "e2");
        assert_eq!(e2.len(), 1);
        assert_eq!(e2[0].count, 1);
        assert_eq!(e2[0].capabilities, vec!["PAY.CHECKOUT".to_string()]);
    }

    #[test]
    fn per_epic_counts_match_resolvable_pairs() {
        let model = sample_model();
        let normalized = normalize(&model);
        let heatmap = emit_heatmap(&model, &normalized.index);
        for epic in &model.roadmap.epics {
            let expected = epic
                .capabilities
                .iter()
                .filter(|cap| normalized.index.capability_domain(cap).is_some())
                .count();
            let epic_id = canonicalize(&epic.id);
            let total: usize = cells_for(&heatmap, &epic_id).iter().map(|c| c.count).sum();
            assert_eq!(total, expected, "epic {epic_id}");
        }
    }

    #[test]
    fn matrix_is_sorted_by_cell_key() {
        let model = sample_model();
        let normalized = normalize(&model);
        let heatmap = emit_heatmap(&model, &normalized.index);
        let keys: Vec<String> = heatmap
            .matrix
            .iter()
            .map(|c| format!("{}::{}", c.domain_id, c.epic_id))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(heatmap.domains[1].id, "catalog");
        assert_eq!(heatmap.epics[0].id, "e1");
    }
}
