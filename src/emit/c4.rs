//! C4-style context and container diagrams (Mermaid C4 syntax).
//!
//! The container edges are a heuristic cross product: every UI container
//! calls every backend module, and every backend module uses every external
//! system. Over-inclusive on purpose; nothing here is curated.

use crate::emit::text::{AliasTable, mermaid_label};
use crate::model::{CompiledModel, Component, ComponentType, Persona, canonicalize};
use std::fmt::Write as _;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct C4Diagrams {
    pub context: String,
    pub container: String,
}

pub fn emit_c4(model: &CompiledModel) -> C4Diagrams {
    C4Diagrams {
        context: context_diagram(model),
        container: container_diagram(model),
    }
}

fn sorted_personas(model: &CompiledModel) -> Vec<&Persona> {
    let mut personas: Vec<&Persona> = model.personas().iter().collect();
    personas.sort_by_key(|p| canonicalize(&p.id));
    personas
}

fn components_of<'a>(model: &'a CompiledModel, wanted: &ComponentType) -> Vec<&'a Component> {
    let mut matching: Vec<&'a Component> = model
        .components
        .iter()
        .filter(|c| &c.component_type() == wanted)
        .collect();
    matching.sort_by_key(|c| canonicalize(&c.id));
    matching
}

fn display_name(component: &Component) -> &str {
    component.name.as_deref().unwrap_or(&component.id)
}

fn context_diagram(model: &CompiledModel) -> String {
    let product = model.product();
    let mut aliases = AliasTable::default();
    let system = aliases.alias("sys", &canonicalize(&product.id));

    let mut out = String::from("C4Context\n");
    let _ = writeln!(out, "  title System Context: {}", mermaid_label(&product.name));

    let mut persona_aliases = Vec::new();
    for persona in sorted_personas(model) {
        let alias = aliases.alias("person", &canonicalize(&persona.id));
        let _ = writeln!(
            out,
            "  Person({alias}, \"{}\", \"{}\")",
            mermaid_label(&persona.name),
            mermaid_label(persona.intent.as_deref().unwrap_or_default())
        );
        persona_aliases.push(alias);
    }

    let _ = writeln!(
        out,
        "  System({system}, \"{}\", \"{}\")",
        mermaid_label(&product.name),
        mermaid_label(&product.kind)
    );

    let mut external_aliases = Vec::new();
    for component in components_of(model, &ComponentType::ExternalSystem) {
        let alias = aliases.alias("ext", &canonicalize(&component.id));
        let _ = writeln!(
            out,
            "  System_Ext({alias}, \"{}\", \"{}\")",
            mermaid_label(display_name(component)),
            mermaid_label(&component.tech.join(", "))
        );
        external_aliases.push(alias);
    }

    for persona in &persona_aliases {
        let _ = writeln!(out, "  Rel({persona}, {system}, \"uses\")");
    }
    for external in &external_aliases {
        let _ = writeln!(out, "  Rel({system}, {external}, \"depends on\")");
    }
    out
}

fn container_diagram(model: &CompiledModel) -> String {
    let product = model.product();
    let mut aliases = AliasTable::default();
    let boundary = aliases.alias("boundary", &canonicalize(&product.id));

    let mut out = String::from("C4Container\n");
    let _ = writeln!(out, "  title Containers: {}", mermaid_label(&product.name));
    let _ = writeln!(
        out,
        "  System_Boundary({boundary}, \"{}\") {{",
        mermaid_label(&product.name)
    );

    let mut emit_group = |out: &mut String, kind: ComponentType, shape: &str, prefix: &str| {
        let mut group = Vec::new();
        for component in components_of(model, &kind) {
            let alias = aliases.alias(prefix, &canonicalize(&component.id));
            let _ = writeln!(
                out,
                "    {shape}({alias}, \"{}\", \"{}\", \"{}\")",
                mermaid_label(display_name(component)),
                mermaid_label(&component.tech.join(", ")),
                kind.as_str()
            );
            group.push(alias);
        }
        group
    };
    let ui = emit_group(&mut out, ComponentType::Ui, "Container", "ui");
    let backend = emit_group(&mut out, ComponentType::BackendModule, "Container", "be");
    emit_group(&mut out, ComponentType::ContentStore, "ContainerDb", "store");
    out.push_str("  }\n");

    let mut external = Vec::new();
    for component in components_of(model, &ComponentType::ExternalSystem) {
        let alias = aliases.alias("ext", &canonicalize(&component.id));
        let _ = writeln!(
            out,
            "  System_Ext({alias}, \"{}\", \"{}\")",
            mermaid_label(display_name(component)),
            mermaid_label(&component.tech.join(", "))
        );
        external.push(alias);
    }

    for from in &ui {
        for to in &backend {
            let _ = writeln!(out, "  Rel({from}, {to}, \"calls\")");
        }
    }
    for from in &backend {
        for to in &external {
            let _ = writeln!(out, "  Rel({from}, {to}, \"uses\")");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compiled::fixtures::sample_model;

    #[test]
    fn context_centers_the_product() {
        let diagrams = emit_c4(&sample_model());
        let context = &diagrams.context;
        assert!(context.starts_with("C4Context\n"));
        assert!(context.contains("Person(person_buyer, \"Buyer\", \"buy things\")"));
        assert!(context.contains("System(sys_shop, \"Shop #quot;Prime#quot;\", \"web-platform\")"));
        assert!(context.contains("System_Ext(ext_stripe, \"Stripe\", \"rest\")"));
        assert!(context.contains("Rel(person_buyer, sys_shop, \"uses\")"));
        assert!(context.contains("Rel(sys_shop, ext_stripe, \"depends on\")"));
        assert!(!context.contains("\"Prime\""));
    }

    #[test]
    fn container_edges_are_a_cross_product() {
        let mut model = sample_model();
        let mut second_ui = model.components[0].clone();
        second_ui.id = "admin".to_string();
        model.components.push(second_ui);
        let mut second_ext = model.components[3].clone();
        second_ext.id = "mailer".to_string();
        second_ext.name = None;
        model.components.push(second_ext);

        let container = emit_c4(&model).container;
        assert!(container.contains("System_Boundary(boundary_shop, "));
        assert!(container.contains("ContainerDb(store_cms, \"cms\", \"\", \"content-store\")"));
        let calls = container.matches("\"calls\")").count();
        let uses = container.matches("\"uses\")").count();
        assert_eq!(calls, 2);
        assert_eq!(uses, 2);
        assert!(container.contains("Rel(ui_admin, be_api, \"calls\")"));
        assert!(container.contains("Rel(be_api, ext_mailer, \"uses\")"));
    }
}
