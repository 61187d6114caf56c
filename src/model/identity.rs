use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalize a free-form identifier into its lookup key.
///
/// Trims, lowercases, maps every character outside `[a-z0-9.:-]` to `-` and
/// collapses runs of `-`. Underscores count as separators so `web_ui`,
/// `Web-UI` and ` WEB UI ` share one identity. Total and idempotent; every
/// emitter goes through this function so ids computed in different artifacts
/// stay byte-identical.
pub fn canonicalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let mapped = if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '.' | ':')
        {
            ch
        } else {
            '-'
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }
    out
}

/// Entity kinds that live in the global id space.
///
/// Declaration order doubles as the property-graph synthesis order, which
/// decides which kind wins when two kinds share an id.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EntityKind {
    Product,
    Domain,
    Persona,
    Capability,
    Flow,
    Component,
    Service,
    Api,
    Event,
}

impl EntityKind {
    /// Kinds that make up the shared id space used for soft reference checks.
    pub const REFERENCEABLE: [EntityKind; 8] = [
        EntityKind::Domain,
        EntityKind::Persona,
        EntityKind::Capability,
        EntityKind::Flow,
        EntityKind::Component,
        EntityKind::Service,
        EntityKind::Api,
        EntityKind::Event,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Domain => "domain",
            EntityKind::Persona => "persona",
            EntityKind::Capability => "capability",
            EntityKind::Flow => "flow",
            EntityKind::Component => "component",
            EntityKind::Service => "service",
            EntityKind::Api => "api",
            EntityKind::Event => "event",
        }
    }

    /// Node label used by graph-store imports.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Product => "Product",
            EntityKind::Domain => "Domain",
            EntityKind::Persona => "Persona",
            EntityKind::Capability => "Capability",
            EntityKind::Flow => "Flow",
            EntityKind::Component => "Component",
            EntityKind::Service => "Service",
            EntityKind::Api => "Api",
            EntityKind::Event => "Event",
        }
    }
}

impl Serialize for EntityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Coarse component grouping used by the container diagram.
///
/// Authored types are matched after canonicalization with a few common
/// aliases; anything else lands in `Other` and keeps its spelling.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ComponentType {
    Ui,
    BackendModule,
    ContentStore,
    ExternalSystem,
    Other(String),
}

impl ComponentType {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Ui => "ui",
            ComponentType::BackendModule => "backend-module",
            ComponentType::ContentStore => "content-store",
            ComponentType::ExternalSystem => "external-system",
            ComponentType::Other(value) => value.as_str(),
        }
    }

    pub fn from_str(value: &str) -> Self {
        match canonicalize(value).as_str() {
            "ui" | "frontend" | "web" | "web-app" | "spa" => ComponentType::Ui,
            "backend-module" | "backend" | "module" | "service" => ComponentType::BackendModule,
            "content-store" | "store" | "database" | "db" | "cms" => ComponentType::ContentStore,
            "external-system" | "external" | "saas" => ComponentType::ExternalSystem,
            _ => ComponentType::Other(value.to_string()),
        }
    }
}

impl Serialize for ComponentType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equivalent_spellings_collide() {
        let expected = canonicalize("Web-UI");
        assert_eq!(expected, "web-ui");
        assert_eq!(canonicalize("web_ui"), expected);
        assert_eq!(canonicalize(" WEB UI "), expected);
    }

    #[test]
    fn keeps_namespacing_punctuation() {
        assert_eq!(canonicalize("Pay.Checkout"), "pay.checkout");
        assert_eq!(canonicalize("svc:Orders"), "svc:orders");
        assert_eq!(canonicalize("a  --  b"), "a-b");
        assert_eq!(canonicalize("Café/Menu"), "caf-menu");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn component_type_accepts_aliases_and_unknowns() {
        assert_eq!(ComponentType::from_str("UI"), ComponentType::Ui);
        assert_eq!(
            ComponentType::from_str("backend_module"),
            ComponentType::BackendModule
        );
        assert_eq!(
            ComponentType::from_str("Content Store"),
            ComponentType::ContentStore
        );
        assert_eq!(
            ComponentType::from_str("external-system"),
            ComponentType::ExternalSystem
        );
        let parsed: ComponentType = serde_json::from_str("\"Batch Job\"").unwrap();
        assert_eq!(parsed, ComponentType::Other("Batch Job".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Batch Job\"");
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(raw in ".*") {
            let once = canonicalize(&raw);
            prop_assert_eq!(canonicalize(&once), once);
        }
    }
}
