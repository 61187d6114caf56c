//! Escaping helpers shared by the tabular and diagram emitters.

use std::borrow::Cow;
use std::collections::BTreeSet;

/// Quote a CSV field when it carries the delimiter, a quote or a line break.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Append one CSV record terminated by `\n`.
pub fn push_csv_row(out: &mut String, fields: &[&str]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(field));
    }
    out.push('\n');
}

/// Escape a label for a double-quoted Graphviz string.
pub fn dot_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a label for a double-quoted Mermaid string.
pub fn mermaid_label(value: &str) -> String {
    value.replace('"', "#quot;").replace('\n', " ")
}

/// Hands out identifier-safe diagram aliases, one per canonical id.
///
/// Canonical ids may contain `.`, `:` and `-`, which Mermaid does not accept
/// in bare identifiers; those map to `_`. Two ids that collapse to the same
/// alias get numeric suffixes in request order.
#[derive(Debug, Default)]
pub struct AliasTable {
    taken: BTreeSet<String>,
}

impl AliasTable {
    pub fn alias(&mut self, prefix: &str, canonical: &str) -> String {
        let base: String = format!("{prefix}_{canonical}")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let mut candidate = base.clone();
        let mut suffix = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        candidate
    }
}
