use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// Admin-configured equivalence classes for tool and industry terms.
///
/// Keys and synonyms compare case-insensitively; "ChatGPT" and "GPT-4" or
/// "HubSpot" and "HubSpot CRM" land in the same class once configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable(BTreeMap<String, Vec<String>>);

impl SynonymTable {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self(entries)
    }

    /// Tolerant construction from an admin settings value shaped as
    /// `{"key": ["synonym", ...], ...}`. Non-object values yield an empty
    /// table; non-string synonyms are skipped.
    pub fn from_value(value: &Value) -> Self {
        let mut entries = BTreeMap::new();
        if let Some(map) = value.as_object() {
            for (key, synonyms) in map {
                let synonyms = synonyms
                    .as_array()
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(Value::as_str)
                            .map(canonical)
                            .filter(|synonym| !synonym.is_empty())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                entries.insert(canonical(key), synonyms);
            }
        }
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn classes(&self) -> impl Iterator<Item = BTreeSet<String>> + '_ {
        self.0.iter().map(|(key, synonyms)| {
            let mut class: BTreeSet<String> = synonyms.iter().map(|s| canonical(s)).collect();
            class.insert(canonical(key));
            class
        })
    }
}

/// Canonical form of a raw term: trimmed, whitespace collapsed, lowercased.
pub fn canonical(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Expand a raw term into its full equivalence class.
///
/// Always contains the canonical form of the term itself; when the term
/// matches a table key or any synonym, the whole class joins the set.
/// Deterministic, no I/O; empty input yields the singleton empty string.
pub fn normalize(term: &str, table: &SynonymTable) -> BTreeSet<String> {
    let canon = canonical(term);
    let mut expanded = BTreeSet::new();
    expanded.insert(canon.clone());

    for class in table.classes() {
        if class.contains(&canon) {
            expanded.extend(class);
        }
    }

    expanded
}

/// The subset of `required` terms with at least one normalized match among
/// `declared`. Preserves the order and original spelling of `required` so
/// reasons can echo the client's own wording.
pub fn matched_terms(required: &[String], declared: &[String], table: &SynonymTable) -> Vec<String> {
    let declared_forms: BTreeSet<String> = declared
        .iter()
        .flat_map(|term| normalize(term, table))
        .collect();

    required
        .iter()
        .filter(|term| !normalize(term, table).is_disjoint(&declared_forms))
        .cloned()
        .collect()
}
