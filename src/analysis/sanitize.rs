// Identifier sanitizer
//
// Maps entity identifiers to tokens that are valid node identifiers in every
// output grammar. Tokens are unique per entity: when two names reduce to the
// same token, later ones get a `_2`, `_3`, ... suffix counted per base token.

use crate::error::{Error, Result};
use crate::parser::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Words that cannot be used as bare node identifiers in some grammar
const RESERVED: &[&str] = &[
    "end", "graph", "subgraph", "flowchart", "classdiagram", "class", "node", "edge", "digraph",
    "strict", "style", "classdef", "click", "default", "direction", "namespace", "note",
];

/// Session-scoped token registry.
///
/// One sanitizer belongs to one analysis; nothing is shared between sessions.
#[derive(Debug, Default)]
pub struct Sanitizer {
    by_id: HashMap<EntityId, String>,
    owners: HashMap<String, EntityId>,
    labels: HashMap<String, String>,
    next_suffix: HashMap<String, usize>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for an entity, allocating one on first use
    pub fn sanitize(&mut self, raw_name: &str, id: &EntityId) -> String {
        if let Some(token) = self.by_id.get(id) {
            return token.clone();
        }

        let base = base_token(raw_name);
        let mut token = base.clone();
        while self.owners.contains_key(&token) {
            let n = self.next_suffix.entry(base.clone()).or_insert(2);
            token = format!("{}_{}", base, n);
            *n += 1;
        }

        self.by_id.insert(id.clone(), token.clone());
        self.owners.insert(token.clone(), id.clone());
        self.labels.insert(token.clone(), raw_name.to_string());
        token
    }

    /// Raw name a token was created for
    pub fn label(&self, token: &str) -> Option<&str> {
        self.labels.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Freeze the registry once the graph is built
    pub fn finish(self) -> TokenMap {
        let mut labels = self.labels;
        let entries = self
            .by_id
            .into_iter()
            .map(|(id, token)| {
                let label = labels.remove(&token).unwrap_or_default();
                (id, TokenEntry { token, label })
            })
            .collect::<BTreeMap<_, _>>();
        TokenMap::from_entries(entries)
    }
}

/// Reduce a raw name to characters every grammar accepts as an identifier
fn base_token(raw: &str) -> String {
    let mut token = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            token.push(c);
        } else if !token.ends_with('_') {
            token.push('_');
        }
    }

    if token.is_empty() || token.chars().all(|c| c == '_') {
        return "_".to_string();
    }
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        token.insert(0, '_');
    }
    if RESERVED.contains(&token.to_ascii_lowercase().as_str()) {
        token.push('_');
    }
    token
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub label: String,
}

/// Frozen entity id to token mapping carried by a built graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    by_id: BTreeMap<EntityId, TokenEntry>,
    by_token: HashMap<String, EntityId>,
}

impl TokenMap {
    fn from_entries(by_id: BTreeMap<EntityId, TokenEntry>) -> Self {
        let by_token = by_id
            .iter()
            .map(|(id, entry)| (entry.token.clone(), id.clone()))
            .collect();
        Self { by_id, by_token }
    }

    /// Rebuild from serialized entries, rejecting anything that is not a bijection
    pub fn from_pairs(pairs: impl IntoIterator<Item = (EntityId, TokenEntry)>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        let mut by_token = HashMap::new();
        for (id, entry) in pairs {
            if let Some(other) = by_token.insert(entry.token.clone(), id.clone()) {
                return Err(Error::document(format!(
                    "token '{}' is shared by {} and {}",
                    entry.token, other, id
                )));
            }
            if by_id.insert(id.clone(), entry).is_some() {
                return Err(Error::document(format!("entity {} has two tokens", id)));
            }
        }
        Ok(Self { by_id, by_token })
    }

    pub fn token(&self, id: &EntityId) -> Option<&str> {
        self.by_id.get(id).map(|e| e.token.as_str())
    }

    pub fn label(&self, token: &str) -> Option<&str> {
        self.by_token
            .get(token)
            .and_then(|id| self.by_id.get(id))
            .map(|e| e.label.as_str())
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Entries in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &TokenEntry)> {
        self.by_id.iter()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
