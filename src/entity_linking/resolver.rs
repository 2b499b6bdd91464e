//! Person registry and free-text name resolution
//!
//! The registry holds the persons that relational records (board seats,
//! investments, founder relations) already vouch for. Free-text names are only
//! ever resolved *against* it; resolution never invents a new person.
//!
//! Matching is biased toward precision: a missed match costs an edge, a false
//! match silently merges two people.

use smallvec::SmallVec;
use std::collections::BTreeMap;

use super::classifier::{CompanyNameSet, EntityClassifier};
use super::normalize::{name_tokens, normalize_person_name};
use crate::database::PersonRecord;

/// Minimum number of shared identity tokens for a fuzzy match
pub const MIN_SHARED_TOKENS: usize = 2;

/// Per-build map of known persons plus a normalized-name index
#[derive(Debug, Clone, Default)]
pub struct PersonRegistry {
    persons: BTreeMap<String, PersonRecord>,
    /// normalized name (or alias) -> person id
    name_index: BTreeMap<String, String>,
}

impl PersonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a person from a relational record.
    ///
    /// The first record seen for an id wins, and the first id seen for a
    /// normalized name keeps the index slot. Returns true if the id was new.
    pub fn register(&mut self, person: PersonRecord) -> bool {
        if self.persons.contains_key(&person.id) {
            return false;
        }
        self.index_name(&person.name, &person.id);
        self.persons.insert(person.id.clone(), person);
        true
    }

    pub fn get(&self, id: &str) -> Option<&PersonRecord> {
        self.persons.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.persons.contains_key(id)
    }

    /// Persons in id order
    pub fn iter(&self) -> impl Iterator<Item = &PersonRecord> {
        self.persons.values()
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Id indexed under an exact normalized name
    pub fn lookup_normalized(&self, normalized: &str) -> Option<&str> {
        self.name_index.get(normalized).map(String::as_str)
    }

    pub fn name_index(&self) -> &BTreeMap<String, String> {
        &self.name_index
    }

    fn index_name(&mut self, name: &str, id: &str) {
        let normalized = normalize_person_name(name);
        if !normalized.is_empty() {
            self.name_index
                .entry(normalized)
                .or_insert_with(|| id.to_string());
        }
    }

    /// Resolve a free-text name to a registered person id.
    ///
    /// In order, short-circuiting:
    /// 1. names of known companies never resolve
    /// 2. exact normalized-name hit in the index
    /// 3. fuzzy pass over indexed names ([`same_identity`]); the new spelling is
    ///    recorded as an alias
    /// 4. otherwise `None`: the caller skips the relationship
    ///
    /// Every registered person with a non-empty name is indexed at
    /// registration, so the index alone covers the registry.
    pub fn resolve(
        &mut self,
        name: &str,
        classifier: &EntityClassifier,
        company_names: &CompanyNameSet,
    ) -> Option<String> {
        if classifier.is_known_company_name(name, company_names) {
            return None;
        }

        let normalized = normalize_person_name(name);
        if normalized.is_empty() {
            return None;
        }
        if let Some(id) = self.name_index.get(&normalized) {
            return Some(id.clone());
        }

        let indexed = self
            .name_index
            .iter()
            .find(|(existing, _)| same_identity(&normalized, existing))
            .map(|(_, id)| id.clone());
        if let Some(id) = indexed.as_ref() {
            self.name_index.insert(normalized, id.clone());
        }
        indexed
    }
}

/// Decide whether two name strings denote the same person.
///
/// Equal after normalization, or both have at least two identity tokens
/// (length > 1) and share at least [`MIN_SHARED_TOKENS`] of them, in any order.
///
/// Two different people with the same given and family name will match; the
/// data model carries no further identity signal to tell them apart.
pub fn same_identity(a: &str, b: &str) -> bool {
    let a = normalize_person_name(a);
    let b = normalize_person_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let a_tokens = distinct(name_tokens(&a));
    let b_tokens = distinct(name_tokens(&b));
    if a_tokens.len() < MIN_SHARED_TOKENS || b_tokens.len() < MIN_SHARED_TOKENS {
        return false;
    }

    let shared = a_tokens.iter().filter(|t| b_tokens.contains(t)).count();
    shared >= MIN_SHARED_TOKENS
}

fn distinct(mut tokens: SmallVec<[&str; 4]>) -> SmallVec<[&str; 4]> {
    tokens.sort_unstable();
    tokens.dedup();
    tokens
}
