//! Company-vs-person classification
//!
//! Lexical heuristics that decide whether a name string denotes an organization.
//! This is "good enough to avoid obviously wrong graph nodes", not NER: false
//! positives and negatives are expected.
//!
//! Three questions are answered, each with its own precision trade-off:
//! - [`EntityClassifier::is_capital_entity`]: is this an investment firm? (node typing)
//! - [`EntityClassifier::is_organization`]: is this any kind of organization?
//! - [`EntityClassifier::is_known_company_name`]: does this name a company we know of?
//!   (guards person resolution)
//! - [`EntityClassifier::looks_like_company`]: narrow investor-attribution filter

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::lexicon::EntityLexicon;

/// "<words> capital|ventures|partners|investment(s)|fund(s)|group|holding(s)"
static CAPITAL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w\s.&'-]+ (capital|ventures|partners|investments?|funds?|group|holdings?)$")
        .unwrap()
});

/// Containment matches need at least this many characters on the shorter side,
/// so "john" never matches "johnson" and "dell" never matches "michael dell".
pub const MIN_CONTAINMENT_LEN: usize = 5;

/// Lowercase company names harvested from the approved company table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyNameSet {
    names: HashSet<String>,
}

impl CompanyNameSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    pub fn insert(&mut self, name: &str) {
        let name = name.trim().to_lowercase();
        if !name.is_empty() {
            self.names.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<HashSet<String>> for CompanyNameSet {
    fn from(names: HashSet<String>) -> Self {
        Self::new(names)
    }
}

/// Lexical company/person classifier over an [`EntityLexicon`]
#[derive(Debug, Clone, Default)]
pub struct EntityClassifier {
    lexicon: EntityLexicon,
}

impl EntityClassifier {
    pub fn new(lexicon: EntityLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &EntityLexicon {
        &self.lexicon
    }

    /// True when the name looks like an investment firm.
    ///
    /// Any one signal suffices: a capital keyword token, a well-known capital firm,
    /// or the "<words> capital|ventures|..." name pattern.
    pub fn is_capital_entity(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        let tokens = word_tokens(&lower);

        tokens
            .iter()
            .any(|t| self.lexicon.capital_keywords.contains(t.as_str()))
            || self
                .lexicon
                .known_capital_firms
                .iter()
                .any(|firm| matches_known(&lower, &tokens, firm))
            || CAPITAL_NAME_RE.is_match(&lower)
    }

    /// True when the name looks like any organization rather than a person
    pub fn is_organization(&self, name: &str) -> bool {
        if self.is_capital_entity(name) {
            return true;
        }
        let lower = name.trim().to_lowercase();
        let tokens = word_tokens(&lower);

        tokens
            .iter()
            .any(|t| self.lexicon.corporate_suffixes.contains(t.as_str()))
            || self
                .lexicon
                .known_corporations
                .iter()
                .any(|corp| matches_known(&lower, &tokens, corp))
    }

    /// True when the name denotes a known company: either an approved company from
    /// `company_names` or a globally recognizable corporation/institution.
    ///
    /// Containment is checked in both directions on whole words.
    pub fn is_known_company_name(&self, name: &str, company_names: &CompanyNameSet) -> bool {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        if company_names.contains(&lower) {
            return true;
        }
        let tokens = word_tokens(&lower);

        company_names
            .iter()
            .chain(self.lexicon.known_entities())
            .any(|company| matches_known(&lower, &tokens, company))
    }

    /// Narrow "obviously a company, not a person" test for investor attribution
    pub fn looks_like_company(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        let tokens = word_tokens(&lower);

        tokens
            .iter()
            .any(|t| self.lexicon.company_indicators.contains(t.as_str()))
            || self
                .lexicon
                .known_entities()
                .any(|entity| matches_known(&lower, &tokens, entity))
    }

    /// True when a company tag marks an investment firm
    pub fn is_capital_tag(&self, tag: &str) -> bool {
        self.lexicon
            .capital_tags
            .contains(&tag.trim().to_lowercase())
    }
}

/// Exact match, or whole-word containment in either direction when the shorter
/// side is at least [`MIN_CONTAINMENT_LEN`] characters.
fn matches_known(lower: &str, tokens: &[String], known: &str) -> bool {
    if lower == known {
        return true;
    }
    let known_tokens = word_tokens(known);
    if known_tokens.is_empty() || tokens.is_empty() {
        return false;
    }
    if known.len() <= lower.len() {
        known.len() >= MIN_CONTAINMENT_LEN && contains_phrase(tokens, &known_tokens)
    } else {
        lower.len() >= MIN_CONTAINMENT_LEN && contains_phrase(&known_tokens, tokens)
    }
}

fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Lowercase alphanumeric word tokens
fn word_tokens(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
