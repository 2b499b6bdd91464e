//! Per-build working state
//!
//! One `BuildContext` is created for each graph build and threaded by reference
//! through every extractor, so two concurrent builds never share a registry.

use tracing::debug;

use crate::config::EdgeWeights;
use crate::database::PersonRecord;
use crate::entity_linking::{CompanyNameSet, EntityClassifier, PersonRegistry};
use crate::graph::types::Link;

/// Record table an id belongs to. Company, person and data-center ids come from
/// separate tables and may collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Company,
    Person,
    DataCenter,
}

/// A link plus the record tables its endpoints were taken from
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedLink {
    pub link: Link,
    pub source: RecordKind,
    pub target: RecordKind,
}

pub struct BuildContext<'a> {
    pub classifier: &'a EntityClassifier,
    pub weights: &'a EdgeWeights,
    pub company_names: CompanyNameSet,
    pub persons: PersonRegistry,
    pub links: Vec<SourcedLink>,
    /// Free-text names that matched no registered person
    pub unresolved_names: usize,
    /// Person records skipped because the name is a company
    pub skipped_person_records: usize,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        classifier: &'a EntityClassifier,
        weights: &'a EdgeWeights,
        company_names: CompanyNameSet,
    ) -> Self {
        Self {
            classifier,
            weights,
            company_names,
            persons: PersonRegistry::new(),
            links: Vec::new(),
            unresolved_names: 0,
            skipped_person_records: 0,
        }
    }

    /// Seed the registry from a relational person record.
    ///
    /// Returns false (and registers nothing) when the record's name is actually
    /// a company; such records must not become nodes or link endpoints.
    pub fn admit_person(&mut self, person: &PersonRecord) -> bool {
        if person.id.is_empty() {
            return false;
        }
        if self
            .classifier
            .is_known_company_name(&person.name, &self.company_names)
        {
            debug!(
                "Skipping person record {:?} ({}): name is a company",
                person.name, person.id
            );
            self.skipped_person_records += 1;
            return false;
        }
        self.persons.register(person.clone());
        true
    }

    /// Resolve a free-text name against the registry; never invents a person
    pub fn resolve_person(&mut self, name: &str) -> Option<String> {
        let resolved = self
            .persons
            .resolve(name, self.classifier, &self.company_names);
        if resolved.is_none() {
            debug!("Unresolved name {:?}: no registered person", name);
            self.unresolved_names += 1;
        }
        resolved
    }

    pub fn push_links(
        &mut self,
        source: RecordKind,
        target: RecordKind,
        links: impl IntoIterator<Item = Link>,
    ) {
        self.links
            .extend(links.into_iter().map(|link| SourcedLink { link, source, target }));
    }
}
