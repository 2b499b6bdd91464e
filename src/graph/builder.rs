//! RelationshipGraphBuilder - assembles the company relationship graph
//!
//! One build runs in phases over an immutable set of company snapshots:
//!
//! 1. Load the requested companies (or every approved company)
//! 2. Ingest relational joins (board seats, investments, founder relations);
//!    these seed the per-build person registry
//! 3. Backfill investor companies referenced by investments but not loaded
//! 4. Run the free-text extractors company by company against the registry
//! 5. Run the batch extractors (hierarchy, partnerships, data centers)
//! 6. Construct nodes, each id exactly once
//! 7. Drop links whose endpoints are missing or belong to another record table
//!    (company, person and data-center ids may collide), then dedup
//!
//! Only data-source failures are errors. Everything else that cannot be
//! attributed with confidence is left out of the graph.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::context::{BuildContext, RecordKind, SourcedLink};
use super::extractors::{
    extract_data_center_links, extract_founder_links, extract_funding_links,
    extract_hierarchy_links, extract_partnership_links, parse_tags,
};
use super::focus::neighborhood;
use super::types::{GraphData, Link, LinkMetadata, LinkType, Node, NodeMetadata, NodeType};
use crate::config::GraphConfig;
use crate::database::{CompanyDataSource, CompanySnapshot, DataCenterRecord, PersonRecord};
use crate::entity_linking::{CompanyNameSet, EntityClassifier};
use crate::error::Result;

/// Per-call build options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphBuildOptions {
    pub include_people: bool,
    pub include_data_centers: bool,
    pub include_partnerships: bool,
    /// Undirected hop limit around the requested companies; ignored when
    /// building over all companies
    pub max_depth: Option<u32>,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            include_people: true,
            include_data_centers: true,
            include_partnerships: true,
            max_depth: None,
        }
    }
}

/// Builds [`GraphData`] from a [`CompanyDataSource`].
///
/// The builder itself is immutable and can serve concurrent builds: all
/// per-build state lives in a fresh [`BuildContext`].
pub struct RelationshipGraphBuilder {
    source: Arc<dyn CompanyDataSource>,
    config: GraphConfig,
    classifier: EntityClassifier,
}

impl RelationshipGraphBuilder {
    pub fn new(source: Arc<dyn CompanyDataSource>) -> Self {
        Self::with_config(source, GraphConfig::default())
    }

    pub fn with_config(source: Arc<dyn CompanyDataSource>, config: GraphConfig) -> Self {
        let classifier = config.classifier();
        Self {
            source,
            config,
            classifier,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn classifier(&self) -> &EntityClassifier {
        &self.classifier
    }

    /// Build the graph for `company_ids`, or for every approved company when `None`.
    ///
    /// Unknown ids are dropped silently. Fails only when the data source fails.
    pub async fn build_graph_data(
        &self,
        company_ids: Option<&[String]>,
        options: &GraphBuildOptions,
    ) -> Result<GraphData> {
        // Phase 1: working set
        let mut companies = self.source.get_companies(company_ids).await?;
        let mut loaded: HashSet<String> = HashSet::new();
        companies.retain(|c| !c.id.is_empty() && loaded.insert(c.id.clone()));
        if let Some(ids) = company_ids {
            let dropped = ids.iter().filter(|id| !loaded.contains(*id)).count();
            if dropped > 0 {
                debug!("{} requested company ids did not resolve", dropped);
            }
        }

        let company_names = self.source.get_company_name_index(None).await?;
        let mut ctx = BuildContext::new(
            &self.classifier,
            &self.config.weights,
            CompanyNameSet::from(company_names),
        );

        // Phase 2: relational joins
        let mut missing_investors: Vec<String> = Vec::new();
        for company in &companies {
            ingest_relational(company, options, &mut ctx, &loaded, &mut missing_investors);
        }

        // Phase 3: backfill
        let backfilled = self.backfill(&missing_investors, &mut loaded).await?;

        // Phase 4: free text, same registry as the relational phase
        if options.include_people {
            for company in &companies {
                let founders = extract_founder_links(company, &mut ctx);
                ctx.push_links(RecordKind::Person, RecordKind::Company, founders);
                let investors = extract_funding_links(company, &mut ctx);
                ctx.push_links(RecordKind::Person, RecordKind::Company, investors);
            }
        }

        // Phase 5: batch extractors
        let weights = &self.config.weights;
        ctx.push_links(
            RecordKind::Company,
            RecordKind::Company,
            extract_hierarchy_links(&companies, weights),
        );
        if options.include_partnerships {
            ctx.push_links(
                RecordKind::Company,
                RecordKind::Company,
                extract_partnership_links(&companies, weights),
            );
        }
        if options.include_data_centers {
            ctx.push_links(
                RecordKind::Company,
                RecordKind::DataCenter,
                extract_data_center_links(&companies, weights),
            );
        }

        // Phase 6: nodes, first record per id wins
        let mut nodes = Vec::new();
        let mut origins: HashMap<String, RecordKind> = HashMap::new();

        for company in companies.iter().chain(backfilled.iter()) {
            if claim_id(&mut origins, &company.id, RecordKind::Company) {
                nodes.push(self.company_node(company));
            }
        }
        if options.include_people {
            for person in ctx.persons.iter() {
                if claim_id(&mut origins, &person.id, RecordKind::Person) {
                    nodes.push(self.person_node(person));
                }
            }
        }
        if options.include_data_centers {
            let data_centers: BTreeMap<&str, &DataCenterRecord> = companies
                .iter()
                .flat_map(|c| c.data_centers.iter())
                .filter(|dc| !dc.data_center.id.is_empty())
                .map(|dc| (dc.data_center.id.as_str(), &dc.data_center))
                .collect();
            for (id, record) in data_centers {
                if claim_id(&mut origins, id, RecordKind::DataCenter) {
                    nodes.push(self.data_center_node(record));
                }
            }
        }

        // Phase 7: endpoint check and dedup
        let unresolved_names = ctx.unresolved_names;
        let skipped_person_records = ctx.skipped_person_records;
        let (links, miswired) = wire_links(ctx.links, &origins);
        let mut graph = GraphData::new(nodes, links);
        let dropped_links = miswired + graph.dedup();

        if let (Some(ids), Some(depth)) = (company_ids, options.max_depth) {
            restrict_to_depth(&mut graph, ids, depth);
        }

        info!(
            "Built relationship graph: {} nodes, {} links ({} duplicate or dangling links dropped, {} unresolved names, {} person records skipped)",
            graph.nodes.len(),
            graph.links.len(),
            dropped_links,
            unresolved_names,
            skipped_person_records
        );

        Ok(graph)
    }

    /// Fetch investor companies referenced by investments but absent from the
    /// working set. They become nodes only; their own fields are not extracted.
    async fn backfill(
        &self,
        missing: &[String],
        loaded: &mut HashSet<String>,
    ) -> Result<Vec<CompanySnapshot>> {
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let mut fetched = self.source.get_companies(Some(missing)).await?;
        fetched.retain(|c| missing.contains(&c.id) && loaded.insert(c.id.clone()));

        for id in missing.iter().filter(|id| !loaded.contains(*id)) {
            warn!(
                "Investor company {} is referenced by an investment but could not be loaded",
                id
            );
        }
        debug!("Backfilled {} investor companies", fetched.len());
        Ok(fetched)
    }

    fn resolve_type(&self, id: &str, heuristic: NodeType) -> NodeType {
        self.config
            .type_overrides
            .get(id)
            .copied()
            .unwrap_or(heuristic)
    }

    fn company_node(&self, company: &CompanySnapshot) -> Node {
        let tags = company.tags.as_ref().map(parse_tags).unwrap_or_default();
        let is_capital = tags.iter().any(|t| self.classifier.is_capital_tag(t))
            || self.classifier.is_capital_entity(&company.name);
        let heuristic = if is_capital {
            NodeType::Capital
        } else {
            NodeType::Company
        };
        let node_type = self.resolve_type(&company.id, heuristic);

        let mut metadata = NodeMetadata {
            company_id: Some(company.id.clone()),
            ..Default::default()
        };
        if node_type == NodeType::Capital {
            metadata.capital_id = Some(company.id.clone());
        }
        if !tags.is_empty() {
            metadata.extra.insert("tags".into(), Value::from(tags));
        }

        Node {
            id: company.id.clone(),
            name: company.name.clone(),
            node_type,
            logo_url: company.logo_url.clone(),
            photo_url: None,
            slug: company.slug.clone(),
            metadata,
        }
    }

    fn person_node(&self, person: &PersonRecord) -> Node {
        let heuristic = if self.classifier.is_organization(&person.name) {
            NodeType::Capital
        } else {
            NodeType::Person
        };
        let node_type = self.resolve_type(&person.id, heuristic);

        let mut metadata = NodeMetadata {
            person_id: Some(person.id.clone()),
            ..Default::default()
        };
        if node_type == NodeType::Capital {
            metadata.capital_id = Some(person.id.clone());
        }
        for (key, value) in [
            ("bio", &person.bio),
            ("linkedinUrl", &person.linkedin_url),
            ("twitterUrl", &person.twitter_url),
        ] {
            if let Some(value) = value {
                metadata.extra.insert(key.into(), Value::from(value.clone()));
            }
        }

        Node {
            id: person.id.clone(),
            name: person.name.clone(),
            node_type,
            logo_url: None,
            photo_url: person.photo_url.clone(),
            slug: person.slug.clone(),
            metadata,
        }
    }

    fn data_center_node(&self, record: &DataCenterRecord) -> Node {
        let mut metadata = NodeMetadata {
            data_center_id: Some(record.id.clone()),
            ..Default::default()
        };
        if let Some(location) = &record.location {
            metadata
                .extra
                .insert("location".into(), Value::from(location.clone()));
        }

        Node {
            id: record.id.clone(),
            name: record.name.clone(),
            node_type: self.resolve_type(&record.id, NodeType::DataCenter),
            logo_url: None,
            photo_url: None,
            slug: record.slug.clone(),
            metadata,
        }
    }
}

/// Relational joins of one company: trusted person records seed the registry,
/// company-side investments queue their investor for backfill when unloaded.
fn ingest_relational(
    company: &CompanySnapshot,
    options: &GraphBuildOptions,
    ctx: &mut BuildContext<'_>,
    loaded: &HashSet<String>,
    missing_investors: &mut Vec<String>,
) {
    let weights = ctx.weights;

    if options.include_people {
        for position in &company.board_positions {
            if ctx.admit_person(&position.person) {
                let link = Link::new(
                    position.person.id.clone(),
                    company.id.clone(),
                    LinkType::BoardMember,
                )
                .with_strength(weights.board_member)
                .with_metadata(LinkMetadata {
                    title: position.title.clone(),
                    date: position.start_date.clone(),
                    ..Default::default()
                });
                ctx.push_links(RecordKind::Person, RecordKind::Company, [link]);
            }
        }

        for relation in &company.founder_relations {
            if ctx.admit_person(&relation.person) {
                let link = Link::new(
                    relation.person.id.clone(),
                    company.id.clone(),
                    LinkType::Founder,
                )
                .with_strength(weights.founder)
                .with_metadata(LinkMetadata {
                    title: relation.title.clone(),
                    ..Default::default()
                });
                ctx.push_links(RecordKind::Person, RecordKind::Company, [link]);
            }
        }
    }

    for investment in &company.investments {
        let metadata = LinkMetadata {
            round: investment.round.clone(),
            amount: investment.amount.clone(),
            date: investment.date.clone(),
            ..Default::default()
        };

        if let Some(person) = &investment.person {
            if options.include_people && ctx.admit_person(person) {
                let link = Link::new(person.id.clone(), company.id.clone(), LinkType::Investor)
                    .with_strength(weights.investor)
                    .with_metadata(metadata);
                ctx.push_links(RecordKind::Person, RecordKind::Company, [link]);
            }
        } else if let Some(investor) = &investment.investor_company {
            if investor.id.is_empty() || investor.id == company.id {
                continue;
            }
            let link = Link::new(investor.id.clone(), company.id.clone(), LinkType::Investor)
                .with_strength(weights.investor)
                .with_metadata(metadata);
            ctx.push_links(RecordKind::Company, RecordKind::Company, [link]);
            if !loaded.contains(&investor.id) && !missing_investors.contains(&investor.id) {
                missing_investors.push(investor.id.clone());
            }
        }
    }
}

/// Reserve `id` for a node built from a `kind` record. An id already taken by
/// another table's record is refused and logged.
fn claim_id(origins: &mut HashMap<String, RecordKind>, id: &str, kind: RecordKind) -> bool {
    match origins.get(id) {
        None => {
            origins.insert(id.to_string(), kind);
            true
        }
        Some(existing) if *existing == kind => false,
        Some(existing) => {
            warn!(
                "{:?} record {} shares its id with a {:?} record; skipped",
                kind, id, existing
            );
            false
        }
    }
}

/// Keep links whose endpoints are nodes built from the record tables the link
/// was extracted from. Returns the kept links and the number dropped.
fn wire_links(links: Vec<SourcedLink>, origins: &HashMap<String, RecordKind>) -> (Vec<Link>, usize) {
    let total = links.len();
    let kept: Vec<Link> = links
        .into_iter()
        .filter(|l| {
            origins.get(&l.link.source) == Some(&l.source)
                && origins.get(&l.link.target) == Some(&l.target)
        })
        .map(|l| l.link)
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Keep only nodes within `depth` undirected hops of the requested companies
fn restrict_to_depth(graph: &mut GraphData, company_ids: &[String], depth: u32) {
    let keep = neighborhood(graph, company_ids, depth);
    graph.nodes.retain(|n| keep.contains(&n.id));
    graph
        .links
        .retain(|l| keep.contains(&l.source) && keep.contains(&l.target));
}
