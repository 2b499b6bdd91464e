//! Relationship extractors over denormalized company fields
//!
//! One function per relationship kind. Company-scoped extractors (funding,
//! founders) resolve free-text names through the build context and only emit
//! links for names that already belong to a registered person. Batch extractors
//! (hierarchy, partnerships, data centers) work on structured ids alone.
//!
//! Semi-structured fields are parsed leniently: malformed JSON means "no
//! structured data", never an error.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::context::BuildContext;
use super::types::{Link, LinkMetadata, LinkType};
use crate::config::EdgeWeights;
use crate::database::{CompanySnapshot, DataCenterRelation};

// =============================================================================
// FIELD PARSING
// =============================================================================

/// A JSON-ish field as a structured value: strings are parsed as JSON,
/// anything unparseable yields `None`.
fn structured(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => serde_json::from_str(s).ok(),
        other => Some(other.clone()),
    }
}

/// Scalars rendered as display strings (amounts may be numbers or text)
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One funding round as found in `company.funding`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundingRound {
    pub round: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub investors: Vec<String>,
}

impl FundingRound {
    fn from_object(obj: &serde_json::Map<String, Value>) -> Self {
        let investors = obj
            .get("investors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Object(o) => o
                            .get("name")
                            .and_then(Value::as_str)
                            .map(|s| s.trim().to_string()),
                        _ => None,
                    })
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            round: scalar_string(obj.get("round").or_else(|| obj.get("stage"))),
            amount: scalar_string(obj.get("amount").or_else(|| obj.get("total"))),
            date: scalar_string(obj.get("date")),
            investors,
        }
    }

    fn metadata(&self) -> LinkMetadata {
        LinkMetadata {
            amount: self.amount.clone(),
            round: self.round.clone(),
            date: self.date.clone(),
            ..Default::default()
        }
    }
}

/// Parse `company.funding`: an object with an `investors` list, an array of such
/// round objects, or a string holding either. Plain prose yields nothing.
pub fn parse_funding(funding: &Value) -> Vec<FundingRound> {
    match structured(funding) {
        Some(Value::Object(obj)) => vec![FundingRound::from_object(&obj)],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(FundingRound::from_object)
            .collect(),
        _ => {
            debug!("Funding field carries no structured data");
            Vec::new()
        }
    }
}

/// Parse `company.tags`: a JSON array of strings, or a string holding one
pub fn parse_tags(tags: &Value) -> Vec<String> {
    match structured(tags) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => {
            debug!("Tags field is not a JSON array; skipped");
            Vec::new()
        }
    }
}

/// One entry of `company.partnerships`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipEntry {
    pub company_id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Parse `company.partnerships`; malformed entries are skipped individually
pub fn parse_partnerships(partnerships: &Value) -> Vec<PartnershipEntry> {
    match structured(partnerships) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<PartnershipEntry>(item).ok())
            .filter(|entry| !entry.company_id.is_empty())
            .collect(),
        _ => {
            debug!("Partnerships field is not a JSON array; skipped");
            Vec::new()
        }
    }
}

// =============================================================================
// COMPANY-SCOPED EXTRACTORS
// =============================================================================

/// `investor` links person -> company for funding investors that resolve to a
/// registered person. Names that are obviously companies are filtered first.
pub fn extract_funding_links(company: &CompanySnapshot, ctx: &mut BuildContext<'_>) -> Vec<Link> {
    let Some(funding) = company.funding.as_ref() else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for round in parse_funding(funding) {
        for investor in &round.investors {
            if ctx.classifier.looks_like_company(investor) {
                continue;
            }
            if let Some(person_id) = ctx.resolve_person(investor) {
                links.push(
                    Link::new(person_id, company.id.clone(), LinkType::Investor)
                        .with_strength(ctx.weights.investor)
                        .with_metadata(round.metadata()),
                );
            }
        }
    }
    links
}

/// `founder` links person -> company for free-text founders that resolve to a
/// registered person
pub fn extract_founder_links(company: &CompanySnapshot, ctx: &mut BuildContext<'_>) -> Vec<Link> {
    let mut links = Vec::new();
    for founder in company.founders.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if let Some(person_id) = ctx.resolve_person(founder) {
            links.push(
                Link::new(person_id, company.id.clone(), LinkType::Founder)
                    .with_strength(ctx.weights.founder),
            );
        }
    }
    links
}

// =============================================================================
// BATCH EXTRACTORS
// =============================================================================

/// `subsidiary` links parent -> child
pub fn extract_hierarchy_links(companies: &[CompanySnapshot], weights: &EdgeWeights) -> Vec<Link> {
    companies
        .iter()
        .filter_map(|c| {
            let parent = c.parent_company_id.as_deref()?.trim();
            if parent.is_empty() || parent == c.id {
                return None;
            }
            Some(
                Link::new(parent, c.id.clone(), LinkType::Subsidiary)
                    .with_strength(weights.subsidiary),
            )
        })
        .collect()
}

/// `partnership` links company -> partner company
pub fn extract_partnership_links(
    companies: &[CompanySnapshot],
    weights: &EdgeWeights,
) -> Vec<Link> {
    let mut links = Vec::new();
    for company in companies {
        let Some(partnerships) = company.partnerships.as_ref() else {
            continue;
        };
        for entry in parse_partnerships(partnerships) {
            if entry.company_id == company.id {
                continue;
            }
            links.push(
                Link::new(company.id.clone(), entry.company_id, LinkType::Partnership)
                    .with_strength(weights.partnership)
                    .with_metadata(LinkMetadata {
                        kind: entry.kind,
                        description: entry.description,
                        date: entry.date,
                        ..Default::default()
                    }),
            );
        }
    }
    links
}

/// `data-center-owner` / `data-center-user` links company -> data center
pub fn extract_data_center_links(
    companies: &[CompanySnapshot],
    weights: &EdgeWeights,
) -> Vec<Link> {
    companies
        .iter()
        .flat_map(|company| {
            company
                .data_centers
                .iter()
                .filter(|dc| !dc.data_center.id.is_empty())
                .map(|dc| {
                    let link_type = match dc.relation {
                        DataCenterRelation::Owner => LinkType::DataCenterOwner,
                        DataCenterRelation::User => LinkType::DataCenterUser,
                    };
                    Link::new(company.id.clone(), dc.data_center.id.clone(), link_type)
                        .with_strength(weights.for_link(link_type))
                })
        })
        .collect()
}
