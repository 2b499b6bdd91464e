//! Read-only data access for the graph builder
//!
//! The relational store itself is owned elsewhere. The builder sees it only
//! through [`CompanyDataSource`], which hands back immutable company snapshots
//! with their relational joins already attached.

pub mod snapshot_store;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

pub use snapshot_store::SnapshotStore;

// =============================================================================
// LENIENT FIELD DECODING
// =============================================================================

/// A list field that may arrive as `null`, prose, or with malformed entries.
///
/// Anything but an array decodes as empty; array entries that do not decode
/// are skipped one by one.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    debug!("Skipping malformed list entry: {}", e);
                    None
                }
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            debug!("Expected a list, found {}; treated as empty", other);
            Ok(Vec::new())
        }
    }
}

/// Display scalar that may arrive as a string or a number
fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// =============================================================================
// SNAPSHOT RECORDS (read-only views)
// =============================================================================

/// A record the store already recognizes as a person
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
}

/// Minimal reference to another company (e.g. the investor side of an investment)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyRef {
    pub id: String,
    pub name: String,
}

/// Board seat join record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardPosition {
    pub person: PersonRecord,
    pub title: Option<String>,
    pub start_date: Option<String>,
}

/// Investment join record; exactly one of `person` / `investor_company` is expected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestmentRecord {
    pub person: Option<PersonRecord>,
    pub investor_company: Option<CompanyRef>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub round: Option<String>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub amount: Option<String>,
    pub date: Option<String>,
}

/// Founder relation join record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FounderRelation {
    pub person: PersonRecord,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataCenterRecord {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub location: Option<String>,
}

/// How a company is linked to a data center
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCenterRelation {
    #[default]
    Owner,
    User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataCenterLink {
    pub data_center: DataCenterRecord,
    pub relation: DataCenterRelation,
}

/// Immutable view of one company for the duration of a build.
///
/// `funding`, `tags` and `partnerships` are semi-structured: they may hold a JSON
/// value, a string containing JSON, or junk. Extractors parse them leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanySnapshot {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub slug: Option<String>,
    pub approved: bool,
    #[serde(deserialize_with = "lenient_vec")]
    pub founders: Vec<String>,
    pub funding: Option<serde_json::Value>,
    pub tags: Option<serde_json::Value>,
    pub parent_company_id: Option<String>,
    pub partnerships: Option<serde_json::Value>,
    #[serde(deserialize_with = "lenient_vec")]
    pub data_centers: Vec<DataCenterLink>,
    #[serde(deserialize_with = "lenient_vec")]
    pub board_positions: Vec<BoardPosition>,
    #[serde(deserialize_with = "lenient_vec")]
    pub investments: Vec<InvestmentRecord>,
    #[serde(deserialize_with = "lenient_vec")]
    pub founder_relations: Vec<FounderRelation>,
}

impl Default for CompanySnapshot {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            logo_url: None,
            slug: None,
            approved: true,
            founders: Vec::new(),
            funding: None,
            tags: None,
            parent_company_id: None,
            partnerships: None,
            data_centers: Vec::new(),
            board_positions: Vec::new(),
            investments: Vec::new(),
            founder_relations: Vec::new(),
        }
    }
}

impl CompanySnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// DATA SOURCE
// =============================================================================

/// Read-only company/person data access consumed by the graph builder.
///
/// Implementations own timeouts and retries; any error returned here fails the
/// whole build.
#[async_trait]
pub trait CompanyDataSource: Send + Sync {
    /// Approved companies with their joins; all of them when `ids` is `None`.
    /// Unknown ids are simply absent from the result.
    async fn get_companies(&self, ids: Option<&[String]>) -> anyhow::Result<Vec<CompanySnapshot>>;

    /// Lowercase company names used for company-vs-person disambiguation
    async fn get_company_name_index(
        &self,
        ids: Option<&[String]>,
    ) -> anyhow::Result<HashSet<String>>;
}
