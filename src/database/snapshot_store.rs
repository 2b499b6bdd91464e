//! In-memory company store backed by a JSON snapshot
//!
//! Serves exported directory data to the graph builder without a live database:
//! used by the `graph_export` CLI and by tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use super::{CompanyDataSource, CompanySnapshot};

/// On-disk snapshot format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub companies: Vec<CompanySnapshot>,
}

/// Read-only company store over an in-memory snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    companies: Vec<CompanySnapshot>,
}

impl SnapshotStore {
    pub fn new(companies: Vec<CompanySnapshot>) -> Self {
        Self { companies }
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: SnapshotFile =
            serde_json::from_str(json).context("Failed to parse company snapshot JSON")?;
        Ok(Self::new(file.companies))
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let store = Self::from_json_str(&content)
            .with_context(|| format!("Failed to load snapshot {:?}", path))?;
        debug!("Loaded {} companies from {:?}", store.companies.len(), path);
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    fn approved(&self) -> impl Iterator<Item = &CompanySnapshot> {
        self.companies.iter().filter(|c| c.approved)
    }

    /// Approved companies for `ids` in request order, skipping unknown and repeated ids
    fn select(&self, ids: Option<&[String]>) -> Vec<&CompanySnapshot> {
        match ids {
            None => self.approved().collect(),
            Some(ids) => {
                let mut seen = HashSet::new();
                ids.iter()
                    .filter(|id| seen.insert(id.as_str()))
                    .filter_map(|id| self.approved().find(|c| &c.id == id))
                    .collect()
            }
        }
    }
}

#[async_trait]
impl CompanyDataSource for SnapshotStore {
    async fn get_companies(&self, ids: Option<&[String]>) -> Result<Vec<CompanySnapshot>> {
        Ok(self.select(ids).into_iter().cloned().collect())
    }

    async fn get_company_name_index(&self, ids: Option<&[String]>) -> Result<HashSet<String>> {
        Ok(self
            .select(ids)
            .into_iter()
            .map(|c| c.name.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect())
    }
}
