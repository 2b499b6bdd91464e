//! Graph builder configuration
//!
//! Loaded from YAML. Every section is optional; missing values fall back to the
//! built-in defaults.
//!
//! ```yaml
//! lexicon:
//!   known_capital_firms: ["acme syndicate"]
//!   capital_tags: ["family office"]
//! weights:
//!   founder: 3.0
//! type_overrides:
//!   person-42: capital
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::entity_linking::{EntityClassifier, EntityLexicon, LexiconOverrides};
use crate::graph::types::{LinkType, NodeType};

/// Link strength per relationship kind (force-directed layout weight)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeWeights {
    pub investor: f32,
    pub founder: f32,
    pub board_member: f32,
    pub subsidiary: f32,
    pub partnership: f32,
    pub data_center_owner: f32,
    pub data_center_user: f32,
}

impl Default for EdgeWeights {
    fn default() -> Self {
        Self {
            investor: 1.0,
            founder: 2.0,
            board_member: 1.0,
            subsidiary: 1.0,
            partnership: 1.0,
            data_center_owner: 1.0,
            data_center_user: 1.0,
        }
    }
}

impl EdgeWeights {
    pub fn for_link(&self, link_type: LinkType) -> f32 {
        match link_type {
            LinkType::Investor => self.investor,
            LinkType::Founder => self.founder,
            LinkType::BoardMember => self.board_member,
            LinkType::Subsidiary | LinkType::Parent => self.subsidiary,
            LinkType::Partnership => self.partnership,
            LinkType::DataCenterOwner => self.data_center_owner,
            LinkType::DataCenterUser => self.data_center_user,
        }
    }
}

/// Configuration shared by every build of a `RelationshipGraphBuilder`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Extensions to the built-in classification tables
    pub lexicon: LexiconOverrides,
    pub weights: EdgeWeights,
    /// Curator overrides: node id -> type, replacing the heuristic
    pub type_overrides: BTreeMap<String, NodeType>,
}

impl GraphConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse graph config YAML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to load config {:?}", path))
    }

    pub fn classifier(&self) -> EntityClassifier {
        EntityClassifier::new(EntityLexicon::with_overrides(&self.lexicon))
    }
}
