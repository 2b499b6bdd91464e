//! Graph types for relationship visualization
//!
//! These types define the node/link representation handed to the rendering
//! layer. Link endpoints are always plain node ids ([`NodeRef`]); resolving
//! them to node objects happens at the rendering boundary, never here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A link endpoint: the id of a node in the same graph
pub type NodeRef = String;

/// Kinds of graph-visible entities
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Company,
    Person,
    DataCenter,
    /// Company- or person-shaped record recognized as an investment firm
    Capital,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Company,
        NodeType::Person,
        NodeType::DataCenter,
        NodeType::Capital,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Company => "company",
            NodeType::Person => "person",
            NodeType::DataCenter => "data-center",
            NodeType::Capital => "capital",
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown node type: {}", s))
    }
}

/// Types of directed relationships
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    /// investor -> company
    Investor,
    /// child -> parent
    Parent,
    /// parent -> child
    Subsidiary,
    /// person -> company
    BoardMember,
    /// person -> company
    Founder,
    /// company -> partner company
    Partnership,
    /// company -> data center
    DataCenterOwner,
    /// company -> data center
    DataCenterUser,
}

impl LinkType {
    pub const ALL: [LinkType; 8] = [
        LinkType::Investor,
        LinkType::Parent,
        LinkType::Subsidiary,
        LinkType::BoardMember,
        LinkType::Founder,
        LinkType::Partnership,
        LinkType::DataCenterOwner,
        LinkType::DataCenterUser,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Investor => "investor",
            LinkType::Parent => "parent",
            LinkType::Subsidiary => "subsidiary",
            LinkType::BoardMember => "board-member",
            LinkType::Founder => "founder",
            LinkType::Partnership => "partnership",
            LinkType::DataCenterOwner => "data-center-owner",
            LinkType::DataCenterUser => "data-center-user",
        }
    }
}

impl std::str::FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown link type: {}", s))
    }
}

/// Back-references from a node to its underlying records, plus free-form extras
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_center_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A graph-visible entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeRef,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

/// Relationship-specific details carried on a link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Partnership kind ("strategic", "technology", ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LinkMetadata {
    pub fn is_empty(&self) -> bool {
        self == &LinkMetadata::default()
    }
}

/// A directed, typed relationship between two node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeRef,
    pub target: NodeRef,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
    #[serde(default, skip_serializing_if = "LinkMetadata::is_empty")]
    pub metadata: LinkMetadata,
}

impl Link {
    pub fn new(source: impl Into<NodeRef>, target: impl Into<NodeRef>, link_type: LinkType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type,
            strength: None,
            metadata: LinkMetadata::default(),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_metadata(mut self, metadata: LinkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Identity of a link within a graph
    pub fn key(&self) -> (&str, &str, LinkType) {
        (self.source.as_str(), self.target.as_str(), self.link_type)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// Node/link graph handed to the rendering layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// Counts by node and link type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub link_count: usize,
    pub nodes_by_type: BTreeMap<NodeType, usize>,
    pub links_by_type: BTreeMap<LinkType, usize>,
}

impl GraphData {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Links leaving or entering `id`
    pub fn links_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.touches(id))
    }

    /// Final correctness pass: first node per id wins, first link per
    /// `(source, target, type)` wins, self-loops and links with a missing
    /// endpoint are dropped.
    ///
    /// Returns the number of links removed.
    pub fn dedup(&mut self) -> usize {
        let mut seen_nodes = HashSet::new();
        self.nodes.retain(|n| seen_nodes.insert(n.id.clone()));

        let before = self.links.len();
        let mut seen_links = HashSet::new();
        self.links.retain(|l| {
            l.source != l.target
                && seen_nodes.contains(&l.source)
                && seen_nodes.contains(&l.target)
                && seen_links.insert((l.source.clone(), l.target.clone(), l.link_type))
        });
        before - self.links.len()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.nodes.len(),
            link_count: self.links.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            *stats.nodes_by_type.entry(node.node_type).or_insert(0) += 1;
        }
        for link in &self.links {
            *stats.links_by_type.entry(link.link_type).or_insert(0) += 1;
        }
        stats
    }

    pub fn to_json_pretty(&self) -> Result<String, crate::error::GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
