//! Focus subgraph selection (ego networks)
//!
//! Stateless: every selection change recomputes from the full graph.
//!
//! Levels around a selected node:
//! - level 0: the selected node
//! - level 1: every node sharing a link with it, either direction
//! - level 2: only `person` nodes linked to a level-1 node
//!
//! Level 2 is restricted to persons so that hub companies with hundreds of
//! investor/subsidiary links still yield a readable graph that shows who sits
//! on the boards of connected companies.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::types::{GraphData, LinkType, NodeRef, NodeType};

/// Per-type visibility toggles; everything is visible by default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityFilter {
    pub hidden_node_types: BTreeSet<NodeType>,
    pub hidden_link_types: BTreeSet<LinkType>,
}

impl VisibilityFilter {
    pub fn hide_node_type(mut self, node_type: NodeType) -> Self {
        self.hidden_node_types.insert(node_type);
        self
    }

    pub fn hide_link_type(mut self, link_type: LinkType) -> Self {
        self.hidden_link_types.insert(link_type);
        self
    }

    pub fn is_node_visible(&self, node_type: NodeType) -> bool {
        !self.hidden_node_types.contains(&node_type)
    }

    pub fn is_link_visible(&self, link_type: LinkType) -> bool {
        !self.hidden_link_types.contains(&link_type)
    }
}

/// Undirected adjacency over node ids
fn adjacency(graph: &GraphData) -> HashMap<&str, Vec<&str>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in &graph.links {
        adjacency
            .entry(link.source.as_str())
            .or_default()
            .push(link.target.as_str());
        adjacency
            .entry(link.target.as_str())
            .or_default()
            .push(link.source.as_str());
    }
    adjacency
}

/// Existing nodes sharing a link with `id`
fn linked_nodes<'g>(
    adjacency: &HashMap<&'g str, Vec<&'g str>>,
    types: &HashMap<&'g str, NodeType>,
    id: &str,
) -> Vec<&'g str> {
    adjacency
        .get(id)
        .map(|ns| {
            ns.iter()
                .copied()
                .filter(|n| types.contains_key(n))
                .collect()
        })
        .unwrap_or_default()
}

/// Focus level (0, 1 or 2) of every node in the selection around `selected`.
///
/// Empty when `selected` is not a node of the graph.
pub fn focus_levels(graph: &GraphData, selected: &str) -> BTreeMap<NodeRef, u8> {
    let mut levels = BTreeMap::new();
    if !graph.has_node(selected) {
        return levels;
    }

    let types: HashMap<&str, NodeType> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.node_type))
        .collect();
    let adjacency = adjacency(graph);

    levels.insert(selected.to_string(), 0);

    let level_one = linked_nodes(&adjacency, &types, selected);
    for id in &level_one {
        levels.entry(id.to_string()).or_insert(1);
    }

    for id in &level_one {
        for candidate in linked_nodes(&adjacency, &types, id) {
            if types.get(candidate) == Some(&NodeType::Person) {
                levels.entry(candidate.to_string()).or_insert(2);
            }
        }
    }

    levels
}

/// The focus subgraph around `selected`, with visibility toggles applied.
///
/// Hidden node types never hide the selected node itself. Links survive when
/// both endpoints survive and their type is visible. An unknown `selected`
/// yields an empty graph.
pub fn select_focus_subgraph(
    graph: &GraphData,
    selected: &str,
    filter: &VisibilityFilter,
) -> GraphData {
    let levels = focus_levels(graph, selected);

    let nodes: Vec<_> = graph
        .nodes
        .iter()
        .filter(|n| {
            levels.contains_key(&n.id) && (n.id == selected || filter.is_node_visible(n.node_type))
        })
        .cloned()
        .collect();

    retain_links(graph, nodes, filter)
}

/// The whole graph with visibility toggles applied and no focus selection
pub fn filter_visible(graph: &GraphData, filter: &VisibilityFilter) -> GraphData {
    let nodes: Vec<_> = graph
        .nodes
        .iter()
        .filter(|n| filter.is_node_visible(n.node_type))
        .cloned()
        .collect();

    retain_links(graph, nodes, filter)
}

fn retain_links(
    graph: &GraphData,
    nodes: Vec<super::types::Node>,
    filter: &VisibilityFilter,
) -> GraphData {
    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let links = graph
        .links
        .iter()
        .filter(|l| {
            kept.contains(l.source.as_str())
                && kept.contains(l.target.as_str())
                && filter.is_link_visible(l.link_type)
        })
        .cloned()
        .collect();

    GraphData::new(nodes, links)
}

/// Node ids within `depth` undirected hops of any seed present in the graph
pub fn neighborhood(graph: &GraphData, seeds: &[String], depth: u32) -> HashSet<NodeRef> {
    let adjacency = adjacency(graph);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, u32)> = VecDeque::new();

    for seed in seeds {
        if let Some(node) = graph.get_node(seed) {
            if visited.insert(node.id.as_str()) {
                queue.push_back((node.id.as_str(), 0));
            }
        }
    }

    while let Some((current, d)) = queue.pop_front() {
        if d >= depth {
            continue;
        }
        if let Some(neighbors) = adjacency.get(current) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back((next, d + 1));
                }
            }
        }
    }

    visited.into_iter().map(str::to_string).collect()
}
