//! Relationship graph assembly and focus queries

pub mod builder;
pub mod context;
pub mod extractors;
pub mod focus;
pub mod types;

pub use builder::{GraphBuildOptions, RelationshipGraphBuilder};
pub use context::BuildContext;
pub use focus::{filter_visible, focus_levels, neighborhood, select_focus_subgraph, VisibilityFilter};
pub use types::{
    GraphData, GraphStats, Link, LinkMetadata, LinkType, Node, NodeMetadata, NodeRef, NodeType,
};
