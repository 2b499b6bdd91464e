//! Company relationship graph
//!
//! Turns company directory snapshots (relational joins plus semi-structured
//! free-text fields) into a deduplicated node/link graph for force-directed
//! rendering, and answers focus queries over the built graph.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use company_graph::{GraphBuildOptions, RelationshipGraphBuilder, SnapshotStore};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = SnapshotStore::from_file("companies.json".as_ref())?;
//! let builder = RelationshipGraphBuilder::new(Arc::new(store));
//! let graph = builder
//!     .build_graph_data(None, &GraphBuildOptions::default())
//!     .await?;
//! println!("{}", graph.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Builder configuration (lexicon overrides, edge weights, type overrides)
pub mod config;

// Read-only data access
pub mod database;

// Name normalization, classification and person deduplication
pub mod entity_linking;

// Graph types, assembly and focus queries
pub mod graph;

pub use config::{EdgeWeights, GraphConfig};
pub use database::{CompanyDataSource, CompanySnapshot, SnapshotStore};
pub use entity_linking::{EntityClassifier, PersonRegistry};
pub use error::{GraphError, Result};
pub use graph::{
    filter_visible, select_focus_subgraph, GraphBuildOptions, GraphData, Link, LinkType, Node,
    NodeRef, NodeType, RelationshipGraphBuilder, VisibilityFilter,
};
