//! Graph Export CLI
//!
//! Builds the relationship graph from a company snapshot file and prints it as
//! JSON, optionally narrowed to the focus subgraph of one node.
//!
//! Usage:
//!   cargo run --features cli --bin graph_export -- \
//!     --snapshot companies.json \
//!     --company openai --company anthropic \
//!     --max-depth 2
//!
//! Examples:
//!   # Ego network around one company, without data centers
//!   cargo run --features cli --bin graph_export -- \
//!     --snapshot companies.json \
//!     --focus openai \
//!     --hide-node data-center
//!
//!   # Counts only
//!   cargo run --features cli --bin graph_export -- --snapshot companies.json --stats

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use company_graph::{
    filter_visible, select_focus_subgraph, GraphBuildOptions, GraphConfig, LinkType, NodeType,
    RelationshipGraphBuilder, SnapshotStore, VisibilityFilter,
};

/// Company relationship graph exporter
#[derive(Parser, Debug)]
#[command(name = "graph_export")]
#[command(about = "Build the company relationship graph from a snapshot file")]
struct Args {
    /// Company snapshot JSON ({"companies": [...]})
    #[arg(long, short = 's', env = "COMPANY_GRAPH_SNAPSHOT")]
    snapshot: PathBuf,

    /// Builder config YAML (lexicon overrides, weights, type overrides)
    #[arg(long, short = 'c', env = "COMPANY_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Restrict the build to these company ids (repeatable)
    #[arg(long = "company")]
    companies: Vec<String>,

    /// Print only the focus subgraph around this node id
    #[arg(long, short = 'f')]
    focus: Option<String>,

    /// Hop limit around the requested companies
    #[arg(long, short = 'd')]
    max_depth: Option<u32>,

    #[arg(long)]
    no_people: bool,

    #[arg(long)]
    no_data_centers: bool,

    #[arg(long)]
    no_partnerships: bool,

    /// Hide a node type (company, person, data-center, capital); repeatable
    #[arg(long, value_parser = parse_node_type)]
    hide_node: Vec<NodeType>,

    /// Hide a link type (investor, board-member, founder, ...); repeatable
    #[arg(long, value_parser = parse_link_type)]
    hide_link: Vec<LinkType>,

    /// Print node/link counts instead of the graph
    #[arg(long)]
    stats: bool,
}

fn parse_node_type(s: &str) -> Result<NodeType, String> {
    s.parse()
}

fn parse_link_type(s: &str) -> Result<LinkType, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let store = SnapshotStore::from_file(&args.snapshot)?;
    let config = match &args.config {
        Some(path) => GraphConfig::from_file(path)?,
        None => GraphConfig::default(),
    };
    let builder = RelationshipGraphBuilder::with_config(Arc::new(store), config);

    let options = GraphBuildOptions {
        include_people: !args.no_people,
        include_data_centers: !args.no_data_centers,
        include_partnerships: !args.no_partnerships,
        max_depth: args.max_depth,
    };
    let company_ids = (!args.companies.is_empty()).then_some(args.companies.as_slice());

    let graph = builder
        .build_graph_data(company_ids, &options)
        .await
        .context("Graph build failed")?;

    let filter = args
        .hide_node
        .iter()
        .fold(VisibilityFilter::default(), |f, t| f.hide_node_type(*t));
    let filter = args
        .hide_link
        .iter()
        .fold(filter, |f, t| f.hide_link_type(*t));

    let graph = match &args.focus {
        Some(selected) => select_focus_subgraph(&graph, selected, &filter),
        None => filter_visible(&graph, &filter),
    };

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&graph.stats())?);
    } else {
        println!("{}", graph.to_json_pretty()?);
    }

    Ok(())
}
