//! Relationship graph integration tests
//!
//! Drives `RelationshipGraphBuilder` end to end through the in-memory
//! `SnapshotStore`, plus a failing data source for error propagation.
//!
//! Run with: cargo test --test relationship_graph_integration

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use company_graph::database::CompanyDataSource;
use company_graph::graph::focus_levels;
use company_graph::{
    select_focus_subgraph, CompanySnapshot, GraphBuildOptions, GraphData, GraphError, LinkType,
    NodeType, RelationshipGraphBuilder, SnapshotStore, VisibilityFilter,
};

// =============================================================================
// HELPERS
// =============================================================================

fn builder(snapshot: Value) -> RelationshipGraphBuilder {
    let store = SnapshotStore::from_json_str(&snapshot.to_string()).unwrap();
    RelationshipGraphBuilder::new(Arc::new(store))
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn node_ids(graph: &GraphData) -> BTreeSet<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn links_of_type(graph: &GraphData, link_type: LinkType) -> Vec<(&str, &str)> {
    graph
        .links
        .iter()
        .filter(|l| l.link_type == link_type)
        .map(|l| (l.source.as_str(), l.target.as_str()))
        .collect()
}

fn assert_well_formed(graph: &GraphData) {
    let nodes = graph.node_ids();
    assert_eq!(nodes.len(), graph.nodes.len(), "duplicate node id");

    let mut keys = HashSet::new();
    for link in &graph.links {
        assert!(nodes.contains(link.source.as_str()), "dangling source {:?}", link);
        assert!(nodes.contains(link.target.as_str()), "dangling target {:?}", link);
        assert!(keys.insert(link.key()), "duplicate link {:?}", link);
    }
}

fn openai_snapshot() -> Value {
    json!({
        "companies": [
            {
                "id": "openai",
                "name": "OpenAI",
                "founders": ["Sam Altman", "Elon Musk"],
                "boardPositions": [
                    { "person": { "id": "p-sam", "name": "Sam Altman" }, "title": "CEO" }
                ],
                "partnerships": [
                    { "companyId": "microsoft", "type": "strategic" }
                ]
            },
            {
                "id": "microsoft",
                "name": "Microsoft",
                "boardPositions": [
                    { "person": { "id": "p-satya", "name": "Satya Nadella" }, "title": "Chairman" }
                ]
            },
            {
                "id": "anthropic",
                "name": "Anthropic",
                "boardPositions": [
                    { "person": { "id": "p-dario", "name": "Dario Amodei" } }
                ]
            }
        ]
    })
}

/// Company with one board member, one owned data center and one company-side
/// investor that is not part of a single-company build
fn acme_snapshot() -> Value {
    json!({
        "companies": [
            {
                "id": "acme",
                "name": "Acme Robotics",
                "founders": ["Jane Doe"],
                "boardPositions": [
                    { "person": { "id": "p-jane", "name": "Jane Doe" }, "title": "Chair" }
                ],
                "dataCenters": [
                    { "dataCenter": { "id": "dc-1", "name": "Ashburn 1", "location": "Virginia" }, "relation": "owner" }
                ],
                "investments": [
                    { "investorCompany": { "id": "seq", "name": "Sequoia Capital" }, "round": "Series A" }
                ],
                "partnerships": [
                    { "companyId": "beta", "type": "technology" }
                ]
            },
            {
                "id": "beta",
                "name": "Beta Systems"
            },
            {
                "id": "seq",
                "name": "Sequoia Capital",
                "founders": ["Don Valentine"],
                "boardPositions": [
                    { "person": { "id": "p-doug", "name": "Doug Leone" } }
                ]
            }
        ]
    })
}

// =============================================================================
// END-TO-END SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_free_text_founder_needs_relational_record() {
    let graph = builder(openai_snapshot())
        .build_graph_data(Some(&ids(&["openai"])), &GraphBuildOptions::default())
        .await
        .unwrap();

    let sam = graph.get_node("p-sam").expect("Sam Altman node");
    assert_eq!(sam.node_type, NodeType::Person);
    assert_eq!(sam.name, "Sam Altman");

    assert_eq!(links_of_type(&graph, LinkType::Founder), vec![("p-sam", "openai")]);
    assert_eq!(
        links_of_type(&graph, LinkType::BoardMember),
        vec![("p-sam", "openai")]
    );
    assert!(graph.nodes.iter().all(|n| n.name != "Elon Musk"));
    assert_well_formed(&graph);
}

#[tokio::test]
async fn test_partnership_edge_carries_kind() {
    let snapshot = json!({
        "companies": [
            {
                "id": "a",
                "name": "Alpha Robotics",
                "partnerships": [{ "companyId": "b", "type": "strategic" }]
            },
            { "id": "b", "name": "Beta Systems" }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    let partnerships: Vec<_> = graph
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::Partnership)
        .collect();
    assert_eq!(partnerships.len(), 1);
    assert_eq!(partnerships[0].key(), ("a", "b", LinkType::Partnership));

    let json = serde_json::to_value(partnerships[0]).unwrap();
    assert_eq!(json["metadata"]["type"], "strategic");
}

#[tokio::test]
async fn test_company_named_founder_is_excluded() {
    let snapshot = json!({
        "companies": [
            {
                "id": "acme",
                "name": "Acme Robotics",
                "founders": ["Sequoia Capital"],
                "boardPositions": [
                    { "person": { "id": "p-seq", "name": "Sequoia Capital" } }
                ]
            }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    assert_eq!(node_ids(&graph), BTreeSet::from(["acme"]));
    assert!(graph.links.is_empty());
}

#[tokio::test]
async fn test_funding_investor_reuses_relational_person() {
    let snapshot = json!({
        "companies": [
            {
                "id": "linkedin",
                "name": "LinkedIn",
                "boardPositions": [
                    { "person": { "id": "p-reid", "name": "Reid Hoffman" } }
                ]
            },
            {
                "id": "inflection",
                "name": "Inflection AI",
                "funding": "{\"round\": \"Seed\", \"investors\": [\"Reid G. Hoffman\", \"Greylock Partners\"]}"
            },
            {
                "id": "broken",
                "name": "Broken Data Co",
                "funding": "{\"investors\": [",
                "tags": "not json"
            }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    let investor: Vec<_> = graph
        .links
        .iter()
        .filter(|l| l.link_type == LinkType::Investor)
        .collect();
    assert_eq!(investor.len(), 1);
    assert_eq!(investor[0].key(), ("p-reid", "inflection", LinkType::Investor));
    assert_eq!(investor[0].metadata.round.as_deref(), Some("Seed"));

    let persons: Vec<_> = graph
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Person)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(persons, vec!["p-reid"]);
    assert!(graph.has_node("broken"));
}

// =============================================================================
// GRAPH INVARIANTS
// =============================================================================

#[tokio::test]
async fn test_build_is_idempotent() {
    let b = builder(openai_snapshot());
    let options = GraphBuildOptions::default();
    let first = b.build_graph_data(None, &options).await.unwrap();
    let second = b.build_graph_data(None, &options).await.unwrap();

    assert_eq!(first, second);
    assert_well_formed(&first);
}

#[tokio::test]
async fn test_concurrent_builds_do_not_share_state() {
    let b = builder(openai_snapshot());
    let options = GraphBuildOptions::default();
    let all = ids(&["openai", "microsoft", "anthropic"]);

    let (a, c) = tokio::join!(
        b.build_graph_data(None, &options),
        b.build_graph_data(Some(&all), &options)
    );
    assert_eq!(node_ids(&a.unwrap()), node_ids(&c.unwrap()));
}

#[tokio::test]
async fn test_duplicate_and_dangling_links_are_removed() {
    let snapshot = json!({
        "companies": [
            {
                "id": "acme",
                "name": "Acme Robotics",
                "founders": ["Jane Doe", "jane doe"],
                "parentCompanyId": "ghost-parent",
                "boardPositions": [
                    { "person": { "id": "p-jane", "name": "Jane Doe" }, "title": "Chair" },
                    { "person": { "id": "p-jane", "name": "Jane Doe" }, "title": "Director" }
                ],
                "founderRelations": [
                    { "person": { "id": "p-jane", "name": "Jane Doe" } }
                ],
                "investments": [
                    { "person": { "id": "p-jane", "name": "Jane Doe" }, "amount": "1000000" },
                    { "person": { "id": "p-jane", "name": "Jane Doe" }, "amount": "2000000" }
                ],
                "partnerships": [{ "companyId": "ghost" }]
            }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    assert_well_formed(&graph);
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.links.len(), 3);

    let board = graph
        .links
        .iter()
        .find(|l| l.link_type == LinkType::BoardMember)
        .unwrap();
    assert_eq!(board.metadata.title.as_deref(), Some("Chair"));

    let investor = graph
        .links
        .iter()
        .find(|l| l.link_type == LinkType::Investor)
        .unwrap();
    assert_eq!(investor.metadata.amount.as_deref(), Some("1000000"));
}

#[tokio::test]
async fn test_unknown_company_ids_are_dropped() {
    let graph = builder(openai_snapshot())
        .build_graph_data(
            Some(&ids(&["anthropic", "does-not-exist"])),
            &GraphBuildOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(node_ids(&graph), BTreeSet::from(["anthropic", "p-dario"]));
    assert_well_formed(&graph);
}

#[tokio::test]
async fn test_malformed_company_fields_do_not_fail_the_build() {
    let snapshot = json!({
        "companies": [
            {
                "id": "a",
                "name": "Alpha Robotics",
                "founders": null,
                "boardPositions": [
                    null,
                    { "person": { "id": "p-ada", "name": "Ada Lovelace" } }
                ]
            },
            {
                "id": "b",
                "name": "Beta Systems",
                "founders": "Ada Lovelace, Alan Turing",
                "dataCenters": "several"
            }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    assert_eq!(node_ids(&graph), BTreeSet::from(["a", "b", "p-ada"]));
    assert_eq!(links_of_type(&graph, LinkType::BoardMember), vec![("p-ada", "a")]);
    assert!(links_of_type(&graph, LinkType::Founder).is_empty());
}

#[tokio::test]
async fn test_colliding_ids_across_record_tables() {
    let snapshot = json!({
        "companies": [
            {
                "id": "1",
                "name": "Alpha Robotics",
                "boardPositions": [{ "person": { "id": "1", "name": "Jane Doe" } }],
                "dataCenters": [{ "dataCenter": { "id": "2", "name": "Ashburn 1" } }]
            },
            {
                "id": "2",
                "name": "Beta Systems",
                "investments": [{ "person": { "id": "2", "name": "John Roe" } }]
            }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    assert!(graph.nodes.iter().all(|n| n.node_type == NodeType::Company));
    assert!(graph.links.is_empty());
    assert_well_formed(&graph);
}

// =============================================================================
// BACKFILL, OPTIONS, DEPTH
// =============================================================================

#[tokio::test]
async fn test_investor_company_is_backfilled_as_node_only() {
    let graph = builder(acme_snapshot())
        .build_graph_data(Some(&ids(&["acme"])), &GraphBuildOptions::default())
        .await
        .unwrap();

    let seq = graph.get_node("seq").expect("backfilled investor");
    assert_eq!(seq.node_type, NodeType::Capital);
    assert_eq!(links_of_type(&graph, LinkType::Investor), vec![("seq", "acme")]);

    // backfilled companies are not extracted
    assert!(!graph.has_node("p-doug"));
    // partner outside the working set dangles
    assert!(links_of_type(&graph, LinkType::Partnership).is_empty());
    assert_well_formed(&graph);
}

#[tokio::test]
async fn test_missing_backfill_drops_the_edge() {
    let snapshot = json!({
        "companies": [
            {
                "id": "acme",
                "name": "Acme Robotics",
                "investments": [
                    { "investorCompany": { "id": "gone", "name": "Vanished Ventures" } }
                ]
            }
        ]
    });
    let graph = builder(snapshot)
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    assert_eq!(node_ids(&graph), BTreeSet::from(["acme"]));
    assert!(graph.links.is_empty());
}

#[tokio::test]
async fn test_option_flags() {
    let b = builder(acme_snapshot());

    let full = b
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();
    assert!(full.has_node("p-jane"));
    assert!(full.has_node("dc-1"));
    assert_eq!(links_of_type(&full, LinkType::Partnership), vec![("acme", "beta")]);

    let no_people = b
        .build_graph_data(
            None,
            &GraphBuildOptions {
                include_people: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(no_people.nodes.iter().all(|n| n.node_type != NodeType::Person));
    assert!(links_of_type(&no_people, LinkType::BoardMember).is_empty());
    assert!(links_of_type(&no_people, LinkType::Founder).is_empty());
    assert_eq!(links_of_type(&no_people, LinkType::Investor), vec![("seq", "acme")]);

    let bare = b
        .build_graph_data(
            None,
            &GraphBuildOptions {
                include_data_centers: false,
                include_partnerships: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!bare.has_node("dc-1"));
    assert!(bare.links.iter().all(|l| !matches!(
        l.link_type,
        LinkType::Partnership | LinkType::DataCenterOwner | LinkType::DataCenterUser
    )));
    assert_well_formed(&bare);
}

#[tokio::test]
async fn test_max_depth_limits_hops_from_requested_companies() {
    let b = builder(acme_snapshot());
    let requested = ids(&["acme"]);

    let zero = b
        .build_graph_data(
            Some(&requested),
            &GraphBuildOptions {
                max_depth: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(node_ids(&zero), BTreeSet::from(["acme"]));
    assert!(zero.links.is_empty());

    let one = b
        .build_graph_data(
            Some(&requested),
            &GraphBuildOptions {
                max_depth: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(node_ids(&one), BTreeSet::from(["acme", "dc-1", "p-jane", "seq"]));
    assert_eq!(one.links.len(), 4);

    let stats = one.stats();
    assert_eq!(stats.nodes_by_type.get(&NodeType::DataCenter), Some(&1));
    assert_eq!(stats.links_by_type.get(&LinkType::Founder), Some(&1));
}

// =============================================================================
// FOCUS
// =============================================================================

#[tokio::test]
async fn test_focus_on_built_graph() {
    let graph = builder(openai_snapshot())
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap();

    let levels = focus_levels(&graph, "openai");
    assert_eq!(levels.get("microsoft"), Some(&1));
    assert_eq!(levels.get("p-sam"), Some(&1));
    assert_eq!(levels.get("p-satya"), Some(&2));

    let focus = select_focus_subgraph(&graph, "openai", &VisibilityFilter::default());
    assert_eq!(
        node_ids(&focus),
        BTreeSet::from(["microsoft", "openai", "p-sam", "p-satya"])
    );
    assert_well_formed(&focus);

    let hidden = VisibilityFilter::default().hide_link_type(LinkType::BoardMember);
    let focus = select_focus_subgraph(&graph, "openai", &hidden);
    assert!(focus.has_node("p-satya"));
    assert!(links_of_type(&focus, LinkType::BoardMember).is_empty());
}

// =============================================================================
// ERROR PROPAGATION
// =============================================================================

struct UnreachableStore;

#[async_trait]
impl CompanyDataSource for UnreachableStore {
    async fn get_companies(&self, _ids: Option<&[String]>) -> anyhow::Result<Vec<CompanySnapshot>> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn get_company_name_index(
        &self,
        _ids: Option<&[String]>,
    ) -> anyhow::Result<HashSet<String>> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

#[tokio::test]
async fn test_data_source_failure_propagates() {
    let b = RelationshipGraphBuilder::new(Arc::new(UnreachableStore));
    let err = b
        .build_graph_data(None, &GraphBuildOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::DataAccess(_)));
    assert_eq!(err.to_string(), "connection refused");
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    const PEOPLE: &[(&str, &str)] = &[
        ("p-ada", "Ada Lovelace"),
        ("p-alan", "Alan Turing"),
        ("p-grace", "Grace Hopper"),
        ("p-seq", "Sequoia Capital"),
    ];

    const FREE_TEXT: &[&str] = &[
        "Ada Lovelace",
        "Ada K. Lovelace",
        "Turing, Alan",
        "Grace Hopper Jr.",
        "Greylock Partners",
        "Unknown Person",
        "",
    ];

    fn company(
        index: usize,
        count: usize,
        board: Vec<usize>,
        founders: Vec<usize>,
        parent: Option<usize>,
        partners: Vec<usize>,
    ) -> Value {
        json!({
            "id": format!("c{}", index),
            "name": format!("Company Number {}", index),
            "founders": founders.iter().map(|f| FREE_TEXT[*f % FREE_TEXT.len()]).collect::<Vec<_>>(),
            "boardPositions": board.iter().map(|p| {
                let (id, name) = PEOPLE[*p % PEOPLE.len()];
                json!({ "person": { "id": id, "name": name } })
            }).collect::<Vec<_>>(),
            // may point past the last company: dangling on purpose
            "parentCompanyId": parent.map(|p| format!("c{}", p % (count + 1))),
            "partnerships": partners.iter().map(|p| json!({ "companyId": format!("c{}", p % (count + 1)) })).collect::<Vec<_>>(),
        })
    }

    fn snapshot_strategy() -> impl Strategy<Value = Value> {
        prop::collection::vec(
            (
                prop::collection::vec(0usize..8, 0..4),
                prop::collection::vec(0usize..8, 0..4),
                prop::option::of(0usize..8),
                prop::collection::vec(0usize..8, 0..3),
            ),
            1..6,
        )
        .prop_map(|specs| {
            let count = specs.len();
            let companies: Vec<Value> = specs
                .into_iter()
                .enumerate()
                .map(|(i, (board, founders, parent, partners))| {
                    company(i, count, board, founders, parent, partners)
                })
                .collect();
            json!({ "companies": companies })
        })
    }

    proptest! {
        #[test]
        fn built_graphs_are_well_formed(snapshot in snapshot_strategy()) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let b = builder(snapshot);
            let options = GraphBuildOptions::default();
            let first = runtime.block_on(b.build_graph_data(None, &options)).unwrap();
            let second = runtime.block_on(b.build_graph_data(None, &options)).unwrap();

            assert_well_formed(&first);
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.has_node("p-seq"));
        }
    }
}
