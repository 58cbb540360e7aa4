use phpdeps::core::{DeclaredEntity, DependencyEdge, DependencyGraph, QualifiedName};
use pretty_assertions::assert_eq;
use regex::Regex;

fn class(name: &str) -> DeclaredEntity {
    DeclaredEntity::class(QualifiedName::parse(name))
}

fn internal(name: &str) -> DeclaredEntity {
    class(name).with_internal(true)
}

fn namespace(name: &str) -> DeclaredEntity {
    DeclaredEntity::namespace(QualifiedName::parse(name))
}

fn graph(edges: &[(DeclaredEntity, DeclaredEntity)]) -> DependencyGraph {
    edges
        .iter()
        .cloned()
        .map(|(from, to)| DependencyEdge::new(from, to))
        .collect()
}

fn assert_consistent(graph: &DependencyGraph) {
    for edge in graph.edges() {
        assert!(graph.contains_vertex(&edge.from), "missing {}", edge.from);
        assert!(graph.contains_vertex(&edge.to), "missing {}", edge.to);
    }
}

fn sample() -> DependencyGraph {
    graph(&[
        (class("App\\Http\\Controller"), class("App\\Domain\\User")),
        (class("App\\Http\\Controller"), internal("Exception")),
        (class("App\\Http\\Request"), class("App\\Http\\Controller")),
        (class("App\\Domain\\User"), class("App\\Domain\\Email")),
        (class("App\\Domain\\User"), internal("DateTimeImmutable")),
        (class("Legacy"), class("App\\Domain\\User")),
        (class("Vendor\\Lib\\Client"), class("App\\Http\\Request")),
    ])
}

#[test]
fn edges_are_deduplicated() {
    let g = graph(&[
        (class("A"), class("B")),
        (class("A"), class("B")),
        (class("A"), class("A")),
    ]);
    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.vertex_count(), 2);
}

#[test]
fn remove_internals_drops_internal_targets() {
    let a = class("A");
    let b = class("B");
    let g = graph(&[(a.clone(), b.clone()), (a.clone(), internal("Internal1"))]);

    let filtered = g.remove_internals();

    assert_eq!(filtered, graph(&[(a.clone(), b.clone())]));
    let vertices: Vec<_> = filtered.vertices().cloned().collect();
    assert_eq!(vertices, vec![a, b]);
}

#[test]
fn remove_internals_does_not_mutate_original() {
    let g = sample();
    let before = g.clone();
    let _ = g.remove_internals();
    let _ = g.collapse_to_namespaces(None);
    assert_eq!(g, before);
}

#[test]
fn collapse_merges_edges_between_same_namespaces() {
    let g = graph(&[
        (class("NS1\\A1"), class("NS2\\B1")),
        (class("NS1\\A2"), class("NS2\\B2")),
    ]);

    let collapsed = g.collapse_to_namespaces(None);

    assert_eq!(collapsed, graph(&[(namespace("NS1"), namespace("NS2"))]));
}

#[test]
fn collapse_removes_self_edges_and_orphans() {
    let g = graph(&[(class("NS1\\A1"), class("NS1\\A2"))]);

    let collapsed = g.collapse_to_namespaces(None);

    assert!(collapsed.is_empty());
    assert_eq!(collapsed.vertex_count(), 0);
}

#[test]
fn collapse_drops_global_namespace_edges() {
    let g = graph(&[
        (class("Legacy"), class("App\\Domain\\User")),
        (class("App\\Http\\Controller"), class("Exception")),
    ]);
    assert!(g.collapse_to_namespaces(None).is_empty());
}

#[test]
fn collapse_with_depth_truncates_namespaces() {
    let collapsed = sample().remove_internals().collapse_to_namespaces(Some(1));
    assert_eq!(collapsed, graph(&[(namespace("Vendor"), namespace("App"))]));
}

#[test]
fn transforms_are_idempotent() {
    let g = sample();

    let filtered = g.remove_internals();
    assert_eq!(filtered.remove_internals(), filtered);

    for depth in [None, Some(1), Some(2)] {
        let collapsed = g.collapse_to_namespaces(depth);
        assert_eq!(collapsed.collapse_to_namespaces(depth), collapsed);
    }

    let from = QualifiedName::parse("App");
    let scoped = g.filter_from(&from);
    assert_eq!(scoped.filter_from(&from), scoped);
}

#[test]
fn transforms_commute() {
    let g = sample();
    assert_eq!(
        g.remove_internals().collapse_to_namespaces(None),
        g.collapse_to_namespaces(None).remove_internals()
    );
}

#[test]
fn every_transform_keeps_vertices_consistent() {
    let g = sample();
    let pattern = Regex::new("Domain").unwrap();

    for derived in [
        g.clone(),
        g.remove_internals(),
        g.collapse_to_namespaces(None),
        g.collapse_to_namespaces(Some(1)),
        g.filter_from(&QualifiedName::parse("App\\Http")),
        g.exclude_matching(&pattern),
        g.union(&graph(&[(class("X"), class("Y"))])),
    ] {
        assert_consistent(&derived);
    }
}

#[test]
fn filter_from_keeps_only_edges_from_namespace() {
    let scoped = sample().filter_from(&QualifiedName::parse("App\\Http"));
    assert!(scoped
        .edges()
        .all(|edge| edge.from.name.to_string().starts_with("App\\Http\\")));
    assert_eq!(scoped.edge_count(), 3);
}

#[test]
fn exclude_matching_drops_both_directions() {
    let pattern = Regex::new("^App\\\\Domain").unwrap();
    let excluded = sample().exclude_matching(&pattern);
    assert!(excluded
        .vertices()
        .all(|vertex| !vertex.name.to_string().starts_with("App\\Domain")));
    assert!(excluded.contains_edge(&class("App\\Http\\Request"), &class("App\\Http\\Controller")));
}

#[test]
fn queries_follow_edges() {
    let g = sample();
    let user = class("App\\Domain\\User");

    let mut dependants: Vec<String> = g.dependants_of(&user).map(ToString::to_string).collect();
    dependants.sort();
    assert_eq!(dependants, vec!["App\\Http\\Controller", "Legacy"]);

    let dependencies: Vec<String> = g.dependencies_of(&user).map(ToString::to_string).collect();
    assert_eq!(dependencies, vec!["App\\Domain\\Email", "DateTimeImmutable"]);
}

#[test]
fn cycles_are_reported_as_components() {
    let g = graph(&[
        (class("A"), class("B")),
        (class("B"), class("C")),
        (class("C"), class("A")),
        (class("C"), class("D")),
    ]);
    let cycles = g.cycles();
    assert_eq!(cycles, vec![vec![class("A"), class("B"), class("C")]]);
    assert!(sample().cycles().is_empty());
}

#[test]
fn petgraph_view_matches_counts() {
    let g = sample();
    let pg = g.to_petgraph();
    assert_eq!(pg.node_count(), g.vertex_count());
    assert_eq!(pg.edge_count(), g.edge_count());
}
