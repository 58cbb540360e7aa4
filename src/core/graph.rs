use petgraph::{algo::tarjan_scc, graph::NodeIndex, Directed, Graph};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::entity::{DeclaredEntity, QualifiedName};

/// `from` references `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: DeclaredEntity,
    pub to: DeclaredEntity,
}

impl DependencyEdge {
    pub fn new(from: DeclaredEntity, to: DeclaredEntity) -> Self {
        Self { from, to }
    }

    pub fn is_self_edge(&self) -> bool {
        self.from == self.to
    }
}

/// Label carried by every petgraph edge.
pub const EDGE_LABEL: &str = "uses";

/// Petgraph view of a dependency graph, used by the dot formatter and
/// cycle detection.
pub type EntityGraph = Graph<DeclaredEntity, &'static str, Directed>;

/// Deduplicated set of edges and the vertices they touch.
///
/// Every transform returns a new graph. Vertices are always exactly the
/// endpoints of the edges, so a vertex that loses its last edge disappears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeSet<DependencyEdge>,
    vertices: BTreeSet<DeclaredEntity>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert(edge);
        }
        graph
    }

    fn insert(&mut self, edge: DependencyEdge) {
        if edge.is_self_edge() {
            return;
        }
        self.vertices.insert(edge.from.clone());
        self.vertices.insert(edge.to.clone());
        self.edges.insert(edge);
    }

    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &DeclaredEntity> {
        self.vertices.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_vertex(&self, entity: &DeclaredEntity) -> bool {
        self.vertices.contains(entity)
    }

    pub fn contains_edge(&self, from: &DeclaredEntity, to: &DeclaredEntity) -> bool {
        self.edges.iter().any(|edge| &edge.from == from && &edge.to == to)
    }

    pub fn dependencies_of<'a>(
        &'a self,
        entity: &'a DeclaredEntity,
    ) -> impl Iterator<Item = &'a DeclaredEntity> + 'a {
        self.edges
            .iter()
            .filter(move |edge| &edge.from == entity)
            .map(|edge| &edge.to)
    }

    pub fn dependants_of<'a>(
        &'a self,
        entity: &'a DeclaredEntity,
    ) -> impl Iterator<Item = &'a DeclaredEntity> + 'a {
        self.edges
            .iter()
            .filter(move |edge| &edge.to == entity)
            .map(|edge| &edge.from)
    }

    /// Set union; used to merge per-file results.
    pub fn union(&self, other: &DependencyGraph) -> DependencyGraph {
        Self::from_edges(self.edges.iter().chain(other.edges.iter()).cloned())
    }

    /// Drops edges pointing at internal entities.
    pub fn remove_internals(&self) -> DependencyGraph {
        self.retain(|edge| !edge.to.internal)
    }

    /// Keeps only edges whose source lives in `namespace`.
    pub fn filter_from(&self, namespace: &QualifiedName) -> DependencyGraph {
        self.retain(|edge| edge.from.name.starts_with(namespace))
    }

    /// Drops edges where either endpoint's name matches `pattern`.
    pub fn exclude_matching(&self, pattern: &Regex) -> DependencyGraph {
        self.retain(|edge| {
            !pattern.is_match(&edge.from.name.to_string())
                && !pattern.is_match(&edge.to.name.to_string())
        })
    }

    /// Projects every class onto its namespace, optionally truncated to
    /// `depth` segments. Self-edges produced by the projection are dropped,
    /// as are edges touching the global namespace.
    pub fn collapse_to_namespaces(&self, depth: Option<usize>) -> DependencyGraph {
        let project = |entity: &DeclaredEntity| -> Option<DeclaredEntity> {
            let mut key = entity.namespace_key();
            if let Some(depth) = depth {
                key = key.truncate(depth);
            }
            (!key.is_global()).then(|| DeclaredEntity::namespace(key))
        };

        Self::from_edges(self.edges.iter().filter_map(|edge| {
            Some(DependencyEdge::new(project(&edge.from)?, project(&edge.to)?))
        }))
    }

    fn retain<F>(&self, keep: F) -> DependencyGraph
    where
        F: Fn(&DependencyEdge) -> bool,
    {
        Self::from_edges(self.edges.iter().filter(|edge| keep(edge)).cloned())
    }

    pub fn to_petgraph(&self) -> EntityGraph {
        let mut graph = EntityGraph::with_capacity(self.vertices.len(), self.edges.len());
        let mut index: HashMap<&DeclaredEntity, NodeIndex> =
            HashMap::with_capacity(self.vertices.len());

        for vertex in &self.vertices {
            index.insert(vertex, graph.add_node(vertex.clone()));
        }
        for edge in &self.edges {
            graph.add_edge(index[&edge.from], index[&edge.to], EDGE_LABEL);
        }
        graph
    }

    /// Dependency cycles: strongly connected components of two or more
    /// vertices, each sorted, largest first.
    pub fn cycles(&self) -> Vec<Vec<DeclaredEntity>> {
        let graph = self.to_petgraph();
        let mut cycles: Vec<Vec<DeclaredEntity>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut members: Vec<DeclaredEntity> =
                    component.into_iter().map(|idx| graph[idx].clone()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        cycles
    }

    /// Outgoing edge count per vertex.
    pub fn out_degrees(&self) -> BTreeMap<&DeclaredEntity, usize> {
        let mut degrees: BTreeMap<&DeclaredEntity, usize> =
            self.vertices.iter().map(|v| (v, 0)).collect();
        for edge in &self.edges {
            *degrees.entry(&edge.from).or_default() += 1;
        }
        degrees
    }

    /// Incoming edge count per vertex.
    pub fn in_degrees(&self) -> BTreeMap<&DeclaredEntity, usize> {
        let mut degrees: BTreeMap<&DeclaredEntity, usize> =
            self.vertices.iter().map(|v| (v, 0)).collect();
        for edge in &self.edges {
            *degrees.entry(&edge.to).or_default() += 1;
        }
        degrees
    }
}

impl FromIterator<DependencyEdge> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = DependencyEdge>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}

impl Extend<DependencyEdge> for DependencyGraph {
    fn extend<I: IntoIterator<Item = DependencyEdge>>(&mut self, iter: I) {
        for edge in iter {
            self.insert(edge);
        }
    }
}
