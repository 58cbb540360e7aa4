use serde::Serialize;

use super::entity::DeclaredEntity;
use super::graph::DependencyGraph;

/// Coupling figures for one vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplingMetrics {
    pub entity: DeclaredEntity,
    /// Incoming edges (Ca).
    pub afferent: usize,
    /// Outgoing edges (Ce).
    pub efferent: usize,
}

impl CouplingMetrics {
    /// `Ce / (Ca + Ce)`; 0.0 for an isolated vertex.
    pub fn instability(&self) -> f64 {
        let total = self.afferent + self.efferent;
        if total == 0 {
            0.0
        } else {
            self.efferent as f64 / total as f64
        }
    }
}

/// One row per vertex, ordered by entity.
pub fn coupling(graph: &DependencyGraph) -> Vec<CouplingMetrics> {
    let incoming = graph.in_degrees();
    graph
        .out_degrees()
        .into_iter()
        .map(|(entity, efferent)| CouplingMetrics {
            entity: entity.clone(),
            afferent: incoming.get(entity).copied().unwrap_or(0),
            efferent,
        })
        .collect()
}
