use petgraph::dot::{Config, Dot};

use super::GraphFormatter;
use crate::core::DependencyGraph;
use crate::error::Result;

/// Graphviz digraph with one node per entity.
pub struct DotFormatter;

impl DotFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl GraphFormatter for DotFormatter {
    fn format(&self, graph: &DependencyGraph) -> Result<String> {
        let graph = graph.to_petgraph();
        Ok(format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel])))
    }

    fn extensions(&self) -> &[&'static str] {
        &["dot", "gv"]
    }
}

impl Default for DotFormatter {
    fn default() -> Self {
        Self::new()
    }
}
