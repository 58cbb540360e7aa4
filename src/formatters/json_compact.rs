use serde_json::json;
use std::collections::HashMap;

use super::GraphFormatter;
use crate::core::{DeclaredEntity, DependencyGraph, EntityKind};
use crate::error::Result;

/// Compact JSON: vertices listed once, edges as index pairs.
pub struct JsonCompactFormatter {
    /// Include kind and internal flags per vertex.
    minimal: bool,
}

impl JsonCompactFormatter {
    pub fn new() -> Self {
        Self { minimal: true }
    }

    pub fn full() -> Self {
        Self { minimal: false }
    }

    fn kind_code(&self, kind: EntityKind) -> u8 {
        match kind {
            EntityKind::Class => 0,
            EntityKind::Namespace => 1,
        }
    }
}

impl GraphFormatter for JsonCompactFormatter {
    fn format(&self, graph: &DependencyGraph) -> Result<String> {
        let mut index: HashMap<&DeclaredEntity, usize> = HashMap::with_capacity(graph.vertex_count());
        let mut vertices = Vec::with_capacity(graph.vertex_count());

        for (idx, vertex) in graph.vertices().enumerate() {
            index.insert(vertex, idx);
            vertices.push(if self.minimal {
                json!(vertex.name.to_string())
            } else {
                json!({
                    "name": vertex.name.to_string(),
                    "kind": self.kind_code(vertex.kind),
                    "internal": vertex.internal,
                })
            });
        }

        let edges: Vec<_> = graph
            .edges()
            .map(|edge| json!([index[&edge.from], index[&edge.to]]))
            .collect();

        let output = json!({
            "meta": {
                "vertices": graph.vertex_count(),
                "edges": graph.edge_count(),
                "format": if self.minimal { "compact" } else { "full" }
            },
            "vertices": vertices,
            "edges": edges
        });

        // Serializing a `Value` cannot fail.
        Ok(output.to_string())
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }
}

impl Default for JsonCompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}
