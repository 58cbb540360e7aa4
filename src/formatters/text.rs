use super::GraphFormatter;
use crate::core::DependencyGraph;
use crate::error::Result;

/// One `From --> To` line per edge.
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl GraphFormatter for TextFormatter {
    fn format(&self, graph: &DependencyGraph) -> Result<String> {
        let mut output = String::new();
        for edge in graph.edges() {
            output.push_str(&format!("{} --> {}\n", edge.from, edge.to));
        }
        Ok(output)
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt"]
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}
