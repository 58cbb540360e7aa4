use super::GraphFormatter;
use crate::core::DependencyGraph;
use crate::error::Result;

/// PlantUML class diagram. Namespaces become dotted package paths.
pub struct PlantUmlFormatter;

impl PlantUmlFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl GraphFormatter for PlantUmlFormatter {
    fn format(&self, graph: &DependencyGraph) -> Result<String> {
        let mut output = String::from("@startuml\n");
        for edge in graph.edges() {
            output.push_str(&format!(
                "{} --> {}\n",
                edge.from.name.to_string_with("."),
                edge.to.name.to_string_with(".")
            ));
        }
        output.push_str("@enduml\n");
        Ok(output)
    }

    fn extensions(&self) -> &[&'static str] {
        &["uml", "puml"]
    }
}

impl Default for PlantUmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}
