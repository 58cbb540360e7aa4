pub mod dot;
pub mod json_compact;
pub mod plantuml;
pub mod text;

pub use dot::DotFormatter;
pub use json_compact::JsonCompactFormatter;
pub use plantuml::PlantUmlFormatter;
pub use text::TextFormatter;

use crate::core::DependencyGraph;
use crate::error::Result;

/// Serializes a graph to a textual format.
pub trait GraphFormatter {
    fn format(&self, graph: &DependencyGraph) -> Result<String>;
    /// File extensions this format may be written to.
    fn extensions(&self) -> &[&'static str];
}
