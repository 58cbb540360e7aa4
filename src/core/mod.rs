pub mod analyzer;
pub mod entity;
pub mod extractor;
pub mod graph;
pub mod internals;
pub mod metrics;
pub mod resolver;
pub mod scanner;

pub use analyzer::{Analysis, AnalysisOptions, CodebaseAnalyzer};
pub use entity::{DeclaredEntity, EntityKind, QualifiedName, Reference};
pub use extractor::{DependencyExtractor, FileDependencies};
pub use graph::{DependencyEdge, DependencyGraph, EntityGraph};
pub use internals::InternalTable;
pub use resolver::NameResolver;
pub use scanner::{FileScanner, SourceUnit};
