use rayon::prelude::*;
use regex::Regex;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::entity::QualifiedName;
use super::extractor::{DependencyExtractor, FileDependencies};
use super::graph::DependencyGraph;
use super::internals::InternalTable;
use super::scanner::{FileScanner, SourceUnit, DEFAULT_EXTENSIONS};
use crate::error::{ConfigError, Error, ParseFailure, Result};
use crate::parsers::php::PhpParser;
use crate::parsers::StructuralParser;

/// Which transforms run after extraction.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Keep edges to platform classes.
    pub with_internals: bool,
    /// Collapse classes onto their namespaces.
    pub only_namespaces: bool,
    /// Truncate namespaces to this many segments when collapsing.
    pub namespace_depth: Option<usize>,
    pub filter_from: Option<QualifiedName>,
    pub exclude: Option<Regex>,
    pub extensions: Vec<String>,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self {
            with_internals: false,
            only_namespaces: false,
            namespace_depth: None,
            filter_from: None,
            exclude: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn with_internals(mut self, with_internals: bool) -> Self {
        self.with_internals = with_internals;
        self
    }

    pub fn only_namespaces(mut self, only_namespaces: bool) -> Self {
        self.only_namespaces = only_namespaces;
        self
    }

    /// A depth of zero means no truncation.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.namespace_depth = (depth > 0).then_some(depth);
        self
    }

    pub fn with_filter_from(mut self, namespace: &str) -> Self {
        self.filter_from = Some(QualifiedName::parse(namespace));
        self
    }

    pub fn with_exclude_pattern(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(ConfigError::from)?;
        self.exclude = Some(regex);
        Ok(self)
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the configured transforms in their fixed order.
    pub fn apply(&self, graph: &DependencyGraph) -> DependencyGraph {
        let mut graph = if self.with_internals {
            graph.clone()
        } else {
            graph.remove_internals()
        };
        if let Some(namespace) = &self.filter_from {
            graph = graph.filter_from(namespace);
        }
        if let Some(pattern) = &self.exclude {
            graph = graph.exclude_matching(pattern);
        }
        if self.only_namespaces {
            graph = graph.collapse_to_namespaces(self.namespace_depth);
        }
        graph
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one run. Files that failed to parse are skipped and listed in
/// `failures`; they contribute nothing to `graph`.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub files: usize,
    pub failures: Vec<ParseFailure>,
    pub unresolved: usize,
}

impl Analysis {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The graph, or the first parse failure if any file was skipped.
    pub fn require_complete(self) -> Result<DependencyGraph> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(Error::Parse(failure)),
            None => Ok(self.graph),
        }
    }
}

pub struct CodebaseAnalyzer {
    file_scanner: FileScanner,
    internals: InternalTable,
    options: AnalysisOptions,
}

impl CodebaseAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            file_scanner: FileScanner::with_extensions(&options.extensions),
            internals: InternalTable::php(),
            options,
        }
    }

    pub fn with_internal_table(mut self, internals: InternalTable) -> Self {
        self.internals = internals;
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn analyze(&self, roots: &[PathBuf]) -> Result<Analysis> {
        let start = Instant::now();

        let units: Vec<SourceUnit> = self.file_scanner.scan(roots)?.into_iter().collect();
        info!("Found {} files to analyze", units.len());

        let (raw, failures, unresolved) = self.extract_all(&units);
        debug!(
            edges = raw.edge_count(),
            vertices = raw.vertex_count(),
            unresolved,
            "extraction complete"
        );
        for failure in &failures {
            warn!("skipped {failure}");
        }

        let graph = self.options.apply(&raw);
        info!(
            "Built graph with {} edges between {} entities in {:.2}s",
            graph.edge_count(),
            graph.vertex_count(),
            start.elapsed().as_secs_f64()
        );

        Ok(Analysis {
            graph,
            files: units.len(),
            failures,
            unresolved,
        })
    }

    /// Parses and analyses every unit in parallel, then merges the per-file
    /// edge sets once all of them are done.
    pub fn extract_all(&self, units: &[SourceUnit]) -> (DependencyGraph, Vec<ParseFailure>, usize) {
        let extractor = DependencyExtractor::new(&self.internals);

        let results: Vec<std::result::Result<FileDependencies, ParseFailure>> = units
            .par_iter()
            .map_init(PhpParser::new, |parser, unit| -> std::result::Result<_, ParseFailure> {
                let parser = parser
                    .as_mut()
                    .map_err(|err| ParseFailure::new(unit.path(), err.to_string()))?;
                let tree = parser.parse(unit)?;
                Ok(extractor.extract(&tree))
            })
            .collect();

        let mut graph = DependencyGraph::new();
        let mut failures = Vec::new();
        let mut unresolved = 0;
        for result in results {
            match result {
                Ok(file) => {
                    unresolved += file.unresolved;
                    graph.extend(file.edges);
                }
                Err(failure) => failures.push(failure),
            }
        }
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        (graph, failures, unresolved)
    }
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}
