pub mod plantuml;
pub mod shell;

pub use plantuml::{PlantUmlRenderer, RenderStatus};
pub use shell::{CommandRunner, ProcessOutcome, SystemShell};

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::core::DependencyGraph;
use crate::error::{ConfigError, Error, Result};
use crate::formatters::GraphFormatter;

/// Turns a finished graph into an artifact at `destination`.
pub trait RenderStrategy {
    fn allowed_extensions(&self) -> &[&'static str];
    fn render(&self, graph: &DependencyGraph, destination: &Path) -> Result<()>;
}

/// Writes a formatter's output straight to the destination.
pub struct FileWriter<F> {
    formatter: F,
}

impl<F: GraphFormatter> FileWriter<F> {
    pub fn new(formatter: F) -> Self {
        Self { formatter }
    }
}

impl<F: GraphFormatter> RenderStrategy for FileWriter<F> {
    fn allowed_extensions(&self) -> &[&'static str] {
        self.formatter.extensions()
    }

    fn render(&self, graph: &DependencyGraph, destination: &Path) -> Result<()> {
        let content = self.formatter.format(graph)?;
        fs::write(destination, content).map_err(|err| Error::filesystem(destination, err))?;
        info!("Wrote {}", destination.display());
        Ok(())
    }
}

pub struct RenderDispatcher {
    strategy: Box<dyn RenderStrategy>,
}

impl RenderDispatcher {
    pub fn new(strategy: impl RenderStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn to_file<F: GraphFormatter + 'static>(formatter: F) -> Self {
        Self::new(FileWriter::new(formatter))
    }

    pub fn allowed_extensions(&self) -> &[&'static str] {
        self.strategy.allowed_extensions()
    }

    /// Configuration checks to run before any analysis starts.
    pub fn validate_destination(&self, destination: &Path) -> Result<()> {
        ensure_output_format(destination, self.allowed_extensions())?;
        ensure_destination_writable(destination)
    }

    pub fn render(&self, graph: &DependencyGraph, destination: &Path) -> Result<()> {
        self.validate_destination(destination)?;
        self.strategy.render(graph, destination)
    }
}

pub fn ensure_output_format(destination: &Path, allowed: &[&str]) -> Result<()> {
    let extension = destination
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if allowed.iter().any(|format| format.eq_ignore_ascii_case(extension)) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedFormat {
            extension: extension.to_string(),
            allowed: allowed.iter().map(|format| format.to_string()).collect(),
        }
        .into())
    }
}

/// Probes the destination directory by creating and dropping a temporary
/// file there, so ownership and ACLs count as well as mode bits.
pub fn ensure_destination_writable(destination: &Path) -> Result<()> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match tempfile::NamedTempFile::new_in(directory) {
        Ok(probe) => {
            if let Err(err) = probe.close() {
                warn!("could not remove write check in {}: {err}", directory.display());
            }
            Ok(())
        }
        Err(err) => {
            debug!("{} is not writable: {err}", directory.display());
            Err(ConfigError::UnwritableDestination {
                path: directory.to_path_buf(),
            }
            .into())
        }
    }
}
