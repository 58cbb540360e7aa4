use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::shell::{CommandRunner, ProcessOutcome, SystemShell};
use super::RenderStrategy;
use crate::core::DependencyGraph;
use crate::error::{Error, Result};
use crate::formatters::{GraphFormatter, PlantUmlFormatter};

pub const DEFAULT_PROGRAM: &str = "plantuml";
pub const INTERMEDIATE_EXTENSION: &str = "uml";
pub const ALLOWED_FORMATS: &[&str] = &["png", "svg"];

/// What the renderer's exit told us.
#[derive(Debug)]
pub enum RenderStatus {
    Success,
    RendererUnavailable(Option<i32>),
    LaunchFailed(io::Error),
}

impl RenderStatus {
    /// Timeouts count as launch failures.
    pub fn from_outcome(outcome: io::Result<ProcessOutcome>) -> Self {
        match outcome {
            Ok(ProcessOutcome::Exited(0)) => RenderStatus::Success,
            Ok(ProcessOutcome::Exited(code)) => RenderStatus::RendererUnavailable(Some(code)),
            Ok(ProcessOutcome::Terminated) => RenderStatus::RendererUnavailable(None),
            Ok(ProcessOutcome::TimedOut) => RenderStatus::LaunchFailed(io::Error::new(
                io::ErrorKind::TimedOut,
                "renderer did not finish before the deadline",
            )),
            Err(err) => RenderStatus::LaunchFailed(err),
        }
    }

    fn into_result(self, program: &str) -> Result<()> {
        match self {
            RenderStatus::Success => Ok(()),
            RenderStatus::RendererUnavailable(status) => Err(Error::RendererUnavailable {
                program: program.to_string(),
                status,
            }),
            RenderStatus::LaunchFailed(source) => Err(Error::LaunchFailed {
                program: program.to_string(),
                source,
            }),
        }
    }
}

/// Writes a PlantUML description next to the destination and hands it to
/// the `plantuml` binary, which writes the image.
pub struct PlantUmlRenderer {
    program: String,
    keep_intermediate: bool,
    formatter: PlantUmlFormatter,
    timeout: Option<Duration>,
    /// `None` runs the program through a host shell bounded by `timeout`.
    runner: Option<Box<dyn CommandRunner>>,
}

impl PlantUmlRenderer {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            keep_intermediate: false,
            formatter: PlantUmlFormatter::new(),
            timeout: None,
            runner: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_keep_intermediate(mut self, keep: bool) -> Self {
        self.keep_intermediate = keep;
        self
    }

    /// Bounds the host shell. A runner set with `with_runner` enforces its
    /// own limits.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Some(Box::new(runner));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn invoke(&self, args: &[OsString]) -> io::Result<ProcessOutcome> {
        match &self.runner {
            Some(runner) => runner.run(&self.program, args),
            None => SystemShell::new()
                .with_timeout(self.timeout)
                .run(&self.program, args),
        }
    }

    pub fn intermediate_path(destination: &Path) -> PathBuf {
        destination.with_extension(INTERMEDIATE_EXTENSION)
    }

    fn format(destination: &Path) -> Option<String> {
        destination
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    fn arguments(destination: &Path, intermediate: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(2);
        if let Some(format) = Self::format(destination).filter(|format| format != "png") {
            args.push(OsString::from(format!("-t{format}")));
        }
        args.push(intermediate.as_os_str().to_os_string());
        args
    }

    /// PlantUML names the image after the intermediate with a lowercase
    /// extension; move it to the exact destination when they differ.
    fn claim_output(destination: &Path) -> Result<()> {
        let Some(format) = Self::format(destination) else {
            return Ok(());
        };
        let produced = destination.with_extension(format);
        if produced.as_os_str() == destination.as_os_str() {
            return Ok(());
        }
        fs::rename(&produced, destination).map_err(|err| Error::filesystem(&produced, err))
    }

    fn cleanup(&self, intermediate: &Path, primary: Result<()>) -> Result<()> {
        if self.keep_intermediate {
            debug!("keeping {}", intermediate.display());
            return primary;
        }
        match (fs::remove_file(intermediate), primary) {
            (Ok(()), primary) => primary,
            (Err(err), Ok(())) => Err(Error::filesystem(intermediate, err)),
            (Err(err), Err(primary)) => {
                warn!("could not remove {}: {err}", intermediate.display());
                Err(primary)
            }
        }
    }
}

impl RenderStrategy for PlantUmlRenderer {
    fn allowed_extensions(&self) -> &[&'static str] {
        ALLOWED_FORMATS
    }

    fn render(&self, graph: &DependencyGraph, destination: &Path) -> Result<()> {
        let intermediate = Self::intermediate_path(destination);
        let description = self.formatter.format(graph)?;
        if let Err(err) = fs::write(&intermediate, description) {
            let _ = fs::remove_file(&intermediate);
            return Err(Error::filesystem(&intermediate, err));
        }
        debug!("wrote {}", intermediate.display());

        let outcome = self.invoke(&Self::arguments(destination, &intermediate));
        let result = RenderStatus::from_outcome(outcome)
            .into_result(&self.program)
            .and_then(|()| Self::claim_output(destination));
        if result.is_ok() {
            info!("Rendered {}", destination.display());
        }

        self.cleanup(&intermediate, result)
    }
}

impl Default for PlantUmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}
