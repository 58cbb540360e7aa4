use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("parse error: {0}")]
    Parse(ParseFailure),

    /// The renderer ran but did not exit cleanly. Most often the binary is
    /// a wrapper script for a tool that is not installed.
    #[error("{program} exited with {}; is it installed?", describe_status(.status))]
    RendererUnavailable {
        program: String,
        status: Option<i32>,
    },

    #[error("failed to launch {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("filesystem error on {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for both ways an external renderer can be missing: a failed
    /// launch or a non-zero exit.
    pub fn is_renderer_unavailable(&self) -> bool {
        matches!(
            self,
            Error::RendererUnavailable { .. } | Error::LaunchFailed { .. }
        )
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Problems detected before the pipeline starts. Nothing has been written
/// when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("output format '{extension}' is not allowed ({})", .allowed.join(", "))]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("{} does not exist or is not readable", .path.display())]
    UnreadableSource { path: PathBuf },

    #[error("destination {} is not writable", .path.display())]
    UnwritableDestination { path: PathBuf },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A single source file that could not be turned into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub message: String,
}

impl ParseFailure {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.path.display(), line, self.message),
            None => write!(f, "{}: {}", self.path.display(), self.message),
        }
    }
}
