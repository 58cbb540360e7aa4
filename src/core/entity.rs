use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Separator between namespace segments in PHP source.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// A fully qualified name split into its segments. The empty name is the
/// global namespace.
///
/// Comparison, ordering and hashing ignore ASCII case, as PHP does for
/// class and namespace names. The spelling is kept for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    pub fn global() -> Self {
        Self::default()
    }

    /// Parses `Foo\Bar\Baz`; a leading separator and empty segments are
    /// ignored.
    pub fn parse(text: &str) -> Self {
        Self {
            segments: text
                .split(NAMESPACE_SEPARATOR)
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_global(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn simple_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Everything but the final segment.
    pub fn namespace(&self) -> QualifiedName {
        match self.segments.split_last() {
            Some((_, init)) => Self {
                segments: init.to_vec(),
            },
            None => Self::global(),
        }
    }

    pub fn truncate(&self, depth: usize) -> QualifiedName {
        Self {
            segments: self.segments.iter().take(depth).cloned().collect(),
        }
    }

    pub fn join(&self, other: &QualifiedName) -> QualifiedName {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Segment-wise prefix test; the global namespace contains everything.
    pub fn starts_with(&self, prefix: &QualifiedName) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self
                .segments
                .iter()
                .zip(&prefix.segments)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Renders with an arbitrary separator, e.g. `.` for PlantUML packages.
    pub fn to_string_with(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

fn folded(segment: &str) -> impl Iterator<Item = u8> + '_ {
    segment.bytes().map(|byte| byte.to_ascii_lowercase())
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for QualifiedName {}

impl Ord for QualifiedName {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match folded(a).cmp(folded(b)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }
}

impl PartialOrd for QualifiedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.segments.len());
        for segment in &self.segments {
            for byte in folded(segment) {
                state.write_u8(byte);
            }
            state.write_u8(0xff);
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with("\\"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Class, interface, trait or enum.
    Class,
    /// Produced only by namespace collapse.
    Namespace,
}

/// Vertex of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclaredEntity {
    pub name: QualifiedName,
    pub kind: EntityKind,
    pub internal: bool,
}

impl DeclaredEntity {
    pub fn class(name: QualifiedName) -> Self {
        Self {
            name,
            kind: EntityKind::Class,
            internal: false,
        }
    }

    pub fn namespace(name: QualifiedName) -> Self {
        Self {
            name,
            kind: EntityKind::Namespace,
            internal: false,
        }
    }

    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn is_namespace(&self) -> bool {
        self.kind == EntityKind::Namespace
    }

    /// The aggregation key used by namespace collapse. Namespace vertices
    /// are their own key.
    pub fn namespace_key(&self) -> QualifiedName {
        match self.kind {
            EntityKind::Class => self.name.namespace(),
            EntityKind::Namespace => self.name.clone(),
        }
    }
}

impl fmt::Display for DeclaredEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

/// A name referenced from a declaration, after import resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    Resolved(QualifiedName),
    /// A bare name with no import and no enclosing namespace. It is placed
    /// in the implicit global namespace rather than dropped.
    UnresolvedDefault(String),
}

impl Reference {
    pub fn qualified_name(&self) -> QualifiedName {
        match self {
            Reference::Resolved(name) => name.clone(),
            Reference::UnresolvedDefault(name) => QualifiedName::parse(name),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }
}
