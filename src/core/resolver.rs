use std::collections::HashMap;

use super::entity::{QualifiedName, Reference, NAMESPACE_SEPARATOR};

/// Names that look like class names in type positions but never refer to a
/// class.
const NON_CLASS_NAMES: &[&str] = &[
    "self", "static", "parent", "array", "callable", "iterable", "bool", "boolean", "int",
    "integer", "float", "double", "string", "void", "null", "mixed", "object", "never",
    "false", "true", "resource", "numeric",
];

/// Resolves names as written in a file to fully qualified names, tracking
/// the current namespace and its `use` imports.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    /// `None` until the file declares a namespace.
    namespace: Option<QualifiedName>,
    /// Lower-cased alias to imported name.
    imports: HashMap<String, QualifiedName>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports are scoped to a namespace declaration.
    pub fn enter_namespace(&mut self, namespace: QualifiedName) {
        self.namespace = Some(namespace);
        self.imports.clear();
    }

    pub fn namespace(&self) -> Option<&QualifiedName> {
        self.namespace.as_ref()
    }

    /// `use Foo\Bar;` aliases `Bar`, `use Foo\Bar as Baz;` aliases `Baz`.
    pub fn add_import(&mut self, target: QualifiedName, alias: Option<&str>) {
        let alias = alias
            .map(str::to_string)
            .or_else(|| target.simple_name().map(str::to_string));
        if let Some(alias) = alias {
            self.imports.insert(alias.to_lowercase(), target);
        }
    }

    /// Fully qualified name of a class declared in the current namespace.
    pub fn declare(&self, simple_name: &str) -> QualifiedName {
        let name = QualifiedName::parse(simple_name);
        match &self.namespace {
            Some(namespace) => namespace.join(&name),
            None => name,
        }
    }

    /// Returns `None` for names that cannot denote a class (`self`,
    /// primitives, empty text).
    pub fn resolve(&self, written: &str) -> Option<Reference> {
        let written = written.trim();
        if written.is_empty() {
            return None;
        }
        if written.starts_with(NAMESPACE_SEPARATOR) {
            return Some(Reference::Resolved(QualifiedName::parse(written)));
        }

        let name = QualifiedName::parse(written);
        let (first, rest) = name.segments().split_first()?;
        let rest = QualifiedName::from_segments(rest.iter().cloned());

        if rest.is_global() && is_non_class_name(first) {
            return None;
        }
        if first.eq_ignore_ascii_case("namespace") && !rest.is_global() {
            let current = self.namespace.clone().unwrap_or_default();
            return Some(Reference::Resolved(current.join(&rest)));
        }
        if let Some(imported) = self.imports.get(&first.to_lowercase()) {
            return Some(Reference::Resolved(imported.join(&rest)));
        }

        match &self.namespace {
            Some(namespace) => Some(Reference::Resolved(namespace.join(&name))),
            None if rest.is_global() => Some(Reference::UnresolvedDefault(first.clone())),
            None => Some(Reference::Resolved(name)),
        }
    }
}

fn is_non_class_name(name: &str) -> bool {
    NON_CLASS_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}
