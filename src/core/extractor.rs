use std::collections::BTreeSet;
use tree_sitter::Node as TSNode;

use super::entity::{DeclaredEntity, QualifiedName};
use super::graph::DependencyEdge;
use super::internals::InternalTable;
use super::resolver::NameResolver;
use super::scanner::SourceUnit;
use crate::parsers::common::{extract_text, find_child_by_kind, find_children_by_kinds};
use crate::parsers::SyntaxTree;

const DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

const NAME_KINDS: &[&str] = &["name", "qualified_name"];

/// Edges contributed by one source unit.
#[derive(Debug, Clone)]
pub struct FileDependencies {
    pub unit: SourceUnit,
    pub declared: Vec<DeclaredEntity>,
    pub edges: BTreeSet<DependencyEdge>,
    /// References that fell back to the implicit global namespace.
    pub unresolved: usize,
}

/// Walks a PHP syntax tree and emits one edge per (declaration, referenced
/// class) pair. Holds no mutable state, so trees can be processed in any
/// order or concurrently.
pub struct DependencyExtractor<'t> {
    internals: &'t InternalTable,
}

struct Collected<'s> {
    source: &'s [u8],
    declared: Vec<DeclaredEntity>,
    edges: BTreeSet<DependencyEdge>,
    unresolved: usize,
}

impl<'t> DependencyExtractor<'t> {
    pub fn new(internals: &'t InternalTable) -> Self {
        Self { internals }
    }

    pub fn extract(&self, tree: &SyntaxTree) -> FileDependencies {
        let mut collected = Collected {
            source: tree.source_bytes(),
            declared: Vec::new(),
            edges: BTreeSet::new(),
            unresolved: 0,
        };
        let mut resolver = NameResolver::new();
        self.walk_statements(&tree.root(), &mut resolver, &mut collected);

        FileDependencies {
            unit: tree.unit.clone(),
            declared: collected.declared,
            edges: collected.edges,
            unresolved: collected.unresolved,
        }
    }

    fn entity(&self, name: QualifiedName) -> DeclaredEntity {
        let internal = self.internals.contains(&name);
        DeclaredEntity::class(name).with_internal(internal)
    }

    fn walk_statements(&self, node: &TSNode, resolver: &mut NameResolver, out: &mut Collected) {
        let mut cursor = node.walk();
        let children: Vec<TSNode> = node.named_children(&mut cursor).collect();

        for child in children {
            match child.kind() {
                "namespace_definition" => self.process_namespace(&child, resolver, out),
                "namespace_use_declaration" => self.process_imports(&child, resolver, out.source),
                kind if DECLARATION_KINDS.contains(&kind) => {
                    self.process_declaration(&child, resolver, out)
                }
                "function_definition" | "comment" | "text" | "php_tag" => {}
                _ => {
                    // Conditional declarations sit inside if/else blocks.
                    if child.named_child_count() > 0 {
                        self.walk_statements(&child, resolver, out);
                    }
                }
            }
        }
    }

    fn process_namespace(&self, node: &TSNode, resolver: &mut NameResolver, out: &mut Collected) {
        let name = node
            .child_by_field_name("name")
            .or_else(|| find_child_by_kind(node, "namespace_name"))
            .map(|name| QualifiedName::parse(extract_text(&name, out.source)))
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .or_else(|| find_child_by_kind(node, "compound_statement"));

        match body {
            Some(body) => {
                let mut scoped = resolver.clone();
                scoped.enter_namespace(name);
                self.walk_statements(&body, &mut scoped, out);
            }
            // `namespace Foo;` applies to the statements that follow.
            None => resolver.enter_namespace(name),
        }
    }

    fn process_imports(&self, node: &TSNode, resolver: &mut NameResolver, source: &[u8]) {
        if imports_non_class(node) {
            return;
        }

        let prefix = node
            .child_by_field_name("prefix")
            .or_else(|| find_child_by_kind(node, "namespace_name"))
            .map(|prefix| QualifiedName::parse(extract_text(&prefix, source)))
            .unwrap_or_default();

        let mut clauses =
            find_children_by_kinds(node, &["namespace_use_clause", "namespace_use_group_clause"]);
        if let Some(group) = find_child_by_kind(node, "namespace_use_group") {
            clauses.extend(find_children_by_kinds(
                &group,
                &["namespace_use_clause", "namespace_use_group_clause"],
            ));
        }

        for clause in clauses {
            if imports_non_class(&clause) {
                continue;
            }
            let names = find_children_by_kinds(&clause, &["name", "qualified_name", "namespace_name"]);
            let Some(target) = names.first() else {
                continue;
            };
            let alias = find_child_by_kind(&clause, "namespace_aliasing_clause")
                .and_then(|aliasing| find_child_by_kind(&aliasing, "name"))
                .or_else(|| clause.child_by_field_name("alias"))
                .or_else(|| names.get(1).copied())
                .map(|alias| extract_text(&alias, source));

            let target = prefix.join(&QualifiedName::parse(extract_text(target, source)));
            resolver.add_import(target, alias);
        }
    }

    fn process_declaration(&self, node: &TSNode, resolver: &NameResolver, out: &mut Collected) {
        let Some(name_node) = node
            .child_by_field_name("name")
            .or_else(|| find_child_by_kind(node, "name"))
        else {
            return;
        };
        let from = self.entity(resolver.declare(extract_text(&name_node, out.source)));
        out.declared.push(from.clone());

        let mut references = Vec::new();
        collect_references(node, out.source, &mut references);

        for written in references {
            let Some(reference) = resolver.resolve(written) else {
                continue;
            };
            if !reference.is_resolved() {
                out.unresolved += 1;
            }
            let to = self.entity(reference.qualified_name());
            if to != from {
                out.edges.insert(DependencyEdge::new(from.clone(), to));
            }
        }
    }
}

/// `use function` / `use const` imports never name classes.
fn imports_non_class(node: &TSNode) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && matches!(child.kind(), "function" | "const"));
    found
}

/// Every class name written inside `node`, as text.
fn collect_references<'s>(node: &TSNode, source: &'s [u8], references: &mut Vec<&'s str>) {
    let mut stack = vec![*node];

    while let Some(current) = stack.pop() {
        let mut cursor = current.walk();
        let children: Vec<TSNode> = current.named_children(&mut cursor).collect();

        match current.kind() {
            "base_clause" | "class_interface_clause" | "use_declaration" | "type_list" => {
                references.extend(
                    children
                        .iter()
                        .filter(|child| NAME_KINDS.contains(&child.kind()))
                        .map(|child| extract_text(child, source)),
                );
            }
            "named_type" => {
                let text = match children.iter().find(|child| NAME_KINDS.contains(&child.kind())) {
                    Some(name) => extract_text(name, source),
                    None => extract_text(&current, source),
                };
                references.push(text);
            }
            "object_creation_expression" => {
                if let Some(class) = children.iter().find(|child| NAME_KINDS.contains(&child.kind())) {
                    references.push(extract_text(class, source));
                }
            }
            "scoped_call_expression"
            | "scoped_property_access_expression"
            | "class_constant_access_expression" => {
                let scope = current
                    .child_by_field_name("scope")
                    .or_else(|| children.first().copied());
                if let Some(scope) = scope.filter(|scope| NAME_KINDS.contains(&scope.kind())) {
                    references.push(extract_text(&scope, source));
                }
            }
            "binary_expression" if is_instanceof(&current) => {
                let right = current
                    .child_by_field_name("right")
                    .or_else(|| children.last().copied());
                if let Some(right) = right.filter(|right| NAME_KINDS.contains(&right.kind())) {
                    references.push(extract_text(&right, source));
                }
            }
            _ => {}
        }

        stack.extend(children.into_iter().rev());
    }
}

fn is_instanceof(node: &TSNode) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| child.kind() == "instanceof");
    found
}
