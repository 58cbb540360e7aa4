use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::error::ParseFailure;

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: &Language) -> Result<Self, tree_sitter::LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    /// Parses `source`; a tree containing syntax errors is a failure.
    pub fn parse(&mut self, file_path: &Path, source: &str) -> Result<Tree, ParseFailure> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseFailure::new(file_path, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let failure = ParseFailure::new(file_path, "syntax error");
            return Err(match first_error(&root) {
                Some(node) => failure.at_line(node.start_position().row + 1),
                None => failure,
            });
        }
        Ok(tree)
    }
}

/// Buffered read sized to the file.
pub fn read_source(file_path: &Path) -> std::io::Result<String> {
    let file = File::open(file_path)?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;
    Ok(content)
}

/// Depth-first search for the first ERROR or MISSING node.
pub fn first_error<'a>(node: &TSNode<'a>) -> Option<TSNode<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<TSNode<'a>> = node.children(&mut cursor).collect();
    children.iter().find_map(first_error)
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &TSNode<'a>, kind: &str) -> Option<TSNode<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn find_children_by_kinds<'a>(node: &TSNode<'a>, kinds: &[&str]) -> Vec<TSNode<'a>> {
    let mut cursor = node.walk();
    let matches = node
        .children(&mut cursor)
        .filter(|child| kinds.contains(&child.kind()))
        .collect();
    matches
}
