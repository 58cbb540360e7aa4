pub mod common;
pub mod php;

use tree_sitter::{Node as TSNode, Tree};

use crate::core::scanner::SourceUnit;
use crate::error::ParseFailure;

/// Syntax tree of one source unit together with the text it indexes into.
pub struct SyntaxTree {
    pub unit: SourceUnit,
    pub source: String,
    pub tree: Tree,
}

impl SyntaxTree {
    pub fn root(&self) -> TSNode<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

/// `parse(file) -> tree`. Implementations may keep internal tables, but
/// the result depends only on the file contents.
pub trait StructuralParser {
    fn parse(&mut self, unit: &SourceUnit) -> Result<SyntaxTree, ParseFailure>;
    fn language_name(&self) -> &str;
}
