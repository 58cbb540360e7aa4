use tree_sitter::Language;

use super::common::{read_source, TreeSitterParser};
use super::{StructuralParser, SyntaxTree};
use crate::core::scanner::SourceUnit;
use crate::error::{Error, ParseFailure, Result};

pub fn language() -> Language {
    tree_sitter_php::LANGUAGE_PHP.into()
}

/// PHP front end. Holds a tree-sitter parser, which is not shareable
/// across threads, so each worker owns one.
pub struct PhpParser {
    parser: TreeSitterParser,
}

impl PhpParser {
    pub fn new() -> Result<Self> {
        let parser = TreeSitterParser::new(&language()).map_err(|err| {
            Error::Parse(ParseFailure::new("<grammar>", format!("incompatible PHP grammar: {err}")))
        })?;
        Ok(Self { parser })
    }

    pub fn parse_source(
        &mut self,
        unit: &SourceUnit,
        source: String,
    ) -> std::result::Result<SyntaxTree, ParseFailure> {
        let tree = self.parser.parse(unit.path(), &source)?;
        Ok(SyntaxTree {
            unit: unit.clone(),
            source,
            tree,
        })
    }
}

impl StructuralParser for PhpParser {
    fn parse(&mut self, unit: &SourceUnit) -> std::result::Result<SyntaxTree, ParseFailure> {
        let source = read_source(unit.path())
            .map_err(|err| ParseFailure::new(unit.path(), format!("could not read file: {err}")))?;
        self.parse_source(unit, source)
    }

    fn language_name(&self) -> &str {
        "php"
    }
}
