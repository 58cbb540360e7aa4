//! # phpdeps
//!
//! Static dependency graphs for PHP codebases.
//!
//! The pipeline runs strictly forward:
//!
//! - **Collect**: walk source roots for `.php` files ([`core::FileScanner`])
//! - **Parse**: tree-sitter syntax trees per file ([`parsers::php::PhpParser`])
//! - **Analyse**: class-to-class edges per tree ([`core::DependencyExtractor`])
//! - **Transform**: drop platform classes, filter, collapse to namespaces
//!   ([`core::DependencyGraph`])
//! - **Render**: text, dot, JSON, or a PlantUML image through the external
//!   `plantuml` binary ([`render::RenderDispatcher`])

pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;
pub mod render;

pub use error::{ConfigError, Error, ParseFailure, Result};
