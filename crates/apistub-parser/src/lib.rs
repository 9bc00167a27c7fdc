//! # apistub-parser
//!
//! Static extraction of a Python package's public API surface into a review
//! token tree.
//!
//! Sources are parsed with ast-grep (tree-sitter Python); nothing is imported
//! or executed. Names are followed through re-export chains to their
//! definitions, and every public module, class and function becomes a node
//! that emits review lines:
//!
//! - [`package`]: archives, metadata, namespace discovery, source index
//! - [`docstring`], [`signature`], [`typename`]: the pieces a declaration is built from
//! - [`nodes`]: module, class, function and member nodes
//! - [`linter`]: pylint findings attached to their declarations
//! - [`pipeline`]: the end-to-end driver

pub mod docstring;
pub mod error;
pub mod linter;
pub mod metadata_map;
pub mod node_index;
pub mod nodes;
pub mod package;
pub mod parser;
pub mod pipeline;
pub mod python;
pub mod signature;
pub mod syntax;
pub mod typename;

pub use error::ParserError;
pub use linter::{LintFinding, Linter, PylintRunner};
pub use metadata_map::MetadataMap;
pub use node_index::NodeIndex;
pub use pipeline::{GenerateOptions, StubGenerator};
pub use python::{Installer, PipInstaller, PythonRuntime};

/// Version reported in the preamble and the `ApiView`.
pub const PARSER_VERSION: &str = env!("CARGO_PKG_VERSION");
