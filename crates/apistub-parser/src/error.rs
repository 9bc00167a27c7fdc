//! Parser error types for apistub-parser.

use std::path::PathBuf;

/// Errors that can occur while analysing a package.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// A required input path does not exist or is unusable.
    #[error("Invalid {kind} path: {}", path.display())]
    InvalidPath { kind: &'static str, path: PathBuf },

    #[error("Unsupported archive: {}", .0.display())]
    UnsupportedArchive(PathBuf),

    #[error("Archive extraction failed: {0}")]
    Archive(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// No importable package directory was found under the package path.
    #[error("No Python package found under {}", .0.display())]
    NamespaceNotFound(PathBuf),

    /// A module source could not be read.
    #[error("Failed to load module {module}: {message}")]
    ImportFailed { module: String, message: String },

    /// `NodeIndex::add` was called twice for the same name.
    #[error("Name already registered in node index: {name}")]
    DuplicateName { name: String },

    /// Two or more review lines share an id.
    #[error("Duplicate line ids: {}", ids.join(", "))]
    DuplicateLineIds { ids: Vec<String> },

    /// The linter could not be started.
    #[error("Linter unavailable: {0}")]
    LinterUnavailable(String),

    #[error("Linter failed: {0}")]
    Linter(String),

    #[error("Package installation failed: {0}")]
    Install(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
