//! The `ApiView` root object and its diagnostics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::navigation::{self, NavigationItem};
use crate::review::ReviewLines;

/// Language tag written into every `ApiView`.
pub const LANGUAGE: &str = "Python";

// ---------------------------------------------------------------------------
// DiagnosticLevel
// ---------------------------------------------------------------------------

/// Severity of a diagnostic attached to a review line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
    Fatal,
}

impl DiagnosticLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CodeDiagnostic
// ---------------------------------------------------------------------------

/// A system-generated comment linked to a review line id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CodeDiagnostic {
    /// Linter code, e.g. `C4717`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_id: Option<String>,
    pub target_id: String,
    pub text: String,
    pub level: DiagnosticLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_link_uri: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiView
// ---------------------------------------------------------------------------

/// Whole-package review handed to serializers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ApiView {
    pub package_name: String,
    pub package_version: String,
    pub parser_version: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_language_package_id: Option<String>,
    #[serde(default)]
    pub namespace: String,
    pub review_lines: ReviewLines,
    #[serde(default)]
    pub diagnostics: Vec<CodeDiagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Vec<NavigationItem>>,
}

impl ApiView {
    /// Create an empty view for a package.
    pub fn new(
        package_name: impl Into<String>,
        package_version: impl Into<String>,
        parser_version: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            package_version: package_version.into(),
            parser_version: parser_version.into(),
            language: LANGUAGE.to_string(),
            cross_language_package_id: None,
            namespace: namespace.into(),
            review_lines: ReviewLines::new(),
            diagnostics: Vec::new(),
            navigation: None,
        }
    }

    /// Rendered review text, one entry per line.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.review_lines.render()
    }

    /// Line ids that occur more than once anywhere in the tree.
    #[must_use]
    pub fn duplicate_line_ids(&self) -> Vec<String> {
        self.review_lines.duplicate_line_ids()
    }

    /// Derive the navigation tree from the emitted declaration lines.
    pub fn build_navigation(&mut self) {
        let items = navigation::from_review_lines(&self.review_lines);
        self.navigation = (!items.is_empty()).then_some(items);
    }
}
