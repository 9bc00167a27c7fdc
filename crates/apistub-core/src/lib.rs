//! # apistub-core
//!
//! Review model shared by the apistub crates.
//!
//! This crate provides the output types handed to serializers:
//! - `ReviewToken` / `ReviewLine` / `ReviewLines`: the line-oriented token tree
//! - `ApiView`: the root object for one analysed package
//! - `CodeDiagnostic`: linter findings attached to line ids
//! - `NavigationItem`: the optional navigation tree derived from declaration lines

pub mod api_view;
pub mod navigation;
pub mod review;

pub use api_view::{ApiView, CodeDiagnostic, DiagnosticLevel, LANGUAGE};
pub use navigation::NavigationItem;
pub use review::{ReviewLine, ReviewLines, ReviewToken, TokenKind};
