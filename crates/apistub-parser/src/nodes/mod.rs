//! Declaration nodes: built from parsed sources in one pass, emitted as review
//! lines in a second.

mod class;
mod dataclass;
mod function;
mod members;
mod module;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use apistub_core::{CodeDiagnostic, ReviewLine, ReviewLines, ReviewToken};

use crate::linter::{FindingOwner, Findings};
use crate::metadata_map::MetadataMap;
use crate::node_index::NodeIndex;
use crate::package::{SourceIndex, Target};
use crate::typename::{TypeNormalizer, type_tokens};

pub use class::{ClassKind, ClassMember, ClassNode};
pub use dataclass::DataclassOptions;
pub use function::FunctionNode;
pub use members::{EnumValueNode, KeyNode, PropertyNode, Value, VariableNode};
pub use module::ModuleNode;

/// Render class added to declarations from hand-authored sources.
pub const HANDWRITTEN_RENDER_CLASS: &str = "handwritten";

/// Decides whether a source file holds hand-authored code.
pub trait HandwrittenPolicy {
    fn is_handwritten(&self, path: &Path) -> bool;
}

/// Files named `*_patch.py` are hand-authored customizations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchFileMarker;

impl HandwrittenPolicy for PatchFileMarker {
    fn is_handwritten(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("_patch.py"))
    }
}

/// Source file and inclusive line range of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceSpan {
    fn owner(&self, id: &str) -> FindingOwner {
        FindingOwner {
            id: id.to_string(),
            path: self.path.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
        }
    }
}

/// Read-only state shared while building nodes.
pub struct BuildContext<'a> {
    pub sources: &'a SourceIndex,
    pub handwritten: &'a dyn HandwrittenPolicy,
}

impl<'a> BuildContext<'a> {
    pub fn new(sources: &'a SourceIndex, handwritten: &'a dyn HandwrittenPolicy) -> Self {
        Self {
            sources,
            handwritten,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        self.sources.namespace()
    }

    /// Normalize a type annotation written in `module`.
    #[must_use]
    pub fn normalize_type(&self, module: &str, raw: &str) -> String {
        let resolver = |name: &str| self.class_path(module, name);
        TypeNormalizer::new(self.namespace())
            .with_resolver(&resolver)
            .normalize(raw)
    }

    /// Definition-site path of a package class named `name` in `module`.
    fn class_path(&self, module: &str, name: &str) -> Option<String> {
        match self.sources.resolve_dotted(module, name)? {
            Target::Class(site) => Some(site.path()),
            _ => None,
        }
    }

    fn span(&self, module: &str, node: &crate::parser::PyNode<'_>) -> SourceSpan {
        let (start_line, end_line) = crate::syntax::line_span(node);
        SourceSpan {
            path: self
                .sources
                .module(module)
                .map(|m| m.path.clone())
                .unwrap_or_default(),
            start_line,
            end_line,
        }
    }
}

/// Mutable state threaded through emission.
pub struct EmitContext<'a> {
    pub index: &'a NodeIndex,
    pub metadata: &'a MetadataMap,
    findings: Findings,
    diagnostics: Vec<CodeDiagnostic>,
}

impl<'a> EmitContext<'a> {
    #[must_use]
    pub fn new(index: &'a NodeIndex, metadata: &'a MetadataMap, findings: Findings) -> Self {
        Self {
            index,
            metadata,
            findings,
            diagnostics: Vec::new(),
        }
    }

    /// A declaration line anchored at `id`, carrying its cross-language id.
    fn declaration(&self, id: &str) -> ReviewLine {
        let mut line = ReviewLine::with_id(id);
        line.cross_language_id = self.metadata.id_for_line(id).map(str::to_string);
        line
    }

    /// Move the findings owned by `id` into the diagnostics list.
    pub fn attach_findings(&mut self, id: &str) {
        let found = self.findings.take(id);
        self.diagnostics.extend(found);
    }

    fn type_tokens(&self, type_text: &str, trailing_space: bool) -> Vec<ReviewToken> {
        type_tokens(type_text, Some(self.index), trailing_space)
    }

    /// Diagnostics collected so far.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<CodeDiagnostic> {
        self.diagnostics
    }
}

/// One line per decorator, each related to the declaration `id`.
fn push_decorators(out: &mut ReviewLines, decorators: &[String], id: &str) {
    for decorator in decorators {
        let mut line = ReviewLine::related_to(id);
        line.push(ReviewToken::keyword(decorator.as_str()).without_suffix_space());
        out.push(line);
    }
}
