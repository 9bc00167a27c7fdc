//! ast-grep wrapper for Python sources.

use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::SupportLang;

/// The concrete AST tree type returned by `parse_source`.
pub type AstTree = ast_grep_core::AstGrep<StrDoc<SupportLang>>;

/// A node borrowed from an [`AstTree`].
pub type PyNode<'r> = ast_grep_core::Node<'r, StrDoc<SupportLang>>;

/// Returns `true` for paths ending in `.py`.
#[must_use]
pub fn is_python_file(file_path: &str) -> bool {
    std::path::Path::new(file_path)
        .extension()
        .is_some_and(|ext| ext == "py")
}

/// Parse Python source into an ast-grep tree.
#[must_use]
pub fn parse_source(source: &str) -> AstTree {
    use ast_grep_language::LanguageExt;
    SupportLang::Python.ast_grep(source)
}

/// Whether the tree contains syntax errors, including tokens the parser
/// inserted to recover (`MISSING` nodes).
#[must_use]
pub fn has_syntax_errors(tree: &AstTree) -> bool {
    fn walk(node: &PyNode<'_>) -> bool {
        node.is_error() || node.is_missing() || node.children().any(|c| walk(&c))
    }
    let root = tree.root();
    root.get_inner_node().has_error() || walk(&root)
}
