//! Shared tree-sitter Python helpers: decorators, docstrings, string literals, names.

use ast_grep_core::Node;

/// `(start, end)` lines of a node, 1-based and inclusive.
pub fn line_span<D: ast_grep_core::Doc>(node: &Node<D>) -> (usize, usize) {
    (node.start_pos().line() + 1, node.end_pos().line() + 1)
}

/// Text of the `name` field, if any.
pub fn node_name<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<String> {
    node.field("name").map(|n| n.text().to_string())
}

/// Decorators of a `decorated_definition`, with the leading `@` kept.
pub fn extract_decorators<D: ast_grep_core::Doc>(node: &Node<D>) -> Vec<String> {
    node.children()
        .filter(|c| c.kind().as_ref() == "decorator")
        .map(|c| c.text().trim().to_string())
        .collect()
}

/// Unwrap a `decorated_definition` into its definition and decorator list.
///
/// Plain definitions come back unchanged with no decorators.
pub fn unwrap_decorated<'r, D: ast_grep_core::Doc>(
    node: &Node<'r, D>,
) -> Option<(Node<'r, D>, Vec<String>)> {
    match node.kind().as_ref() {
        "decorated_definition" => {
            let definition = node.field("definition")?;
            Some((definition, extract_decorators(node)))
        }
        "class_definition" | "function_definition" => Some((node.clone(), Vec::new())),
        _ => None,
    }
}

/// Check if any decorator matches one of the given names (handles dotted paths and calls).
pub fn decorator_matches_any(decorators: &[String], names: &[&str]) -> bool {
    decorators.iter().any(|d| {
        let bare = d.trim_start_matches('@');
        let base = bare.split('(').next().unwrap_or(bare).trim();
        names
            .iter()
            .any(|s| base == *s || base.ends_with(&format!(".{s}")))
    })
}

pub fn decorator_matches(decorators: &[String], name: &str) -> bool {
    decorator_matches_any(decorators, &[name])
}

#[must_use]
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

#[must_use]
pub fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

pub fn is_async_def<D: ast_grep_core::Doc>(node: &Node<D>) -> bool {
    // Trim leading whitespace before checking for "async " prefix
    node.text().trim_start().starts_with("async ")
}

/// Split a Python string literal into `(prefix, content)`.
///
/// Handles single, double and triple quotes with `r`/`b`/`u`/`f` prefixes.
/// Escape sequences are left untouched.
#[must_use]
pub fn split_string_literal(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    let quote_start = text.find(['"', '\''])?;
    let prefix = &text[..quote_start];
    if !prefix.chars().all(|c| "rRbBuUfF".contains(c)) {
        return None;
    }
    let body = &text[quote_start..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            let inner = &body[quote.len()..body.len() - quote.len()];
            return Some((prefix.to_string(), inner.to_string()));
        }
    }
    None
}

/// Content of a plain (non-bytes, non-f) string literal.
#[must_use]
pub fn plain_string_value(text: &str) -> Option<String> {
    let (prefix, content) = split_string_literal(text)?;
    let lowered = prefix.to_ascii_lowercase();
    if lowered.contains('b') || lowered.contains('f') {
        return None;
    }
    Some(content)
}

/// Dedent a docstring the way `inspect.cleandoc` does.
#[must_use]
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let mut lines = expanded.lines();
    let first = lines.next().unwrap_or_default().trim().to_string();
    let rest: Vec<&str> = lines.collect();
    let margin = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = Vec::with_capacity(rest.len() + 1);
    out.push(first);
    for line in rest {
        let cut = margin.min(line.len() - line.trim_start().len());
        out.push(line[cut..].trim_end().to_string());
    }
    while out.first().is_some_and(String::is_empty) {
        out.remove(0);
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n")
}

/// Docstring of a class or function definition (first statement of `body`).
pub fn extract_docstring<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<String> {
    let body = node.field("body")?;
    docstring_of_block(&body)
}

/// Docstring of a module root or a block.
pub fn docstring_of_block<D: ast_grep_core::Doc>(block: &Node<D>) -> Option<String> {
    let first = block
        .children()
        .find(|c| c.kind().as_ref() != "comment")?;
    if first.kind().as_ref() != "expression_statement" {
        return None;
    }
    let string_node = first.children().find(|c| c.kind().as_ref() == "string")?;
    let content = plain_string_value(&string_node.text())?;
    let doc = clean_docstring(&content);
    (!doc.is_empty()).then_some(doc)
}

/// Names listed in a module's `__all__` (supports `=` and `+=`).
pub fn extract_dunder_all<D: ast_grep_core::Doc>(root: &Node<D>) -> Option<Vec<String>> {
    let mut names: Option<Vec<String>> = None;
    for child in root.children() {
        if child.kind().as_ref() != "expression_statement" {
            continue;
        }
        let Some(stmt) = child.children().next() else {
            continue;
        };
        let kind = stmt.kind();
        if kind.as_ref() != "assignment" && kind.as_ref() != "augmented_assignment" {
            continue;
        }
        let is_all = stmt
            .field("left")
            .is_some_and(|left| left.text().as_ref() == "__all__");
        let Some(right) = stmt.field("right") else {
            continue;
        };
        if !is_all {
            continue;
        }
        let listed: Vec<String> = right
            .children()
            .filter(|c| c.kind().as_ref() == "string")
            .filter_map(|c| plain_string_value(&c.text()))
            .collect();
        if kind.as_ref() == "augmented_assignment" {
            names.get_or_insert_with(Vec::new).extend(listed);
        } else {
            names = Some(listed);
        }
    }
    names
}
