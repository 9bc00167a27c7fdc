//! Review tokens, lines and line trees.
//!
//! A `ReviewLines` list is append-only while a package is being emitted. Each
//! `ReviewLine` owns its tokens and an optional nested `ReviewLines` of children;
//! children render one indentation level (four spaces) deeper than their parent.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const INDENT: &str = "    ";

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// TokenKind
// ---------------------------------------------------------------------------

/// Classification of a single review token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum TokenKind {
    Text,
    Punctuation,
    Keyword,
    TypeName,
    MemberName,
    StringLiteral,
    Literal,
    Comment,
    ExternalUrl,
}

// ---------------------------------------------------------------------------
// ReviewToken
// ---------------------------------------------------------------------------

/// One token inside a review line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewToken {
    pub kind: TokenKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_diff: bool,
    #[serde(default = "default_true")]
    pub has_suffix_space: bool,
    #[serde(default)]
    pub has_prefix_space: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub render_classes: Vec<String>,
}

impl ReviewToken {
    /// Create a token with the default spacing (suffix space, no prefix space).
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            navigation_display_name: None,
            navigate_to_id: None,
            skip_diff: false,
            has_suffix_space: true,
            has_prefix_space: false,
            render_classes: Vec::new(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Text, value)
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Keyword, value)
    }

    pub fn punctuation(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Punctuation, value)
    }

    pub fn type_name(value: impl Into<String>) -> Self {
        Self::new(TokenKind::TypeName, value)
    }

    pub fn member_name(value: impl Into<String>) -> Self {
        Self::new(TokenKind::MemberName, value)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Literal, value)
    }

    /// A string literal token. The value is wrapped in double quotes.
    pub fn string_literal(value: &str) -> Self {
        Self::new(TokenKind::StringLiteral, format!("\"{value}\""))
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Comment, value)
    }

    pub fn external_url(url: impl Into<String>) -> Self {
        Self::new(TokenKind::ExternalUrl, url)
    }

    #[must_use]
    pub const fn without_suffix_space(mut self) -> Self {
        self.has_suffix_space = false;
        self
    }

    #[must_use]
    pub const fn with_suffix_space(mut self, has_suffix_space: bool) -> Self {
        self.has_suffix_space = has_suffix_space;
        self
    }

    #[must_use]
    pub const fn with_prefix_space(mut self) -> Self {
        self.has_prefix_space = true;
        self
    }

    #[must_use]
    pub const fn with_skip_diff(mut self) -> Self {
        self.skip_diff = true;
        self
    }

    #[must_use]
    pub fn navigate_to(mut self, id: impl Into<String>) -> Self {
        self.navigate_to_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.navigation_display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn render_class(mut self, class: impl Into<String>) -> Self {
        self.render_classes.push(class.into());
        self
    }

    /// Append `prefix_space? value suffix_space?` to `out`.
    pub fn render_into(&self, out: &mut String) {
        if self.has_prefix_space {
            out.push(' ');
        }
        out.push_str(&self.value);
        if self.has_suffix_space {
            out.push(' ');
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewLine
// ---------------------------------------------------------------------------

/// One rendered line plus its nested children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ReviewLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_language_id: Option<String>,
    #[serde(default)]
    pub tokens: Vec<ReviewToken>,
    #[serde(default, skip_serializing_if = "ReviewLines::is_empty")]
    pub children: ReviewLines,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_context_end_line: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to_line: Option<String>,
}

impl ReviewLine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A line anchored by `line_id`.
    pub fn with_id(line_id: impl Into<String>) -> Self {
        Self {
            line_id: Some(line_id.into()),
            ..Self::default()
        }
    }

    /// A decorator-style line that belongs to the declaration `line_id`.
    pub fn related_to(line_id: impl Into<String>) -> Self {
        Self {
            related_to_line: Some(line_id.into()),
            ..Self::default()
        }
    }

    /// A line with neither tokens nor children.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty() && self.children.is_empty()
    }

    pub fn push(&mut self, token: ReviewToken) {
        self.tokens.push(token);
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = ReviewToken>) {
        self.tokens.extend(tokens);
    }

    /// Concatenated rendering of this line's own tokens.
    #[must_use]
    pub fn render_tokens(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            token.render_into(&mut out);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// ReviewLines
// ---------------------------------------------------------------------------

/// Ordered sequence of review lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ReviewLines(Vec<ReviewLine>);

impl ReviewLines {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, line: ReviewLine) {
        self.0.push(line);
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewLine> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ReviewLine] {
        &self.0
    }

    #[must_use]
    pub fn last(&self) -> Option<&ReviewLine> {
        self.0.last()
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        self.0.iter().any(|line| !line.is_blank())
    }

    /// Normalize the tail to exactly `count` blank lines.
    ///
    /// Missing blanks are appended and excess ones popped. With
    /// `last_is_context_end` the final blank line is flagged as closing the
    /// enclosing context. An empty list stays empty.
    pub fn set_blank_lines(&mut self, count: usize, last_is_context_end: bool) {
        if self.0.is_empty() {
            return;
        }
        let trailing = self.0.iter().rev().take_while(|line| line.is_blank()).count();
        if trailing > count {
            self.0.truncate(self.0.len() - (trailing - count));
        } else {
            for _ in trailing..count {
                self.0.push(ReviewLine::blank());
            }
        }
        if last_is_context_end
            && count > 0
            && let Some(last) = self.0.last_mut()
        {
            last.is_context_end_line = true;
        }
    }

    /// Render every line, indenting children four spaces per level.
    ///
    /// Blank lines render as empty strings.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut Vec<String>) {
        for line in &self.0 {
            if line.tokens.is_empty() {
                out.push(String::new());
            } else {
                out.push(format!("{}{}", INDENT.repeat(depth), line.render_tokens()));
            }
            line.children.render_into(depth + 1, out);
        }
    }

    /// Rendered text joined with newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.render().join("\n")
    }

    /// Every line id in depth-first order.
    #[must_use]
    pub fn line_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        for line in &self.0 {
            if let Some(id) = line.line_id.as_deref() {
                ids.push(id);
            }
            line.children.collect_ids(ids);
        }
    }

    /// Line ids that occur more than once, sorted.
    #[must_use]
    pub fn duplicate_line_ids(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for id in self.line_ids() {
            *counts.entry(id).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

impl<'a> IntoIterator for &'a ReviewLines {
    type Item = &'a ReviewLine;
    type IntoIter = std::slice::Iter<'a, ReviewLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ReviewLines {
    type Item = ReviewLine;
    type IntoIter = std::vec::IntoIter<ReviewLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<ReviewLine> for ReviewLines {
    fn from_iter<T: IntoIterator<Item = ReviewLine>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ReviewLine> for ReviewLines {
    fn extend<T: IntoIterator<Item = ReviewLine>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_line(value: &str) -> ReviewLine {
        let mut line = ReviewLine::new();
        line.push(ReviewToken::text(value).without_suffix_space());
        line
    }

    #[test]
    fn token_renders_spacing() {
        let mut out = String::new();
        ReviewToken::punctuation("->")
            .with_prefix_space()
            .render_into(&mut out);
        assert_eq!(out, " -> ");
    }

    #[test]
    fn string_literal_is_double_quoted() {
        let token = ReviewToken::string_literal("Bill");
        assert_eq!(token.value, "\"Bill\"");
        assert_eq!(token.kind, TokenKind::StringLiteral);
    }

    #[test]
    fn set_blank_lines_appends_missing_blanks() {
        let mut lines: ReviewLines = [text_line("a")].into_iter().collect();
        lines.set_blank_lines(2, false);
        assert_eq!(lines.len(), 3);
        assert!(lines.as_slice()[1].is_blank());
        assert!(!lines.as_slice()[2].is_context_end_line);
    }

    #[test]
    fn set_blank_lines_pops_excess_blanks() {
        let mut lines: ReviewLines = [
            text_line("a"),
            ReviewLine::blank(),
            ReviewLine::blank(),
            ReviewLine::blank(),
        ]
        .into_iter()
        .collect();
        lines.set_blank_lines(1, false);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn set_blank_lines_marks_context_end() {
        let mut lines: ReviewLines = [text_line("a"), ReviewLine::blank()].into_iter().collect();
        lines.set_blank_lines(2, true);
        let flagged: Vec<bool> = lines.iter().map(|l| l.is_context_end_line).collect();
        assert_eq!(flagged, vec![false, false, true]);
    }

    #[test]
    fn set_blank_lines_zero_removes_trailing_blanks() {
        let mut lines: ReviewLines = [text_line("a"), ReviewLine::blank()].into_iter().collect();
        lines.set_blank_lines(0, true);
        assert_eq!(lines.len(), 1);
        assert!(!lines.as_slice()[0].is_context_end_line);
    }

    #[test]
    fn set_blank_lines_on_empty_list_is_noop() {
        let mut lines = ReviewLines::new();
        lines.set_blank_lines(2, true);
        assert!(lines.is_empty());
    }

    #[test]
    fn render_indents_children() {
        let mut parent = text_line("class A:");
        parent.children.push(text_line("ivar x"));
        parent.children.push(ReviewLine::blank());
        let lines: ReviewLines = [parent].into_iter().collect();
        assert_eq!(lines.render(), vec!["class A:", "    ivar x", ""]);
    }

    #[test]
    fn duplicate_ids_found_in_nested_children() {
        let mut parent = ReviewLine::with_id("pkg.A");
        parent.children.push(ReviewLine::with_id("pkg.A.f"));
        parent.children.push(ReviewLine::with_id("pkg.A.f"));
        let lines: ReviewLines = [parent, ReviewLine::with_id("pkg.B")].into_iter().collect();
        assert_eq!(lines.line_ids(), vec!["pkg.A", "pkg.A.f", "pkg.A.f", "pkg.B"]);
        assert_eq!(lines.duplicate_line_ids(), vec!["pkg.A.f".to_string()]);
    }

    #[test]
    fn blank_lines_skip_children_field_when_serialized() {
        let json = serde_json::to_value(ReviewLine::blank()).unwrap();
        assert_eq!(json, serde_json::json!({ "Tokens": [] }));
    }
}
