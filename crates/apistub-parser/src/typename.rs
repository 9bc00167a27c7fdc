//! Type-string normalization and tokenization.
//!
//! Raw annotations and docstring types are parsed into a small expression tree,
//! rewritten (unions, optionals, forward refs, literal quoting, module prefixes)
//! and printed back. Printing a normalized string again is a no-op.

use std::sync::LazyLock;

use apistub_core::ReviewToken;
use regex::Regex;

use crate::node_index::NodeIndex;

static ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(?:py:)?[a-z]+:").expect("static regex"));

static TYPE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~?[A-Za-z\d._]+").expect("static regex"));

const TYPING_PREFIXES: [&str; 2] = ["typing.", "typing_extensions."];

/// Maps a name as written in some module to its definition-site path inside the package.
pub type NameResolver<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeExpr {
    Name(String),
    Str(String),
    Subscript { name: String, args: Vec<TypeExpr> },
    Call { name: String, args: Vec<TypeExpr> },
    List(Vec<TypeExpr>),
    /// `A | B`, kept textual.
    Pipe(Vec<TypeExpr>),
    /// `A or B` from docstrings, folded into `Union` / `Optional`.
    Or(Vec<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Open(char),
    Close(char),
    Comma,
    Pipe,
    Or,
}

fn lex(text: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '[' | '(' => {
                tokens.push(Token::Open(c));
                i += 1;
            }
            ']' | ')' => {
                tokens.push(Token::Close(c));
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '|' => {
                tokens.push(Token::Pipe);
                i += 1;
            }
            '"' | '\'' => {
                let end = chars[i + 1..].iter().position(|&q| q == c)? + i + 1;
                tokens.push(Token::Str(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            c if is_ident_char(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                if ident == "or" {
                    tokens.push(Token::Or);
                } else {
                    tokens.push(Token::Ident(ident));
                }
            }
            _ => return None,
        }
    }
    Some(tokens)
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '~' | '-' | '*')
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Option<TypeExpr> {
        let mut parts = vec![self.pipe()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            parts.push(self.pipe()?);
        }
        Some(if parts.len() == 1 {
            parts.remove(0)
        } else {
            TypeExpr::Or(parts)
        })
    }

    fn pipe(&mut self) -> Option<TypeExpr> {
        let mut parts = vec![self.atom()?];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            parts.push(self.atom()?);
        }
        Some(if parts.len() == 1 {
            parts.remove(0)
        } else {
            TypeExpr::Pipe(parts)
        })
    }

    fn atom(&mut self) -> Option<TypeExpr> {
        match self.next()? {
            Token::Ident(name) => match self.peek() {
                Some(Token::Open('[')) => {
                    self.pos += 1;
                    let args = self.args(']')?;
                    Some(TypeExpr::Subscript { name, args })
                }
                Some(Token::Open('(')) => {
                    self.pos += 1;
                    let args = self.args(')')?;
                    Some(TypeExpr::Call { name, args })
                }
                _ => Some(TypeExpr::Name(name)),
            },
            Token::Str(value) => Some(TypeExpr::Str(value)),
            Token::Open('[') => Some(TypeExpr::List(self.args(']')?)),
            _ => None,
        }
    }

    fn args(&mut self, close: char) -> Option<Vec<TypeExpr>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::Close(close)) {
            self.pos += 1;
            return Some(args);
        }
        loop {
            args.push(self.expr()?);
            match self.next()? {
                Token::Comma => {}
                Token::Close(c) if c == close => return Some(args),
                _ => return None,
            }
        }
    }
}

fn parse(text: &str) -> Option<TypeExpr> {
    let mut parser = Parser {
        tokens: lex(text)?,
        pos: 0,
    };
    let expr = parser.expr()?;
    (parser.pos == parser.tokens.len()).then_some(expr)
}

/// Drop reST roles (`:class:`) and backticks outside quoted spans; string
/// contents are kept byte for byte.
fn strip_markup(raw: &str) -> String {
    let clean = |segment: &str| ROLE_RE.replace_all(segment, "").replace('`', "");
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(['\'', '"']) {
        out.push_str(&clean(&rest[..start]));
        let quoted = &rest[start..];
        let quote = quoted.as_bytes()[0];
        let mut escaped = false;
        let end = quoted
            .bytes()
            .enumerate()
            .skip(1)
            .find(|&(_, b)| {
                let closes = b == quote && !escaped;
                escaped = b == b'\\' && !escaped;
                closes
            })
            .map_or(quoted.len(), |(i, _)| i + 1);
        out.push_str(&quoted[..end]);
        rest = &quoted[end..];
    }
    out.push_str(&clean(rest));
    out
}

/// Rewrites type strings relative to the package's root namespace.
pub struct TypeNormalizer<'a> {
    namespace: &'a str,
    resolver: Option<NameResolver<'a>>,
}

impl<'a> TypeNormalizer<'a> {
    #[must_use]
    pub const fn new(namespace: &'a str) -> Self {
        Self {
            namespace,
            resolver: None,
        }
    }

    /// Qualify names that are package classes imported into the current module.
    #[must_use]
    pub const fn with_resolver(mut self, resolver: NameResolver<'a>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = strip_markup(raw);
        let cleaned = cleaned.trim();
        match parse(cleaned) {
            Some(expr) => self.print(&expr, false),
            None => {
                tracing::debug!(raw, "type kept verbatim");
                cleaned.replace('~', "")
            }
        }
    }

    fn print(&self, expr: &TypeExpr, in_literal: bool) -> String {
        match expr {
            TypeExpr::Name(name) if in_literal => name.clone(),
            TypeExpr::Name(name) => self.qualify(name),
            TypeExpr::Str(value) if in_literal => format!("\"{value}\""),
            TypeExpr::Str(value) => match parse(value) {
                Some(inner) => self.print(&inner, false),
                None => format!("\"{value}\""),
            },
            TypeExpr::Subscript { name, args } => {
                let name = if in_literal {
                    name.clone()
                } else {
                    self.qualify(name)
                };
                match short_name(&name) {
                    "Literal" => format!("{name}[{}]", self.print_all(args, true)),
                    "Union" => {
                        let parts: Vec<String> =
                            args.iter().map(|a| self.print(a, false)).collect();
                        fold_union(parts)
                    }
                    "Optional" if args.len() == 1 => {
                        let inner = self.print(&args[0], false);
                        if inner.starts_with("Optional[") || inner == "None" {
                            inner
                        } else {
                            format!("Optional[{inner}]")
                        }
                    }
                    "ForwardRef" if args.len() == 1 => self.print(&args[0], false),
                    _ => format!("{name}[{}]", self.print_all(args, in_literal)),
                }
            }
            TypeExpr::Call { name, args } => {
                if short_name(name) == "ForwardRef" && args.len() == 1 {
                    self.print(&args[0], false)
                } else {
                    let name = if in_literal {
                        name.clone()
                    } else {
                        self.qualify(name)
                    };
                    format!("{name}({})", self.print_all(args, in_literal))
                }
            }
            TypeExpr::List(items) => format!("[{}]", self.print_all(items, in_literal)),
            TypeExpr::Pipe(parts) => parts
                .iter()
                .map(|p| self.print(p, in_literal))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeExpr::Or(parts) => {
                fold_union(parts.iter().map(|p| self.print(p, false)).collect())
            }
        }
    }

    fn print_all(&self, exprs: &[TypeExpr], in_literal: bool) -> String {
        exprs
            .iter()
            .map(|e| self.print(e, in_literal))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn qualify(&self, name: &str) -> String {
        let name = name.trim_start_matches('~');
        if name.is_empty()
            || name.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '*')
            || name.chars().all(|c| c == '.')
        {
            return name.to_string();
        }
        if name == "NoneType" {
            return "None".to_string();
        }
        for prefix in TYPING_PREFIXES {
            if let Some(rest) = name.strip_prefix(prefix) {
                return rest.to_string();
            }
        }
        if self.in_package(name) {
            return name.to_string();
        }
        if let Some(resolver) = self.resolver
            && let Some(qualified) = resolver(name)
        {
            return qualified;
        }
        short_name(name).to_string()
    }

    fn in_package(&self, name: &str) -> bool {
        !self.namespace.is_empty()
            && (name == self.namespace
                || name
                    .strip_prefix(self.namespace)
                    .is_some_and(|rest| rest.starts_with('.')))
    }
}

fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `[A, None, B]` -> `Optional[Union[A, B]]`, `[A, None]` -> `Optional[A]`.
fn fold_union(parts: Vec<String>) -> String {
    let total = parts.len();
    let mut rest: Vec<String> = parts
        .into_iter()
        .filter(|p| p != "None" && p != "NoneType")
        .collect();
    let has_none = rest.len() < total;
    let body = match rest.len() {
        0 => return "None".to_string(),
        1 => rest.remove(0),
        _ => format!("Union[{}]", rest.join(", ")),
    };
    if has_none && !body.starts_with("Optional[") {
        format!("Optional[{body}]")
    } else {
        body
    }
}

/// Tokenize a normalized type: punctuation between names, a `TypeName` per
/// name (short form, linked through `index`), string and numeric literals.
///
/// No token carries a suffix space except, when `trailing_space` is set, the last.
#[must_use]
pub fn type_tokens(
    type_text: &str,
    index: Option<&NodeIndex>,
    trailing_space: bool,
) -> Vec<ReviewToken> {
    let mut tokens = Vec::new();
    let mut pending = String::new();
    let mut pos = 0;
    while pos < type_text.len() {
        let rest = &type_text[pos..];
        let Some(c) = rest.chars().next() else { break };
        if (c == '"' || c == '\'')
            && let Some(len) = rest[1..].find(c)
        {
            flush_punctuation(&mut pending, &mut tokens);
            tokens.push(ReviewToken::string_literal(&rest[1..=len]).without_suffix_space());
            pos += len + 2;
            continue;
        }
        if let Some(m) = TYPE_NAME_RE.find(rest)
            && m.start() == 0
        {
            flush_punctuation(&mut pending, &mut tokens);
            let span = m.as_str();
            let is_literal = span.starts_with(|c: char| c.is_ascii_digit())
                || span.chars().all(|c| c == '.');
            let token = if is_literal {
                ReviewToken::literal(span)
            } else {
                let full = span.trim_start_matches('~');
                let mut token = ReviewToken::type_name(short_name(full));
                if let Some(id) = index.and_then(|i| i.get_navigation_id(full)) {
                    token = token.navigate_to(id);
                }
                token
            };
            tokens.push(token.without_suffix_space());
            pos += span.len();
            continue;
        }
        pending.push(c);
        pos += c.len_utf8();
    }
    flush_punctuation(&mut pending, &mut tokens);
    if trailing_space && let Some(last) = tokens.pop() {
        tokens.push(last.with_suffix_space(true));
    }
    tokens
}

fn flush_punctuation(pending: &mut String, tokens: &mut Vec<ReviewToken>) {
    if pending.is_empty() {
        return;
    }
    let trimmed = pending.trim();
    if trimmed.is_empty() {
        if let Some(last) = tokens.pop() {
            tokens.push(last.with_suffix_space(true));
        }
    } else {
        let mut token = ReviewToken::punctuation(trimmed)
            .with_suffix_space(pending.ends_with(char::is_whitespace));
        if pending.starts_with(char::is_whitespace) {
            token = token.with_prefix_space();
        }
        tokens.push(token);
    }
    pending.clear();
}
