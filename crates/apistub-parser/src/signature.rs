//! Uniform signature model built from a `function_definition` node or from a
//! list of annotated fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::docstring::ParsedDocstring;
use crate::parser::PyNode;
use crate::syntax::plain_string_value;

static FUNC_TYPE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*type:\s*\((.*)\)\s*->\s*(.+?)\s*$").expect("static regex")
});

/// Default value of a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ArgDefault {
    /// No default; the parameter is required.
    #[default]
    NoneGiven,
    /// Rendered verbatim: numbers, `None`, `...`, names, expressions.
    Literal(String),
    /// Rendered as a double-quoted string literal.
    Str(String),
}

impl ArgDefault {
    #[must_use]
    pub fn ellipsis() -> Self {
        Self::Literal("...".into())
    }

    /// Classify untyped default text: `None` and `...` stay bare, anything else is a string.
    #[must_use]
    pub fn from_text(raw: &str) -> Self {
        match raw {
            "None" | "..." => Self::Literal(raw.to_string()),
            _ => Self::Str(raw.to_string()),
        }
    }

    #[must_use]
    pub const fn is_given(&self) -> bool {
        !matches!(self, Self::NoneGiven)
    }

    fn from_node(node: &PyNode<'_>) -> Self {
        let text = node.text();
        if node.kind().as_ref() == "string"
            && let Some(value) = plain_string_value(&text)
        {
            return Self::Str(value);
        }
        Self::Literal(text.to_string())
    }
}

/// One parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgType {
    pub name: String,
    pub arg_type: Option<String>,
    pub default: ArgDefault,
}

impl ArgType {
    #[must_use]
    pub fn new(name: impl Into<String>, arg_type: Option<String>, default: ArgDefault) -> Self {
        Self {
            name: name.into(),
            arg_type,
            default,
        }
    }

    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, None, ArgDefault::NoneGiven)
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        !self.default.is_given()
    }

    /// Fill a missing type or default from `other`.
    fn fill_from(&mut self, other: &Self) {
        if self.arg_type.is_none() {
            self.arg_type.clone_from(&other.arg_type);
        }
        if !self.default.is_given() {
            self.default = other.default.clone();
        }
    }
}

/// One rendered slot of a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEntry<'a> {
    Arg {
        prefix: &'static str,
        arg: &'a ArgType,
    },
    /// `/` after positional-only parameters.
    PositionalOnlyMarker,
    /// Bare `*` before keyword-only parameters.
    KeywordOnlyMarker,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub positional_only: Vec<ArgType>,
    pub positional: Vec<ArgType>,
    pub var_positional: Option<ArgType>,
    pub keyword_only: Vec<ArgType>,
    pub var_keyword: Option<ArgType>,
    pub return_type: Option<String>,
}

impl Signature {
    /// Build from a `function_definition` node. Annotations win over type comments.
    #[must_use]
    pub fn from_function(node: &PyNode<'_>) -> Self {
        let mut signature = Self {
            return_type: node.field("return_type").map(|t| t.text().trim().to_string()),
            ..Self::default()
        };
        if let Some(params) = node.field("parameters") {
            signature.read_parameters(&params);
        }
        if let Some(comment) = function_type_comment(node) {
            signature.apply_type_comment(&comment);
        }
        signature
    }

    /// Build from annotated fields: `self`, the positional fields, then keyword-only ones.
    ///
    /// No defaults and no return type are recorded.
    #[must_use]
    pub fn from_annotations(
        fields: impl IntoIterator<Item = (String, Option<String>, bool)>,
    ) -> Self {
        let mut signature = Self {
            positional: vec![ArgType::untyped("self")],
            ..Self::default()
        };
        for (name, arg_type, kw_only) in fields {
            let arg = ArgType::new(name, arg_type, ArgDefault::NoneGiven);
            if kw_only {
                signature.keyword_only.push(arg);
            } else {
                signature.positional.push(arg);
            }
        }
        signature
    }

    fn read_parameters(&mut self, params: &PyNode<'_>) {
        let mut after_star = false;
        let mut last: Option<(Slot, usize)> = None;
        for child in params.children() {
            match child.kind().as_ref() {
                "identifier" => {
                    last = Some(self.push(after_star, ArgType::untyped(child.text().to_string())));
                }
                "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                    let arg_type = child.field("type").map(|t| t.text().trim().to_string());
                    let default = child
                        .field("value")
                        .map_or(ArgDefault::NoneGiven, |v| ArgDefault::from_node(&v));
                    let default = match default {
                        ArgDefault::Literal(ref text) if after_star && text == "None" => {
                            ArgDefault::ellipsis()
                        }
                        other => other,
                    };
                    let target = child
                        .field("name")
                        .or_else(|| child.children().find(|c| c.is_named()));
                    let Some(target) = target else { continue };
                    last = match target.kind().as_ref() {
                        "list_splat_pattern" => {
                            after_star = true;
                            self.var_positional =
                                Some(ArgType::new(splat_name(&target), arg_type, default));
                            Some((Slot::VarPositional, 0))
                        }
                        "dictionary_splat_pattern" => {
                            self.var_keyword =
                                Some(ArgType::new(splat_name(&target), arg_type, default));
                            Some((Slot::VarKeyword, 0))
                        }
                        _ => Some(self.push(
                            after_star,
                            ArgType::new(target.text().to_string(), arg_type, default),
                        )),
                    };
                }
                "list_splat_pattern" => {
                    after_star = true;
                    self.var_positional = Some(ArgType::untyped(splat_name(&child)));
                    last = Some((Slot::VarPositional, 0));
                }
                "dictionary_splat_pattern" => {
                    self.var_keyword = Some(ArgType::untyped(splat_name(&child)));
                    last = Some((Slot::VarKeyword, 0));
                }
                "keyword_separator" => after_star = true,
                "positional_separator" => {
                    self.positional_only.append(&mut self.positional);
                    last = None;
                }
                "comment" => {
                    if let (Some(slot), Some(type_text)) = (last, arg_type_comment(&child.text()))
                        && let Some(arg) = self.slot_mut(slot)
                        && arg.arg_type.is_none()
                    {
                        arg.arg_type = Some(type_text);
                    }
                }
                _ => {}
            }
        }
    }

    fn push(&mut self, after_star: bool, arg: ArgType) -> (Slot, usize) {
        if after_star {
            self.keyword_only.push(arg);
            (Slot::KeywordOnly, self.keyword_only.len() - 1)
        } else {
            self.positional.push(arg);
            (Slot::Positional, self.positional.len() - 1)
        }
    }

    fn slot_mut(&mut self, (slot, index): (Slot, usize)) -> Option<&mut ArgType> {
        match slot {
            Slot::Positional => self.positional.get_mut(index),
            Slot::KeywordOnly => self.keyword_only.get_mut(index),
            Slot::VarPositional => self.var_positional.as_mut(),
            Slot::VarKeyword => self.var_keyword.as_mut(),
        }
    }

    /// Apply a `# type: (A, B) -> R` comment to parameters lacking annotations.
    fn apply_type_comment(&mut self, comment: &FunctionTypeComment) {
        if self.return_type.is_none() {
            self.return_type = Some(comment.return_type.clone());
        }
        if comment.arg_types.is_empty() {
            return;
        }
        let skip_receiver = usize::from(
            self.first_arg()
                .is_some_and(|a| a.name == "self" || a.name == "cls")
                && comment.arg_types.len() < self.arg_count(),
        );
        let mut types = comment.arg_types.iter();
        let args = self
            .positional_only
            .iter_mut()
            .chain(self.positional.iter_mut())
            .chain(self.var_positional.iter_mut())
            .chain(self.keyword_only.iter_mut())
            .chain(self.var_keyword.iter_mut())
            .skip(skip_receiver);
        for arg in args {
            let Some(type_text) = types.next() else { break };
            if arg.arg_type.is_none() {
                arg.arg_type = Some(type_text.trim_start_matches('*').to_string());
            }
        }
    }

    fn first_arg(&self) -> Option<&ArgType> {
        self.positional_only.first().or_else(|| self.positional.first())
    }

    fn arg_count(&self) -> usize {
        self.positional_only.len()
            + self.positional.len()
            + self.keyword_only.len()
            + usize::from(self.var_positional.is_some())
            + usize::from(self.var_keyword.is_some())
    }

    /// Replace the receiver of a classmethod with an untyped `cls`.
    pub fn use_cls_receiver(&mut self) {
        let group = if self.positional_only.is_empty() {
            &mut self.positional
        } else {
            &mut self.positional_only
        };
        if !group.is_empty() {
            group.remove(0);
        }
        group.insert(0, ArgType::untyped("cls"));
    }

    /// Fill missing types and defaults from a docstring and append docstring-only keywords.
    pub fn merge_docstring(&mut self, doc: &ParsedDocstring) {
        if self.return_type.is_none() {
            self.return_type.clone_from(&doc.ret_type);
        }
        for arg in self
            .positional_only
            .iter_mut()
            .chain(self.positional.iter_mut())
        {
            if let Some(found) = doc.pos_args.get(&arg.name) {
                arg.fill_from(found);
            }
        }
        for arg in &mut self.keyword_only {
            let found = doc
                .kw_args
                .get(&arg.name)
                .or_else(|| doc.pos_args.get(&arg.name));
            match found {
                Some(found) if arg.is_required() => {
                    if arg.arg_type.is_none() {
                        arg.arg_type.clone_from(&found.arg_type);
                    }
                }
                Some(found) => arg.fill_from(found),
                None => {}
            }
        }
        for (name, kwarg) in &doc.kw_args {
            if !self.has_arg(name) {
                self.keyword_only.push(kwarg.clone());
            }
        }
    }

    fn has_arg(&self, name: &str) -> bool {
        self.positional_only
            .iter()
            .chain(&self.positional)
            .chain(&self.keyword_only)
            .chain(self.var_positional.iter())
            .chain(self.var_keyword.iter())
            .any(|arg| arg.name == name)
    }

    pub fn sort_keyword_only(&mut self) {
        self.keyword_only.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Every type string in the signature, for normalization passes.
    pub fn types_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.positional_only
            .iter_mut()
            .chain(self.positional.iter_mut())
            .chain(self.var_positional.iter_mut())
            .chain(self.keyword_only.iter_mut())
            .chain(self.var_keyword.iter_mut())
            .filter_map(|arg| arg.arg_type.as_mut())
            .chain(self.return_type.iter_mut())
    }

    /// Parameter slots in render order, including `/` and `*` markers.
    #[must_use]
    pub fn entries(&self) -> Vec<SignatureEntry<'_>> {
        let mut entries: Vec<SignatureEntry<'_>> = self
            .positional_only
            .iter()
            .map(|arg| SignatureEntry::Arg { prefix: "", arg })
            .collect();
        if !self.positional_only.is_empty() {
            entries.push(SignatureEntry::PositionalOnlyMarker);
        }
        entries.extend(
            self.positional
                .iter()
                .map(|arg| SignatureEntry::Arg { prefix: "", arg }),
        );
        if let Some(arg) = &self.var_positional {
            entries.push(SignatureEntry::Arg { prefix: "*", arg });
        } else if !self.keyword_only.is_empty() {
            entries.push(SignatureEntry::KeywordOnlyMarker);
        }
        entries.extend(
            self.keyword_only
                .iter()
                .map(|arg| SignatureEntry::Arg { prefix: "", arg }),
        );
        if let Some(arg) = &self.var_keyword {
            entries.push(SignatureEntry::Arg { prefix: "**", arg });
        }
        entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Positional,
    KeywordOnly,
    VarPositional,
    VarKeyword,
}

fn splat_name(node: &PyNode<'_>) -> String {
    node.children()
        .find(|c| c.kind().as_ref() == "identifier")
        .map_or_else(
            || node.text().trim_start_matches('*').to_string(),
            |ident| ident.text().to_string(),
        )
}

/// `# type: int` -> `int`; function-level comments are not argument comments.
fn arg_type_comment(text: &str) -> Option<String> {
    let rest = text.trim_start_matches('#').trim_start();
    let type_text = rest.strip_prefix("type:")?.trim();
    if type_text.is_empty() || type_text.starts_with('(') || type_text.starts_with("ignore") {
        return None;
    }
    Some(type_text.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FunctionTypeComment {
    arg_types: Vec<String>,
    return_type: String,
}

fn function_type_comment(node: &PyNode<'_>) -> Option<FunctionTypeComment> {
    let in_def = node.children().filter(|c| c.kind().as_ref() == "comment");
    let in_body = node
        .field("body")
        .into_iter()
        .flat_map(|body| body.children().take_while(|c| c.kind().as_ref() == "comment").collect::<Vec<_>>());
    in_def
        .chain(in_body)
        .find_map(|comment| parse_function_type_comment(&comment.text()))
}

fn parse_function_type_comment(text: &str) -> Option<FunctionTypeComment> {
    let caps = FUNC_TYPE_COMMENT_RE.captures(text.trim())?;
    let args = caps.get(1)?.as_str().trim();
    let arg_types = if args.is_empty() || args == "..." {
        Vec::new()
    } else {
        split_top_level(args)
    };
    Some(FunctionTypeComment {
        arg_types,
        return_type: caps.get(2)?.as_str().to_string(),
    })
}

/// Split on commas that are not nested inside brackets.
#[must_use]
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}
