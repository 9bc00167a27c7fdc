//! Class members that are not functions: properties, variables, typed-dict
//! keys and enum values.

use apistub_core::{ReviewLines, ReviewToken};

use super::EmitContext;
use crate::parser::PyNode;
use crate::syntax::plain_string_value;

const READ_ONLY_GAP: &str = "    ";

/// A rendered value: string literals get quotes, everything else is verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Raw(String),
}

impl Value {
    /// Any expression; plain strings become [`Value::Str`].
    #[must_use]
    pub fn from_expression(node: &PyNode<'_>) -> Self {
        let text = node.text();
        if node.kind().as_ref() == "string"
            && let Some(value) = plain_string_value(&text)
        {
            return Self::Str(value);
        }
        Self::Raw(text.to_string())
    }

    /// Only literal strings, numbers, booleans, lists and dicts.
    #[must_use]
    pub fn from_literal(node: &PyNode<'_>) -> Option<Self> {
        match node.kind().as_ref() {
            "string" | "concatenated_string" | "integer" | "float" | "true" | "false"
            | "list" | "dictionary" => Some(Self::from_expression(node)),
            "unary_operator" => node
                .field("argument")
                .filter(|arg| matches!(arg.kind().as_ref(), "integer" | "float"))
                .map(|_| Self::Raw(node.text().to_string())),
            _ => None,
        }
    }

    fn token(&self) -> ReviewToken {
        match self {
            Self::Str(value) => ReviewToken::string_literal(value),
            Self::Raw(value) => ReviewToken::literal(value.as_str()),
        }
        .without_suffix_space()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNode {
    pub name: String,
    pub id: String,
    pub type_name: Option<String>,
    pub read_only: bool,
}

impl PropertyNode {
    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        let mut line = cx.declaration(&self.id);
        line.push(ReviewToken::keyword("property"));
        line.push(
            ReviewToken::member_name(self.name.as_str())
                .with_suffix_space(self.type_name.is_some() || self.read_only),
        );
        if let Some(type_name) = &self.type_name {
            line.push(ReviewToken::punctuation(":"));
            line.extend(cx.type_tokens(type_name, false));
        }
        if self.read_only {
            line.push(ReviewToken::text(READ_ONLY_GAP).without_suffix_space());
            line.push(ReviewToken::comment("# Read-only").without_suffix_space());
        }
        out.push(line);
    }
}

/// `ivar` (instance) or `cvar` (class) variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNode {
    pub name: String,
    pub id: String,
    pub type_name: Option<String>,
    pub value: Option<Value>,
    pub is_ivar: bool,
}

impl VariableNode {
    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        let mut line = cx.declaration(&self.id);
        line.push(ReviewToken::keyword(if self.is_ivar { "ivar" } else { "cvar" }));
        line.push(
            ReviewToken::member_name(self.name.as_str())
                .with_suffix_space(self.type_name.is_none() && self.value.is_some()),
        );
        if let Some(type_name) = &self.type_name {
            line.push(ReviewToken::punctuation(":"));
            line.extend(cx.type_tokens(type_name, self.value.is_some()));
        }
        if let Some(value) = &self.value {
            line.push(ReviewToken::punctuation("="));
            line.push(value.token());
        }
        out.push(line);
    }
}

/// One key of a typed dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNode {
    pub name: String,
    pub id: String,
    pub type_name: String,
}

impl KeyNode {
    pub fn new(class_id: &str, name: &str, type_name: String) -> Self {
        Self {
            name: name.to_string(),
            id: format!("{class_id}.\"{name}\""),
            type_name,
        }
    }

    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        let mut line = cx.declaration(&self.id);
        line.push(ReviewToken::keyword("key"));
        line.push(ReviewToken::string_literal(&self.name));
        line.push(ReviewToken::punctuation(":"));
        line.extend(cx.type_tokens(&self.type_name, false));
        out.push(line);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueNode {
    pub name: String,
    pub id: String,
    pub value: Value,
}

impl EnumValueNode {
    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        let mut line = cx.declaration(&self.id);
        line.push(ReviewToken::member_name(self.name.as_str()));
        line.push(ReviewToken::punctuation("="));
        line.push(self.value.token());
        out.push(line);
    }
}
