//! Functions and methods.

use apistub_core::{ReviewLine, ReviewLines, ReviewToken};

use super::{BuildContext, EmitContext, SourceSpan, push_decorators};
use crate::docstring::ParsedDocstring;
use crate::linter::FindingOwner;
use crate::parser::PyNode;
use crate::signature::{ArgDefault, Signature, SignatureEntry};
use crate::syntax::{
    decorator_matches, extract_docstring, is_async_def, node_name, unwrap_decorated,
};

const ASYNC_SUFFIX: &str = ":async";
/// Signatures with more entries than this render one parameter per line.
const SINGLE_LINE_MAX_ENTRIES: usize = 2;

/// Where a function is declared.
pub(crate) struct FunctionScope<'s> {
    /// Id of the owning class or module.
    pub parent_id: &'s str,
    /// Name the parent exposes the function under, when it differs from the `def`.
    pub exported_name: Option<&'s str>,
    /// Module the `def` lives in, for resolving its annotations.
    pub module: &'s str,
    pub is_module_level: bool,
    /// Docstring used by `__init__` when it has none of its own.
    pub class_docstring: Option<&'s str>,
}

#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub name: String,
    /// `parent.name`, shown for module-level functions.
    pub qualified_name: String,
    /// Line id: parent id, name, `:async` when asynchronous, `_N` for overloads.
    pub id: String,
    pub decorators: Vec<String>,
    pub signature: Signature,
    pub is_async: bool,
    pub is_class_method: bool,
    pub is_module_level: bool,
    /// Folded into an abstract role of the owning class.
    pub hidden: bool,
    /// An `@overload` declaration rather than the implementation.
    pub is_overload: bool,
    span: SourceSpan,
}

impl FunctionNode {
    /// Build from a `function_definition`, possibly wrapped in decorators.
    pub(crate) fn build(
        stmt: &PyNode<'_>,
        scope: &FunctionScope<'_>,
        ctx: &BuildContext<'_>,
    ) -> Option<Self> {
        let (def, decorators) = unwrap_decorated(stmt)?;
        if def.kind().as_ref() != "function_definition" {
            return None;
        }
        let name = match scope.exported_name {
            Some(exported) => exported.to_string(),
            None => node_name(&def)?,
        };
        let is_async = is_async_def(&def);
        let is_class_method = decorator_matches(&decorators, "classmethod");

        let qualified_name = format!("{}.{name}", scope.parent_id);
        let mut id = qualified_name.clone();
        if is_async {
            id.push_str(ASYNC_SUFFIX);
        }

        let mut signature = Signature::from_function(&def);
        if is_class_method {
            signature.use_cls_receiver();
        }
        let docstring = extract_docstring(&def).or_else(|| {
            (name == "__init__")
                .then(|| scope.class_docstring.map(str::to_string))
                .flatten()
        });
        if let Some(docstring) = docstring {
            signature.merge_docstring(&ParsedDocstring::parse(&docstring));
        }
        signature.sort_keyword_only();
        for type_text in signature.types_mut() {
            *type_text = ctx.normalize_type(scope.module, type_text);
        }

        tracing::debug!(id, "built function");
        Some(Self {
            name,
            qualified_name,
            id,
            decorators,
            signature,
            is_async,
            is_class_method,
            is_module_level: scope.is_module_level,
            hidden: false,
            is_overload: false,
            span: ctx.span(scope.module, stmt),
        })
    }

    /// Synthesized function with no source of its own, e.g. a dataclass `__init__`.
    pub(crate) fn synthesized(
        name: &str,
        parent_id: &str,
        signature: Signature,
        span: SourceSpan,
    ) -> Self {
        let qualified_name = format!("{parent_id}.{name}");
        Self {
            name: name.to_string(),
            id: qualified_name.clone(),
            qualified_name,
            decorators: Vec::new(),
            signature,
            is_async: false,
            is_class_method: false,
            is_module_level: false,
            hidden: false,
            is_overload: false,
            span,
        }
    }

    /// Mark this node as the `n`th overload (1-based) of its implementation.
    pub(crate) fn number_overload(&mut self, n: usize) {
        self.id = format!("{}_{n}", self.id);
        self.is_overload = true;
    }

    pub(crate) fn finding_owner(&self) -> FindingOwner {
        self.span.owner(&self.id)
    }

    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        push_decorators(out, &self.decorators, &self.id);
        cx.attach_findings(&self.id);

        let mut line = cx.declaration(&self.id);
        if self.is_async {
            line.push(ReviewToken::keyword("async"));
        }
        line.push(ReviewToken::keyword("def"));
        let name = if self.is_module_level {
            ReviewToken::member_name(self.qualified_name.as_str())
                .display_name(self.name.as_str())
                .render_class("function")
        } else {
            ReviewToken::member_name(self.name.as_str())
        };
        line.push(name.without_suffix_space());
        line.push(ReviewToken::punctuation("(").without_suffix_space());

        let entries = self.signature.entries();
        if entries.len() > SINGLE_LINE_MAX_ENTRIES {
            for (i, entry) in entries.iter().enumerate() {
                let mut param = ReviewLine::new();
                param.extend(entry_tokens(entry, cx));
                if i + 1 < entries.len() {
                    param.push(ReviewToken::punctuation(","));
                }
                line.children.push(param);
            }
            out.push(line);

            let mut closing = match &self.signature.return_type {
                Some(_) => ReviewLine::with_id(format!("{}.returntype", self.id)),
                None => ReviewLine::new(),
            };
            closing.push(ReviewToken::punctuation(")").without_suffix_space());
            closing.extend(self.return_tokens(cx));
            closing.is_context_end_line = true;
            out.push(closing);
        } else {
            for (i, entry) in entries.iter().enumerate() {
                line.extend(entry_tokens(entry, cx));
                if i + 1 < entries.len() {
                    line.push(ReviewToken::punctuation(","));
                }
            }
            line.push(ReviewToken::punctuation(")").without_suffix_space());
            line.extend(self.return_tokens(cx));
            out.push(line);
        }
        out.push(ReviewLine::blank());
    }

    fn return_tokens(&self, cx: &EmitContext<'_>) -> Vec<ReviewToken> {
        let Some(return_type) = &self.signature.return_type else {
            return Vec::new();
        };
        let mut tokens = vec![ReviewToken::punctuation("->").with_prefix_space()];
        tokens.extend(cx.type_tokens(return_type, false));
        tokens
    }
}

/// `name: TYPE = DEFAULT` for an argument, or a bare `/` / `*` marker.
fn entry_tokens(entry: &SignatureEntry<'_>, cx: &EmitContext<'_>) -> Vec<ReviewToken> {
    match entry {
        SignatureEntry::PositionalOnlyMarker => {
            vec![ReviewToken::punctuation("/").without_suffix_space()]
        }
        SignatureEntry::KeywordOnlyMarker => {
            vec![ReviewToken::punctuation("*").without_suffix_space()]
        }
        SignatureEntry::Arg { prefix, arg } => {
            let mut tokens = vec![
                ReviewToken::text(format!("{prefix}{}", arg.name))
                    .with_suffix_space(arg.arg_type.is_none() && arg.default.is_given()),
            ];
            if let Some(arg_type) = &arg.arg_type {
                tokens.push(ReviewToken::punctuation(":"));
                tokens.extend(cx.type_tokens(arg_type, arg.default.is_given()));
            }
            with_default(tokens, &arg.default)
        }
    }
}

fn with_default(mut tokens: Vec<ReviewToken>, default: &ArgDefault) -> Vec<ReviewToken> {
    let value = match default {
        ArgDefault::NoneGiven => return tokens,
        ArgDefault::Literal(value) => ReviewToken::literal(value.as_str()),
        ArgDefault::Str(value) => ReviewToken::string_literal(value),
    };
    tokens.push(ReviewToken::punctuation("="));
    tokens.push(value.without_suffix_space());
    tokens
}
