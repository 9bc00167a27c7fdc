//! Sphinx-style docstring parsing: `:param`, `:keyword`, `:ivar`, their type tags and `:rtype:`.
//!
//! Only the pieces used to complete signatures are extracted. Anything that
//! does not match a known tag is ignored.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::signature::{ArgDefault, ArgType};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:(\w+)(?:\s+([^:]+))?:\s*(.*)$").expect("static regex")
});

static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[Dd]efault value is|,\s*defaults to)\s+(.+?)(?:\.\s|\.?$)")
        .expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Positional,
    Keyword,
    InstanceVar,
}

impl Bucket {
    fn of_tag(tag: &str) -> Option<Self> {
        match tag {
            "param" | "parameter" | "arg" | "argument" => Some(Self::Positional),
            "keyword" | "kwarg" | "kwparam" => Some(Self::Keyword),
            "ivar" | "var" => Some(Self::InstanceVar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeTag {
    Param,
    Var,
    Return,
}

impl TypeTag {
    fn of_tag(tag: &str) -> Option<Self> {
        match tag {
            "type" | "paramtype" => Some(Self::Param),
            "vartype" => Some(Self::Var),
            "rtype" | "returntype" => Some(Self::Return),
            _ => None,
        }
    }
}

/// Raw entry collected for one documented name.
#[derive(Debug, Clone, Default)]
struct Entry {
    arg_type: Option<String>,
    description: String,
}

/// Result of parsing one docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocstring {
    pub pos_args: BTreeMap<String, ArgType>,
    pub kw_args: BTreeMap<String, ArgType>,
    /// Instance variables documented with `:ivar:` / `:vartype:`.
    pub ivars: BTreeMap<String, Option<String>>,
    pub ret_type: Option<String>,
    /// Type from a name-less `:type:` / `:vartype:` tag, as used by properties.
    pub bare_type: Option<String>,
}

impl ParsedDocstring {
    #[must_use]
    pub fn parse(docstring: &str) -> Self {
        DocstringParser::new(docstring).run()
    }

    /// Type documented for a positional or keyword argument.
    #[must_use]
    pub fn type_for(&self, name: &str) -> Option<&str> {
        self.pos_args
            .get(name)
            .or_else(|| self.kw_args.get(name))
            .and_then(|arg| arg.arg_type.as_deref())
    }

    /// Default documented for an argument, cast according to its type.
    #[must_use]
    pub fn default_for(&self, name: &str) -> ArgDefault {
        self.pos_args
            .get(name)
            .or_else(|| self.kw_args.get(name))
            .map_or(ArgDefault::NoneGiven, |arg| arg.default.clone())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos_args.is_empty()
            && self.kw_args.is_empty()
            && self.ivars.is_empty()
            && self.ret_type.is_none()
            && self.bare_type.is_none()
    }
}

struct DocstringParser<'a> {
    lines: Vec<&'a str>,
    positional: BTreeMap<String, Entry>,
    keyword: BTreeMap<String, Entry>,
    ivars: BTreeMap<String, Entry>,
    param_types: Vec<(String, String)>,
    ret_type: Option<String>,
    bare_type: Option<String>,
}

impl<'a> DocstringParser<'a> {
    fn new(docstring: &'a str) -> Self {
        Self {
            lines: docstring.lines().map(str::trim).collect(),
            positional: BTreeMap::new(),
            keyword: BTreeMap::new(),
            ivars: BTreeMap::new(),
            param_types: Vec::new(),
            ret_type: None,
            bare_type: None,
        }
    }

    fn run(mut self) -> ParsedDocstring {
        let mut index = 0;
        while index < self.lines.len() {
            let line = self.lines[index];
            index += 1;
            let Some(caps) = TAG_RE.captures(line) else {
                continue;
            };
            let tag = caps.get(1).map_or("", |m| m.as_str());
            let names = caps.get(2).map_or("", |m| m.as_str().trim());
            let value = caps.get(3).map_or("", |m| m.as_str().trim());

            if let Some(bucket) = Bucket::of_tag(tag) {
                let (description, consumed) = self.description_from(index, value);
                index += consumed;
                self.record_entry(bucket, names, description);
            } else if let Some(type_tag) = TypeTag::of_tag(tag) {
                let (type_text, consumed) = self.type_from(index, value);
                index += consumed;
                self.record_type(type_tag, names, type_text);
            }
        }
        self.finish()
    }

    /// Free text of a tag, joined with any continuation lines until the next tag or blank.
    fn description_from(&self, start: usize, first: &str) -> (String, usize) {
        let mut description = first.to_string();
        let mut consumed = 0;
        for line in &self.lines[start..] {
            if line.is_empty() || is_tag_line(line) {
                break;
            }
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(line);
            consumed += 1;
        }
        (description, consumed)
    }

    /// Type text of a type tag, following wrapped `,` / ` or` continuations.
    fn type_from(&self, start: usize, first: &str) -> (String, usize) {
        let mut type_text = first.to_string();
        let mut consumed = 0;
        let mut next = start;
        if type_text.is_empty()
            && let Some(line) = self.lines.get(next)
            && !is_tag_line(line)
        {
            type_text = (*line).to_string();
            consumed += 1;
            next += 1;
        }
        while type_text.ends_with(',') || type_text.ends_with(" or") {
            let Some(line) = self.lines.get(next) else {
                break;
            };
            if line.is_empty() || is_tag_line(line) {
                break;
            }
            type_text.push(' ');
            type_text.push_str(line);
            consumed += 1;
            next += 1;
        }
        (strip_quotes(&type_text), consumed)
    }

    fn record_entry(&mut self, bucket: Bucket, names: &str, description: String) {
        let Some((arg_type, name)) = split_type_and_name(names) else {
            tracing::debug!(names, "docstring tag without a name");
            return;
        };
        let target = match bucket {
            Bucket::Positional => &mut self.positional,
            Bucket::Keyword => &mut self.keyword,
            Bucket::InstanceVar => &mut self.ivars,
        };
        let entry = target.entry(name).or_default();
        if arg_type.is_some() {
            entry.arg_type = arg_type;
        }
        entry.description = description;
    }

    fn record_type(&mut self, tag: TypeTag, names: &str, type_text: String) {
        if type_text.is_empty() {
            tracing::debug!(names, "docstring type tag without a type");
            return;
        }
        match tag {
            TypeTag::Return => self.ret_type = Some(type_text),
            TypeTag::Var | TypeTag::Param if names.is_empty() => {
                self.bare_type.get_or_insert(type_text);
            }
            TypeTag::Var => {
                self.ivars.entry(names.to_string()).or_default().arg_type = Some(type_text);
            }
            TypeTag::Param => self.param_types.push((names.to_string(), type_text)),
        }
    }

    fn finish(mut self) -> ParsedDocstring {
        // `:type x:` may appear before or after `:param x:`.
        for (name, type_text) in std::mem::take(&mut self.param_types) {
            if let Some(entry) = self.keyword.get_mut(&name) {
                entry.arg_type = Some(type_text);
            } else {
                self.positional.entry(name).or_default().arg_type = Some(type_text);
            }
        }

        let pos_args = self
            .positional
            .into_iter()
            .map(|(name, entry)| {
                let default = parse_default(&entry.description)
                    .map_or(ArgDefault::NoneGiven, |raw| {
                        cast_default(entry.arg_type.as_deref(), &raw)
                    });
                let arg = ArgType::new(name.clone(), entry.arg_type, default);
                (name, arg)
            })
            .collect();

        let kw_args = self
            .keyword
            .into_iter()
            .map(|(name, entry)| {
                let arg_type = entry.arg_type.map(|t| {
                    if t.starts_with("Optional[") {
                        t
                    } else {
                        format!("Optional[{t}]")
                    }
                });
                let arg = ArgType::new(name.clone(), arg_type, ArgDefault::ellipsis());
                (name, arg)
            })
            .collect();

        let ivars = self
            .ivars
            .into_iter()
            .map(|(name, entry)| (name, entry.arg_type))
            .collect();

        ParsedDocstring {
            pos_args,
            kw_args,
            ivars,
            ret_type: self.ret_type,
            bare_type: self.bare_type,
        }
    }
}

/// A field-list tag line; cross-reference roles such as `:class:` do not count.
fn is_tag_line(line: &str) -> bool {
    TAG_RE.captures(line).is_some_and(|caps| {
        !matches!(
            caps.get(1).map_or("", |m| m.as_str()),
            "class" | "py" | "obj" | "data" | "func" | "meth" | "attr" | "exc" | "mod" | "any"
        )
    })
}

/// `str name` -> `(Some("str"), "name")`, `Dict[str, int] opts` -> `(Some("Dict[str, int]"), "opts")`.
fn split_type_and_name(names: &str) -> Option<(Option<String>, String)> {
    let (head, name) = match names.rsplit_once(char::is_whitespace) {
        Some((head, name)) => (Some(head.trim()), name.trim()),
        None => (None, names.trim()),
    };
    if name.is_empty() {
        return None;
    }
    let arg_type = head
        .filter(|h| !h.is_empty())
        .map(strip_quotes);
    Some((arg_type, name.to_string()))
}

fn strip_quotes(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Default value phrase in a description, if any.
fn parse_default(description: &str) -> Option<String> {
    let caps = DEFAULT_RE.captures(description)?;
    let raw = caps.get(1)?.as_str().trim();
    let raw = raw.strip_suffix('.').unwrap_or(raw);
    let raw = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(raw);
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Cast a documented default according to the documented type.
///
/// Numeric and boolean types yield a bare literal when the text parses, otherwise
/// the raw string is kept.
#[must_use]
pub fn cast_default(arg_type: Option<&str>, raw: &str) -> ArgDefault {
    let Some(arg_type) = arg_type else {
        return ArgDefault::from_text(raw);
    };
    let optional = arg_type.starts_with("Optional[");
    if optional && raw == "None" {
        return ArgDefault::Literal("None".into());
    }
    let base = arg_type
        .strip_prefix("Optional[")
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(arg_type)
        .trim();
    let casts = match base {
        "bool" => matches!(raw, "True" | "False"),
        "int" => raw.parse::<i64>().is_ok(),
        "float" => raw.parse::<f64>().is_ok(),
        "complex" => is_complex_literal(raw),
        _ => return ArgDefault::from_text(raw),
    };
    if casts {
        ArgDefault::Literal(raw.to_string())
    } else {
        ArgDefault::Str(raw.to_string())
    }
}

fn is_complex_literal(raw: &str) -> bool {
    let body = raw
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim_end_matches(['j', 'J']);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn param_with_inline_type() {
        let doc = ParsedDocstring::parse(":param str name: The name.\n:rtype: int");
        assert_eq!(doc.type_for("name"), Some("str"));
        assert_eq!(doc.ret_type.as_deref(), Some("int"));
        assert_eq!(doc.default_for("name"), ArgDefault::NoneGiven);
    }

    #[test]
    fn separate_type_tag_applies_to_param() {
        let doc = ParsedDocstring::parse(
            ":type age: int\n:param age: Age in years. Default value is 21.",
        );
        assert_eq!(doc.type_for("age"), Some("int"));
        assert_eq!(doc.default_for("age"), ArgDefault::Literal("21".into()));
    }

    #[test]
    fn wrapped_type_continues_on_next_line() {
        let doc = ParsedDocstring::parse(
            ":param value: The value.\n:type value: str or\n    ~pkg.models.Thing\n:rtype:\n    list[str]",
        );
        assert_eq!(doc.type_for("value"), Some("str or ~pkg.models.Thing"));
        assert_eq!(doc.ret_type.as_deref(), Some("list[str]"));
    }

    #[test]
    fn keyword_args_are_optional_with_ellipsis() {
        let doc = ParsedDocstring::parse(
            ":keyword str etag: Entity tag.\n:keyword Optional[int] timeout: Seconds.\n:paramtype etag: str",
        );
        let etag = &doc.kw_args["etag"];
        assert_eq!(etag.arg_type.as_deref(), Some("Optional[str]"));
        assert_eq!(etag.default, ArgDefault::Literal("...".into()));
        assert_eq!(doc.kw_args["timeout"].arg_type.as_deref(), Some("Optional[int]"));
        assert!(doc.pos_args.is_empty());
    }

    #[test]
    fn ivars_collect_types() {
        let doc = ParsedDocstring::parse(
            "A model.\n\n:ivar str name: Name.\n:ivar count: Count.\n:vartype count: int",
        );
        assert_eq!(doc.ivars["name"].as_deref(), Some("str"));
        assert_eq!(doc.ivars["count"].as_deref(), Some("int"));
    }

    #[test]
    fn quotes_are_stripped_from_types() {
        let doc = ParsedDocstring::parse(":param `pkg.Model` model: A model.");
        assert_eq!(doc.type_for("model"), Some("pkg.Model"));
    }

    #[test]
    fn defaults_to_phrase_on_continuation_line() {
        let doc = ParsedDocstring::parse(
            ":param str mode: The mode to use,\n    defaults to \"fast\".\n:param bool flag: Flag.",
        );
        assert_eq!(doc.default_for("mode"), ArgDefault::Str("fast".into()));
        assert_eq!(doc.default_for("flag"), ArgDefault::NoneGiven);
    }

    #[test]
    fn nameless_type_tag_is_kept_for_properties() {
        let doc = ParsedDocstring::parse("The endpoint.\n\n:type: str\n");
        assert_eq!(doc.bare_type.as_deref(), Some("str"));
        assert!(doc.pos_args.is_empty());
    }

    #[test]
    fn malformed_tags_are_tolerated() {
        let doc = ParsedDocstring::parse(":param: nothing\n:type:\n:rtype: bool");
        assert!(doc.pos_args.is_empty());
        assert_eq!(doc.ret_type.as_deref(), Some("bool"));
    }

    #[rstest]
    #[case(Some("bool"), "True", ArgDefault::Literal("True".into()))]
    #[case(Some("Optional[int]"), "5", ArgDefault::Literal("5".into()))]
    #[case(Some("int"), "five", ArgDefault::Str("five".into()))]
    #[case(Some("float"), "0.5", ArgDefault::Literal("0.5".into()))]
    #[case(Some("complex"), "1+2j", ArgDefault::Literal("1+2j".into()))]
    #[case(Some("Optional[str]"), "None", ArgDefault::Literal("None".into()))]
    #[case(Some("str"), "abc", ArgDefault::Str("abc".into()))]
    #[case(None, "...", ArgDefault::Literal("...".into()))]
    fn default_casting(
        #[case] arg_type: Option<&str>,
        #[case] raw: &str,
        #[case] expected: ArgDefault,
    ) {
        assert_eq!(cast_default(arg_type, raw), expected);
    }
}
