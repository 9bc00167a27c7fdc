//! `@dataclass` support: decorator options, fields and the synthesized `__init__`.

use crate::parser::PyNode;
use crate::signature::{Signature, split_top_level};
use crate::syntax::{decorator_matches, is_private};

use super::members::Value;

/// Options every dataclass carries, with their defaults, in declaration order.
const STANDARD_OPTIONS: &[(&str, &str)] = &[
    ("init", "True"),
    ("repr", "True"),
    ("eq", "True"),
    ("order", "False"),
    ("unsafe_hash", "False"),
    ("frozen", "False"),
];

/// Options shown only when given explicitly.
const OPTIONAL_OPTIONS: &[&str] = &["match_args", "kw_only", "slots", "weakref_slot"];

/// Parameters of a `@dataclass(...)` decorator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataclassOptions {
    /// Options in render order, defaults filled in.
    values: Vec<(String, String)>,
}

impl DataclassOptions {
    /// Parse `@dataclass`, `@dataclasses.dataclass` or `@dataclass(...)`.
    ///
    /// Returns `None` for any other decorator.
    #[must_use]
    pub fn from_decorator(decorator: &str) -> Option<Self> {
        if !decorator_matches(&[decorator.to_string()], "dataclass") {
            return None;
        }
        let given = call_keywords(decorator);
        let mut values: Vec<(String, String)> = STANDARD_OPTIONS
            .iter()
            .map(|(name, default)| {
                let value = given
                    .iter()
                    .find(|(k, _)| k == name)
                    .map_or_else(|| (*default).to_string(), |(_, v)| v.clone());
                ((*name).to_string(), value)
            })
            .collect();
        for name in OPTIONAL_OPTIONS {
            if let Some((_, value)) = given.iter().find(|(k, _)| k == name) {
                values.push(((*name).to_string(), value.clone()));
            }
        }
        Some(Self { values })
    }

    fn flag(&self, name: &str) -> bool {
        self.values
            .iter()
            .any(|(k, v)| k == name && v == "True")
    }

    /// Whether an `__init__` is generated.
    #[must_use]
    pub fn init(&self) -> bool {
        self.flag("init")
    }

    #[must_use]
    pub fn kw_only(&self) -> bool {
        self.flag("kw_only")
    }

    /// `@dataclass(init=True, repr=True, ...)`
    #[must_use]
    pub fn render(&self) -> String {
        let args: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("@dataclass({})", args.join(", "))
    }
}

/// One field of a dataclass, as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataclassField {
    pub name: String,
    /// Annotation text as written, not yet normalized.
    pub type_name: String,
    pub value: Option<Value>,
    pub kw_only: bool,
    /// Appears in the generated `__init__`.
    pub init: bool,
    /// `InitVar[...]` pseudo-fields only exist as `__init__` parameters.
    pub is_init_var: bool,
}

impl DataclassField {
    /// Shown as an instance variable of the class.
    pub fn is_displayed(&self) -> bool {
        !self.is_init_var && !is_private(&self.name)
    }
}

/// Fields declared in one class body, in source order.
///
/// `kw_only` is the class-level default from the decorator; a `_: KW_ONLY`
/// sentinel turns it on for the remaining fields.
pub(crate) fn fields_of(body: &[PyNode<'_>], kw_only: bool) -> Vec<DataclassField> {
    let mut kw_only = kw_only;
    let mut fields = Vec::new();
    for stmt in body {
        let Some((name, type_node, value)) = annotated_assignment(stmt) else {
            continue;
        };
        let type_name = type_node.text().trim().to_string();
        if is_class_var(&type_name) {
            continue;
        }
        if type_name.rsplit('.').next() == Some("KW_ONLY") {
            kw_only = true;
            continue;
        }
        let mut field = DataclassField {
            name,
            is_init_var: type_name.split('[').next().is_some_and(|t| t.ends_with("InitVar")),
            type_name,
            value: None,
            kw_only,
            init: true,
        };
        if let Some(value) = value {
            if is_field_call(&value) {
                for (key, arg) in call_keywords(&value.text()) {
                    match (key.as_str(), arg.as_str()) {
                        ("kw_only", flag) => field.kw_only = flag == "True",
                        ("init", flag) => field.init = flag != "False",
                        _ => {}
                    }
                }
                field.value = Some(Value::Raw(value.text().to_string()));
            } else {
                field.value = Some(Value::from_expression(&value));
            }
        }
        fields.push(field);
    }
    fields
}

/// Merge fields of a derived class over those of its bases: a redefined
/// field keeps the position of its first definition.
pub(crate) fn merge_fields(into: &mut Vec<DataclassField>, derived: Vec<DataclassField>) {
    for field in derived {
        match into.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => into.push(field),
        }
    }
}

/// Signature of the generated `__init__`: `self`, then every `init` field,
/// keyword-only ones last. Types are taken as they stand on the fields.
pub(crate) fn init_signature(fields: &[DataclassField]) -> Signature {
    Signature::from_annotations(
        fields
            .iter()
            .filter(|f| f.init)
            .map(|f| (f.name.clone(), Some(f.type_name.clone()), f.kw_only)),
    )
}

/// `NAME[: TYPE] [= VALUE]` with a plain identifier target, as `(name, type, value)`.
pub(crate) fn assignment<'r>(
    stmt: &PyNode<'r>,
) -> Option<(String, Option<PyNode<'r>>, Option<PyNode<'r>>)> {
    if stmt.kind().as_ref() != "expression_statement" {
        return None;
    }
    let assignment = stmt.children().next()?;
    if assignment.kind().as_ref() != "assignment" {
        return None;
    }
    let left = assignment.field("left")?;
    if left.kind().as_ref() != "identifier" {
        return None;
    }
    Some((
        left.text().to_string(),
        assignment.field("type"),
        assignment.field("right"),
    ))
}

/// `NAME: TYPE [= VALUE]` as `(name, type, value)`.
pub(crate) fn annotated_assignment<'r>(
    stmt: &PyNode<'r>,
) -> Option<(String, PyNode<'r>, Option<PyNode<'r>>)> {
    let (name, type_node, value) = assignment(stmt)?;
    Some((name, type_node?, value))
}

pub(crate) fn is_class_var(type_name: &str) -> bool {
    let head = type_name.split('[').next().unwrap_or(type_name).trim();
    head == "ClassVar" || head.ends_with(".ClassVar")
}

fn is_field_call(node: &PyNode<'_>) -> bool {
    node.kind().as_ref() == "call"
        && node.field("function").is_some_and(|f| {
            let name = f.text();
            name.as_ref() == "field" || name.ends_with(".field")
        })
}

/// Keyword arguments of a call written as text, e.g. `f(a=1, b="x")`.
fn call_keywords(call: &str) -> Vec<(String, String)> {
    let Some(open) = call.find('(') else {
        return Vec::new();
    };
    let Some(close) = call.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    split_top_level(&call[open + 1..close])
        .into_iter()
        .filter_map(|arg| {
            let (key, value) = arg.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
