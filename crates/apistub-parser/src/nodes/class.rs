//! Classes: bases, members collected across package base classes, abstract
//! roles, and the class block.

use std::collections::{BTreeMap, HashSet};

use apistub_core::{ReviewLines, ReviewToken};

use super::dataclass::{self, DataclassField, DataclassOptions, annotated_assignment, is_class_var};
use super::function::{FunctionNode, FunctionScope};
use super::members::{EnumValueNode, KeyNode, PropertyNode, Value, VariableNode};
use super::{BuildContext, EmitContext, HANDWRITTEN_RENDER_CLASS, SourceSpan, push_decorators};
use crate::ParserError;
use crate::docstring::ParsedDocstring;
use crate::linter::FindingOwner;
use crate::node_index::{EntryKind, IndexEntry, NodeIndex};
use crate::package::{DefSite, Target, top_level_statements};
use crate::parser::PyNode;
use crate::syntax::{
    decorator_matches, decorator_matches_any, extract_docstring, is_async_def, is_dunder,
    is_private, node_name, unwrap_decorated,
};

/// Roles a class implements when it defines every listed method. The
/// methods of an implemented role are not rendered individually.
const ABSTRACT_ROLES: &[(&str, &[&str])] = &[
    ("ContextManager", &["__enter__", "__exit__"]),
    ("AsyncContextManager", &["__aenter__", "__aexit__"]),
    ("Iterator", &["__next__", "__iter__"]),
    ("Collection", &["__contains__", "__iter__", "__len__"]),
    (
        "Mapping",
        &[
            "__getitem__",
            "__len__",
            "__eq__",
            "__ne__",
            "__contains__",
            "__iter__",
            "keys",
            "items",
            "values",
            "get",
        ],
    ),
    ("AsyncIterable", &["__anext__", "__aiter__"]),
    ("AsyncIterator", &["__anext__", "__aiter__"]),
    ("Awaitable", &["__await__"]),
];

const ENUM_BASES: &[&str] = &["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];
const TYPED_DICT_BASE: &str = "TypedDict";
const PROPERTY_DECORATORS: &[&str] = &["property", "cached_property"];
/// Methods from these modules are serialization plumbing.
const SKIPPED_MODULE_SUFFIX: &str = "_model_base";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Enum,
    TypedDict,
}

impl ClassKind {
    /// Classify by the external classes somewhere in the inheritance chain.
    fn from_external_bases(external: &[String]) -> Self {
        let short = |path: &String| path.rsplit('.').next().unwrap_or(path).to_string();
        if external.iter().any(|p| ENUM_BASES.contains(&short(p).as_str())) {
            Self::Enum
        } else if external.iter().any(|p| short(p) == TYPED_DICT_BASE) {
            Self::TypedDict
        } else {
            Self::Class
        }
    }
}

/// One child of a class block.
#[derive(Debug, Clone)]
pub enum ClassMember {
    Key(KeyNode),
    Property(PropertyNode),
    Variable(VariableNode),
    EnumValue(EnumValueNode),
    Class(Box<ClassNode>),
    Function(FunctionNode),
}

impl ClassMember {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Key(n) => &n.name,
            Self::Property(n) => &n.name,
            Self::Variable(n) => &n.name,
            Self::EnumValue(n) => &n.name,
            Self::Class(n) => &n.name,
            Self::Function(n) => &n.name,
        }
    }

    /// Position of the member's group in the class block.
    fn rank(&self) -> u8 {
        match self {
            Self::Key(_) => 0,
            Self::Property(_) => 1,
            Self::Variable(_) => 2,
            Self::EnumValue(_) => 3,
            Self::Class(_) => 4,
            Self::Function(f) if f.name.starts_with("__") => 5,
            Self::Function(f) if f.is_class_method => 6,
            Self::Function(_) => 7,
        }
    }

    pub(crate) fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        match self {
            Self::Key(n) => n.emit(out, cx),
            Self::Property(n) => n.emit(out, cx),
            Self::Variable(n) => n.emit(out, cx),
            Self::EnumValue(n) => n.emit(out, cx),
            Self::Class(n) => n.emit(out, cx),
            Self::Function(n) => n.emit(out, cx),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassNode {
    pub name: String,
    /// Parent id plus name, e.g. `pkg.Client` or `pkg.Client.Options`.
    pub id: String,
    /// Where the class is defined.
    pub site: DefSite,
    pub kind: ClassKind,
    /// Normalized base class types, `object` excluded.
    pub bases: Vec<String>,
    pub decorators: Vec<String>,
    pub implements: Vec<String>,
    pub members: Vec<ClassMember>,
    pub dataclass: Option<DataclassOptions>,
    pub is_handwritten: bool,
    span: SourceSpan,
}

/// A class statement located in the sources.
struct ClassSource<'a> {
    site: DefSite,
    stmt: PyNode<'a>,
    def: PyNode<'a>,
    decorators: Vec<String>,
}

impl<'a> ClassSource<'a> {
    fn load(ctx: &BuildContext<'a>, site: &DefSite) -> Option<Self> {
        let stmt = ctx.sources.class_node(site)?;
        let (def, decorators) = unwrap_decorated(&stmt)?;
        Some(Self {
            site: site.clone(),
            stmt,
            def,
            decorators,
        })
    }

    fn module(&self) -> &str {
        &self.site.module
    }

    fn body(&self) -> Vec<PyNode<'a>> {
        self.def
            .field("body")
            .map(|body| top_level_statements(&body))
            .unwrap_or_default()
    }

    fn dataclass(&self) -> Option<DataclassOptions> {
        self.decorators
            .iter()
            .find_map(|d| DataclassOptions::from_decorator(d))
    }

    /// Base class expressions as written. Keyword arguments such as
    /// `metaclass=` are skipped and `six.with_metaclass(M, A, B)` yields `A, B`.
    fn base_exprs(&self) -> Vec<String> {
        let Some(args) = self.def.field("superclasses") else {
            return Vec::new();
        };
        let mut bases = Vec::new();
        for arg in args.children().filter(|c| c.is_named()) {
            match arg.kind().as_ref() {
                "keyword_argument" | "comment" | "list_splat" | "dictionary_splat" => {}
                "call"
                    if arg
                        .field("function")
                        .is_some_and(|f| f.text().ends_with("with_metaclass")) =>
                {
                    if let Some(call_args) = arg.field("arguments") {
                        bases.extend(
                            call_args
                                .children()
                                .filter(|c| c.is_named() && c.kind().as_ref() != "comment")
                                .skip(1)
                                .map(|c| c.text().to_string()),
                        );
                    }
                }
                _ => bases.push(arg.text().to_string()),
            }
        }
        bases
    }
}

/// The class followed by its package base classes, depth first, plus every
/// base outside the package.
#[derive(Default)]
struct Lineage<'a> {
    classes: Vec<ClassSource<'a>>,
    external: Vec<String>,
}

impl<'a> Lineage<'a> {
    fn of(ctx: &BuildContext<'a>, root: ClassSource<'a>) -> Self {
        let mut lineage = Self::default();
        let mut seen = HashSet::from([root.site.clone()]);
        lineage.visit(ctx, root, &mut seen);
        lineage
    }

    fn visit(&mut self, ctx: &BuildContext<'a>, class: ClassSource<'a>, seen: &mut HashSet<DefSite>) {
        let bases = class.base_exprs();
        let module = class.site.module.clone();
        self.classes.push(class);
        for base in bases {
            match ctx.sources.resolve_base(&module, &base) {
                Target::Class(site) => {
                    if seen.insert(site.clone())
                        && let Some(source) = ClassSource::load(ctx, &site)
                    {
                        self.visit(ctx, source, seen);
                    }
                }
                Target::External(path) => self.external.push(path),
                _ => tracing::debug!(module, base, "base class is not a class"),
            }
        }
    }
}

impl ClassNode {
    /// Build the class defined at `site`, exposed as `name` under `parent_id`.
    pub(crate) fn build(
        parent_id: &str,
        name: &str,
        site: &DefSite,
        ctx: &BuildContext<'_>,
    ) -> Option<Self> {
        let lineage = Lineage::of(ctx, ClassSource::load(ctx, site)?);
        let root = lineage.classes.first()?;
        let module = root.module();
        let name = name.to_string();
        let id = format!("{parent_id}.{name}");
        let kind = ClassKind::from_external_bases(&lineage.external);

        let bases = root
            .base_exprs()
            .iter()
            .filter(|base| base.as_str() != "object")
            .map(|base| ctx.normalize_type(module, base))
            .collect();
        let dataclass = root.dataclass();
        let decorators = root
            .decorators
            .iter()
            .map(|d| match (&dataclass, DataclassOptions::from_decorator(d)) {
                (Some(options), Some(_)) => options.render(),
                _ => d.clone(),
            })
            .collect();
        let span = ctx.span(module, &root.stmt);
        let is_handwritten = ctx.handwritten.is_handwritten(&span.path);
        let docstring = extract_docstring(&root.def);

        let collector = Collector {
            ctx,
            id: &id,
            lineage: &lineage,
            docstring: docstring.as_deref(),
        };
        let members = match kind {
            ClassKind::Enum => collector.enum_members(),
            ClassKind::Class | ClassKind::TypedDict => {
                collector.members(kind, dataclass.as_ref(), &span)
            }
        };

        let mut node = Self {
            name,
            id,
            site: site.clone(),
            kind,
            bases,
            decorators,
            implements: Vec::new(),
            members,
            dataclass,
            is_handwritten,
            span,
        };
        node.set_abstract_roles();
        node.sort_members();
        tracing::debug!(id = node.id, kind = ?node.kind, members = node.members.len(), "built class");
        Some(node)
    }

    fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Function(f) => Some(f),
            _ => None,
        })
    }

    fn set_abstract_roles(&mut self) {
        let names: HashSet<&str> = self.functions().map(|f| f.name.as_str()).collect();
        let roles: Vec<&(&str, &[&str])> = ABSTRACT_ROLES
            .iter()
            .filter(|(_, methods)| methods.iter().all(|m| names.contains(m)))
            .collect();
        let hidden: HashSet<&str> = roles.iter().flat_map(|(_, methods)| methods.iter().copied()).collect();
        self.implements = roles.iter().map(|(role, _)| (*role).to_string()).collect();
        for member in &mut self.members {
            if let ClassMember::Function(f) = member
                && hidden.contains(f.name.as_str())
            {
                f.hidden = true;
            }
        }
    }

    /// Keys, properties, variables, enum values, nested classes, dunder
    /// methods, class methods, then instance methods; by name within a group.
    /// The sort is stable so overloads stay ahead of their implementation.
    fn sort_members(&mut self) {
        self.members
            .sort_by(|a, b| a.rank().cmp(&b.rank()).then_with(|| a.name().cmp(b.name())));
    }

    /// Owners for linter findings: the class, its methods and nested classes.
    pub(crate) fn finding_owners(&self) -> Vec<FindingOwner> {
        let mut owners = vec![self.span.owner(&self.id)];
        for member in &self.members {
            match member {
                ClassMember::Function(f) => owners.push(f.finding_owner()),
                ClassMember::Class(c) => owners.extend(c.finding_owners()),
                _ => {}
            }
        }
        owners
    }

    /// Register the class and nested classes, plus definition-site aliases.
    pub fn register(&self, index: &mut NodeIndex) -> Result<(), ParserError> {
        index.add(
            &self.id,
            IndexEntry {
                navigation_id: self.id.clone(),
                kind: EntryKind::Class,
            },
        )?;
        index.alias(&self.site.path(), &self.id);
        for member in &self.members {
            if let ClassMember::Class(nested) = member {
                nested.register(index)?;
            }
        }
        Ok(())
    }

    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        tracing::debug!(id = self.id, "emitting class");
        push_decorators(out, &self.decorators, &self.id);
        cx.attach_findings(&self.id);

        let mut line = cx.declaration(&self.id);
        line.push(ReviewToken::keyword("class"));
        let mut name = ReviewToken::text(self.id.as_str())
            .without_suffix_space()
            .display_name(self.name.as_str())
            .render_class(if self.kind == ClassKind::Enum { "enum" } else { "class" });
        if self.is_handwritten {
            name = name.render_class(HANDWRITTEN_RENDER_CLASS);
        }
        line.push(name);

        if !self.bases.is_empty() {
            line.push(ReviewToken::punctuation("(").without_suffix_space());
            for (i, base) in self.bases.iter().enumerate() {
                if i > 0 {
                    line.push(ReviewToken::punctuation(","));
                }
                line.extend(cx.type_tokens(base, false));
            }
            line.push(ReviewToken::punctuation(")").without_suffix_space());
        }
        line.push(ReviewToken::punctuation(":").without_suffix_space());

        if !self.implements.is_empty() {
            line.push(ReviewToken::text(" ").without_suffix_space());
            line.push(ReviewToken::keyword("implements"));
            for (i, role) in self.implements.iter().enumerate() {
                if i > 0 {
                    line.push(ReviewToken::punctuation(","));
                }
                line.push(ReviewToken::type_name(role.as_str()).without_suffix_space());
            }
        }

        let mut children = ReviewLines::new();
        for member in &self.members {
            if !matches!(member, ClassMember::Function(_)) {
                member.emit(&mut children, cx);
            }
        }
        children.set_blank_lines(1, false);
        for function in self.functions().filter(|f| !f.hidden) {
            function.emit(&mut children, cx);
        }
        children.set_blank_lines(2, true);
        line.children = children;
        out.push(line);
    }
}

/// Member collection for one class.
struct Collector<'c, 'a> {
    ctx: &'c BuildContext<'a>,
    id: &'c str,
    lineage: &'c Lineage<'a>,
    docstring: Option<&'c str>,
}

/// Functions found in the lineage, before nodes are built.
#[derive(Default)]
struct FoundFunctions<'c, 'a> {
    /// `(name, is_async)` to statement and defining module.
    methods: BTreeMap<(String, bool), (PyNode<'a>, &'c str)>,
    getters: BTreeMap<String, (PyNode<'a>, &'c str)>,
    setters: HashSet<String>,
    overloads: Vec<(String, PyNode<'a>, &'c str)>,
}

impl<'c, 'a> Collector<'c, 'a> {
    fn root(&self) -> Option<&'c ClassSource<'a>> {
        self.lineage.classes.first()
    }

    fn child_id(&self, name: &str) -> String {
        format!("{}.{name}", self.id)
    }

    fn members(
        &self,
        kind: ClassKind,
        dataclass: Option<&DataclassOptions>,
        span: &SourceSpan,
    ) -> Vec<ClassMember> {
        let found = self.find_functions();
        let mut members = Vec::new();

        let keys = if kind == ClassKind::TypedDict {
            self.keys()
        } else {
            Vec::new()
        };
        let mut claimed: HashSet<String> = keys.iter().map(|k| k.name.clone()).collect();
        claimed.extend(found.getters.keys().cloned());
        claimed.extend(found.methods.keys().map(|(name, _)| name.clone()));

        let fields = if dataclass.is_some() {
            self.dataclass_fields()
        } else {
            Vec::new()
        };
        let mut variables = self.variables(kind);
        for field in fields.iter().filter(|f| f.is_displayed()) {
            variables.insert(
                field.name.clone(),
                VariableNode {
                    name: field.name.clone(),
                    id: self.child_id(&field.name),
                    type_name: Some(field.type_name.clone()),
                    value: field.value.clone(),
                    is_ivar: true,
                },
            );
        }
        for (name, variable) in variables {
            if claimed.contains(&name) {
                tracing::debug!(class = self.id, name, "variable shadowed by another member");
                continue;
            }
            members.push(ClassMember::Variable(variable));
        }
        members.extend(keys.into_iter().map(ClassMember::Key));
        members.extend(self.properties(&found).into_iter().map(ClassMember::Property));
        members.extend(self.nested_classes().into_iter().map(|c| ClassMember::Class(Box::new(c))));

        let has_init = found.methods.contains_key(&("__init__".to_string(), false));
        members.extend(self.methods(found).into_iter().map(ClassMember::Function));
        if let Some(options) = dataclass
            && options.init()
            && !has_init
        {
            members.push(ClassMember::Function(FunctionNode::synthesized(
                "__init__",
                self.id,
                dataclass::init_signature(&fields),
                span.clone(),
            )));
        }
        members
    }

    /// Enum classes list their values and documented instance variables only.
    fn enum_members(&self) -> Vec<ClassMember> {
        let mut members: Vec<ClassMember> = self
            .docstring_ivars()
            .into_values()
            .map(ClassMember::Variable)
            .collect();
        let Some(root) = self.root() else {
            return members;
        };
        for stmt in root.body() {
            let Some((name, None, Some(value))) = dataclass::assignment(&stmt) else {
                continue;
            };
            if is_private(&name) {
                continue;
            }
            members.push(ClassMember::EnumValue(EnumValueNode {
                id: self.child_id(&name),
                value: Value::from_expression(&value),
                name,
            }));
        }
        members
    }

    fn docstring_ivars(&self) -> BTreeMap<String, VariableNode> {
        let (Some(doc), Some(root)) = (self.docstring, self.root()) else {
            return BTreeMap::new();
        };
        ParsedDocstring::parse(doc)
            .ivars
            .into_iter()
            .map(|(name, type_name)| {
                let node = VariableNode {
                    id: self.child_id(&name),
                    type_name: type_name.map(|t| self.ctx.normalize_type(root.module(), &t)),
                    value: None,
                    is_ivar: true,
                    name: name.clone(),
                };
                (name, node)
            })
            .collect()
    }

    /// Documented instance variables, then annotated and literal-valued
    /// class attributes. The most derived class wins for each name.
    /// Annotated fields of dataclasses are left to the field pass.
    fn variables(&self, kind: ClassKind) -> BTreeMap<String, VariableNode> {
        let mut variables = self.docstring_ivars();
        let mut settled: HashSet<String> = HashSet::new();
        for class in &self.lineage.classes {
            let is_dataclass = class.dataclass().is_some();
            let mut own: BTreeMap<String, (Option<String>, Option<Value>)> = BTreeMap::new();
            for stmt in class.body() {
                let Some((name, type_node, value)) = dataclass::assignment(&stmt) else {
                    continue;
                };
                if is_private(&name) {
                    continue;
                }
                let type_name = type_node.map(|t| t.text().trim().to_string());
                if type_name.is_some() && kind == ClassKind::TypedDict {
                    continue;
                }
                if is_dataclass && type_name.as_deref().is_some_and(|t| !is_class_var(t)) {
                    continue;
                }
                let value = value.as_ref().and_then(Value::from_literal);
                if type_name.is_none() && value.is_none() {
                    continue;
                }
                let type_name = type_name.map(|t| self.ctx.normalize_type(class.module(), &t));
                own.insert(name, (type_name, value));
            }
            for (name, (type_name, value)) in own {
                if !settled.insert(name.clone()) {
                    continue;
                }
                if let Some(existing) = variables.get_mut(&name) {
                    if type_name.is_some() {
                        existing.type_name = type_name;
                    }
                    if value.is_some() {
                        existing.value = value;
                    }
                    continue;
                }
                let is_ivar = type_name
                    .as_deref()
                    .is_none_or(|t| !t.starts_with("ClassVar"));
                variables.insert(
                    name.clone(),
                    VariableNode {
                        id: self.child_id(&name),
                        name,
                        type_name,
                        value,
                        is_ivar,
                    },
                );
            }
        }
        variables
    }

    /// Typed-dict keys from the bases down; a redefined key keeps its position.
    fn keys(&self) -> Vec<KeyNode> {
        let mut keys: Vec<(String, String)> = Vec::new();
        for class in self.lineage.classes.iter().rev() {
            for stmt in class.body() {
                let Some((name, type_node, _)) = annotated_assignment(&stmt) else {
                    continue;
                };
                if is_private(&name) {
                    continue;
                }
                let type_name = self.ctx.normalize_type(class.module(), type_node.text().trim());
                match keys.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(entry) => entry.1 = type_name,
                    None => keys.push((name, type_name)),
                }
            }
        }
        keys.into_iter()
            .map(|(name, type_name)| KeyNode::new(self.id, &name, type_name))
            .collect()
    }

    /// Fields of every dataclass in the lineage, bases first, types normalized.
    fn dataclass_fields(&self) -> Vec<DataclassField> {
        let mut fields = Vec::new();
        for class in self.lineage.classes.iter().rev() {
            let Some(options) = class.dataclass() else {
                continue;
            };
            let mut declared = dataclass::fields_of(&class.body(), options.kw_only());
            for field in &mut declared {
                field.type_name = self.ctx.normalize_type(class.module(), &field.type_name);
            }
            dataclass::merge_fields(&mut fields, declared);
        }
        fields
    }

    fn find_functions(&self) -> FoundFunctions<'c, 'a> {
        let mut found = FoundFunctions::default();
        for class in &self.lineage.classes {
            let module = class.module();
            if module.ends_with(SKIPPED_MODULE_SUFFIX) {
                continue;
            }
            let mut own_methods = BTreeMap::new();
            let mut own_getters = BTreeMap::new();
            for stmt in class.body() {
                let Some((def, decorators)) = unwrap_decorated(&stmt) else {
                    continue;
                };
                if def.kind().as_ref() != "function_definition" {
                    continue;
                }
                let Some(name) = node_name(&def) else {
                    continue;
                };
                if is_private(&name) && !is_dunder(&name) {
                    continue;
                }
                if decorator_matches(&decorators, "overload") {
                    found.overloads.push((name, stmt, module));
                } else if decorator_matches_any(&decorators, PROPERTY_DECORATORS) {
                    own_getters.insert(name, (def, module));
                } else if let Some(accessor) = property_accessor(&decorators, &name) {
                    if accessor == "setter" {
                        found.setters.insert(name);
                    }
                } else {
                    own_methods.insert((name, is_async_def(&def)), (stmt, module));
                }
            }
            for (key, value) in own_methods {
                found.methods.entry(key).or_insert(value);
            }
            for (key, value) in own_getters {
                found.getters.entry(key).or_insert(value);
            }
        }
        found
    }

    fn properties(&self, found: &FoundFunctions<'c, 'a>) -> Vec<PropertyNode> {
        found
            .getters
            .iter()
            .map(|(name, (def, module))| {
                let type_name = def
                    .field("return_type")
                    .map(|t| t.text().trim().to_string())
                    .or_else(|| {
                        let doc = ParsedDocstring::parse(&extract_docstring(def)?);
                        doc.ret_type.or(doc.bare_type)
                    })
                    .map(|t| self.ctx.normalize_type(module, &t));
                PropertyNode {
                    name: name.clone(),
                    id: self.child_id(name),
                    type_name,
                    read_only: !found.setters.contains(name),
                }
            })
            .collect()
    }

    /// Method nodes, each preceded by its numbered overloads.
    fn methods(&self, found: FoundFunctions<'c, 'a>) -> Vec<FunctionNode> {
        let scope = |module: &'c str| FunctionScope {
            parent_id: self.id,
            exported_name: None,
            module,
            is_module_level: false,
            class_docstring: self.docstring,
        };
        let mut overloaded: HashSet<String> = HashSet::new();
        let mut nodes = Vec::new();
        for ((name, _), (stmt, module)) in found.methods {
            if overloaded.insert(name.clone()) {
                let overloads = found.overloads.iter().filter(|(n, ..)| *n == name);
                for (n, (_, overload, overload_module)) in overloads.enumerate() {
                    if let Some(mut node) = FunctionNode::build(overload, &scope(*overload_module), self.ctx) {
                        node.number_overload(n + 1);
                        nodes.push(node);
                    }
                }
            }
            if let Some(node) = FunctionNode::build(&stmt, &scope(module), self.ctx) {
                nodes.push(node);
            }
        }
        nodes
    }

    fn nested_classes(&self) -> Vec<ClassNode> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        root.body()
            .iter()
            .filter_map(|stmt| {
                let (def, _) = unwrap_decorated(stmt)?;
                if def.kind().as_ref() != "class_definition" {
                    return None;
                }
                let name = node_name(&def)?;
                if is_private(&name) {
                    return None;
                }
                let site = DefSite::new(root.module(), format!("{}.{name}", root.site.qualname));
                ClassNode::build(self.id, &name, &site, self.ctx)
            })
            .collect()
    }
}

/// `setter`, `getter` or `deleter` for a `@NAME.setter`-style decorator.
fn property_accessor<'d>(decorators: &'d [String], name: &str) -> Option<&'d str> {
    decorators.iter().find_map(|d| {
        d.trim_start_matches('@')
            .strip_prefix(name)?
            .strip_prefix('.')
    })
}
