//! Parsed sources of every module under the root namespace, with per-module
//! binding tables built from top-level statements.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::ParserError;
use crate::parser::{AstTree, PyNode, has_syntax_errors, parse_source};
use crate::syntax::{extract_dunder_all, node_name, unwrap_decorated};

/// What a top-level name is bound to in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Class,
    Function,
    Variable,
    /// `from MODULE import NAME [as alias]`
    FromImport { module: String, name: String },
    /// `import MODULE [as alias]`
    Module(String),
}

/// One parsed module.
pub struct SourceModule {
    pub name: String,
    pub path: PathBuf,
    pub is_package: bool,
    tree: AstTree,
    bindings: HashMap<String, Binding>,
    /// Bound names in first-seen order.
    order: Vec<String>,
    dunder_all: Option<Vec<String>>,
    star_imports: Vec<String>,
}

impl std::fmt::Debug for SourceModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceModule")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("bindings", &self.order)
            .finish_non_exhaustive()
    }
}

impl SourceModule {
    /// Parse `source` as module `name`.
    #[must_use]
    pub fn parse(name: &str, path: PathBuf, is_package: bool, source: &str) -> Self {
        let tree = parse_source(source);
        if has_syntax_errors(&tree) {
            tracing::warn!(module = name, "syntax errors in module; continuing with partial tree");
        }
        let mut module = Self {
            name: name.to_string(),
            path,
            is_package,
            tree,
            bindings: HashMap::new(),
            order: Vec::new(),
            dunder_all: None,
            star_imports: Vec::new(),
        };
        module.collect_bindings();
        module
    }

    pub fn root(&self) -> PyNode<'_> {
        self.tree.root()
    }

    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Bound names in first-seen order.
    #[must_use]
    pub fn bound_names(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn dunder_all(&self) -> Option<&[String]> {
        self.dunder_all.as_deref()
    }

    /// Modules pulled in with `from X import *`, as absolute names.
    #[must_use]
    pub fn star_imports(&self) -> &[String] {
        &self.star_imports
    }

    /// Package that relative imports in this module are anchored to.
    fn anchor_package(&self) -> &str {
        if self.is_package {
            &self.name
        } else {
            self.name.rsplit_once('.').map_or("", |(parent, _)| parent)
        }
    }

    fn bind(&mut self, name: String, binding: Binding) {
        if !self.bindings.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.bindings.insert(name, binding);
    }

    fn collect_bindings(&mut self) {
        let mut found: Vec<(String, Binding)> = Vec::new();
        let mut stars: Vec<String> = Vec::new();
        let anchor = self.anchor_package().to_string();
        let root = self.tree.root();
        for stmt in top_level_statements(&root) {
            collect_statement(&stmt, &anchor, &mut found, &mut stars);
        }
        let dunder_all = extract_dunder_all(&root);
        for (name, binding) in found {
            self.bind(name, binding);
        }
        self.star_imports = stars;
        self.dunder_all = dunder_all;
    }
}

/// Statements at module level, including bodies of `if` (not `if TYPE_CHECKING`) and `try`.
pub fn top_level_statements<'r>(block: &PyNode<'r>) -> Vec<PyNode<'r>> {
    let mut out = Vec::new();
    for child in block.children() {
        match child.kind().as_ref() {
            "if_statement" => {
                let guarded = child
                    .field("condition")
                    .is_some_and(|c| c.text().contains("TYPE_CHECKING"));
                if !guarded && let Some(body) = child.field("consequence") {
                    out.extend(top_level_statements(&body));
                }
            }
            "try_statement" => {
                if let Some(body) = child.field("body") {
                    out.extend(top_level_statements(&body));
                }
            }
            _ => out.push(child),
        }
    }
    out
}

fn collect_statement(
    stmt: &PyNode<'_>,
    anchor: &str,
    found: &mut Vec<(String, Binding)>,
    stars: &mut Vec<String>,
) {
    match stmt.kind().as_ref() {
        "class_definition" | "function_definition" | "decorated_definition" => {
            let Some((definition, _)) = unwrap_decorated(stmt) else {
                return;
            };
            let Some(name) = node_name(&definition) else {
                return;
            };
            let binding = if definition.kind().as_ref() == "class_definition" {
                Binding::Class
            } else {
                Binding::Function
            };
            found.push((name, binding));
        }
        "expression_statement" => {
            for assignment in stmt.children().filter(|c| c.kind().as_ref() == "assignment") {
                let Some(left) = assignment.field("left") else {
                    continue;
                };
                for target in assignment_targets(&left) {
                    found.push((target, Binding::Variable));
                }
            }
        }
        "import_statement" => {
            for child in stmt.children() {
                match child.kind().as_ref() {
                    "dotted_name" => {
                        let module = child.text().to_string();
                        let head = module.split('.').next().unwrap_or(&module).to_string();
                        found.push((head.clone(), Binding::Module(head)));
                    }
                    "aliased_import" => {
                        if let (Some(name), Some(alias)) = (child.field("name"), child.field("alias")) {
                            found.push((alias.text().to_string(), Binding::Module(name.text().to_string())));
                        }
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => collect_from_import(stmt, anchor, found, stars),
        _ => {}
    }
}

fn assignment_targets(left: &PyNode<'_>) -> Vec<String> {
    match left.kind().as_ref() {
        "identifier" => vec![left.text().to_string()],
        "pattern_list" | "tuple_pattern" => left
            .children()
            .filter(|c| c.kind().as_ref() == "identifier")
            .map(|c| c.text().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn collect_from_import(
    stmt: &PyNode<'_>,
    anchor: &str,
    found: &mut Vec<(String, Binding)>,
    stars: &mut Vec<String>,
) {
    let Some(module_node) = stmt.field("module_name") else {
        return;
    };
    let module = absolute_module(&module_node.text(), anchor);
    let mut after_import = false;
    for child in stmt.children() {
        let kind = child.kind();
        match kind.as_ref() {
            "import" => after_import = true,
            "wildcard_import" if after_import => stars.push(module.clone()),
            "dotted_name" if after_import => {
                let name = child.text().to_string();
                found.push((
                    name.clone(),
                    Binding::FromImport {
                        module: module.clone(),
                        name,
                    },
                ));
            }
            "aliased_import" if after_import => {
                if let (Some(name), Some(alias)) = (child.field("name"), child.field("alias")) {
                    found.push((
                        alias.text().to_string(),
                        Binding::FromImport {
                            module: module.clone(),
                            name: name.text().to_string(),
                        },
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Resolve `..models` relative to `anchor`; absolute names pass through.
#[must_use]
pub fn absolute_module(written: &str, anchor: &str) -> String {
    let written = written.trim();
    let dots = written.chars().take_while(|&c| c == '.').count();
    if dots == 0 {
        return written.to_string();
    }
    let mut base: Vec<&str> = anchor.split('.').filter(|p| !p.is_empty()).collect();
    for _ in 1..dots {
        base.pop();
    }
    let rest = &written[dots..];
    if !rest.is_empty() {
        base.push(rest);
    }
    base.join(".")
}

/// Every module under the root namespace directory, keyed by dotted name.
#[derive(Debug, Default)]
pub struct SourceIndex {
    pub(crate) namespace: String,
    pub(crate) modules: BTreeMap<String, SourceModule>,
}

impl SourceIndex {
    /// Parse every `.py` file below `source_root/<namespace path>`.
    pub fn build(source_root: &Path, namespace: &str) -> Result<Self, ParserError> {
        let namespace_dir = namespace
            .split('.')
            .fold(source_root.to_path_buf(), |dir, part| dir.join(part));
        let mut index = Self {
            namespace: namespace.to_string(),
            modules: BTreeMap::new(),
        };
        if !namespace_dir.is_dir() {
            return Err(ParserError::NamespaceNotFound(namespace_dir));
        }
        let files = WalkBuilder::new(&namespace_dir)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|p| p.extension().is_some_and(|ext| ext == "py"));
        for path in files {
            let Some((name, is_package)) = module_name_for(source_root, &path) else {
                continue;
            };
            let source =
                std::fs::read_to_string(&path).map_err(|e| ParserError::ImportFailed {
                    module: name.clone(),
                    message: e.to_string(),
                })?;
            let module = SourceModule::parse(&name, path, is_package, &source);
            index.modules.insert(name, module);
        }
        tracing::debug!(modules = index.modules.len(), "source index built");
        Ok(index)
    }

    /// Build from in-memory `(module name, source)` pairs; names ending in
    /// `__init__` mark packages.
    #[must_use]
    pub fn from_sources<'a>(
        namespace: &str,
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let modules = sources
            .into_iter()
            .map(|(name, source)| {
                let (name, is_package) = name
                    .strip_suffix(".__init__")
                    .map_or((name, false), |pkg| (pkg, true));
                let path = PathBuf::from(format!(
                    "{}{}",
                    name.replace('.', "/"),
                    if is_package { "/__init__.py" } else { ".py" }
                ));
                (
                    name.to_string(),
                    SourceModule::parse(name, path, is_package, source),
                )
            })
            .collect();
        Self {
            namespace: namespace.to_string(),
            modules,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn module(&self, name: &str) -> Option<&SourceModule> {
        self.modules.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &SourceModule> {
        self.modules.values()
    }
}

fn module_name_for(source_root: &Path, path: &Path) -> Option<(String, bool)> {
    let relative = path.strip_prefix(source_root).ok()?.with_extension("");
    let mut parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let is_package = parts.last().is_some_and(|p| p == "__init__");
    if is_package {
        parts.pop();
    }
    (!parts.is_empty()).then(|| (parts.join("."), is_package))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_modules() {
        assert_eq!(absolute_module(".models", "pkg.sub"), "pkg.sub.models");
        assert_eq!(absolute_module("..core", "pkg.sub"), "pkg.core");
        assert_eq!(absolute_module(".", "pkg"), "pkg");
        assert_eq!(absolute_module("typing", "pkg"), "typing");
    }

    #[test]
    fn bindings_cover_imports_and_definitions() {
        let index = SourceIndex::from_sources(
            "pkg",
            [(
                "pkg.__init__",
                "from typing import TYPE_CHECKING\nfrom ._client import Client as FakeClient\nfrom .models import *\nimport os.path\nimport json as j\n\nif TYPE_CHECKING:\n    from .hidden import Hidden\n\ntry:\n    from ._speedups import fast\nexcept ImportError:\n    fast = None\n\nclass Local: pass\n\ndef helper(): pass\n\nVALUE, OTHER = 1, 2\n",
            )],
        );
        let module = index.module("pkg").unwrap();
        assert_eq!(
            module.binding("FakeClient"),
            Some(&Binding::FromImport {
                module: "pkg._client".into(),
                name: "Client".into()
            })
        );
        assert_eq!(module.binding("os"), Some(&Binding::Module("os".into())));
        assert_eq!(module.binding("j"), Some(&Binding::Module("json".into())));
        assert_eq!(module.binding("Hidden"), None);
        assert!(matches!(module.binding("fast"), Some(Binding::FromImport { .. })));
        assert_eq!(module.binding("Local"), Some(&Binding::Class));
        assert_eq!(module.binding("helper"), Some(&Binding::Function));
        assert_eq!(module.binding("OTHER"), Some(&Binding::Variable));
        assert_eq!(module.star_imports(), &["pkg.models".to_string()]);
    }

    #[test]
    fn builds_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("fake");
        std::fs::create_dir_all(pkg.join("_impl")).unwrap();
        std::fs::write(pkg.join("__init__.py"), "from ._impl.core import Thing\n").unwrap();
        std::fs::write(pkg.join("_impl/__init__.py"), "").unwrap();
        std::fs::write(pkg.join("_impl/core.py"), "class Thing: pass\n").unwrap();
        let index = SourceIndex::build(dir.path(), "fake").unwrap();
        let names: Vec<&str> = index.modules().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["fake", "fake._impl", "fake._impl.core"]);
        assert!(index.module("fake").unwrap().is_package);
    }
}
