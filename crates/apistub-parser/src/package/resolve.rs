//! Name resolution across re-export chains.

use std::collections::HashSet;

use super::discovery::in_namespace;
use super::sources::{Binding, SourceIndex, top_level_statements};
use crate::parser::PyNode;
use crate::syntax::{is_private, node_name, unwrap_decorated};

/// Where a class, function or variable is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefSite {
    pub module: String,
    /// Dotted path inside the module, e.g. `Outer.Inner`.
    pub qualname: String,
}

impl DefSite {
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
        }
    }

    /// `module.qualname`
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }

    /// Short name, the last qualname component.
    #[must_use]
    pub fn name(&self) -> &str {
        self.qualname.rsplit('.').next().unwrap_or(&self.qualname)
    }
}

/// What a name refers to once import chains are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Class(DefSite),
    Function(DefSite),
    Variable(DefSite),
    Module(String),
    /// Outside the indexed sources; dotted path as far as it is known.
    External(String),
}

impl Target {
    /// Dotted path of the target.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Class(site) | Self::Function(site) | Self::Variable(site) => site.path(),
            Self::Module(path) | Self::External(path) => path.clone(),
        }
    }
}

type Seen = HashSet<(String, String)>;

impl SourceIndex {
    /// Resolve a bare `name` as seen from `module`.
    #[must_use]
    pub fn resolve(&self, module: &str, name: &str) -> Option<Target> {
        self.resolve_in(module, name, &mut Seen::new())
    }

    fn resolve_in(&self, module: &str, name: &str, seen: &mut Seen) -> Option<Target> {
        if !seen.insert((module.to_string(), name.to_string())) {
            tracing::debug!(module, name, "import cycle while resolving name");
            return None;
        }
        let source = self.module(module)?;
        match source.binding(name) {
            Some(Binding::Class) => Some(Target::Class(DefSite::new(module, name))),
            Some(Binding::Function) => Some(Target::Function(DefSite::new(module, name))),
            Some(Binding::Variable) => Some(Target::Variable(DefSite::new(module, name))),
            Some(Binding::Module(path)) => Some(self.absolute(path)),
            Some(Binding::FromImport {
                module: from,
                name: imported,
            }) => {
                if self.contains(from) {
                    self.resolve_in(from, imported, seen)
                        .or_else(|| self.submodule(from, imported))
                } else {
                    Some(self.absolute(&format!("{from}.{imported}")))
                }
            }
            None => source
                .star_imports()
                .iter()
                .filter(|star| self.public_names(star).iter().any(|n| n == name))
                .find_map(|star| self.resolve_in(star, name, seen))
                .or_else(|| self.submodule(module, name)),
        }
    }

    fn submodule(&self, module: &str, name: &str) -> Option<Target> {
        let path = format!("{module}.{name}");
        self.contains(&path).then_some(Target::Module(path))
    }

    /// Resolve an absolute dotted path, falling back to `External`.
    fn absolute(&self, path: &str) -> Target {
        if in_namespace(path, &self.namespace) || self.contains(path) {
            let parts: Vec<&str> = path.split('.').collect();
            for split in (1..=parts.len()).rev() {
                let module = parts[..split].join(".");
                if !self.contains(&module) {
                    continue;
                }
                if split == parts.len() {
                    return Target::Module(module);
                }
                if let Some(target) = self.walk_members(Target::Module(module), &parts[split..]) {
                    return target;
                }
                break;
            }
        }
        Target::External(path.to_string())
    }

    /// Resolve a possibly dotted reference such as `models.Pet` or
    /// `pkg.models.Pet` as seen from `module`.
    #[must_use]
    pub fn resolve_dotted(&self, module: &str, dotted: &str) -> Option<Target> {
        let dotted = dotted.trim().trim_start_matches('~');
        let mut parts = dotted.split('.');
        let head = parts.next()?;
        let rest: Vec<&str> = parts.collect();
        match self.resolve(module, head) {
            Some(target) => self.walk_members(target, &rest),
            None if !rest.is_empty() => match self.absolute(dotted) {
                Target::External(_) => None,
                target => Some(target),
            },
            None => None,
        }
    }

    fn walk_members(&self, start: Target, parts: &[&str]) -> Option<Target> {
        let mut current = start;
        for part in parts {
            current = match current {
                Target::Module(module) => self
                    .resolve(&module, part)
                    .or_else(|| self.submodule(&module, part))?,
                Target::Class(site) => {
                    let nested = DefSite::new(&site.module, format!("{}.{part}", site.qualname));
                    if self.class_node(&nested).is_some() {
                        Target::Class(nested)
                    } else {
                        return None;
                    }
                }
                Target::External(path) => Target::External(format!("{path}.{part}")),
                Target::Function(_) | Target::Variable(_) => return None,
            };
        }
        Some(current)
    }

    /// Names a module exports: `__all__`, or every bound and star-imported
    /// name not starting with `_`.
    #[must_use]
    pub fn public_names(&self, module: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        self.collect_public_names(module, &mut seen, &mut names);
        names
    }

    fn collect_public_names(&self, module: &str, seen: &mut HashSet<String>, out: &mut Vec<String>) {
        if !seen.insert(module.to_string()) {
            return;
        }
        let Some(source) = self.module(module) else {
            return;
        };
        if let Some(all) = source.dunder_all() {
            for name in all {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            return;
        }
        for name in source.bound_names() {
            if !is_private(name) && !out.contains(name) {
                out.push(name.clone());
            }
        }
        for star in source.star_imports() {
            self.collect_public_names(star, seen, out);
        }
    }

    /// Public classes and functions reachable from `module`, sorted by name.
    ///
    /// Members defined outside the root namespace are dropped.
    #[must_use]
    pub fn module_members(&self, module: &str) -> Vec<(String, Target)> {
        let mut members: Vec<(String, Target)> = self
            .public_names(module)
            .into_iter()
            .filter(|name| !is_private(name))
            .filter_map(|name| {
                let target = self.resolve(module, &name)?;
                match &target {
                    Target::Class(site) | Target::Function(site)
                        if in_namespace(&site.module, &self.namespace) =>
                    {
                        Some((name, target))
                    }
                    Target::External(path) => {
                        tracing::debug!(module, name, path, "skipping member defined outside the package");
                        None
                    }
                    _ => None,
                }
            })
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));
        members
    }

    /// The statement (possibly `decorated_definition`) defining the class at `site`.
    #[must_use]
    pub fn class_node(&self, site: &DefSite) -> Option<PyNode<'_>> {
        let source = self.module(&site.module)?;
        let mut block = source.root();
        let mut found = None;
        for part in site.qualname.split('.') {
            let stmt = top_level_statements(&block).into_iter().find(|stmt| {
                unwrap_decorated(stmt).is_some_and(|(def, _)| {
                    def.kind().as_ref() == "class_definition"
                        && node_name(&def).as_deref() == Some(part)
                })
            })?;
            let (def, _) = unwrap_decorated(&stmt)?;
            block = def.field("body")?;
            found = Some(stmt);
        }
        found
    }

    /// Every top-level `def NAME` statement in `module`, in source order.
    #[must_use]
    pub fn function_nodes(&self, module: &str, name: &str) -> Vec<PyNode<'_>> {
        let Some(source) = self.module(module) else {
            return Vec::new();
        };
        let root = source.root();
        top_level_statements(&root)
            .into_iter()
            .filter(|stmt| {
                unwrap_decorated(stmt).is_some_and(|(def, _)| {
                    def.kind().as_ref() == "function_definition"
                        && node_name(&def).as_deref() == Some(name)
                })
            })
            .collect()
    }

    /// Resolve a base-class expression written in `module`.
    ///
    /// Unknown bare names (builtins) come back as `External(name)`.
    #[must_use]
    pub fn resolve_base(&self, module: &str, expr: &str) -> Target {
        let name = expr.split('[').next().unwrap_or(expr).trim();
        self.resolve_dotted(module, name)
            .unwrap_or_else(|| Target::External(name.to_string()))
    }
}
