//! One module of the package: its public functions and classes.

use apistub_core::{ReviewLines, ReviewToken};

use super::function::{FunctionNode, FunctionScope};
use super::{BuildContext, ClassNode, EmitContext};
use crate::ParserError;
use crate::linter::FindingOwner;
use crate::node_index::{EntryKind, IndexEntry, NodeIndex};
use crate::package::{DefSite, Target};
use crate::syntax::{decorator_matches, unwrap_decorated};

#[derive(Debug, Clone)]
pub struct ModuleNode {
    /// Dotted module name, also the namespace line id.
    pub name: String,
    pub functions: Vec<FunctionNode>,
    pub classes: Vec<ClassNode>,
}

impl ModuleNode {
    /// Collect the public classes and functions `module` exposes.
    #[must_use]
    pub fn build(module: &str, ctx: &BuildContext<'_>) -> Self {
        let mut node = Self {
            name: module.to_string(),
            functions: Vec::new(),
            classes: Vec::new(),
        };
        for (name, target) in ctx.sources.module_members(module) {
            match target {
                Target::Class(site) => match ClassNode::build(module, &name, &site, ctx) {
                    Some(class) => node.classes.push(class),
                    None => tracing::warn!(module, name, "class source not found"),
                },
                Target::Function(site) => {
                    node.functions.extend(module_function(module, &name, &site, ctx));
                }
                _ => {}
            }
        }
        tracing::debug!(
            module,
            functions = node.functions.len(),
            classes = node.classes.len(),
            "built module"
        );
        node
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }

    /// Register `MODULE.NAME` for every class and function implementation.
    pub fn register(&self, index: &mut NodeIndex) -> Result<(), ParserError> {
        for function in self.functions.iter().filter(|f| !f.is_overload) {
            index.add(
                &function.qualified_name,
                IndexEntry {
                    navigation_id: function.id.clone(),
                    kind: EntryKind::Function,
                },
            )?;
        }
        for class in &self.classes {
            class.register(index)?;
        }
        Ok(())
    }

    pub(crate) fn finding_owners(&self) -> Vec<FindingOwner> {
        let mut owners: Vec<FindingOwner> =
            self.functions.iter().map(FunctionNode::finding_owner).collect();
        for class in &self.classes {
            owners.extend(class.finding_owners());
        }
        owners
    }

    pub fn emit(&self, out: &mut ReviewLines, cx: &mut EmitContext<'_>) {
        tracing::info!(module = self.name, "emitting module");
        let mut line = cx.declaration(&self.name);
        line.push(ReviewToken::keyword("namespace"));
        line.push(
            ReviewToken::text(self.name.as_str())
                .without_suffix_space()
                .render_class("namespace"),
        );

        let mut children = ReviewLines::new();
        for function in &self.functions {
            function.emit(&mut children, cx);
        }
        for class in &self.classes {
            class.emit(&mut children, cx);
        }
        children.set_blank_lines(2, true);
        line.children = children;
        out.push(line);
    }
}

/// Overloads of a module-level function exported as `name`, numbered, then
/// its implementation.
fn module_function(
    module: &str,
    name: &str,
    site: &DefSite,
    ctx: &BuildContext<'_>,
) -> Vec<FunctionNode> {
    let scope = FunctionScope {
        parent_id: module,
        exported_name: Some(name),
        module: &site.module,
        is_module_level: true,
        class_docstring: None,
    };
    let statements = ctx.sources.function_nodes(&site.module, site.name());
    let (overloads, implementations): (Vec<_>, Vec<_>) =
        statements.into_iter().partition(|stmt| {
            unwrap_decorated(stmt).is_some_and(|(_, decorators)| decorator_matches(&decorators, "overload"))
        });
    let Some(implementation) = implementations.last() else {
        return Vec::new();
    };

    let mut nodes: Vec<FunctionNode> = Vec::new();
    for (n, overload) in overloads.iter().enumerate() {
        if let Some(mut node) = FunctionNode::build(overload, &scope, ctx) {
            node.number_overload(n + 1);
            nodes.push(node);
        }
    }
    nodes.extend(FunctionNode::build(implementation, &scope, ctx));
    nodes
}
