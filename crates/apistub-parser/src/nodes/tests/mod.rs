use super::*;
use pretty_assertions::assert_eq;

mod functions;
mod modules;

/// The `fakeapi` fixture package, parsed from memory.
fn fakeapi() -> SourceIndex {
    SourceIndex::from_sources(
        "fakeapi",
        [
            (
                "fakeapi.__init__",
                include_str!("../../../tests/fixtures/fakeapi/fakeapi/__init__.py"),
            ),
            (
                "fakeapi._client",
                include_str!("../../../tests/fixtures/fakeapi/fakeapi/_client.py"),
            ),
            (
                "fakeapi._functions",
                include_str!("../../../tests/fixtures/fakeapi/fakeapi/_functions.py"),
            ),
            (
                "fakeapi._patch",
                include_str!("../../../tests/fixtures/fakeapi/fakeapi/_patch.py"),
            ),
            (
                "fakeapi.models.__init__",
                include_str!("../../../tests/fixtures/fakeapi/fakeapi/models/__init__.py"),
            ),
            (
                "fakeapi.models._models",
                include_str!("../../../tests/fixtures/fakeapi/fakeapi/models/_models.py"),
            ),
        ],
    )
}

/// A one-module package named `pkg`.
fn single_module(source: &str) -> SourceIndex {
    SourceIndex::from_sources("pkg", [("pkg.__init__", source)])
}

fn build_module(sources: &SourceIndex, module: &str) -> ModuleNode {
    let ctx = BuildContext::new(sources, &PatchFileMarker);
    ModuleNode::build(module, &ctx)
}

fn index_of(module: &ModuleNode) -> NodeIndex {
    let mut index = NodeIndex::new();
    module.register(&mut index).unwrap();
    index
}

/// Emit `module` on its own and return the review lines.
fn emit_module(module: &ModuleNode) -> ReviewLines {
    let index = index_of(module);
    let metadata = MetadataMap::default();
    let mut cx = EmitContext::new(&index, &metadata, Findings::default());
    let mut out = ReviewLines::new();
    module.emit(&mut out, &mut cx);
    out
}

/// Emit a single function at depth zero.
fn emit_function(function: &FunctionNode) -> ReviewLines {
    let index = NodeIndex::new();
    let metadata = MetadataMap::default();
    let mut cx = EmitContext::new(&index, &metadata, Findings::default());
    let mut out = ReviewLines::new();
    function.emit(&mut out, &mut cx);
    out
}

fn emit_class(class: &ClassNode) -> ReviewLines {
    let mut index = NodeIndex::new();
    class.register(&mut index).unwrap();
    let metadata = MetadataMap::default();
    let mut cx = EmitContext::new(&index, &metadata, Findings::default());
    let mut out = ReviewLines::new();
    class.emit(&mut out, &mut cx);
    out
}

/// Rendered text with trailing spaces removed.
fn rendered(lines: &ReviewLines) -> Vec<String> {
    lines
        .render()
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect()
}

fn find_class<'a>(module: &'a ModuleNode, name: &str) -> &'a ClassNode {
    module
        .classes
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("class {name} not found"))
}

fn find_function<'a>(module: &'a ModuleNode, name: &str) -> &'a FunctionNode {
    module
        .functions
        .iter()
        .find(|f| f.name == name && !f.is_overload)
        .unwrap_or_else(|| panic!("function {name} not found"))
}

fn method<'a>(class: &'a ClassNode, id_suffix: &str) -> &'a FunctionNode {
    let id = format!("{}.{id_suffix}", class.id);
    class
        .members
        .iter()
        .find_map(|m| match m {
            ClassMember::Function(f) if f.id == id => Some(f),
            _ => None,
        })
        .unwrap_or_else(|| panic!("method {id} not found"))
}

/// `(kind, name)` for every member, in emission order.
fn member_summary(class: &ClassNode) -> Vec<(&'static str, String)> {
    class
        .members
        .iter()
        .map(|m| {
            let kind = match m {
                ClassMember::Key(_) => "key",
                ClassMember::Property(_) => "property",
                ClassMember::Variable(v) if v.is_ivar => "ivar",
                ClassMember::Variable(_) => "cvar",
                ClassMember::EnumValue(_) => "enum",
                ClassMember::Class(_) => "class",
                ClassMember::Function(_) => "function",
            };
            (kind, m.name().to_string())
        })
        .collect()
}

#[test]
fn fixture_package_parses() {
    let sources = fakeapi();
    assert!(sources.contains("fakeapi.models"));
    let module = build_module(&sources, "fakeapi");
    let names: Vec<&str> = module.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Customization", "FakeClient"]);
}
