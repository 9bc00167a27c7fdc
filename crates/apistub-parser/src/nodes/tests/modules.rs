use super::*;
use pretty_assertions::assert_eq;
use crate::ParserError;
use crate::linter::LintFinding;

#[test]
fn functions_come_before_classes() {
    let module = build_module(&fakeapi(), "fakeapi");
    let lines = emit_module(&module);
    let namespace = &lines.as_slice()[0];

    assert_eq!(namespace.line_id.as_deref(), Some("fakeapi"));
    assert_eq!(namespace.render_tokens(), "namespace fakeapi");
    let declared: Vec<&str> = namespace
        .children
        .iter()
        .filter_map(|l| l.line_id.as_deref())
        .filter(|id| !id.ends_with(".returntype"))
        .collect();
    assert_eq!(
        declared,
        vec![
            "fakeapi.add_1",
            "fakeapi.add_2",
            "fakeapi.add",
            "fakeapi.with_docstring_types",
            "fakeapi.with_simple_default",
            "fakeapi.with_simple_typehints",
            "fakeapi.Customization",
            "fakeapi.FakeClient",
        ]
    );
}

#[test]
fn module_body_ends_with_two_blanks() {
    let module = build_module(&fakeapi(), "fakeapi");
    let lines = emit_module(&module);
    let children: Vec<&ReviewLine> = lines.as_slice()[0].children.iter().collect();
    let n = children.len();

    assert!(children[n - 2].is_blank());
    assert!(!children[n - 2].is_context_end_line);
    assert!(children[n - 1].is_blank());
    assert!(children[n - 1].is_context_end_line);
}

#[test]
fn line_ids_are_unique() {
    for name in ["fakeapi", "fakeapi.models"] {
        let module = build_module(&fakeapi(), name);
        let lines = emit_module(&module);
        assert!(
            lines.duplicate_line_ids().is_empty(),
            "{name}: {:?}",
            lines.duplicate_line_ids()
        );
    }
}

#[test]
fn decorator_lines_point_at_the_next_declaration() {
    let module = build_module(&fakeapi(), "fakeapi.models");
    let lines = emit_module(&module);

    fn check(lines: &ReviewLines) {
        let all = lines.as_slice();
        for (i, line) in all.iter().enumerate() {
            if let Some(target) = &line.related_to_line {
                let next = all[i + 1..]
                    .iter()
                    .find(|l| l.related_to_line.is_none())
                    .expect("declaration after decorator");
                assert_eq!(next.line_id.as_ref(), Some(target));
            }
            check(&line.children);
        }
    }
    check(&lines);
}

#[test]
fn registers_functions_and_classes() {
    let module = build_module(&fakeapi(), "fakeapi");
    let index = index_of(&module);

    assert_eq!(index.get_navigation_id("fakeapi.add"), Some("fakeapi.add"));
    assert!(index.get("fakeapi.add_1").is_none());
    assert_eq!(
        index.get_navigation_id("fakeapi._client.FakeClient"),
        Some("fakeapi.FakeClient")
    );
}

#[test]
fn registering_twice_is_a_conflict() {
    let module = build_module(&fakeapi(), "fakeapi");
    let mut index = index_of(&module);
    let err = module.register(&mut index).unwrap_err();
    assert!(matches!(err, ParserError::DuplicateName { .. }), "{err:?}");
}

#[test]
fn aliased_exports_use_the_exported_name() {
    let sources = SourceIndex::from_sources(
        "pkg",
        [
            (
                "pkg.__init__",
                "from ._a import Client, connect\nfrom ._b import Client as AsyncClient\nfrom ._b import connect as connect_async\n__all__ = ['Client', 'AsyncClient', 'connect', 'connect_async']\n",
            ),
            (
                "pkg._a",
                "class Client:\n    def get(self) -> str: ...\n\ndef connect(url: str) -> Client: ...\n",
            ),
            (
                "pkg._b",
                "class Client:\n    async def get(self) -> str: ...\n\nasync def connect(url: str) -> Client: ...\n",
            ),
        ],
    );
    let module = build_module(&sources, "pkg");

    let class_ids: Vec<&str> = module.classes.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(class_ids, vec!["pkg.AsyncClient", "pkg.Client"]);
    let function_ids: Vec<&str> = module.functions.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(function_ids, vec!["pkg.connect", "pkg.connect_async:async"]);
    assert_eq!(
        method(find_class(&module, "AsyncClient"), "get:async").qualified_name,
        "pkg.AsyncClient.get"
    );

    let mut index = NodeIndex::new();
    module.register(&mut index).unwrap();
    assert_eq!(index.get_navigation_id("pkg._a.Client"), Some("pkg.Client"));
    assert_eq!(index.get_navigation_id("pkg._b.Client"), Some("pkg.AsyncClient"));

    let lines = emit_module(&module);
    assert!(lines.duplicate_line_ids().is_empty(), "{:?}", lines.duplicate_line_ids());
    let text = rendered(&lines);
    assert!(text.contains(&"    class pkg.AsyncClient:".to_string()), "{text:?}");
}

#[test]
fn external_and_private_names_are_skipped() {
    let sources = single_module(
        "from os.path import join\nfrom collections import OrderedDict\n\n__all__ = ['join', 'OrderedDict', 'visible']\n\nLIMIT = 3\n\ndef visible() -> None: ...\n\ndef _hidden() -> None: ...\n",
    );
    let module = build_module(&sources, "pkg");
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["visible"]);
    assert!(module.classes.is_empty());
}

#[test]
fn module_without_declarations_is_empty() {
    let sources = single_module("VERSION = '1.0'\n");
    assert!(build_module(&sources, "pkg").is_empty());
}

#[test]
fn findings_attach_to_the_smallest_owner() {
    let module = build_module(&fakeapi(), "fakeapi");
    let owners = module.finding_owners();
    let ping = owners
        .iter()
        .find(|o| o.id == "fakeapi.FakeClient.ping")
        .expect("ping owner");
    let finding = LintFinding {
        code: "C4717".to_string(),
        category: "convention".to_string(),
        symbol: "client-method-missing-tracing".to_string(),
        message: "add tracing".to_string(),
        help_link: None,
        path: Some(std::path::PathBuf::from("fakeapi/_client.py")),
        line: Some(ping.start_line),
        end_line: None,
    };
    let mut findings = Findings::assign(&[finding], &owners);

    let attached = findings.take("fakeapi.FakeClient.ping");
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].target_id, "fakeapi.FakeClient.ping");
    assert!(findings.is_empty());
}
