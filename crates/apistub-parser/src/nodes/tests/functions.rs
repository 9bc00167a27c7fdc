use super::*;
use pretty_assertions::assert_eq;
use apistub_core::TokenKind;

#[test]
fn simple_typehinted_method_renders_one_parameter_per_line() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");
    let function = method(client, "with_simple_typehints");

    assert_eq!(
        rendered(&emit_function(function)),
        vec![
            "def with_simple_typehints(",
            "    self,",
            "    name: str,",
            "    age: int",
            ") -> str",
            "",
        ]
    );
}

#[test]
fn multi_line_signature_closes_with_return_type_line() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");
    let lines = emit_function(method(client, "with_simple_typehints"));

    let closing = &lines.as_slice()[1];
    assert_eq!(
        closing.line_id.as_deref(),
        Some("fakeapi.FakeClient.with_simple_typehints.returntype")
    );
    assert!(closing.is_context_end_line);
    assert!(lines.as_slice()[2].is_blank());
}

#[test]
fn two_parameters_stay_on_one_line() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let function = find_function(&module, "with_simple_typehints");

    let lines = emit_function(function);
    assert_eq!(
        rendered(&lines),
        vec!["def fakeapi.with_simple_typehints(name: str, age: int) -> str", ""]
    );
    let name = &lines.as_slice()[0].tokens[1];
    assert_eq!(name.navigation_display_name.as_deref(), Some("with_simple_typehints"));
    assert!(name.render_classes.iter().any(|c| c == "function"));
}

#[test]
fn keyword_only_marker_and_string_default() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let function = find_function(&module, "with_simple_default");

    let lines = emit_function(function);
    assert_eq!(
        rendered(&lines),
        vec![
            "def fakeapi.with_simple_default(",
            "    name: str = \"Bill\",",
            "    *,",
            "    age: int = 21",
            ") -> None",
            "",
        ]
    );
    let bill = lines.as_slice()[0].children.as_slice()[0]
        .tokens
        .iter()
        .find(|t| t.value == "\"Bill\"")
        .expect("default token");
    assert_eq!(bill.kind, TokenKind::StringLiteral);
}

#[test]
fn docstring_types_fill_missing_annotations() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let function = find_function(&module, "with_docstring_types");

    let text = rendered(&emit_function(function)).join("\n");
    assert!(text.contains("name: str"), "docstring type missing: {text}");
    assert!(text.contains("count: int = 3"), "docstring type missing: {text}");
    assert!(text.contains("-> str"), "docstring return type missing: {text}");
}

#[test]
fn sync_and_async_methods_get_distinct_ids() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");

    let sync = method(client, "ping");
    let asynchronous = method(client, "ping:async");
    assert!(!sync.is_async);
    assert!(asynchronous.is_async);

    let text = rendered(&emit_function(asynchronous));
    assert_eq!(text[0], "async def ping(self)");
}

#[test]
fn method_overloads_are_numbered_before_the_implementation() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");

    let ids: Vec<&str> = client
        .members
        .iter()
        .filter_map(|m| match m {
            ClassMember::Function(f) if f.name == "double" => Some(f.id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        ids,
        vec![
            "fakeapi.FakeClient.double_1",
            "fakeapi.FakeClient.double_2",
            "fakeapi.FakeClient.double_3",
            "fakeapi.FakeClient.double",
        ]
    );
}

#[test]
fn overload_ids_are_stable_across_runs() {
    let sources = fakeapi();
    let first = build_module(&sources, "fakeapi");
    let second = build_module(&sources, "fakeapi");
    let ids = |m: &ModuleNode| -> Vec<String> {
        find_class(m, "FakeClient")
            .members
            .iter()
            .map(|member| member.name().to_string())
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(emit_module(&first), emit_module(&second));
}

#[test]
fn overload_lines_relate_their_decorators() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");
    let overload = method(client, "double_2");

    let lines = emit_function(overload);
    let decorator = &lines.as_slice()[0];
    assert_eq!(decorator.related_to_line.as_deref(), Some("fakeapi.FakeClient.double_2"));
    assert_eq!(decorator.render_tokens(), "@overload");
    assert_eq!(
        lines.as_slice()[1].line_id.as_deref(),
        Some("fakeapi.FakeClient.double_2")
    );
}

#[test]
fn module_level_overloads() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let ids: Vec<&str> = module
        .functions
        .iter()
        .filter(|f| f.name == "add")
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(ids, vec!["fakeapi.add_1", "fakeapi.add_2", "fakeapi.add"]);
}

#[test]
fn class_methods_use_cls_receiver() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");
    let function = method(client, "from_connection_string");

    assert!(function.is_class_method);
    let text = rendered(&emit_function(function));
    assert!(text[1].starts_with("def from_connection_string(cls"), "{text:?}");
}

#[test]
fn init_without_docstring_uses_class_docstring() {
    let sources = fakeapi();
    let module = build_module(&sources, "fakeapi");
    let client = find_class(&module, "FakeClient");
    let init = method(client, "__init__");

    let text = rendered(&emit_function(init)).join("\n");
    assert!(text.contains("endpoint: str"), "class docstring not used: {text}");
    assert!(text.contains("credential = None"), "{text}");
    assert!(text.contains("**kwargs"), "{text}");
}
