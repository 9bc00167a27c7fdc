//! # End-to-end generation over the `fakeapi` fixture package
//!
//! The linter is replaced by an in-memory stub; nothing here needs a Python
//! interpreter.
//!
//! ```bash
//! cargo test -p apistub-parser --test pipeline
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use apistub_core::{ApiView, DiagnosticLevel};
use apistub_parser::linter::GLOBAL_TARGET;
use apistub_parser::{GenerateOptions, LintFinding, Linter, ParserError, StubGenerator};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fakeapi")
}

fn options(package_path: PathBuf) -> GenerateOptions {
    GenerateOptions {
        package_path,
        python_version: Some("3.12.1".to_string()),
        ..GenerateOptions::default()
    }
}

fn generate(options: GenerateOptions) -> ApiView {
    StubGenerator::new(options)
        .generate()
        .expect("generation should succeed")
}

/// Returns fixed findings, or fails when none are configured.
struct StubLinter(Option<Vec<LintFinding>>);

impl Linter for StubLinter {
    fn lint(&self, _package_path: &Path) -> Result<Vec<LintFinding>, ParserError> {
        self.0
            .clone()
            .ok_or_else(|| ParserError::LinterUnavailable("stub".to_string()))
    }
}

fn finding(code: &str, path: Option<&str>, line: Option<usize>) -> LintFinding {
    LintFinding {
        code: code.to_string(),
        category: "convention".to_string(),
        symbol: "naming-mismatch".to_string(),
        message: "name does not follow guidelines".to_string(),
        help_link: Some("https://example.com/help".to_string()),
        path: path.map(PathBuf::from),
        line,
        end_line: None,
    }
}

/// Pack the fixture as a wheel with dist-info metadata.
fn build_wheel(dir: &Path) -> PathBuf {
    let wheel = dir.join("fake_api-1.2.0-py3-none-any.whl");
    let file = std::fs::File::create(&wheel).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    let package = fixture_root().join("fakeapi");
    for entry in walk(&package) {
        let relative = entry.strip_prefix(fixture_root()).unwrap();
        zip.start_file(relative.to_string_lossy().replace('\\', "/"), options)
            .unwrap();
        zip.write_all(&std::fs::read(&entry).unwrap()).unwrap();
    }
    zip.start_file("fake_api-1.2.0.dist-info/METADATA", options)
        .unwrap();
    zip.write_all(b"Metadata-Version: 2.1\nName: fake-api\nVersion: 1.2.0\nProvides-Extra: aio\n")
        .unwrap();
    zip.start_file("fake_api-1.2.0.dist-info/top_level.txt", options)
        .unwrap();
    zip.write_all(b"fakeapi\n").unwrap();
    zip.finish().unwrap();
    wheel
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(walk(&path));
        } else if path.extension().is_some_and(|ext| ext == "py") {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn namespaces(view: &ApiView) -> Vec<String> {
    view.review_lines
        .iter()
        .filter(|line| line.tokens.first().is_some_and(|t| t.value == "namespace"))
        .filter_map(|line| line.line_id.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[test]
fn generates_view_for_source_directory() {
    let view = generate(options(fixture_root()));

    assert_eq!(view.package_name, "fake-api");
    assert_eq!(view.package_version, "1.2.0");
    assert_eq!(view.parser_version, apistub_parser::PARSER_VERSION);
    assert_eq!(view.language, "Python");
    assert_eq!(view.namespace, "fakeapi");
    assert_eq!(namespaces(&view), vec!["fakeapi", "fakeapi.models"]);
    assert!(view.duplicate_line_ids().is_empty());
}

#[test]
fn preamble_names_tool_and_runtime_versions() {
    let mut opts = options(fixture_root());
    opts.source_url = Some("https://example.com/fake-api".to_string());
    let view = generate(opts);
    let lines = view.review_lines.as_slice();

    assert_eq!(lines[0].line_id.as_deref(), Some(GLOBAL_TARGET));
    let header = &lines[0].tokens[0];
    assert!(header.skip_diff);
    assert_eq!(
        header.value,
        format!(
            "# Package is parsed using apistub(version:{}), Python version: 3.12.1",
            apistub_parser::PARSER_VERSION
        )
    );
    assert_eq!(lines[1].render_tokens(), "# Source URL: https://example.com/fake-api ");
    assert!(lines[2].is_blank());
    assert!(lines[3].is_blank());
}

#[test]
fn python_version_defaults_to_unknown() {
    let mut opts = options(fixture_root());
    opts.python_version = None;
    let view = generate(opts);
    assert!(
        view.review_lines.as_slice()[0].tokens[0]
            .value
            .ends_with("Python version: unknown")
    );
}

#[test]
fn output_is_deterministic() {
    let first = serde_json::to_string(&generate(options(fixture_root()))).unwrap();
    let second = serde_json::to_string(&generate(options(fixture_root()))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn filter_namespace_limits_modules() {
    let mut opts = options(fixture_root());
    opts.filter_namespace = Some("fakeapi.models".to_string());
    let view = generate(opts);

    assert_eq!(view.namespace, "fakeapi.models");
    assert_eq!(namespaces(&view), vec!["fakeapi.models"]);
}

#[test]
fn navigation_lists_namespaces_and_classes() {
    let view = generate(options(fixture_root()));
    let navigation = view.navigation.as_ref().expect("navigation");

    let texts: Vec<&str> = navigation.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(texts, vec!["fakeapi", "fakeapi.models"]);
    let models: Vec<&str> = navigation[1]
        .child_items
        .iter()
        .map(|n| n.text.as_str())
        .collect();
    assert!(models.contains(&"FakeTypedDict"), "{models:?}");
}

#[test]
fn serialized_view_matches_schema() {
    let view = generate(options(fixture_root()));
    let schema = serde_json::to_value(schemars::schema_for!(ApiView)).unwrap();
    let instance = serde_json::to_value(&view).unwrap();

    let validator = jsonschema::validator_for(&schema).expect("schema should compile");
    let errors: Vec<String> = validator.iter_errors(&instance).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "schema violations: {errors:?}");
}

// ---------------------------------------------------------------------------
// Linter findings
// ---------------------------------------------------------------------------

#[test]
fn findings_attach_to_declarations_and_global() {
    let findings = vec![
        finding("C4748", Some("fakeapi/_client.py"), Some(6)),
        finding("E4701", None, None),
        finding("C4749", Some("fakeapi/_client.py"), Some(1)),
    ];
    let view = StubGenerator::new(options(fixture_root()))
        .with_linter(Box::new(StubLinter(Some(findings))))
        .generate()
        .unwrap();

    let targets: Vec<(&str, DiagnosticLevel)> = view
        .diagnostics
        .iter()
        .map(|d| (d.target_id.as_str(), d.level))
        .collect();
    assert_eq!(
        targets,
        vec![
            (GLOBAL_TARGET, DiagnosticLevel::Error),
            ("fakeapi.FakeClient", DiagnosticLevel::Warning),
        ]
    );
    assert_eq!(
        view.diagnostics[1].help_link_uri.as_deref(),
        Some("https://example.com/help")
    );
}

#[test]
fn linter_failure_is_not_fatal() {
    let view = StubGenerator::new(options(fixture_root()))
        .with_linter(Box::new(StubLinter(None)))
        .generate()
        .unwrap();
    assert!(view.diagnostics.is_empty());
}

#[test]
fn skip_lint_ignores_the_linter() {
    let mut opts = options(fixture_root());
    opts.skip_lint = true;
    let view = StubGenerator::new(opts)
        .with_linter(Box::new(StubLinter(Some(vec![finding("E4701", None, None)]))))
        .generate()
        .unwrap();
    assert!(view.diagnostics.is_empty());
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[test]
fn wheel_archives_are_extracted() {
    let dir = tempfile::tempdir().unwrap();
    let wheel = build_wheel(dir.path());
    let temp = dir.path().join("extract");
    std::fs::create_dir(&temp).unwrap();

    let mut opts = options(wheel);
    opts.temp_path = Some(temp.clone());
    let view = generate(opts);

    assert_eq!(view.package_name, "fake-api");
    assert_eq!(namespaces(&view), vec!["fakeapi", "fakeapi.models"]);
    assert!(temp.join("fake_api-1.2.0-py3-none-any/fakeapi/__init__.py").is_file());
}

#[test]
fn missing_package_path_is_rejected() {
    let err = StubGenerator::new(options(PathBuf::from("/nonexistent/fake-api")))
        .generate()
        .unwrap_err();
    assert!(matches!(err, ParserError::InvalidPath { kind: "package", .. }), "{err:?}");
}

#[test]
fn missing_temp_dir_is_rejected() {
    let mut opts = options(fixture_root());
    opts.temp_path = Some(PathBuf::from("/nonexistent/temp"));
    let err = StubGenerator::new(opts).generate().unwrap_err();
    assert!(matches!(err, ParserError::InvalidPath { kind: "temp", .. }), "{err:?}");
}

#[test]
fn plain_files_are_not_packages() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "not a package").unwrap();
    let err = StubGenerator::new(options(file)).generate().unwrap_err();
    assert!(matches!(err, ParserError::UnsupportedArchive(_)), "{err:?}");
}

#[test]
fn directory_without_packages_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = StubGenerator::new(options(dir.path().to_path_buf()))
        .generate()
        .unwrap_err();
    assert!(matches!(err, ParserError::NamespaceNotFound(_)), "{err:?}");
}

#[test]
fn duplicate_line_ids_fail_generation() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("clash");
    std::fs::create_dir(&package).unwrap();
    std::fs::write(
        package.join("__init__.py"),
        "class C:\n    class f:\n        pass\n\n    def f(self) -> None:\n        pass\n",
    )
    .unwrap();

    let err = StubGenerator::new(options(dir.path().to_path_buf()))
        .generate()
        .unwrap_err();
    match err {
        ParserError::DuplicateLineIds { ids } => assert_eq!(ids, vec!["clash.C.f".to_string()]),
        other => panic!("expected duplicate ids, got {other:?}"),
    }
}

#[test]
fn missing_metadata_falls_back_to_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("tiny_pkg");
    std::fs::create_dir(&package).unwrap();
    std::fs::write(package.join("__init__.py"), "def hello() -> str:\n    return 'hi'\n").unwrap();

    let view = generate(options(dir.path().to_path_buf()));
    assert_eq!(view.package_name, "tiny_pkg");
    assert_eq!(view.package_version, "0.0.0");
}
