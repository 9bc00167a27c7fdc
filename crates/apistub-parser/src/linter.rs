//! Pylint integration: run the linter once, keep the custom-checker findings,
//! and hand each one to the innermost declaration enclosing it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use apistub_core::{CodeDiagnostic, DiagnosticLevel};
use regex::Regex;
use serde::Deserialize;

use crate::ParserError;

/// Target id for findings that are not tied to a declaration.
pub const GLOBAL_TARGET: &str = "GLOBAL";

/// Checker-code range (`message-id[1..3]`) of the custom guideline checker.
const CUSTOM_CHECKER_RANGE: &str = "47";

static HELP_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(.*?)\s*See details:\s*(\S+)\s*$").expect("static regex")
});

/// One linter finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    /// Message id, e.g. `C4717`.
    pub code: String,
    pub category: String,
    pub symbol: String,
    pub message: String,
    pub help_link: Option<String>,
    pub path: Option<PathBuf>,
    pub line: Option<usize>,
    pub end_line: Option<usize>,
}

impl LintFinding {
    /// `E*` and `F*` codes are errors, everything else a warning.
    #[must_use]
    pub fn level(&self) -> DiagnosticLevel {
        if self.code.starts_with('E') || self.code.starts_with('F') {
            DiagnosticLevel::Error
        } else {
            DiagnosticLevel::Warning
        }
    }

    #[must_use]
    pub fn is_custom_checker(&self) -> bool {
        self.code.get(1..3) == Some(CUSTOM_CHECKER_RANGE)
    }

    fn to_diagnostic(&self, target_id: &str) -> CodeDiagnostic {
        CodeDiagnostic {
            diagnostic_id: Some(self.code.clone()),
            target_id: target_id.to_string(),
            text: format!("{}: {}", self.symbol, self.message),
            level: self.level(),
            help_link_uri: self.help_link.clone(),
        }
    }
}

/// Row of `pylint -f json` output.
#[derive(Debug, Deserialize)]
struct PylintMessage {
    #[serde(rename = "type", default)]
    category: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    message: String,
    #[serde(rename = "message-id")]
    message_id: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    line: Option<usize>,
    #[serde(rename = "endLine", default)]
    end_line: Option<usize>,
}

impl From<PylintMessage> for LintFinding {
    fn from(raw: PylintMessage) -> Self {
        let (message, help_link) = split_help_link(&raw.message);
        Self {
            code: raw.message_id,
            category: raw.category,
            symbol: raw.symbol,
            message,
            help_link,
            path: raw.path.filter(|p| !p.is_empty()).map(PathBuf::from),
            line: raw.line,
            end_line: raw.end_line,
        }
    }
}

/// Split a trailing `See details: URL` off a message.
#[must_use]
pub fn split_help_link(message: &str) -> (String, Option<String>) {
    HELP_LINK_RE.captures(message).map_or_else(
        || (message.trim().to_string(), None),
        |caps| {
            let text = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            let link = caps.get(2).map(|m| m.as_str().to_string());
            (text, link)
        },
    )
}

/// Decode `pylint -f json` output, keeping custom-checker findings only.
pub fn parse_pylint_json(json: &str) -> Result<Vec<LintFinding>, ParserError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let messages: Vec<PylintMessage> = serde_json::from_str(json)?;
    Ok(messages
        .into_iter()
        .map(LintFinding::from)
        .filter(LintFinding::is_custom_checker)
        .collect())
}

/// Something that lints a package directory.
pub trait Linter {
    fn lint(&self, package_path: &Path) -> Result<Vec<LintFinding>, ParserError>;
}

/// Runs `python -m pylint PATH -f json --recursive=y`.
#[derive(Debug, Clone)]
pub struct PylintRunner {
    executable: String,
    extra_args: Vec<String>,
}

impl PylintRunner {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            extra_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

impl Linter for PylintRunner {
    fn lint(&self, package_path: &Path) -> Result<Vec<LintFinding>, ParserError> {
        tracing::info!(path = %package_path.display(), "running pylint");
        let output = Command::new(&self.executable)
            .args(["-m", "pylint"])
            .arg(package_path)
            .args(["-f", "json", "--recursive=y"])
            .args(&self.extra_args)
            .output()
            .map_err(|e| ParserError::LinterUnavailable(format!("{}: {e}", self.executable)))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        // Pylint exits non-zero whenever it reports anything.
        if stdout.trim().is_empty() && !output.status.success() {
            return Err(ParserError::Linter(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let findings = parse_pylint_json(&stdout)?;
        tracing::info!(count = findings.len(), "pylint findings kept");
        Ok(findings)
    }
}

/// A declaration that can own findings: its id, source file and line span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingOwner {
    pub id: String,
    pub path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

/// Findings of one run, distributed to owners.
#[derive(Debug, Default)]
pub struct Findings {
    by_owner: HashMap<String, Vec<CodeDiagnostic>>,
}

impl Findings {
    /// Attach each finding to the smallest owner whose file ends with the
    /// finding's path and whose span encloses its line. Findings without a
    /// path or line go to [`GLOBAL_TARGET`].
    #[must_use]
    pub fn assign(findings: &[LintFinding], owners: &[FindingOwner]) -> Self {
        let mut by_owner: HashMap<String, Vec<CodeDiagnostic>> = HashMap::new();
        for finding in findings {
            let (Some(path), Some(line)) = (finding.path.as_deref(), finding.line) else {
                by_owner
                    .entry(GLOBAL_TARGET.to_string())
                    .or_default()
                    .push(finding.to_diagnostic(GLOBAL_TARGET));
                continue;
            };
            let end = finding.end_line.unwrap_or(line).max(line);
            let owner = owners
                .iter()
                .filter(|o| o.path.ends_with(path) && o.start_line <= line && end <= o.end_line)
                .min_by_key(|o| o.end_line - o.start_line);
            match owner {
                Some(owner) => by_owner
                    .entry(owner.id.clone())
                    .or_default()
                    .push(finding.to_diagnostic(&owner.id)),
                None => tracing::debug!(
                    code = finding.code,
                    path = %path.display(),
                    line,
                    "finding outside any public declaration"
                ),
            }
        }
        Self { by_owner }
    }

    /// Remove and return the diagnostics owned by `id`.
    pub fn take(&mut self, id: &str) -> Vec<CodeDiagnostic> {
        self.by_owner.remove(id).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_owner.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PYLINT_OUTPUT: &str = r#"[
        {"type": "convention", "module": "fake._client", "obj": "Client", "line": 4, "column": 0,
         "endLine": 4, "endColumn": 12, "path": "fake/_client.py", "symbol": "client-method-missing-type-annotations",
         "message": "Client methods should use type annotations. See details: https://aka.ms/guidelines", "message-id": "C4749"},
        {"type": "error", "module": "fake", "obj": "", "line": 1, "column": 0,
         "path": "", "symbol": "package-name-incorrect", "message": "Package name is wrong.", "message-id": "E4712"},
        {"type": "convention", "module": "fake", "obj": "", "line": 1, "column": 0,
         "path": "fake/__init__.py", "symbol": "missing-docstring", "message": "Missing docstring", "message-id": "C0114"}
    ]"#;

    #[test]
    fn keeps_custom_checker_findings() {
        let findings = parse_pylint_json(PYLINT_OUTPUT).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].message, "Client methods should use type annotations.");
        assert_eq!(findings[0].help_link.as_deref(), Some("https://aka.ms/guidelines"));
        assert_eq!(findings[0].level(), DiagnosticLevel::Warning);
        assert_eq!(findings[1].level(), DiagnosticLevel::Error);
        assert_eq!(findings[1].path, None);
    }

    #[test]
    fn innermost_owner_wins() {
        let findings = parse_pylint_json(PYLINT_OUTPUT).unwrap();
        let owners = vec![
            FindingOwner {
                id: "fake.Client".into(),
                path: PathBuf::from("/tmp/pkg/fake/_client.py"),
                start_line: 2,
                end_line: 20,
            },
            FindingOwner {
                id: "fake.Client.send".into(),
                path: PathBuf::from("/tmp/pkg/fake/_client.py"),
                start_line: 4,
                end_line: 8,
            },
        ];
        let mut assigned = Findings::assign(&findings, &owners);
        let send = assigned.take("fake.Client.send");
        assert_eq!(send.len(), 1);
        assert_eq!(send[0].target_id, "fake.Client.send");
        assert!(assigned.take("fake.Client").is_empty());
        let global = assigned.take(GLOBAL_TARGET);
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].text, "package-name-incorrect: Package name is wrong.");
        assert!(assigned.is_empty());
    }

    #[test]
    fn messages_without_link_are_trimmed() {
        assert_eq!(split_help_link("  plain text "), ("plain text".to_string(), None));
    }

    #[test]
    fn empty_output_has_no_findings() {
        assert!(parse_pylint_json("").unwrap().is_empty());
    }
}
