//! Generation pipeline: package path in, `ApiView` out.
//!
//! 1. Validate paths and extract archives
//! 2. Read package metadata, optionally install the package
//! 3. Run the linter once over the package
//! 4. Discover the root namespace and parse every module under it
//! 5. Build module nodes and register them in the node index
//! 6. Emit the preamble and every module, attaching linter findings
//! 7. Reject duplicate line ids and derive navigation

use std::path::{Path, PathBuf};

use apistub_core::{ApiView, ReviewLine, ReviewLines, ReviewToken};

use crate::linter::{FindingOwner, Findings, GLOBAL_TARGET, LintFinding, Linter};
use crate::metadata_map::MetadataMap;
use crate::node_index::NodeIndex;
use crate::nodes::{BuildContext, EmitContext, HandwrittenPolicy, ModuleNode, PatchFileMarker};
use crate::package::archive::{self, is_archive};
use crate::package::{PackageLayout, PackageMetadata, SourceIndex};
use crate::python::Installer;
use crate::{PARSER_VERSION, ParserError};

const UNKNOWN_VERSION: &str = "0.0.0";
const UNKNOWN_PYTHON: &str = "unknown";

/// Inputs of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Package directory or `.whl` / `.zip` / `.tar.gz` archive.
    pub package_path: PathBuf,
    /// Extraction base for archives; the system temp dir when unset.
    pub temp_path: Option<PathBuf>,
    pub mapping_path: Option<PathBuf>,
    /// Only emit modules inside this dotted namespace.
    pub filter_namespace: Option<String>,
    pub source_url: Option<String>,
    /// Interpreter version shown in the preamble.
    pub python_version: Option<String>,
    pub install: bool,
    pub skip_lint: bool,
}

/// Runs the pipeline with pluggable linter, installer and handwritten policy.
pub struct StubGenerator {
    options: GenerateOptions,
    linter: Option<Box<dyn Linter>>,
    installer: Option<Box<dyn Installer>>,
    handwritten: Box<dyn HandwrittenPolicy>,
}

impl StubGenerator {
    #[must_use]
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            linter: None,
            installer: None,
            handwritten: Box::new(PatchFileMarker),
        }
    }

    #[must_use]
    pub fn with_linter(mut self, linter: Box<dyn Linter>) -> Self {
        self.linter = Some(linter);
        self
    }

    #[must_use]
    pub fn with_installer(mut self, installer: Box<dyn Installer>) -> Self {
        self.installer = Some(installer);
        self
    }

    #[must_use]
    pub fn with_handwritten_policy(mut self, policy: Box<dyn HandwrittenPolicy>) -> Self {
        self.handwritten = policy;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Run every step and return the finished view.
    ///
    /// # Errors
    ///
    /// Invalid paths, archive or install failures, a missing root package,
    /// node index conflicts and duplicate line ids.
    pub fn generate(&self) -> Result<ApiView, ParserError> {
        // Step 1: inputs
        let package_root = self.prepare()?;

        // Step 2: metadata and install
        let metadata = PackageMetadata::load(&package_root);
        if self.options.install {
            match &self.installer {
                Some(installer) => installer.install(&package_root, &metadata.extras)?,
                None => tracing::warn!("install requested but no installer configured"),
            }
        }

        // Step 3: lint
        let lint_findings = self.lint(&package_root);

        // Step 4: layout and sources
        let layout = PackageLayout::discover(&package_root)?;
        let namespace = self
            .options
            .filter_namespace
            .clone()
            .unwrap_or_else(|| layout.namespace.clone());
        let sources = SourceIndex::build(&layout.source_root, &layout.namespace)?;
        let mapping = MetadataMap::load(&package_root, self.options.mapping_path.as_deref());

        // Step 5: nodes
        let ctx = BuildContext::new(&sources, self.handwritten.as_ref());
        let modules: Vec<ModuleNode> = layout
            .modules_in(&namespace)
            .map(|module| ModuleNode::build(&module.name, &ctx))
            .filter(|module| {
                if module.is_empty() {
                    tracing::debug!(module = module.name, "module exposes nothing; skipped");
                }
                !module.is_empty()
            })
            .collect();
        let mut index = NodeIndex::new();
        for module in &modules {
            module.register(&mut index)?;
        }
        let owners: Vec<FindingOwner> = modules.iter().flat_map(ModuleNode::finding_owners).collect();
        let findings = Findings::assign(&lint_findings, &owners);

        // Step 6: emit
        let package_name = metadata
            .name
            .clone()
            .unwrap_or_else(|| layout.namespace.replace('.', "-"));
        let version = metadata.version.as_deref().unwrap_or(UNKNOWN_VERSION);
        let mut view = ApiView::new(package_name, version, PARSER_VERSION, namespace.as_str());
        view.cross_language_package_id = mapping.package_id().map(str::to_string);

        let mut cx = EmitContext::new(&index, &mapping, findings);
        cx.attach_findings(GLOBAL_TARGET);
        let mut lines = ReviewLines::new();
        self.preamble(&mut lines);
        for module in &modules {
            module.emit(&mut lines, &mut cx);
        }
        view.review_lines = lines;
        view.diagnostics = cx.into_diagnostics();

        // Step 7: checks and navigation
        let duplicates = view.duplicate_line_ids();
        if !duplicates.is_empty() {
            return Err(ParserError::DuplicateLineIds { ids: duplicates });
        }
        view.build_navigation();
        tracing::info!(
            package = view.package_name,
            modules = modules.len(),
            diagnostics = view.diagnostics.len(),
            "api view generated"
        );
        Ok(view)
    }

    /// Check the input paths; extract archives and return the package root.
    fn prepare(&self) -> Result<PathBuf, ParserError> {
        let package_path = &self.options.package_path;
        if !package_path.exists() {
            return Err(ParserError::InvalidPath {
                kind: "package",
                path: package_path.clone(),
            });
        }
        if let Some(temp) = &self.options.temp_path
            && !temp.is_dir()
        {
            return Err(ParserError::InvalidPath {
                kind: "temp",
                path: temp.clone(),
            });
        }
        if is_archive(package_path) {
            let temp = self
                .options
                .temp_path
                .clone()
                .unwrap_or_else(std::env::temp_dir);
            return archive::extract(package_path, &temp);
        }
        if package_path.is_file() {
            return Err(ParserError::UnsupportedArchive(package_path.clone()));
        }
        Ok(package_path.clone())
    }

    fn lint(&self, package_root: &Path) -> Vec<LintFinding> {
        if self.options.skip_lint {
            return Vec::new();
        }
        let Some(linter) = &self.linter else {
            return Vec::new();
        };
        match linter.lint(package_root) {
            Ok(findings) => findings,
            Err(error) => {
                tracing::warn!(%error, "linter failed; continuing without findings");
                Vec::new()
            }
        }
    }

    /// Tool and runtime versions, the optional source link, two blank lines.
    fn preamble(&self, lines: &mut ReviewLines) {
        let python_version = self
            .options
            .python_version
            .as_deref()
            .unwrap_or(UNKNOWN_PYTHON);
        let mut header = ReviewLine::with_id(GLOBAL_TARGET);
        header.push(
            ReviewToken::comment(format!(
                "# Package is parsed using apistub(version:{PARSER_VERSION}), Python version: {python_version}"
            ))
            .with_skip_diff(),
        );
        lines.push(header);

        if let Some(url) = &self.options.source_url {
            let mut line = ReviewLine::new();
            line.push(
                ReviewToken::literal("# Source URL: ")
                    .without_suffix_space()
                    .with_skip_diff(),
            );
            line.push(ReviewToken::external_url(url.as_str()).with_skip_diff());
            lines.push(line);
        }
        lines.push(ReviewLine::blank());
        lines.push(ReviewLine::blank());
    }
}
