//! Root namespace discovery and module enumeration.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::ParserError;

const INIT_FILE: &str = "__init__.py";
const TOP_LEVEL_FILE: &str = "top_level.txt";
const EXTEND_PATH_MARKER: &str = ".extend_path(__path__, __name__)";
const SKIPPED_DIRS: [&str; 6] = ["tests", "test", "build", "samples", "doc", "docs"];

/// One importable module found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    pub name: String,
    pub path: PathBuf,
    pub is_package: bool,
}

/// Where the package's sources live and which modules they hold.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    /// Directory that contains the top-level package directory.
    pub source_root: PathBuf,
    pub namespace: String,
    /// Every module under `source_root`, sorted by name.
    pub modules: Vec<ModuleFile>,
}

impl PackageLayout {
    /// Walk `root` for packages and decide the root namespace.
    ///
    /// `*.dist-info/top_level.txt` wins; otherwise the first `__init__.py` (in
    /// sorted walk order) that is more than an `extend_path` shim.
    pub fn discover(root: &Path) -> Result<Self, ParserError> {
        let source_root = source_root(root);
        let modules = find_modules(&source_root);
        let namespace = top_level_namespace(root)
            .or_else(|| first_real_package(&modules))
            .ok_or_else(|| ParserError::NamespaceNotFound(root.to_path_buf()))?;
        tracing::info!(namespace, modules = modules.len(), "discovered package layout");
        Ok(Self {
            source_root,
            namespace,
            modules,
        })
    }

    /// Directory of the root namespace package.
    #[must_use]
    pub fn namespace_dir(&self) -> PathBuf {
        self.namespace
            .split('.')
            .fold(self.source_root.clone(), |dir, part| dir.join(part))
    }

    /// Modules inside `namespace` (dotted-prefix match).
    pub fn modules_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a ModuleFile> {
        self.modules
            .iter()
            .filter(move |m| in_namespace(&m.name, namespace))
    }
}

/// `azure.fake.models` is inside `azure.fake`; `azure.fakeish` is not.
#[must_use]
pub fn in_namespace(name: &str, namespace: &str) -> bool {
    namespace.is_empty()
        || name == namespace
        || name
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn source_root(root: &Path) -> PathBuf {
    let src = root.join("src");
    if src.is_dir() {
        return src;
    }
    if root.join(INIT_FILE).is_file()
        && let Some(parent) = root.parent()
    {
        return parent.to_path_buf();
    }
    root.to_path_buf()
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name)
}

fn find_modules(source_root: &Path) -> Vec<ModuleFile> {
    let mut builder = WalkBuilder::new(source_root);
    builder
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_some_and(|ft| ft.is_dir())
                || !is_skipped_dir(&entry.file_name().to_string_lossy())
        });

    let mut modules = Vec::new();
    for entry in builder.build().filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        let dir = entry.path();
        if !dir.join(INIT_FILE).is_file() {
            continue;
        }
        let Some(package) = module_name(source_root, dir) else {
            continue;
        };
        modules.push(ModuleFile {
            name: package.clone(),
            path: dir.join(INIT_FILE),
            is_package: true,
        });
        let Ok(files) = std::fs::read_dir(dir) else {
            continue;
        };
        for file in files.filter_map(Result::ok) {
            let path = file.path();
            let file_name = file.file_name().to_string_lossy().into_owned();
            if let Some(stem) = file_name.strip_suffix(".py")
                && !stem.starts_with('_')
                && path.is_file()
            {
                modules.push(ModuleFile {
                    name: format!("{package}.{stem}"),
                    path,
                    is_package: false,
                });
            }
        }
    }
    modules.sort_by(|a, b| a.name.cmp(&b.name));
    modules
}

fn module_name(source_root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(source_root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("."))
}

fn top_level_namespace(root: &Path) -> Option<String> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .build()
        .filter_map(Result::ok)
        .map(ignore::DirEntry::into_path)
        .filter(|p| {
            p.file_name().is_some_and(|n| n == TOP_LEVEL_FILE)
                && p.parent()
                    .and_then(Path::extension)
                    .is_some_and(|ext| ext == "dist-info" || ext == "egg-info")
        })
        .collect();
    files.sort();
    let text = std::fs::read_to_string(files.first()?).ok()?;
    let name = text.lines().next()?.trim();
    (!name.is_empty()).then(|| {
        tracing::info!(namespace = name, "root module from {TOP_LEVEL_FILE}");
        name.to_string()
    })
}

fn first_real_package(modules: &[ModuleFile]) -> Option<String> {
    modules
        .iter()
        .filter(|m| m.is_package)
        .find(|m| {
            let content = std::fs::read_to_string(&m.path).unwrap_or_default();
            let lines: Vec<&str> = content.lines().collect();
            lines.len() > 1 || lines.first().is_some_and(|l| !l.contains(EXTEND_PATH_MARKER))
        })
        .map(|m| m.name.clone())
}
