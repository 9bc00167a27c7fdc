//! Package name, version and extras from distribution metadata or build files.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static SETUP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bname\s*=\s*['"]([^'"]+)['"]"#).expect("static regex")
});
static SETUP_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bversion\s*=\s*['"]([^'"]+)['"]"#).expect("static regex")
});
static SETUP_EXTRAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"extras_require\s*=\s*\{([^}]*)\}").expect("static regex")
});
static DICT_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]\s*:"#).expect("static regex"));
static VERSION_CONST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:VERSION|__version__)\s*=\s*['"]([^'"]+)['"]"#)
        .expect("static regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Unconditional extras, in declaration order.
    pub extras: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PyProject {
    project: Option<ProjectTable>,
}

#[derive(Debug, Deserialize)]
struct ProjectTable {
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "optional-dependencies", default)]
    optional_dependencies: toml::Table,
}

impl PackageMetadata {
    /// Read metadata from the first source found under `root`.
    ///
    /// Order: `*.dist-info/METADATA`, `PKG-INFO`, `pyproject.toml` `[project]`, `setup.py`.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        let mut metadata = Self::default();
        if let Some(path) = find_dist_info_metadata(root) {
            metadata.merge(Self::from_core_metadata(&read(&path)));
        }
        let pkg_info = root.join("PKG-INFO");
        if pkg_info.is_file() {
            metadata.merge(Self::from_core_metadata(&read(&pkg_info)));
        }
        let pyproject = root.join("pyproject.toml");
        if pyproject.is_file() {
            metadata.merge(Self::from_pyproject(&read(&pyproject)));
        }
        let setup = root.join("setup.py");
        if setup.is_file() {
            metadata.merge(Self::from_setup_py(&read(&setup)));
        }
        if metadata.version.is_none() {
            metadata.version = find_version_file(root);
        }
        tracing::debug!(?metadata, root = %root.display(), "package metadata");
        metadata
    }

    /// Keep already-known values; fill the rest from `other`.
    fn merge(&mut self, other: Self) {
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.version.is_none() {
            self.version = other.version;
        }
        if self.extras.is_empty() {
            self.extras = other.extras;
        }
    }

    /// Parse RFC 822 style core metadata (`METADATA` / `PKG-INFO`).
    #[must_use]
    pub fn from_core_metadata(text: &str) -> Self {
        let mut metadata = Self::default();
        for line in text.lines() {
            if line.is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Name:") {
                metadata.name = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Version:") {
                metadata.version = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Provides-Extra:") {
                push_extra(&mut metadata.extras, value.trim());
            }
        }
        metadata
    }

    #[must_use]
    pub fn from_pyproject(text: &str) -> Self {
        let project = match toml::from_str::<PyProject>(text) {
            Ok(PyProject {
                project: Some(project),
            }) => project,
            Ok(_) => return Self::default(),
            Err(error) => {
                tracing::debug!(%error, "unreadable pyproject.toml");
                return Self::default();
            }
        };
        let mut extras = Vec::new();
        for key in project.optional_dependencies.keys() {
            push_extra(&mut extras, key);
        }
        Self {
            name: project.name,
            version: project.version,
            extras,
        }
    }

    #[must_use]
    pub fn from_setup_py(text: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };
        let mut extras = Vec::new();
        if let Some(body) = SETUP_EXTRAS_RE.captures(text).and_then(|c| c.get(1)) {
            for key in DICT_KEY_RE.captures_iter(body.as_str()) {
                if let Some(key) = key.get(1) {
                    push_extra(&mut extras, key.as_str());
                }
            }
        }
        Self {
            name: capture(&SETUP_NAME_RE),
            version: capture(&SETUP_VERSION_RE),
            extras,
        }
    }
}

fn push_extra(extras: &mut Vec<String>, extra: &str) {
    if extra.is_empty() || extra.contains(':') || extras.iter().any(|e| e == extra) {
        return;
    }
    extras.push(extra.to_string());
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|error| {
        tracing::debug!(path = %path.display(), %error, "metadata file unreadable");
        String::new()
    })
}

fn find_dist_info_metadata(root: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir() && p.extension().is_some_and(|ext| ext == "dist-info"))
        .map(|p| p.join("METADATA"))
        .filter(|p| p.is_file())
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// `VERSION = "x"` or `__version__ = "x"` from a `_version.py` under `root`.
fn find_version_file(root: &Path) -> Option<String> {
    let mut files: Vec<PathBuf> = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .build()
        .filter_map(Result::ok)
        .map(ignore::DirEntry::into_path)
        .filter(|p| p.file_name().is_some_and(|n| n == "_version.py"))
        .collect();
    files.sort();
    files.iter().find_map(|path| {
        VERSION_CONST_RE
            .captures(&read(path))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn core_metadata_fields() {
        let meta = PackageMetadata::from_core_metadata(
            "Metadata-Version: 2.1\nName: azure-fake\nVersion: 1.2.3\nProvides-Extra: aio\nProvides-Extra: aio\n\nBody text\nName: ignored\n",
        );
        assert_eq!(meta.name.as_deref(), Some("azure-fake"));
        assert_eq!(meta.version.as_deref(), Some("1.2.3"));
        assert_eq!(meta.extras, vec!["aio".to_string()]);
    }

    #[test]
    fn pyproject_project_table() {
        let meta = PackageMetadata::from_pyproject(
            "[project]\nname = \"fake\"\nversion = \"0.4.0\"\n\n[project.optional-dependencies]\naio = [\"aiohttp\"]\n",
        );
        assert_eq!(meta.name.as_deref(), Some("fake"));
        assert_eq!(meta.extras, vec!["aio".to_string()]);
    }

    #[test]
    fn setup_py_ignores_conditional_extras() {
        let meta = PackageMetadata::from_setup_py(
            "setup(\n    name=\"azure-fake\",\n    version=VERSION,\n    extras_require={\":python_version<'3.0'\": ['x'], 'aio': ['aiohttp']},\n)\n",
        );
        assert_eq!(meta.name.as_deref(), Some("azure-fake"));
        assert_eq!(meta.version, None);
        assert_eq!(meta.extras, vec!["aio".to_string()]);
    }

    #[test]
    fn version_file_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setup.py"), "setup(name='fake', version=VERSION)\n").unwrap();
        std::fs::create_dir_all(dir.path().join("fake")).unwrap();
        std::fs::write(dir.path().join("fake/_version.py"), "VERSION = \"2.0.0b1\"\n").unwrap();
        let meta = PackageMetadata::load(dir.path());
        assert_eq!(meta.name.as_deref(), Some("fake"));
        assert_eq!(meta.version.as_deref(), Some("2.0.0b1"));
    }
}
