//! Cross-language id mapping loaded from `apiview-properties.json`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::package::archive::is_archive;

/// Default mapping file name looked up in the package root.
pub const MAPPING_FILE_NAME: &str = "apiview-properties.json";

#[derive(Debug, Default, Deserialize)]
struct MappingFile {
    #[serde(rename = "CrossLanguagePackageId", default)]
    package_id: Option<String>,
    #[serde(rename = "CrossLanguageDefinitionId", default)]
    definition_ids: HashMap<String, String>,
}

/// Logical key to cross-language id map.
#[derive(Debug, Clone, Default)]
pub struct MetadataMap {
    package_id: Option<String>,
    ids: HashMap<String, String>,
}

impl MetadataMap {
    /// Load the mapping for a package.
    ///
    /// An explicit `mapping_path` wins. Otherwise `apiview-properties.json` is read
    /// from the package directory; archives get an empty map. Any read or decode
    /// failure yields an empty map.
    #[must_use]
    pub fn load(package_path: &Path, mapping_path: Option<&Path>) -> Self {
        let path = match mapping_path {
            Some(path) => path.to_path_buf(),
            None if is_archive(package_path) => return Self::default(),
            None => package_path.join(MAPPING_FILE_NAME),
        };
        match Self::read(&path) {
            Ok(map) => map,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "no cross-language mapping loaded");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, crate::ParserError> {
        let raw = std::fs::read_to_string(path)?;
        let file: MappingFile = serde_json::from_str(&raw)?;
        Ok(Self {
            package_id: file.package_id,
            ids: file.definition_ids,
        })
    }

    /// Build a map directly, mostly for tests.
    #[must_use]
    pub fn from_entries(
        package_id: Option<String>,
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            package_id,
            ids: entries.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn package_id(&self) -> Option<&str> {
        self.package_id.as_deref()
    }

    #[must_use]
    pub fn id_for(&self, key: &str) -> Option<&str> {
        self.ids.get(key).map(String::as_str)
    }

    /// Cross-language id for a line id; a trailing `_<digits>` overload suffix is ignored.
    #[must_use]
    pub fn id_for_line(&self, line_id: &str) -> Option<&str> {
        self.id_for(strip_overload_suffix(line_id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.package_id.is_none()
    }
}

/// `pkg.C.double_2` -> `pkg.C.double`; ids without a numeric suffix are unchanged.
#[must_use]
pub fn strip_overload_suffix(line_id: &str) -> &str {
    let digits_trimmed = line_id.trim_end_matches(|c: char| c.is_ascii_digit());
    if digits_trimmed.len() < line_id.len()
        && let Some(base) = digits_trimmed.strip_suffix('_')
    {
        return base;
    }
    line_id
}
