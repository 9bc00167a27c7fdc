//! Package selection settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackageConfig {
    /// Package source tree or `.whl` / `.zip` / `.tar.gz` archive.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Base directory for archive extraction. Defaults to the system temp dir.
    #[serde(default)]
    pub temp_path: Option<PathBuf>,

    /// Cross-language mapping file (`apiview-properties.json` format).
    #[serde(default)]
    pub mapping_path: Option<PathBuf>,

    /// Restrict analysis to this dotted sub-namespace.
    #[serde(default)]
    pub filter_namespace: Option<String>,

    /// URL shown in the review preamble.
    #[serde(default)]
    pub source_url: Option<String>,
}

impl PackageConfig {
    /// Extraction base, falling back to the system temp directory.
    #[must_use]
    pub fn resolved_temp_path(&self) -> PathBuf {
        self.temp_path.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(filter) = self.filter_namespace.as_deref()
            && !is_dotted_identifier(filter)
        {
            return Err(ConfigError::InvalidValue {
                field: "package.filter_namespace".into(),
                reason: format!("'{filter}' is not a dotted module path"),
            });
        }
        if let Some(url) = self.source_url.as_deref()
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "package.source_url".into(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }
        Ok(())
    }
}

fn is_dotted_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}
