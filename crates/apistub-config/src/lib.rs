//! # apistub-config
//!
//! Layered configuration loading for apistub using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`APISTUB_*` prefix, `__` as separator)
//! 2. Project-level `apistub.toml`
//! 3. User-level `~/.config/apistub/config.toml`
//! 4. Built-in defaults
//!
//! Command-line flags are applied on top of the loaded value by the binary.
//!
//! # Environment Variable Mapping
//!
//! `APISTUB_PACKAGE__PATH` -> `package.path`, `APISTUB_LINTER__SKIP` -> `linter.skip`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use apistub_config::ApistubConfig;
//!
//! let config = ApistubConfig::load().expect("config");
//! if config.linter.skip {
//!     println!("pylint disabled");
//! }
//! ```

mod error;
mod linter;
mod output;
mod package;
mod python;

pub use error::ConfigError;
pub use linter::LinterConfig;
pub use output::OutputConfig;
pub use package::PackageConfig;
pub use python::{InstallConfig, PythonConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the project-local config.
pub const PROJECT_CONFIG_FILE: &str = "apistub.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApistubConfig {
    #[serde(default)]
    pub package: PackageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub linter: LinterConfig,
    #[serde(default)]
    pub python: PythonConfig,
    #[serde(default)]
    pub install: InstallConfig,
}

impl ApistubConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables (`APISTUB_*` prefix)
    /// 2. `apistub.toml` (project-local)
    /// 3. `~/.config/apistub/config.toml` (user-global)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load with an explicit config file in place of the project-local one.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment_with(Some(path)).extract().map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        Self::figment_with(None)
    }

    fn figment_with(project_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path =
            project_file.map_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE), Path::to_path_buf);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("APISTUB_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("apistub").join("config.toml"))
    }

    /// Check cross-field constraints after flags have been applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package.path.is_none() {
            return Err(ConfigError::Missing {
                field: "package.path".into(),
            });
        }
        self.package.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = ApistubConfig::default();
        assert!(config.package.path.is_none());
        assert!(!config.linter.skip);
        assert!(!config.install.enabled);
        assert!(config.output.pretty);
        assert_eq!(config.python.executable, "python");
    }

    #[test]
    fn figment_builds_without_files() {
        let config: ApistubConfig = ApistubConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert!(!config.output.markdown);
        assert_eq!(config.output.out_path, PathBuf::from("."));
    }

    #[test]
    fn validate_requires_package_path() {
        let config = ApistubConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing { field }) if field == "package.path"
        ));
    }
}
