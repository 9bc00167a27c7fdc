//! Python runtime and installation settings.

use serde::{Deserialize, Serialize};

fn default_executable() -> String {
    "python".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PythonConfig {
    /// Interpreter used to run pylint, pip and the version probe.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Runtime version shown in the preamble. Probed from the interpreter when unset.
    #[serde(default)]
    pub version: Option<String>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            version: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InstallConfig {
    /// Install the package and its declared extras before analysis.
    #[serde(default)]
    pub enabled: bool,
}
