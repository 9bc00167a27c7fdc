//! Linter integration settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LinterConfig {
    /// Skip running pylint entirely.
    #[serde(default)]
    pub skip: bool,

    /// Extra arguments appended to the pylint invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}
