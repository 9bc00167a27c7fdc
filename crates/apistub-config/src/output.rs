//! Serializer output settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_out_path() -> PathBuf {
    PathBuf::from(".")
}

const fn default_pretty() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Output directory, or a `.json` file path.
    #[serde(default = "default_out_path")]
    pub out_path: PathBuf,

    /// Also write a markdown rendering next to the JSON file.
    #[serde(default)]
    pub markdown: bool,

    /// Pretty-print the JSON output.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_path: default_out_path(),
            markdown: false,
            pretty: default_pretty(),
        }
    }
}
