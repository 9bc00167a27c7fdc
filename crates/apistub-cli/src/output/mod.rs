//! Token file serializers: the JSON file APIView consumes and an optional
//! markdown rendering.

use std::path::{Path, PathBuf};

use anyhow::Context;
use apistub_config::OutputConfig;
use apistub_core::ApiView;

pub mod markdown;

const JSON_EXTENSION: &str = "json";

/// `OUT/<package>_python.json`, or `OUT` itself when it names a `.json` file.
pub fn json_path(view: &ApiView, out_path: &Path) -> PathBuf {
    if out_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION))
    {
        out_path.to_path_buf()
    } else {
        out_path.join(format!("{}_python.json", view.package_name))
    }
}

pub fn render_json(view: &ApiView, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(view)?
    } else {
        serde_json::to_string(view)?
    };
    Ok(json)
}

/// Write the token file (and the markdown rendering when enabled); returns
/// the paths written.
pub fn write(view: &ApiView, config: &OutputConfig) -> anyhow::Result<Vec<PathBuf>> {
    let json_path = json_path(view, &config.out_path);
    if let Some(parent) = json_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    std::fs::write(&json_path, render_json(view, config.pretty)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;
    let mut written = vec![json_path.clone()];

    if config.markdown {
        let md_path = json_path.with_extension("md");
        std::fs::write(&md_path, markdown::render(view))
            .with_context(|| format!("failed to write {}", md_path.display()))?;
        written.push(md_path);
    }
    Ok(written)
}

/// JSON schema of the token file.
pub fn schema_json() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&schemars::schema_for!(ApiView))?)
}
