//! Markdown rendering of a token file: a heading plus the review text in a
//! fenced block.

use apistub_core::ApiView;

pub fn render(view: &ApiView) -> String {
    let mut out = format!(
        "# Package is parsed using apistub(version:{})\n\n## {} {}\n\n```python\n",
        view.parser_version, view.package_name, view.package_version
    );
    for line in view.render() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str("```\n");
    out
}
