//! Navigation tree derived from declaration lines.
//!
//! Declaration tokens carry a render class (`namespace`, `class`, `enum`,
//! `function`); any line whose tokens carry one of these becomes a navigation
//! entry, nested the same way the lines are nested.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::review::{ReviewLine, ReviewLines};

const NAVIGABLE_CLASSES: &[&str] = &["namespace", "class", "enum", "function"];

/// One entry of the navigation panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct NavigationItem {
    pub text: String,
    pub navigation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_items: Vec<NavigationItem>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

pub(crate) fn from_review_lines(lines: &ReviewLines) -> Vec<NavigationItem> {
    lines.iter().filter_map(item_for_line).collect()
}

fn item_for_line(line: &ReviewLine) -> Option<NavigationItem> {
    let id = line.line_id.as_deref()?;
    let (token, class) = line.tokens.iter().find_map(|token| {
        token
            .render_classes
            .iter()
            .find(|class| NAVIGABLE_CLASSES.contains(&class.as_str()))
            .map(|class| (token, class))
    })?;

    let text = token
        .navigation_display_name
        .clone()
        .unwrap_or_else(|| token.value.clone());
    let mut tags = BTreeMap::new();
    tags.insert("TypeKind".to_string(), class.clone());

    Some(NavigationItem {
        text,
        navigation_id: id.to_string(),
        child_items: from_review_lines(&line.children),
        tags,
    })
}
