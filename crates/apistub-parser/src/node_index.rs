//! Registry from fully-qualified entity name to navigation id.
//!
//! Entries are textual keys, never node references, so type-name tokens can
//! link to declarations without tying node lifetimes together.

use std::collections::HashMap;

use crate::ParserError;

/// What a registered name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Class,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub navigation_id: String,
    pub kind: EntryKind,
}

#[derive(Debug, Default)]
pub struct NodeIndex {
    entries: HashMap<String, IndexEntry>,
    aliases: HashMap<String, String>,
}

impl NodeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`; fails if it is already present.
    pub fn add(&mut self, name: &str, entry: IndexEntry) -> Result<(), ParserError> {
        if self.entries.contains_key(name) {
            return Err(ParserError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    /// Point a secondary name (e.g. the definition-site path of a re-exported
    /// class) at an existing navigation id. The first alias wins.
    pub fn alias(&mut self, name: &str, navigation_id: &str) {
        self.aliases
            .entry(name.to_string())
            .or_insert_with(|| navigation_id.to_string());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.get(name.strip_prefix('~').unwrap_or(name))
    }

    /// Navigation id for `name`, ignoring a leading `~`.
    #[must_use]
    pub fn get_navigation_id(&self, name: &str) -> Option<&str> {
        let name = name.strip_prefix('~').unwrap_or(name);
        self.entries
            .get(name)
            .map(|entry| entry.navigation_id.as_str())
            .or_else(|| self.aliases.get(name).map(String::as_str))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_entry(id: &str) -> IndexEntry {
        IndexEntry {
            navigation_id: id.to_string(),
            kind: EntryKind::Class,
        }
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut index = NodeIndex::new();
        index.add("pkg.Client", class_entry("pkg.Client")).unwrap();
        let err = index
            .add("pkg.Client", class_entry("pkg.Client"))
            .unwrap_err();
        assert!(matches!(err, ParserError::DuplicateName { name } if name == "pkg.Client"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn lookup_ignores_tilde() {
        let mut index = NodeIndex::new();
        index.add("pkg.Client", class_entry("pkg.Client")).unwrap();
        assert_eq!(index.get_navigation_id("~pkg.Client"), Some("pkg.Client"));
        assert_eq!(index.get_navigation_id("pkg.client"), None);
    }

    #[test]
    fn aliases_resolve_without_conflicting() {
        let mut index = NodeIndex::new();
        index.alias("pkg._models.Client", "pkg.Client");
        index.alias("pkg._models.Client", "pkg.aio.Client");
        index
            .add("pkg._models.Client", class_entry("pkg._models.Client"))
            .unwrap();
        assert_eq!(
            index.get_navigation_id("pkg._models.Client"),
            Some("pkg._models.Client")
        );
        index.alias("pkg.models.Other", "pkg.Other");
        assert_eq!(index.get_navigation_id("~pkg.models.Other"), Some("pkg.Other"));
    }
}
