//! Character list panel model
//!
//! Builds the browsable row list from the catalog plus completion and
//! avatar-cache state: incomplete entries first, completed last, numeric id
//! order within each group. The live filter toggles visibility on the rows
//! already built instead of re-querying the catalog.

use crate::catalog::{compare_ids, Catalog};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Placeholder shown when a record has no display name
const UNKNOWN_NAME: &str = "(unknown)";

/// One rendered catalog entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PanelRow {
    pub id: String,
    pub name: String,
    pub completed: bool,
    pub has_avatar: bool,
    pub visible: bool,
}

/// The panel: ordered rows with per-row visibility
#[derive(Clone, Debug, Default)]
pub struct Panel {
    rows: Vec<PanelRow>,
}

impl Panel {
    /// Build rows for the whole catalog, sorted incomplete-first then by
    /// numeric id. All rows start visible.
    pub fn build(
        catalog: &Catalog,
        completed: &BTreeSet<String>,
        cached_avatars: &HashSet<String>,
    ) -> Self {
        let mut rows: Vec<PanelRow> = catalog
            .iter()
            .map(|(id, record)| {
                let name = if record.name.is_empty() {
                    UNKNOWN_NAME.to_string()
                } else {
                    record.name.clone()
                };
                let has_avatar = record
                    .avatar
                    .as_ref()
                    .map(|key| cached_avatars.contains(key))
                    .unwrap_or(false);
                PanelRow {
                    id: id.clone(),
                    name,
                    completed: completed.contains(id),
                    has_avatar,
                    visible: true,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then_with(|| compare_ids(&a.id, &b.id))
        });

        Self { rows }
    }

    /// Apply a live filter: case-insensitive substring match on the display
    /// name. An empty query shows every row.
    pub fn set_filter(&mut self, query: &str) {
        let needle = query.to_lowercase();
        for row in &mut self.rows {
            row.visible = needle.is_empty() || row.name.to_lowercase().contains(&needle);
        }
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn visible_rows(&self) -> Vec<&PanelRow> {
        self.rows.iter().filter(|r| r.visible).collect()
    }

    /// Plain-text rendering of the visible rows
    pub fn render_lines(&self) -> Vec<String> {
        self.visible_rows()
            .iter()
            .map(|row| {
                let mark = if row.completed { "✓" } else { "○" };
                let avatar = if row.has_avatar { "" } else { "  [no avatar]" };
                format!("{} {:>5}  {}{}", mark, row.id, row.name, avatar)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_catalog() -> Catalog {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "12": {"name": "Alice", "avatar": "alice.png"},
                "7": {"name": "Bob"},
                "100": {"name": ""}
            }"#,
        )
        .unwrap();
        Catalog::load_from_file(file.path()).unwrap()
    }

    #[test]
    fn test_incomplete_rows_sort_first() {
        let catalog = sample_catalog();
        let completed: BTreeSet<String> = ["7".to_string()].into_iter().collect();
        let panel = Panel::build(&catalog, &completed, &HashSet::new());

        let ids: Vec<&str> = panel.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "100", "7"]);
    }

    #[test]
    fn test_empty_name_gets_placeholder() {
        let catalog = sample_catalog();
        let panel = Panel::build(&catalog, &BTreeSet::new(), &HashSet::new());

        let row = panel.rows().iter().find(|r| r.id == "100").unwrap();
        assert_eq!(row.name, "(unknown)");
    }

    #[test]
    fn test_avatar_flag_requires_cached_key() {
        let catalog = sample_catalog();
        let mut cached = HashSet::new();
        cached.insert("alice.png".to_string());
        let panel = Panel::build(&catalog, &BTreeSet::new(), &cached);

        let alice = panel.rows().iter().find(|r| r.id == "12").unwrap();
        let bob = panel.rows().iter().find(|r| r.id == "7").unwrap();
        assert!(alice.has_avatar);
        assert!(!bob.has_avatar);
    }

    #[test]
    fn test_filter_hides_non_matching_rows() {
        let catalog = sample_catalog();
        let mut panel = Panel::build(&catalog, &BTreeSet::new(), &HashSet::new());

        panel.set_filter("ali");
        let visible: Vec<&str> = panel.visible_rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(visible, vec!["12"]);

        panel.set_filter("zzz");
        assert!(panel.visible_rows().is_empty());

        panel.set_filter("");
        assert_eq!(panel.visible_rows().len(), 3);
    }

    #[test]
    fn test_render_lines_show_state() {
        let catalog = sample_catalog();
        let completed: BTreeSet<String> = ["7".to_string()].into_iter().collect();
        let mut cached = HashSet::new();
        cached.insert("alice.png".to_string());
        let panel = Panel::build(&catalog, &completed, &cached);

        let lines = panel.render_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("○"));
        assert!(lines[0].contains("Alice"));
        assert!(!lines[0].contains("[no avatar]"));
        assert!(lines[2].starts_with("✓"));
        assert!(lines[2].contains("Bob"));
        assert!(lines[2].contains("[no avatar]"));
    }
}
