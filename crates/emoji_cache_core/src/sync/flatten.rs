//! Expansion of compact locale records into stored entries.

use crate::model::entry::UnicodeEntry;
use serde::Deserialize;

/// Locale record as published in the compact data files.
///
/// Skin-tone variations are nested under `skins` and usually omit `group`
/// and `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompactRecord {
    #[serde(alias = "code")]
    pub hexcode: String,
    #[serde(default, alias = "annotation")]
    pub label: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub unicode: Option<String>,
    #[serde(default)]
    pub shortcodes: Vec<String>,
    #[serde(default)]
    pub skins: Vec<CompactRecord>,
}

impl CompactRecord {
    fn into_entry(self) -> UnicodeEntry {
        UnicodeEntry {
            code: self.hexcode,
            group: self.group,
            order: self.order,
            label: self.label,
            tags: self.tags,
            unicode: self.unicode,
            shortcodes: self.shortcodes,
        }
    }
}

/// Flattens records so every skin variation becomes its own entry.
///
/// Skins inherit the parent's `group` and `tags` when they carry none.
/// Skins nested below the first level are dropped.
pub fn flatten_compact_records(records: Vec<CompactRecord>) -> Vec<UnicodeEntry> {
    let mut entries = Vec::with_capacity(records.len());
    for mut record in records {
        let skins = std::mem::take(&mut record.skins);
        let parent_group = record.group;
        let parent_tags = record.tags.clone();
        entries.push(record.into_entry());

        for mut skin in skins {
            skin.skins.clear();
            if skin.group.is_none() {
                skin.group = parent_group;
            }
            if skin.tags.is_empty() {
                skin.tags = parent_tags.clone();
            }
            entries.push(skin.into_entry());
        }
    }
    entries
}
