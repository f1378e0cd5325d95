//! Cached entry records.
//!
//! # Responsibility
//! - Define the stored shapes of unicode and custom entries.
//! - Keep serde field names aligned with the remote JSON payloads.
//!
//! # Invariants
//! - `UnicodeEntry::code` is unique within one locale partition.
//! - `CustomEntry::shortcode` is unique within the custom partition.
//! - Entries are replaced wholesale on re-sync, never patched.

use serde::{Deserialize, Serialize};

/// One reference-data record for a given locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnicodeEntry {
    /// Primary key within the locale partition (e.g. `1F600`).
    #[serde(alias = "hexcode")]
    pub code: String,
    /// Group classification. Entries without a group are unreachable via group queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
    /// Sort rank within the group; absent sorts as `0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Display label.
    #[serde(alias = "annotation")]
    pub label: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Rendered glyph, when the source provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unicode: Option<String>,
    #[serde(default)]
    pub shortcodes: Vec<String>,
}

impl UnicodeEntry {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            group: None,
            order: None,
            label: label.into(),
            tags: Vec::new(),
            unicode: None,
            shortcodes: Vec::new(),
        }
    }

    /// Order used for in-group sorting.
    pub fn sort_order(&self) -> i64 {
        self.order.unwrap_or(0)
    }
}

/// One locally-defined record served by the custom-entries endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub shortcode: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub static_url: String,
    #[serde(default = "default_visible_in_picker")]
    pub visible_in_picker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CustomEntry {
    pub fn new(shortcode: impl Into<String>) -> Self {
        Self {
            shortcode: shortcode.into(),
            url: String::new(),
            static_url: String::new(),
            visible_in_picker: true,
            category: None,
        }
    }
}

fn default_visible_in_picker() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{CustomEntry, UnicodeEntry};

    #[test]
    fn unicode_entry_accepts_source_aliases() {
        let entry: UnicodeEntry = serde_json::from_str(
            r#"{"hexcode":"1F600","annotation":"grinning face","group":0,"order":1,"tags":["face"]}"#,
        )
        .unwrap();
        assert_eq!(entry.code, "1F600");
        assert_eq!(entry.label, "grinning face");
        assert_eq!(entry.group, Some(0));
        assert!(entry.shortcodes.is_empty());
    }

    #[test]
    fn missing_order_sorts_as_zero() {
        let entry = UnicodeEntry::new("1F44B", "waving hand");
        assert_eq!(entry.sort_order(), 0);
    }

    #[test]
    fn custom_entry_defaults_to_visible() {
        let entry: CustomEntry =
            serde_json::from_str(r#"{"shortcode":"blobcat","url":"https://x/blobcat.png"}"#)
                .unwrap();
        assert!(entry.visible_in_picker);
        assert_eq!(entry.category, None);
        assert_eq!(entry.static_url, "");
    }
}
