mod common;

use common::{entry, memory_store, seed_locale};
use emoji_cache_core::{CacheError, CustomEntry, Locale, PartitionId, UnicodeEntry};

fn codes(entries: &[UnicodeEntry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.code.as_str()).collect()
}

#[test]
fn put_then_get_by_code_returns_stored_entry() {
    let store = memory_store();
    let mut grinning = entry("1F600", 0, Some(1), "grinning face", &["face", "grin"]);
    grinning.unicode = Some("😀".to_string());
    grinning.shortcodes = vec!["grinning".to_string()];
    seed_locale(&store, Locale::En, &[grinning.clone()]);

    assert_eq!(store.get_by_code("1F600", "en").unwrap(), Some(grinning));
    assert_eq!(store.get_by_code("1F601", "en").unwrap(), None);
}

#[test]
fn get_by_codes_filters_range_scan_to_requested_codes() {
    let store = memory_store();
    seed_locale(
        &store,
        Locale::En,
        &[
            entry("a", 0, Some(1), "alpha", &[]),
            entry("b", 0, Some(2), "bravo", &[]),
            entry("c", 0, Some(3), "charlie", &[]),
            entry("d", 0, Some(4), "delta", &[]),
        ],
    );

    let found = store.get_by_codes(&["c", "a"], "en").unwrap();
    assert_eq!(codes(&found), vec!["a", "c"]);

    let with_unknown = store.get_by_codes(&["b", "zz"], "en").unwrap();
    assert_eq!(codes(&with_unknown), vec!["b"]);

    let empty: [&str; 0] = [];
    assert!(store.get_by_codes(&empty, "en").unwrap().is_empty());
}

#[test]
fn get_by_tag_matches_prefix_case_insensitively() {
    let store = memory_store();
    seed_locale(
        &store,
        Locale::En,
        &[
            entry("1F600", 0, Some(1), "grinning face", &["Face", "grin"]),
            entry("1F601", 0, Some(2), "beaming face", &["face", "facet"]),
            entry("1F436", 3, Some(1), "dog face", &["dog"]),
        ],
    );

    let faces = store.get_by_tag("FACE", "en").unwrap();
    assert_eq!(codes(&faces), vec!["1F600", "1F601"]);

    let prefixed = store.get_by_tag("gr", "en").unwrap();
    assert_eq!(codes(&prefixed), vec!["1F600"]);

    assert!(store.get_by_tag("cat", "en").unwrap().is_empty());
}

#[test]
fn get_group_sorts_by_order_with_missing_order_first() {
    let store = memory_store();
    seed_locale(
        &store,
        Locale::En,
        &[
            entry("x", 1, Some(5), "x", &[]),
            entry("y", 1, Some(2), "y", &[]),
            entry("z", 1, None, "z", &[]),
            entry("other", 2, Some(1), "other", &[]),
        ],
    );

    let group = store.get_group(1, "en").unwrap();
    assert_eq!(codes(&group), vec!["z", "y", "x"]);
    assert!(store.get_group(9, "en").unwrap().is_empty());
}

#[test]
fn get_group_icon_returns_lowest_ordered_entry() {
    let store = memory_store();
    seed_locale(
        &store,
        Locale::En,
        &[
            entry("x", 1, Some(5), "x", &[]),
            entry("y", 1, Some(2), "y", &[]),
            entry("unordered", 1, None, "unordered", &[]),
            entry("only-unordered", 4, None, "only-unordered", &[]),
        ],
    );

    let icon = store.get_group_icon(1, "en").unwrap().unwrap();
    assert_eq!(icon.code, "y");
    assert_eq!(store.get_group_icon(7, "en").unwrap(), None);
    assert_eq!(store.get_group_icon(4, "en").unwrap(), None);
}

#[test]
fn reads_against_unloaded_locale_fail() {
    let store = memory_store();
    seed_locale(&store, Locale::En, &[entry("1F600", 0, Some(1), "grinning", &[])]);

    let err = store.get_by_code("1F600", "fr").unwrap_err();
    assert!(matches!(err, CacheError::LocaleNotLoaded(Locale::Fr)));
    assert_eq!(err.to_string(), "locale fr is not loaded in emoji database");

    assert!(matches!(
        store.get_group(0, "fr").unwrap_err(),
        CacheError::LocaleNotLoaded(Locale::Fr)
    ));
}

#[test]
fn locale_strings_are_normalized_before_reads() {
    let store = memory_store();
    seed_locale(&store, Locale::EnGb, &[entry("1F600", 0, Some(1), "grinning", &[])]);

    assert!(store.get_by_code("1F600", "en_GB").unwrap().is_some());
    assert!(store.get_by_code("1F600", "EN-gb").unwrap().is_some());
}

#[test]
fn rewriting_entry_replaces_its_tags() {
    let store = memory_store();
    seed_locale(&store, Locale::En, &[entry("1F600", 0, Some(1), "grinning", &["old"])]);
    seed_locale(&store, Locale::En, &[entry("1F600", 0, Some(1), "grinning", &["new"])]);

    assert!(store.get_by_tag("old", "en").unwrap().is_empty());
    assert_eq!(codes(&store.get_by_tag("new", "en").unwrap()), vec!["1F600"]);
    assert_eq!(store.count_partition(PartitionId::Locale(Locale::En)).unwrap(), 1);
}

#[test]
fn count_partition_tracks_each_partition() {
    let store = memory_store();
    seed_locale(
        &store,
        Locale::Ja,
        &[
            entry("1F600", 0, Some(1), "grinning", &[]),
            entry("1F601", 0, Some(2), "beaming", &[]),
        ],
    );
    store
        .put_custom_entries(&[CustomEntry::new("blobcat")])
        .unwrap();

    assert_eq!(store.count_partition(Locale::Ja.into()).unwrap(), 2);
    assert_eq!(store.count_partition(Locale::En.into()).unwrap(), 0);
    assert_eq!(store.count_partition(PartitionId::Custom).unwrap(), 1);
}

#[test]
fn etag_is_ignored_while_partition_is_empty() {
    let store = memory_store();
    store.put_etag("\"v1\"", Locale::En.into()).unwrap();
    assert_eq!(store.load_latest_etag("en").unwrap(), None);

    seed_locale(&store, Locale::En, &[entry("1F600", 0, Some(1), "grinning", &[])]);
    assert_eq!(store.load_latest_etag("en").unwrap().as_deref(), Some("\"v1\""));

    store.put_etag("\"v2\"", Locale::En.into()).unwrap();
    assert_eq!(store.load_latest_etag("en").unwrap().as_deref(), Some("\"v2\""));
}

#[test]
fn custom_lookups_by_shortcode() {
    let store = memory_store();
    let mut blobcat = CustomEntry::new("blobcat");
    blobcat.url = "https://example.test/blobcat.png".to_string();
    blobcat.category = Some("blobs".to_string());
    store
        .put_custom_entries(&[
            blobcat.clone(),
            CustomEntry::new("apple"),
            CustomEntry::new("zebra"),
        ])
        .unwrap();
    store.put_etag("\"c1\"", PartitionId::Custom).unwrap();

    assert_eq!(store.get_custom_by_shortcode("blobcat").unwrap(), Some(blobcat));
    assert_eq!(store.get_custom_by_shortcode("missing").unwrap(), None);

    let found = store
        .get_custom_by_shortcodes(&["zebra", "apple", "nope"])
        .unwrap();
    let shortcodes: Vec<&str> = found.iter().map(|entry| entry.shortcode.as_str()).collect();
    assert_eq!(shortcodes, vec!["apple", "zebra"]);

    assert_eq!(store.load_latest_etag("custom").unwrap().as_deref(), Some("\"c1\""));
}
