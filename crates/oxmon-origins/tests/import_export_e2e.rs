//! End-to-end tests for the import/export codec against persistence.

use chrono::{TimeZone, Utc};

use oxmon_origins::{
    export_json, load_origins, merge, parse_import, save_origins, CodecError, OriginMode,
    OriginStore, RetentionTtl, WindowOriginMeta,
};
use oxmon_state::fakes::MemoryKeyValueStore;

fn mark(source: &str, mode: OriginMode, ts_ms: i64) -> WindowOriginMeta {
    WindowOriginMeta::new(source, mode, Utc.timestamp_millis_opt(ts_ms).unwrap())
}

#[test]
fn test_export_import_merge_persist_cycle() {
    let kv = MemoryKeyValueStore::new();

    // Machine A exports.
    let mut theirs = OriginStore::new();
    theirs
        .insert("w1", mark("w0", OriginMode::Replaced, 1_700_000_000_000))
        .unwrap();
    theirs
        .insert("w2", mark("w0", OriginMode::Cloned, 1_700_000_100_000))
        .unwrap();
    let file = export_json(&theirs, RetentionTtl::SevenDays, Utc::now()).unwrap();

    // Machine B has an overlapping local store.
    let mut ours = OriginStore::new();
    ours.insert("w2", mark("other", OriginMode::Replaced, 1_700_000_200_000))
        .unwrap();
    ours.insert("w3", mark("w0", OriginMode::Cloned, 1_700_000_000_000))
        .unwrap();

    let imported = parse_import(&file, Utc::now()).unwrap();
    let merged = merge(&ours, &imported);

    // w1 arrives, w2 keeps the newer local record, w3 survives.
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get("w1").unwrap().mode, OriginMode::Replaced);
    assert_eq!(merged.get("w2").unwrap().source_id, "other");
    assert!(merged.get("w3").is_some());

    save_origins(&kv, &merged).unwrap();
    assert_eq!(load_origins(&kv, Utc::now()), merged);
}

#[test]
fn test_import_failure_leaves_store_untouched() {
    let mut store = OriginStore::new();
    store
        .insert("w1", mark("w0", OriginMode::Cloned, 1_700_000_000_000))
        .unwrap();
    let before = store.clone();

    for text in ["{broken", r#"{"entries": []}"#, "[]"] {
        assert!(parse_import(text, Utc::now()).is_err());
        // Nothing to merge, nothing changed.
        assert_eq!(store, before);
    }
}

#[test]
fn test_soft_and_hard_import_errors_are_distinct() {
    let soft = parse_import(r#"{"entries": []}"#, Utc::now()).unwrap_err();
    assert!(soft.is_soft());
    assert!(matches!(soft, CodecError::NothingImported));

    let hard = parse_import("{broken", Utc::now()).unwrap_err();
    assert!(!hard.is_soft());
    assert!(matches!(hard, CodecError::Parse(_)));
}

#[test]
fn test_legacy_export_from_old_console_imports_cleanly() {
    // The shape the console stored before the versioned document existed.
    let legacy = r#"{
        "w-new": {"sourceId": "w-old", "mode": "replaced", "createdAt": 1700000000000},
        "w-copy": {"sourceId": "w-old", "mode": "cloned", "createdAt": 1700000000500}
    }"#;
    let store = parse_import(legacy, Utc::now()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("w-new").unwrap().mode, OriginMode::Replaced);
    assert_eq!(
        store.get("w-copy").unwrap().created_at.timestamp_millis(),
        1_700_000_000_500
    );
}
