//! Versioned import/export of origin marks.
//!
//! Export produces a self-describing JSON document with entry counts and
//! ISO8601 timestamps. Import accepts that document back, or the legacy
//! bare `{windowId: {...}}` map, detected as tagged variants: try the
//! versioned shape first, fall back to legacy, otherwise reject.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::CodecError;
use crate::meta::{OriginMode, WindowOriginMeta};
use crate::sanitize::{parse_epoch_millis, sanitize_entry};
use crate::store::{ModeCounts, OriginStore};
use crate::ttl::RetentionTtl;

/// Schema version of the export document.
pub const EXPORT_SCHEMA_VERSION: u64 = 1;

/// One exported origin mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub window_id: String,
    pub source_id: String,
    pub mode: OriginMode,
    /// ISO8601 with millisecond precision.
    pub created_at: String,
}

/// The versioned export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub schema_version: u64,
    pub exported_at: String,
    pub ttl_days: u32,
    pub total: usize,
    pub mode_counts: ModeCounts,
    pub entries: Vec<ExportEntry>,
}

fn iso_millis(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the export document. Entries come out newest-first; exporting an
/// empty store is an error, not an empty file.
pub fn export_document(
    store: &OriginStore,
    ttl: RetentionTtl,
    now: DateTime<Utc>,
) -> Result<ExportDocument, CodecError> {
    if store.is_empty() {
        return Err(CodecError::NothingToExport);
    }

    let mut marks: Vec<(&String, &WindowOriginMeta)> = store.iter().collect();
    marks.sort_by(|(id_a, a), (id_b, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| id_a.cmp(id_b))
    });

    let entries = marks
        .into_iter()
        .map(|(id, meta)| ExportEntry {
            window_id: id.clone(),
            source_id: meta.source_id.clone(),
            mode: meta.mode,
            created_at: iso_millis(meta.created_at),
        })
        .collect();

    Ok(ExportDocument {
        schema_version: EXPORT_SCHEMA_VERSION,
        exported_at: iso_millis(now),
        ttl_days: ttl.days(),
        total: store.len(),
        mode_counts: store.mode_counts(),
        entries,
    })
}

/// Pretty-printed export JSON.
pub fn export_json(
    store: &OriginStore,
    ttl: RetentionTtl,
    now: DateTime<Utc>,
) -> Result<String, CodecError> {
    let doc = export_document(store, ttl, now)?;
    serde_json::to_string_pretty(&doc).map_err(|err| CodecError::Parse(err.to_string()))
}

/// Download filename for an export taken at `now`: the ISO8601 timestamp
/// with ':' and '.' replaced by '-' so it is filesystem-safe everywhere.
pub fn export_filename(now: DateTime<Utc>) -> String {
    let stamp = iso_millis(now).replace([':', '.'], "-");
    format!("silence-origin-marks-{stamp}.json")
}

/// Parse an import file into a sanitized store.
///
/// All-or-nothing at the file level: malformed JSON or an unrecognized
/// top-level shape is a hard error with zero partial effects. A
/// structurally valid file yielding no usable entries is the distinct
/// soft `NothingImported` error. Duplicate window ids keep the entry
/// with the greatest `created_at` (ties go to the later occurrence).
pub fn parse_import(text: &str, now: DateTime<Utc>) -> Result<OriginStore, CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| CodecError::Parse(err.to_string()))?;
    let Some(obj) = value.as_object() else {
        return Err(CodecError::UnsupportedShape);
    };

    let store = match obj.get("entries") {
        Some(entries) => {
            let items = entries.as_array().ok_or(CodecError::UnsupportedShape)?;
            parse_versioned_entries(items, now)
        }
        None => parse_legacy_map(obj, now),
    };

    if store.is_empty() {
        return Err(CodecError::NothingImported);
    }
    Ok(store)
}

fn parse_versioned_entries(items: &[Value], now: DateTime<Utc>) -> OriginStore {
    let mut store = OriginStore::new();
    for item in items {
        let Some(obj) = item.as_object() else {
            debug!("skipping non-object import entry");
            continue;
        };
        let Some(window_id) = obj.get("window_id").and_then(Value::as_str).filter(|s| !s.is_empty())
        else {
            debug!("skipping import entry without window_id");
            continue;
        };
        let Some(source_id) = obj.get("source_id").and_then(Value::as_str) else {
            debug!(window_id, "skipping import entry without string source_id");
            continue;
        };
        let Some(mode) = obj.get("mode").and_then(Value::as_str).and_then(OriginMode::parse)
        else {
            debug!(window_id, "skipping import entry with unrecognized mode");
            continue;
        };
        let created_at = obj
            .get("created_at")
            .and_then(parse_import_timestamp)
            .unwrap_or(now);

        upsert_latest(&mut store, window_id, WindowOriginMeta::new(source_id, mode, created_at));
    }
    store
}

fn parse_legacy_map(obj: &serde_json::Map<String, Value>, now: DateTime<Utc>) -> OriginStore {
    let mut store = OriginStore::new();
    for (window_id, entry) in obj {
        if let Some(meta) = sanitize_entry(window_id, entry, now) {
            upsert_latest(&mut store, window_id, meta);
        }
    }
    store
}

/// Epoch-ms number or ISO8601 string.
fn parse_import_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if value.is_number() {
        return parse_epoch_millis(value);
    }
    let text = value.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn upsert_latest(store: &mut OriginStore, window_id: &str, meta: WindowOriginMeta) {
    let newer = match store.get(window_id) {
        Some(existing) => meta.created_at >= existing.created_at,
        None => true,
    };
    if newer {
        store
            .entries_mut()
            .insert(window_id.to_string(), meta);
    }
}

/// Entrywise latest-`created_at`-wins merge. Keys only in `current` are
/// preserved; ties resolve to the imported side.
pub fn merge(current: &OriginStore, imported: &OriginStore) -> OriginStore {
    let mut merged = current.clone();
    for (window_id, incoming) in imported.iter() {
        upsert_latest(&mut merged, window_id, incoming.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ms(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ts).unwrap()
    }

    fn mark(source: &str, mode: OriginMode, ts: i64) -> WindowOriginMeta {
        WindowOriginMeta::new(source, mode, ms(ts))
    }

    #[test]
    fn test_export_counts_and_order() {
        let mut store = OriginStore::new();
        store
            .insert("w1", mark("w0", OriginMode::Replaced, 1_700_000_000_000))
            .unwrap();

        let doc = export_document(&store, RetentionTtl::SevenDays, ms(1_700_000_100_000)).unwrap();
        assert_eq!(doc.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(doc.total, 1);
        assert_eq!(doc.mode_counts, ModeCounts { replaced: 1, cloned: 0 });
        assert_eq!(doc.entries[0].window_id, "w1");
        assert_eq!(doc.ttl_days, 7);
    }

    #[test]
    fn test_export_sorts_newest_first() {
        let mut store = OriginStore::new();
        store.insert("older", mark("s", OriginMode::Cloned, 1_000)).unwrap();
        store.insert("newer", mark("s", OriginMode::Cloned, 2_000)).unwrap();

        let doc = export_document(&store, RetentionTtl::SevenDays, ms(3_000)).unwrap();
        assert_eq!(doc.entries[0].window_id, "newer");
        assert_eq!(doc.entries[1].window_id, "older");
    }

    #[test]
    fn test_export_empty_store_is_error() {
        let err = export_document(&OriginStore::new(), RetentionTtl::SevenDays, Utc::now());
        assert!(matches!(err, Err(CodecError::NothingToExport)));
    }

    #[test]
    fn test_export_filename_has_no_colons_or_dots_before_extension() {
        let name = export_filename(ms(1_700_000_000_000));
        assert!(name.starts_with("silence-origin-marks-"));
        assert!(name.ends_with(".json"));
        let stem = name.trim_end_matches(".json");
        assert!(!stem.contains(':'));
        assert!(!stem.contains('.'));
    }

    #[test]
    fn test_roundtrip_preserves_millis() {
        let mut store = OriginStore::new();
        store
            .insert("w1", mark("w0", OriginMode::Replaced, 1_700_000_000_123))
            .unwrap();
        store
            .insert("w2", mark("w0", OriginMode::Cloned, 1_700_000_000_456))
            .unwrap();

        let json = export_json(&store, RetentionTtl::SevenDays, Utc::now()).unwrap();
        let back = parse_import(&json, Utc::now()).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_import_versioned_accepts_ms_and_iso_timestamps() {
        let now = ms(2_000_000_000_000);
        let text = r#"{
            "entries": [
                {"window_id": "a", "source_id": "s", "mode": "cloned", "created_at": 1700000000123},
                {"window_id": "b", "source_id": "s", "mode": "replaced", "created_at": "2023-11-14T22:13:20.123Z"},
                {"window_id": "c", "source_id": "s", "mode": "cloned", "created_at": "not a date"}
            ]
        }"#;
        let store = parse_import(text, now).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("a").unwrap().created_at.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(store.get("b").unwrap().created_at.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(store.get("c").unwrap().created_at, now);
    }

    #[test]
    fn test_import_rejects_malformed_entries_keeps_valid() {
        let text = r#"{
            "entries": [
                {"window_id": "ok", "source_id": "s", "mode": "cloned", "created_at": 1700000000000},
                {"window_id": "bad", "source_id": "s", "mode": "bogus", "created_at": 1700000000000},
                {"window_id": "", "source_id": "s", "mode": "cloned"},
                "not an object"
            ]
        }"#;
        let store = parse_import(text, Utc::now()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("ok").is_some());
    }

    #[test]
    fn test_import_duplicate_ids_latest_wins() {
        let text = r#"{
            "entries": [
                {"window_id": "w", "source_id": "late", "mode": "cloned", "created_at": 2000},
                {"window_id": "w", "source_id": "early", "mode": "cloned", "created_at": 1000}
            ]
        }"#;
        let store = parse_import(text, Utc::now()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("w").unwrap().source_id, "late");
    }

    #[test]
    fn test_import_legacy_map_shape() {
        let text = r#"{
            "w1": {"sourceId": "w0", "mode": "replaced", "createdAt": 1700000000000},
            "w2": {"sourceId": "w0", "mode": "bogus", "createdAt": 1700000000000}
        }"#;
        let store = parse_import(text, Utc::now()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("w1").unwrap().mode, OriginMode::Replaced);
    }

    #[test]
    fn test_import_empty_entries_is_nothing_imported() {
        let err = parse_import(r#"{"entries": []}"#, Utc::now());
        assert!(matches!(err, Err(CodecError::NothingImported)));
        assert!(err.unwrap_err().is_soft());
    }

    #[test]
    fn test_import_invalid_json_is_hard_error() {
        let err = parse_import("not json at all {", Utc::now());
        assert!(matches!(err, Err(CodecError::Parse(_))));
        assert!(!parse_import("[1]", Utc::now()).unwrap_err().is_soft());
    }

    #[test]
    fn test_import_non_object_top_level_rejected() {
        assert!(matches!(
            parse_import("[]", Utc::now()),
            Err(CodecError::UnsupportedShape)
        ));
        assert!(matches!(
            parse_import(r#"{"entries": "nope"}"#, Utc::now()),
            Err(CodecError::UnsupportedShape)
        ));
    }

    #[test]
    fn test_merge_identity() {
        let mut a = OriginStore::new();
        a.insert("w1", mark("s", OriginMode::Cloned, 1_000)).unwrap();

        assert_eq!(merge(&a, &OriginStore::new()), a);
        assert_eq!(merge(&OriginStore::new(), &a), a);
    }

    #[test]
    fn test_merge_latest_wins_and_ties_to_imported() {
        let mut current = OriginStore::new();
        current.insert("w", mark("current", OriginMode::Cloned, 2_000)).unwrap();
        current.insert("only-current", mark("c", OriginMode::Cloned, 1_000)).unwrap();

        let mut imported = OriginStore::new();
        imported.insert("w", mark("imported-old", OriginMode::Replaced, 1_000)).unwrap();

        let merged = merge(&current, &imported);
        assert_eq!(merged.get("w").unwrap().source_id, "current");
        assert!(merged.get("only-current").is_some());

        // Equal timestamps resolve to the imported side.
        let mut tied = OriginStore::new();
        tied.insert("w", mark("imported-tied", OriginMode::Replaced, 2_000)).unwrap();
        let merged = merge(&current, &tied);
        assert_eq!(merged.get("w").unwrap().source_id, "imported-tied");

        // And the winning side's timestamp is the max of the two.
        let mut newer = OriginStore::new();
        newer.insert("w", mark("imported-new", OriginMode::Replaced, 3_000)).unwrap();
        let merged = merge(&current, &newer);
        assert_eq!(merged.get("w").unwrap().created_at.timestamp_millis(), 3_000);
    }
}
