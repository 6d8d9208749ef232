//! Strict sanitizer for raw origin entries in the stored wire shape.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use crate::meta::{OriginMode, WindowOriginMeta};

/// Validate one raw `{sourceId, mode, createdAt}` object.
///
/// Rejects (returns `None`):
/// - empty window id
/// - missing or non-string `sourceId`
/// - `mode` that is not exactly `"replaced"` or `"cloned"`
///
/// `createdAt` is read-repaired: only a finite positive number of epoch
/// milliseconds is accepted, anything else defaults to `now`. Repair is a
/// read-path concession only; write paths always carry real timestamps.
pub(crate) fn sanitize_entry(
    window_id: &str,
    raw: &Value,
    now: DateTime<Utc>,
) -> Option<WindowOriginMeta> {
    if window_id.is_empty() {
        debug!("dropping origin entry with empty window id");
        return None;
    }
    let obj = raw.as_object()?;

    let source_id = match obj.get("sourceId").and_then(Value::as_str) {
        Some(s) => s,
        None => {
            debug!(window_id, "dropping origin entry without string sourceId");
            return None;
        }
    };

    let mode = match obj.get("mode").and_then(Value::as_str).and_then(OriginMode::parse) {
        Some(m) => m,
        None => {
            debug!(window_id, "dropping origin entry with unrecognized mode");
            return None;
        }
    };

    let created_at = obj
        .get("createdAt")
        .and_then(parse_epoch_millis)
        .unwrap_or(now);

    Some(WindowOriginMeta::new(source_id, mode, created_at))
}

/// Accept only finite positive epoch-millisecond numbers.
pub(crate) fn parse_epoch_millis(value: &Value) -> Option<DateTime<Utc>> {
    let ms = value.as_f64().filter(|v| v.is_finite() && *v > 0.0)?;
    Utc.timestamp_millis_opt(ms as i64).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_entry_accepted() {
        let raw = json!({"sourceId": "w0", "mode": "replaced", "createdAt": 1_700_000_000_000i64});
        let meta = sanitize_entry("w1", &raw, Utc::now()).unwrap();
        assert_eq!(meta.source_id, "w0");
        assert_eq!(meta.mode, OriginMode::Replaced);
        assert_eq!(meta.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_empty_window_id_rejected() {
        let raw = json!({"sourceId": "w0", "mode": "cloned", "createdAt": 1});
        assert!(sanitize_entry("", &raw, Utc::now()).is_none());
    }

    #[test]
    fn test_non_string_source_rejected() {
        let raw = json!({"sourceId": 42, "mode": "cloned", "createdAt": 1});
        assert!(sanitize_entry("w1", &raw, Utc::now()).is_none());
        let raw = json!({"mode": "cloned", "createdAt": 1});
        assert!(sanitize_entry("w1", &raw, Utc::now()).is_none());
    }

    #[test]
    fn test_bogus_mode_rejected() {
        let raw = json!({"sourceId": "w0", "mode": "bogus", "createdAt": 1});
        assert!(sanitize_entry("w1", &raw, Utc::now()).is_none());
    }

    #[test]
    fn test_bad_timestamp_repairs_to_now() {
        let now = Utc::now();
        for bad in [json!(-5), json!(0), json!("yesterday"), json!(null)] {
            let raw = json!({"sourceId": "w0", "mode": "cloned", "createdAt": bad});
            let meta = sanitize_entry("w1", &raw, now).unwrap();
            assert_eq!(meta.created_at.timestamp_millis(), now.timestamp_millis());
        }
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(sanitize_entry("w1", &json!("text"), Utc::now()).is_none());
        assert!(sanitize_entry("w1", &json!(null), Utc::now()).is_none());
    }
}
