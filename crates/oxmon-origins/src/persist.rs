//! Load/save of the origin store and TTL setting over the KV boundary.
//!
//! Reads never fail: a missing key, unreadable backend, malformed JSON,
//! or wrong top-level shape all degrade to the empty store (or default
//! TTL). Writes return the storage error so the caller can decide to
//! discard it — persistence here is best-effort, never fatal.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use oxmon_state::{KeyValueStore, StorageResult};

use crate::sanitize::sanitize_entry;
use crate::store::OriginStore;
use crate::ttl::RetentionTtl;

/// Storage key for the origin store JSON document.
pub const ORIGIN_STORE_KEY: &str = "oxmon.notifications.silence.window-origins.v1";

/// Storage key for the retention setting (stringified day count).
pub const TTL_DAYS_KEY: &str = "oxmon.notifications.silence.window-origins.ttl-days.v1";

/// Load the origin store, sanitizing every entry. Never fails.
pub fn load_origins(kv: &dyn KeyValueStore, now: DateTime<Utc>) -> OriginStore {
    let raw = match kv.get(ORIGIN_STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return OriginStore::new(),
        Err(err) => {
            warn!(%err, "origin store unreadable, starting empty");
            return OriginStore::new();
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "stored origin document is not valid JSON, starting empty");
            return OriginStore::new();
        }
    };
    let Some(obj) = value.as_object() else {
        debug!("stored origin document is not an object, starting empty");
        return OriginStore::new();
    };

    obj.iter()
        .filter_map(|(id, entry)| sanitize_entry(id, entry, now).map(|meta| (id.clone(), meta)))
        .collect()
}

/// Persist the origin store. An empty store removes the key outright
/// rather than writing `{}`.
pub fn save_origins(kv: &dyn KeyValueStore, store: &OriginStore) -> StorageResult<()> {
    if store.is_empty() {
        return kv.remove(ORIGIN_STORE_KEY);
    }
    let json = serde_json::to_string(store)
        .map_err(|err| oxmon_state::StorageError::Backend(err.to_string()))?;
    kv.set(ORIGIN_STORE_KEY, &json)
}

/// Load the retention setting, normalizing anything unusable to the default.
pub fn load_ttl(kv: &dyn KeyValueStore) -> RetentionTtl {
    match kv.get(TTL_DAYS_KEY) {
        Ok(Some(raw)) => RetentionTtl::parse(&raw),
        Ok(None) => RetentionTtl::default(),
        Err(err) => {
            warn!(%err, "ttl setting unreadable, using default");
            RetentionTtl::default()
        }
    }
}

/// Persist the retention setting.
pub fn save_ttl(kv: &dyn KeyValueStore, ttl: RetentionTtl) -> StorageResult<()> {
    kv.set(TTL_DAYS_KEY, &ttl.days().to_string())
}
