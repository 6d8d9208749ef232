//! Reconciliation of the origin store against the live window list.
//!
//! Runs on every refresh of the backend's window list: records whose
//! window was deleted by some other path are dropped, then TTL pruning is
//! reapplied. Idempotent by construction.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::store::OriginStore;

/// Drop records for windows no longer present upstream, then apply TTL.
///
/// Same structural-sharing contract as `filter_active`: the borrowed
/// input comes back untouched when nothing changed.
pub fn reconcile<'a>(
    store: &'a OriginStore,
    live_ids: &HashSet<String>,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Cow<'a, OriginStore> {
    let keep = |id: &str, created_at: DateTime<Utc>| {
        live_ids.contains(id) && now.signed_duration_since(created_at) <= ttl
    };

    let changed = store.iter().any(|(id, meta)| !keep(id, meta.created_at));
    if !changed {
        return Cow::Borrowed(store);
    }

    let retained: OriginStore = store
        .iter()
        .filter(|(id, meta)| keep(id, meta.created_at))
        .map(|(id, meta)| (id.clone(), meta.clone()))
        .collect();
    Cow::Owned(retained)
}
