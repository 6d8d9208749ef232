//! Retention setting and TTL-based pruning of origin records.

use std::borrow::Cow;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::store::OriginStore;

/// How long origin records are retained. A closed set of choices; anything
/// unrecognized normalizes to the seven-day default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionTtl {
    OneDay,
    SevenDays,
    ThirtyDays,
}

impl RetentionTtl {
    pub const fn days(self) -> u32 {
        match self {
            RetentionTtl::OneDay => 1,
            RetentionTtl::SevenDays => 7,
            RetentionTtl::ThirtyDays => 30,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::days(self.days() as i64)
    }

    /// Map a day count onto the closed set.
    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            1 => Some(RetentionTtl::OneDay),
            7 => Some(RetentionTtl::SevenDays),
            30 => Some(RetentionTtl::ThirtyDays),
            _ => None,
        }
    }

    /// Parse the persisted stringified day count, normalizing invalid or
    /// missing values to the default.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::from_days)
            .unwrap_or_default()
    }
}

impl Default for RetentionTtl {
    fn default() -> Self {
        RetentionTtl::SevenDays
    }
}

impl std::fmt::Display for RetentionTtl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.days())
    }
}

/// Keep only entries whose age at `now` is within `ttl`.
///
/// Pure: the input is never mutated. When nothing is pruned the borrowed
/// input is returned as-is, so callers comparing references can skip a
/// redundant persist/update cycle.
///
/// A zero or negative `ttl` prunes everything older than `now`. Entries
/// with a future `created_at` (negative age) are never pruned.
pub fn filter_active(store: &OriginStore, ttl: Duration, now: DateTime<Utc>) -> Cow<'_, OriginStore> {
    let expired = store
        .iter()
        .any(|(_, meta)| now.signed_duration_since(meta.created_at) > ttl);
    if !expired {
        return Cow::Borrowed(store);
    }

    let retained: OriginStore = store
        .iter()
        .filter(|(_, meta)| now.signed_duration_since(meta.created_at) <= ttl)
        .map(|(id, meta)| (id.clone(), meta.clone()))
        .collect();
    Cow::Owned(retained)
}
