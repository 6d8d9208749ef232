//! Provenance metadata for derived silence windows.
//!
//! When a silence window is edited, the console either replaces the
//! original (delete old, create new) or clones it (keep old, create new).
//! `WindowOriginMeta` records which of the two happened and when, keyed by
//! the id of the window that came out of the edit.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How a derived window relates to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginMode {
    /// The source window was deleted after the derived window was created.
    Replaced,
    /// The source window was kept alongside the derived window.
    Cloned,
}

impl OriginMode {
    /// The exact wire token for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            OriginMode::Replaced => "replaced",
            OriginMode::Cloned => "cloned",
        }
    }

    /// Parse the exact wire token. Anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "replaced" => Some(OriginMode::Replaced),
            "cloned" => Some(OriginMode::Cloned),
            _ => None,
        }
    }
}

impl std::fmt::Display for OriginMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provenance record for one derived silence window.
///
/// The wire shape matches the stored console format: camelCase keys with
/// `createdAt` as milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOriginMeta {
    /// Id of the window this one was derived from.
    pub source_id: String,
    /// Whether the source was replaced or kept.
    pub mode: OriginMode,
    /// When the derivation happened. Millisecond granularity.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl WindowOriginMeta {
    /// Build a record, truncating the timestamp to millisecond precision
    /// so that stored and exported forms round-trip exactly.
    pub fn new(source_id: impl Into<String>, mode: OriginMode, created_at: DateTime<Utc>) -> Self {
        Self {
            source_id: source_id.into(),
            mode,
            created_at: truncate_to_millis(created_at),
        }
    }
}

/// Drop sub-millisecond precision from a timestamp.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ts.timestamp_millis())
        .single()
        .unwrap_or(ts)
}
