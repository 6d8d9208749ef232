//! Silence-window entities and the payload sent to the backend.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SilenceError, SilenceResult};

/// A backend-owned silence window: alerts matching `pattern` are
/// suppressed between `start_time` and `end_time`, optionally on a
/// recurrence schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceWindow {
    pub id: String,
    pub pattern: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields of a window to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPayload {
    pub pattern: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

impl WindowPayload {
    /// Reject an unusable payload before anything touches the network.
    pub fn validate(&self) -> SilenceResult<()> {
        if self.pattern.trim().is_empty() {
            return Err(SilenceError::Validation("pattern must not be empty".into()));
        }
        if self.start_time >= self.end_time {
            return Err(SilenceError::Validation(
                "start time must be before end time".into(),
            ));
        }
        Ok(())
    }

    /// Exact field equality used when the backend did not echo the id of
    /// the window it created: same start, same end, same normalized
    /// recurrence.
    pub fn matches(&self, window: &SilenceWindow) -> bool {
        window.start_time == self.start_time
            && window.end_time == self.end_time
            && normalize_recurrence(window.recurrence.as_deref())
                == normalize_recurrence(self.recurrence.as_deref())
    }
}

/// Trim whitespace and collapse blank recurrence strings to `None`.
pub fn normalize_recurrence(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Total preference order among candidate windows during id resolution:
/// most recent `created_at` first, then most recent `updated_at`, then
/// lexicographically greatest id. Absent timestamps sort last.
pub fn resolution_order(a: &SilenceWindow, b: &SilenceWindow) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| b.id.cmp(&a.id))
}
