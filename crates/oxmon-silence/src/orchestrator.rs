//! Edit-window workflow: replace or clone, then record provenance.
//!
//! The ordering guarantee is strict: the replacement window is created
//! before any attempt to delete the original, so a failure can never lose
//! the only copy of a window. A failed delete downgrades the operation to
//! a clone instead of failing it.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use oxmon_origins::{reconcile, OriginMode, OriginStore, RetentionTtl, WindowOriginMeta};

use crate::api::SilenceWindowApi;
use crate::error::{ApiResult, SilenceResult};
use crate::window::{resolution_order, SilenceWindow, WindowPayload};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Success,
    Warning,
    Error,
}

/// A transient, non-blocking message for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: NoticeSeverity::Error,
            message: message.into(),
        }
    }
}

/// One edit operation: derive a new window from `source_id`.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// The window being edited.
    pub source_id: String,
    /// The new window's fields.
    pub payload: WindowPayload,
    /// Delete the original after the new window exists.
    pub replace_original: bool,
}

/// What an edit operation did.
#[derive(Debug, Clone)]
pub struct EditReport {
    /// Id of the created window, when it could be resolved.
    pub created_id: Option<String>,
    /// Provenance mode recorded in the store, if any.
    pub recorded_mode: Option<OriginMode>,
    /// User-facing notices, in presentation order.
    pub notices: Vec<Notice>,
}

/// Run the edit workflow against the backend, recording provenance into
/// `store` when the created window's id can be resolved.
///
/// Failure semantics:
/// - invalid payload: error before any network call, nothing mutated
/// - create failure: error, nothing recorded
/// - delete failure in replace mode: downgraded to clone, with a warning
///   notice about the retained original plus a success notice for the copy
/// - list failure during id resolution: the new window stays unmarked
pub async fn edit_window(
    api: &dyn SilenceWindowApi,
    store: &mut OriginStore,
    request: &EditRequest,
    now: DateTime<Utc>,
) -> SilenceResult<EditReport> {
    request.payload.validate()?;

    let created = api.create(&request.payload).await?;

    let mut notices = Vec::new();
    let mode = if request.replace_original {
        match api.delete(&request.source_id).await {
            Ok(()) => {
                info!(source_id = %request.source_id, "original window deleted after edit");
                notices.push(Notice::success("Silence window updated; original replaced."));
                OriginMode::Replaced
            }
            Err(err) => {
                warn!(source_id = %request.source_id, %err, "delete failed, keeping original");
                notices.push(Notice::warning(format!(
                    "Could not delete original window {}; it was kept alongside the new one: {err}",
                    request.source_id
                )));
                notices.push(Notice::success("The edited copy itself was created successfully."));
                OriginMode::Cloned
            }
        }
    } else {
        notices.push(Notice::success("Silence window cloned; original kept."));
        OriginMode::Cloned
    };

    let created_id = match created.id.filter(|id| !id.is_empty()) {
        Some(id) => Some(id),
        None => match api.list().await {
            Ok(windows) => resolve_created_id(&windows, &request.payload, &request.source_id),
            Err(err) => {
                debug!(%err, "window list refresh failed, leaving the new window unmarked");
                None
            }
        },
    };

    let recorded_mode = match &created_id {
        Some(id) => store
            .insert(
                id.clone(),
                WindowOriginMeta::new(request.source_id.as_str(), mode, now),
            )
            .ok()
            .map(|_| mode),
        None => None,
    };

    Ok(EditReport {
        created_id,
        recorded_mode,
        notices,
    })
}

/// Pick which of `windows` is the one the edit just created: exact payload
/// match, original excluded, preferred by `resolution_order`. Returns
/// `None` when no candidate matches.
pub fn resolve_created_id(
    windows: &[SilenceWindow],
    payload: &WindowPayload,
    exclude_id: &str,
) -> Option<String> {
    let mut candidates: Vec<&SilenceWindow> = windows
        .iter()
        .filter(|w| w.id != exclude_id && payload.matches(w))
        .collect();
    candidates.sort_by(|a, b| resolution_order(a, b));
    candidates.first().map(|w| w.id.clone())
}

/// Reconcile the origin store against the backend's live window list,
/// dropping records for deleted windows and reapplying the TTL.
///
/// The `Cow` carries the structural-sharing contract through: a borrowed
/// result means nothing changed and no persist is needed.
pub async fn reconcile_with_backend<'a>(
    api: &dyn SilenceWindowApi,
    store: &'a OriginStore,
    ttl: RetentionTtl,
    now: DateTime<Utc>,
) -> ApiResult<Cow<'a, OriginStore>> {
    let windows = api.list().await?;
    let live: HashSet<String> = windows.into_iter().map(|w| w.id).collect();
    Ok(reconcile(store, &live, ttl.duration(), now))
}
