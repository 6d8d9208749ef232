//! Backend CRUD trait for silence windows.
//!
//! The backend owns the windows; this crate only consumes `list`,
//! `create`, and `delete`. Implementations: `HttpSilenceApi` against the
//! REST backend, and `fakes::FakeSilenceApi` for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::window::{SilenceWindow, WindowPayload};

/// Acknowledgment of a created window.
///
/// `id` is the created window's id when the backend echoes it. Backends
/// that answer with an empty body leave it `None`, and the caller falls
/// back to list-based resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedWindow {
    #[serde(default)]
    pub id: Option<String>,
}

/// Silence-window CRUD surface.
#[async_trait]
pub trait SilenceWindowApi: Send + Sync {
    /// Fetch all silence windows.
    async fn list(&self) -> ApiResult<Vec<SilenceWindow>>;

    /// Create a window from the payload.
    async fn create(&self, payload: &WindowPayload) -> ApiResult<CreatedWindow>;

    /// Delete a window by id.
    async fn delete(&self, id: &str) -> ApiResult<()>;
}
