//! Oxmon-Silence: silence-window lifecycle for the Oxmon console
//!
//! Editing a silence window is modeled as create-then-maybe-delete: the
//! replacement is created first, and only then is the original deleted
//! (replace mode) or kept (clone mode). The outcome is recorded as a
//! provenance mark in `oxmon-origins`.
//!
//! ## Key Components
//!
//! - `SilenceWindowApi`: backend CRUD trait
//! - `HttpSilenceApi`: REST client; `fakes::FakeSilenceApi` for tests
//! - `edit_window`: the replace-or-clone workflow
//! - `reconcile_with_backend`: prune marks for windows deleted upstream

mod api;
mod error;
pub mod fakes;
mod http;
mod orchestrator;
mod window;

pub use api::{CreatedWindow, SilenceWindowApi};
pub use error::{ApiError, ApiResult, SilenceError, SilenceResult};
pub use http::HttpSilenceApi;
pub use orchestrator::{
    edit_window, reconcile_with_backend, resolve_created_id, EditReport, EditRequest, Notice,
    NoticeSeverity,
};
pub use window::{normalize_recurrence, resolution_order, SilenceWindow, WindowPayload};
