//! In-memory fake of the silence-window API (testing only)
//!
//! Backed by a `Mutex<Vec<SilenceWindow>>`, with switches to suppress the
//! created-id echo and to inject failures per operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{CreatedWindow, SilenceWindowApi};
use crate::error::{ApiError, ApiResult};
use crate::window::{SilenceWindow, WindowPayload};

/// In-memory backend fake.
#[derive(Debug, Default)]
pub struct FakeSilenceApi {
    windows: Mutex<Vec<SilenceWindow>>,
    suppress_created_id: AtomicBool,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
}

impl FakeSilenceApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing window.
    pub fn seed(&self, window: SilenceWindow) {
        self.windows.lock().unwrap().push(window);
    }

    /// Snapshot of the backend's current windows.
    pub fn windows(&self) -> Vec<SilenceWindow> {
        self.windows.lock().unwrap().clone()
    }

    /// Make `create` answer without echoing the new window's id.
    pub fn suppress_created_id(&self, on: bool) {
        self.suppress_created_id.store(on, Ordering::SeqCst);
    }

    pub fn fail_list(&self, on: bool) {
        self.fail_list.store(on, Ordering::SeqCst);
    }

    pub fn fail_create(&self, on: bool) {
        self.fail_create.store(on, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, on: bool) {
        self.fail_delete.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl SilenceWindowApi for FakeSilenceApi {
    async fn list(&self) -> ApiResult<Vec<SilenceWindow>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("injected list failure".into()));
        }
        Ok(self.windows())
    }

    async fn create(&self, payload: &WindowPayload) -> ApiResult<CreatedWindow> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("injected create failure".into()));
        }
        let window = SilenceWindow {
            id: uuid::Uuid::new_v4().to_string(),
            pattern: payload.pattern.clone(),
            start_time: payload.start_time,
            end_time: payload.end_time,
            recurrence: payload.recurrence.clone(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        let id = window.id.clone();
        self.windows.lock().unwrap().push(window);

        if self.suppress_created_id.load(Ordering::SeqCst) {
            Ok(CreatedWindow::default())
        } else {
            Ok(CreatedWindow { id: Some(id) })
        }
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "injected delete failure".into(),
            });
        }
        let mut windows = self.windows.lock().unwrap();
        let before = windows.len();
        windows.retain(|w| w.id != id);
        if windows.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: format!("window {id} not found"),
            });
        }
        Ok(())
    }
}
