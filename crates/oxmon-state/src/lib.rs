//! Oxmon-State: persistence boundary for Oxmon client-side state
//!
//! This crate provides the storage abstraction the silence-window
//! provenance feature persists through. It mirrors the browser
//! local-storage contract: a flat string namespace, synchronous access,
//! and best-effort writes the caller may choose to ignore.
//!
//! ## Key Components
//!
//! - `KeyValueStore`: the storage trait
//! - `DirKeyValueStore`: one-file-per-key directory backend
//! - `fakes`: in-memory and always-failing stores for tests

mod error;
pub mod fakes;
mod fs;
mod kv;

pub use error::{StorageError, StorageResult};
pub use fs::DirKeyValueStore;
pub use kv::KeyValueStore;
