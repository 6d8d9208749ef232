//! Oxmon-Origins: provenance bookkeeping for silence windows
//!
//! When an operator edits a maintenance silence window, the console
//! creates a new window and either deletes the original ("replace") or
//! keeps it ("clone"). This crate owns the local record of those
//! derivations: which window came from which, in which mode, and when —
//! with TTL-bounded retention, reconciliation against the live window
//! list, and a versioned import/export format.
//!
//! ## Key Components
//!
//! - `OriginStore` / `WindowOriginMeta`: the provenance map
//! - `filter_active` / `reconcile`: pruning, with structural sharing
//! - `codec`: versioned export plus legacy-tolerant import
//! - `persist`: best-effort load/save over the `oxmon-state` KV boundary

mod codec;
mod error;
mod meta;
mod persist;
mod reconcile;
mod sanitize;
mod store;
mod ttl;

pub use codec::{
    export_document, export_filename, export_json, merge, parse_import, ExportDocument,
    ExportEntry, EXPORT_SCHEMA_VERSION,
};
pub use error::{CodecError, OriginError, OriginResult};
pub use meta::{truncate_to_millis, OriginMode, WindowOriginMeta};
pub use persist::{
    load_origins, load_ttl, save_origins, save_ttl, ORIGIN_STORE_KEY, TTL_DAYS_KEY,
};
pub use reconcile::reconcile;
pub use store::{ModeCounts, OriginStore};
pub use ttl::{filter_active, RetentionTtl};
