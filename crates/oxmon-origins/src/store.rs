//! In-memory origin store keyed by derived-window id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{OriginError, OriginResult};
use crate::meta::{OriginMode, WindowOriginMeta};

/// Aggregate counts per origin mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCounts {
    pub replaced: usize,
    pub cloned: usize,
}

/// Mapping from derived-window id to its provenance record.
///
/// Serializes transparently as the bare `{windowId: {...}}` map the
/// console stores under its local-storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginStore {
    entries: HashMap<String, WindowOriginMeta>,
}

impl OriginStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any provenance has been recorded at all.
    pub fn has_any(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Look up the provenance record for a window id.
    pub fn get(&self, window_id: &str) -> Option<&WindowOriginMeta> {
        self.entries.get(window_id)
    }

    pub fn contains(&self, window_id: &str) -> bool {
        self.entries.contains_key(window_id)
    }

    /// Record provenance for a derived window. Empty ids are rejected.
    pub fn insert(
        &mut self,
        window_id: impl Into<String>,
        meta: WindowOriginMeta,
    ) -> OriginResult<()> {
        let window_id = window_id.into();
        if window_id.is_empty() {
            return Err(OriginError::EmptyWindowId);
        }
        self.entries.insert(window_id, meta);
        Ok(())
    }

    /// Remove the record for a window id, returning it if present.
    pub fn remove(&mut self, window_id: &str) -> Option<WindowOriginMeta> {
        self.entries.remove(window_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WindowOriginMeta)> {
        self.entries.iter()
    }

    /// Count entries per mode.
    pub fn mode_counts(&self) -> ModeCounts {
        let mut counts = ModeCounts::default();
        for meta in self.entries.values() {
            match meta.mode {
                OriginMode::Replaced => counts.replaced += 1,
                OriginMode::Cloned => counts.cloned += 1,
            }
        }
        counts
    }

    pub(crate) fn entries_mut(&mut self) -> &mut HashMap<String, WindowOriginMeta> {
        &mut self.entries
    }
}

impl FromIterator<(String, WindowOriginMeta)> for OriginStore {
    fn from_iter<I: IntoIterator<Item = (String, WindowOriginMeta)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().filter(|(id, _)| !id.is_empty()).collect(),
        }
    }
}
