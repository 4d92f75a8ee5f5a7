//! Static fallback verses
//!
//! The table is loaded once at process start, either from the resource
//! compiled into this crate or from an operator-supplied JSON file with the
//! same shape:
//!
//! ```json
//! { "comfort": { "reference": "...", "text": "...", "prayer": "..." }, ... }
//! ```
//!
//! Keys must be [`SituationId`] values. A `comfort` entry is mandatory since
//! it is served whenever the requested situation has no entry of its own.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, VerseError};
use crate::situation::SituationId;
use crate::verse::VerseResult;

const BUILTIN_FALLBACK_JSON: &str = include_str!("../data/fallback_verses.json");

/// Immutable situation → verse mapping
#[derive(Debug, Clone)]
pub struct FallbackTable {
    entries: BTreeMap<SituationId, VerseResult>,
    default: VerseResult,
}

impl FallbackTable {
    /// Load the table compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_FALLBACK_JSON)
    }

    /// Load a table from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| VerseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a table
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: BTreeMap<SituationId, VerseResult> = serde_json::from_str(raw)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: BTreeMap<SituationId, VerseResult>) -> Result<Self> {
        for (id, verse) in &entries {
            if let Some(field) = verse.missing_field() {
                return Err(VerseError::InvalidEntry {
                    situation: id.to_string(),
                    reason: format!("'{}' is empty", field),
                });
            }
        }

        let default = entries
            .get(&SituationId::DEFAULT)
            .cloned()
            .ok_or_else(|| VerseError::MissingDefault(SituationId::DEFAULT.to_string()))?;

        Ok(Self { entries, default })
    }

    /// Fallback verse for a resolved situation, or the default entry
    pub fn select(&self, id: Option<SituationId>) -> &VerseResult {
        id.and_then(|id| self.entries.get(&id))
            .unwrap_or(&self.default)
    }

    pub fn get(&self, id: SituationId) -> Option<&VerseResult> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
