//! Core data models shared by the scanner, the session reducer, and the
//! remote store.
//!
//! Wire names use camelCase so that records written by the external
//! ingestion process and entries written by earlier clients decode as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::MatchResult;

/// Maximum number of history entries loaded for a device at startup.
pub const HISTORY_LIMIT: usize = 50;

/// A schedule document keyed by a 9-digit identifier.
///
/// Produced upstream with every shift already formatted; this crate only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    /// Pre-formatted shift strings, in display order.
    #[serde(default)]
    pub shifts: Vec<String>,
    /// Opaque last-updated marker set by the ingestion process.
    #[serde(default)]
    pub updated_at: String,
}

/// One rendered result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayResult {
    pub formatted: String,
}

impl DisplayResult {
    pub fn new(formatted: impl Into<String>) -> Self {
        Self {
            formatted: formatted.into(),
        }
    }
}

impl From<&MatchResult> for DisplayResult {
    fn from(m: &MatchResult) -> Self {
        Self::new(m.formatted.clone())
    }
}

/// Anonymous per-installation partition key for search history.
///
/// This is not a user identity and carries no authentication meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A completed search, as stored in the history log.
///
/// Entries are append-only: once built they are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub term: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub result_count: usize,
    #[serde(default)]
    pub saved_results: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
}

impl HistoryEntry {
    /// Build the entry for a search that completed with `results`.
    ///
    /// A zero-result search is still recorded.
    pub fn record(
        term: &str,
        results: &[DisplayResult],
        device: Option<&DeviceId>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: now_ms.to_string(),
            term: term.to_string(),
            timestamp: now_ms,
            result_count: results.len(),
            saved_results: results.iter().map(|r| r.formatted.clone()).collect(),
            device_id: device.cloned(),
        }
    }

    /// Key of this entry in the remote history log.
    pub fn document_id(&self) -> String {
        format!("{}_{}", self.timestamp, self.term)
    }
}
