//! Remote store abstraction for Shift Lookup.
//!
//! Two collaborators sit behind these traits: the schedule store, read by
//! exact identifier, and the history log, an append-only collection
//! partitioned by [`DeviceId`]. Both are treated as opaque, eventually
//! consistent key-value services; no cross-record atomicity is assumed.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DeviceId, HistoryEntry, ScheduleRecord};

/// Point lookup of pre-formatted schedules.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Fetch the schedule stored under `key`.
    ///
    /// Returns `Ok(None)` when no record exists; that is a normal outcome.
    /// `Err` is reserved for transport or backend failures.
    async fn get_schedule(&self, key: &str) -> Result<Option<ScheduleRecord>>;
}

/// Append-only search history log.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`append`](HistoryLog::append) | Write an entry under [`HistoryEntry::document_id`] |
/// | [`recent`](HistoryLog::recent) | Newest-first entries for one device, capped |
#[async_trait]
pub trait HistoryLog: Send + Sync {
    async fn append(&self, entry: &HistoryEntry) -> Result<()>;

    /// Entries whose `device_id` equals `device`, ordered by timestamp
    /// descending, at most `limit` of them.
    async fn recent(&self, device: &DeviceId, limit: usize) -> Result<Vec<HistoryEntry>>;
}
