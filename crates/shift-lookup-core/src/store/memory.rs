//! In-memory store implementing both [`ScheduleStore`] and [`HistoryLog`].
//!
//! Used for testing and offline runs. `set_offline(true)` makes every call
//! fail the way a dropped connection would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{DeviceId, HistoryEntry, ScheduleRecord};

use super::{HistoryLog, ScheduleStore};

pub struct InMemoryStore {
    schedules: RwLock<HashMap<String, ScheduleRecord>>,
    history: RwLock<HashMap<String, HistoryEntry>>,
    offline: AtomicBool,
    lookups: AtomicUsize,
    appends: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
            history: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
            appends: AtomicUsize::new(0),
        }
    }

    pub fn insert_schedule(&self, key: &str, record: ScheduleRecord) {
        self.schedules
            .write()
            .unwrap()
            .insert(key.to_string(), record);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of point lookups attempted, including failed ones.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of history appends that were stored.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("store unreachable");
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn get_schedule(&self, key: &str) -> Result<Option<ScheduleRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.schedules.read().unwrap().get(key).cloned())
    }
}

#[async_trait]
impl HistoryLog for InMemoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        self.check_online()?;
        self.history
            .write()
            .unwrap()
            .insert(entry.document_id(), entry.clone());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn recent(&self, device: &DeviceId, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.check_online()?;
        let history = self.history.read().unwrap();
        let mut entries: Vec<HistoryEntry> = history
            .values()
            .filter(|e| e.device_id.as_ref() == Some(device))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.term.cmp(&b.term))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}
