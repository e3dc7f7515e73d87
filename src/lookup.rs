//! The lookup controller: runs the session reducer's effects against a
//! remote store.
//!
//! [`LookupApp`] owns the current [`SessionState`] and is the only place
//! that performs I/O for a search:
//!
//! 1. **Startup** ([`LookupApp::start`]) reads the device's recent history.
//!    A failure is logged and the session starts with an empty history.
//! 2. **Search** ([`LookupApp::search`]) validates through the reducer,
//!    awaits the point lookup, and applies the outcome. A transport error
//!    becomes the generic connection-error phase and records nothing.
//! 3. **History write** is two-phase. The reducer has already prepended the
//!    entry to the in-session list; the remote append runs as a detached
//!    `tokio` task. Its failure is logged and sent to a diagnostic channel
//!    ([`LookupApp::drain_diagnostics`]) and never touches session state.
//!
//! [`LookupApp::begin_search`] and [`LookupApp::complete_lookup`] expose the
//! two halves of a search so that callers can keep several lookups in
//! flight; responses for superseded requests are dropped by the reducer.

use anyhow::Result;
use shift_lookup_core::models::{DeviceId, HistoryEntry, ScheduleRecord};
use shift_lookup_core::session::{
    reduce, Effect, RequestToken, SessionEvent, SessionState, Transition,
};
use shift_lookup_core::store::{HistoryLog, ScheduleStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A history entry that could not be written to the remote log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWriteFailure {
    pub document_id: String,
    pub error: String,
}

pub struct LookupApp<S> {
    store: Arc<S>,
    state: SessionState,
    history_limit: usize,
    diagnostics_tx: mpsc::UnboundedSender<HistoryWriteFailure>,
    diagnostics_rx: mpsc::UnboundedReceiver<HistoryWriteFailure>,
    pending_writes: Vec<JoinHandle<()>>,
}

impl<S> LookupApp<S>
where
    S: ScheduleStore + HistoryLog + 'static,
{
    pub fn new(store: Arc<S>, history_limit: usize) -> Self {
        let (diagnostics_tx, diagnostics_rx) = mpsc::unbounded_channel();
        Self {
            store,
            state: SessionState::new(),
            history_limit,
            diagnostics_tx,
            diagnostics_rx,
            pending_writes: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Load the most recent history for `device` and make it the session
    /// history, replacing whatever was there.
    pub async fn start(&mut self, device: DeviceId) -> &SessionState {
        let entries = match self.store.recent(&device, self.history_limit).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(%device, "failed to load search history: {:#}", e);
                Vec::new()
            }
        };
        tracing::debug!(%device, count = entries.len(), "history loaded");
        self.apply(SessionEvent::HistoryLoaded { device, entries });
        &self.state
    }

    /// Run one search to completion.
    pub async fn search(&mut self, term: &str) -> &SessionState {
        if let Some((token, key)) = self.begin_search(term) {
            let outcome = self.store.get_schedule(&key).await;
            self.complete_lookup(token, key, outcome);
        }
        &self.state
    }

    /// Submit `term`. Returns the lookup to perform, or `None` if the term
    /// was empty or rejected.
    pub fn begin_search(&mut self, term: &str) -> Option<(RequestToken, String)> {
        match self.apply(SessionEvent::SearchRequested {
            term: term.to_string(),
        }) {
            Some(Effect::Lookup { token, key }) => Some((token, key)),
            _ => None,
        }
    }

    /// Feed the result of a point lookup back into the session.
    ///
    /// # Panics
    ///
    /// When the outcome produces a history entry, the remote write is
    /// spawned on the current Tokio runtime, so this must be called from
    /// within one.
    pub fn complete_lookup(
        &mut self,
        token: RequestToken,
        key: String,
        outcome: Result<Option<ScheduleRecord>>,
    ) {
        let event = match outcome {
            Ok(record) => {
                tracing::info!(
                    term = %key,
                    found = record.is_some(),
                    "lookup completed"
                );
                SessionEvent::LookupSucceeded {
                    token,
                    key,
                    record,
                    now_ms: chrono::Utc::now().timestamp_millis(),
                }
            }
            Err(e) => {
                tracing::warn!(term = %key, "lookup failed: {:#}", e);
                SessionEvent::LookupFailed { token }
            }
        };

        if let Some(Effect::PersistHistory(entry)) = self.apply(event) {
            self.persist_in_background(entry);
        }
    }

    /// Remote write failures captured since the last call.
    pub fn drain_diagnostics(&mut self) -> Vec<HistoryWriteFailure> {
        let mut failures = Vec::new();
        while let Ok(f) = self.diagnostics_rx.try_recv() {
            failures.push(f);
        }
        failures
    }

    /// Wait for every outstanding history write to finish.
    ///
    /// Searches never call this; it exists so a short-lived process can
    /// let its writes land before the runtime shuts down.
    pub async fn flush(&mut self) {
        for handle in self.pending_writes.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("history write task aborted: {}", e);
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Option<Effect> {
        let Transition { state, effect } = reduce(std::mem::take(&mut self.state), event);
        self.state = state;
        effect
    }

    fn persist_in_background(&mut self, entry: HistoryEntry) {
        let store = Arc::clone(&self.store);
        let diagnostics = self.diagnostics_tx.clone();

        self.pending_writes.retain(|h| !h.is_finished());
        self.pending_writes.push(tokio::spawn(async move {
            if let Err(e) = store.append(&entry).await {
                let document_id = entry.document_id();
                tracing::warn!(document = %document_id, "failed to save search history: {:#}", e);
                let _ = diagnostics.send(HistoryWriteFailure {
                    document_id,
                    error: format!("{:#}", e),
                });
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shift_lookup_core::session::Phase;
    use shift_lookup_core::store::memory::InMemoryStore;

    fn app(store: &Arc<InMemoryStore>) -> LookupApp<InMemoryStore> {
        LookupApp::new(Arc::clone(store), 50)
    }

    #[tokio::test]
    async fn test_rejected_term_skips_store() {
        let store = Arc::new(InMemoryStore::new());
        let mut app = app(&store);
        app.start(DeviceId::new("dev")).await;

        assert!(app.search("12345678a").await.input_error().is_some());
        assert!(app.search("12345").await.input_error().is_some());
        assert_eq!(app.search("").await.phase, Phase::Idle);
        assert_eq!(store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_lookup_drops_stale_token() {
        let store = Arc::new(InMemoryStore::new());
        let mut app = app(&store);
        app.start(DeviceId::new("dev")).await;

        let (old, old_key) = app.begin_search("111111111").unwrap();
        let (new, new_key) = app.begin_search("222222222").unwrap();

        app.complete_lookup(new, new_key, Ok(None));
        app.complete_lookup(
            old,
            old_key,
            Ok(Some(ScheduleRecord {
                shifts: vec!["stale".to_string()],
                updated_at: String::new(),
            })),
        );
        app.flush().await;

        assert_eq!(app.state().phase, Phase::NotFound);
        assert!(app.state().results.is_empty());
        assert_eq!(app.state().history.len(), 1);
        assert_eq!(app.state().history[0].term, "222222222");
        assert_eq!(store.append_count(), 1);
    }

    #[test]
    #[should_panic(expected = "Tokio")]
    fn test_complete_lookup_needs_runtime_for_history_write() {
        let store = Arc::new(InMemoryStore::new());
        let mut app = app(&store);
        let (token, key) = app.begin_search("123456789").unwrap();
        app.complete_lookup(token, key, Ok(None));
    }

    #[test]
    fn test_failed_lookup_outside_runtime_spawns_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let mut app = app(&store);
        let (token, key) = app.begin_search("123456789").unwrap();
        app.complete_lookup(token, key, Err(anyhow::anyhow!("offline")));
        assert_eq!(app.state().phase, Phase::ConnectionError);
        assert!(app.state().history.is_empty());
    }
}
