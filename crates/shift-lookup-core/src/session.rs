//! Session state and the reducer that drives a search.
//!
//! [`reduce`] is a pure function from the current [`SessionState`] and a
//! [`SessionEvent`] to the next state plus at most one [`Effect`] for the
//! caller to run. No I/O happens here, so the whole search lifecycle can be
//! tested without a remote store.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──SearchRequested──▶ Rejected            (invalid term, no effect)
//!                       └─▶ Querying{token}     (Effect::Lookup)
//! Querying ──LookupSucceeded──▶ Found | NotFound (Effect::PersistHistory)
//!          └─LookupFailed─────▶ ConnectionError  (no history)
//! ```
//!
//! Every lookup carries a monotonically increasing [`RequestToken`]. A
//! response whose token is not the one currently in flight is dropped, so a
//! slow lookup can never overwrite the results of a newer search.

use crate::models::{DeviceId, DisplayResult, HistoryEntry, ScheduleRecord};
use crate::validate::{validate_term, ValidationError};

/// Message shown when the point lookup fails for any transport reason.
pub const CONNECTION_ERROR_MESSAGE: &str = "Lỗi kết nối Server. Vui lòng kiểm tra mạng.";

pub type RequestToken = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Rejected(ValidationError),
    Querying {
        token: RequestToken,
        key: String,
    },
    Found,
    NotFound,
    ConnectionError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Current contents of the input box.
    pub input: String,
    pub phase: Phase,
    pub results: Vec<DisplayResult>,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub device: Option<DeviceId>,
    next_token: RequestToken,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Querying { .. })
    }

    pub fn input_error(&self) -> Option<&ValidationError> {
        match &self.phase {
            Phase::Rejected(e) => Some(e),
            _ => None,
        }
    }

    /// Generic status line for the current phase, if any.
    pub fn status_message(&self) -> Option<&'static str> {
        match self.phase {
            Phase::ConnectionError => Some(CONNECTION_ERROR_MESSAGE),
            _ => None,
        }
    }

    fn is_current(&self, token: RequestToken) -> bool {
        matches!(self.phase, Phase::Querying { token: t, .. } if t == token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user submitted (or typed) `term`.
    SearchRequested { term: String },
    /// The term was rejected before reaching the reducer.
    ValidationFailed {
        term: String,
        error: ValidationError,
    },
    /// The point lookup completed. `record` is `None` when no schedule exists.
    LookupSucceeded {
        token: RequestToken,
        key: String,
        record: Option<ScheduleRecord>,
        now_ms: i64,
    },
    LookupFailed { token: RequestToken },
    /// Startup history read finished. Replaces the in-session history.
    HistoryLoaded {
        device: DeviceId,
        entries: Vec<HistoryEntry>,
    },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Lookup { token: RequestToken, key: String },
    /// Append to the remote history log. Fire-and-forget: the entry is
    /// already part of the returned state.
    PersistHistory(HistoryEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn with(state: SessionState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }
}

pub fn reduce(mut state: SessionState, event: SessionEvent) -> Transition {
    match event {
        SessionEvent::SearchRequested { term } => {
            state.input = term.clone();
            state.results.clear();

            match validate_term(&term) {
                Ok(()) => {
                    let token = state.next_token;
                    state.next_token += 1;
                    state.phase = Phase::Querying {
                        token,
                        key: term.clone(),
                    };
                    Transition::with(state, Effect::Lookup { token, key: term })
                }
                // A cleared input box is not an error.
                Err(ValidationError::Empty) => {
                    state.phase = Phase::Idle;
                    Transition::to(state)
                }
                Err(e) => {
                    state.phase = Phase::Rejected(e);
                    Transition::to(state)
                }
            }
        }

        SessionEvent::ValidationFailed { term, error } => {
            state.input = term;
            state.results.clear();
            state.phase = Phase::Rejected(error);
            Transition::to(state)
        }

        SessionEvent::LookupSucceeded {
            token,
            key,
            record,
            now_ms,
        } => {
            if !state.is_current(token) {
                return Transition::to(state);
            }

            let (phase, results) = match record {
                Some(rec) => (
                    Phase::Found,
                    rec.shifts.into_iter().map(DisplayResult::new).collect(),
                ),
                None => (Phase::NotFound, Vec::new()),
            };

            let entry = HistoryEntry::record(&key, &results, state.device.as_ref(), now_ms);
            state.phase = phase;
            state.results = results;
            state.history.insert(0, entry.clone());
            Transition::with(state, Effect::PersistHistory(entry))
        }

        SessionEvent::LookupFailed { token } => {
            if state.is_current(token) {
                state.phase = Phase::ConnectionError;
                state.results.clear();
            }
            Transition::to(state)
        }

        SessionEvent::HistoryLoaded { device, entries } => {
            state.device = Some(device);
            state.history = entries;
            Transition::to(state)
        }
    }
}
