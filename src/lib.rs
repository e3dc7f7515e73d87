//! # Shift Lookup
//!
//! **Look up work-shift schedules by a 9-digit identifier.**
//!
//! A user enters an identifier, the app reads the matching schedule record
//! from a remote document store, shows its pre-formatted shift lines, and
//! records the search in a per-device history log mirrored to the same
//! store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────────┐
//! │   CLI    │──▶│  LookupApp   │──▶│ FirestoreClient  │
//! │ (shifts) │   │ reducer+I/O  │   │ schedules/history│
//! └──────────┘   └──────┬───────┘   └──────────────────┘
//!                       │
//!                       ▼
//!              shift-lookup-core
//!      (session reducer, validation, grouping)
//! ```
//!
//! The pure pieces (models, grid scanner, validation, session reducer,
//! history grouping, store traits) live in `shift-lookup-core` and are
//! re-exported here as [`core`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`identity`] | Create-once device identity file |
//! | [`firestore`] | Firestore REST client for schedules and history |
//! | [`grid_source`] | Load CSV sheets (file or URL) for the grid scanner |
//! | [`lookup`] | Search controller: runs reducer effects, background history writes |
//! | [`render`] | Terminal rendering of results and grouped history |
//!
//! ## Quick Start
//!
//! ```bash
//! shifts lookup 123456789       # one search
//! shifts history                # this device's recent searches
//! shifts interactive            # one search per stdin line
//! shifts scan sheet.csv 123456789
//! ```

pub mod config;
pub mod firestore;
pub mod grid_source;
pub mod identity;
pub mod lookup;
pub mod render;

pub use lookup::{HistoryWriteFailure, LookupApp};
pub use shift_lookup_core as core;
