//! # Shift Lookup Core
//!
//! Runtime-free logic for Shift Lookup: data models, the grid scanner,
//! identifier validation, the session reducer, history day-grouping, and
//! the remote store abstraction.
//!
//! This crate contains no tokio, HTTP client, or filesystem I/O. Everything
//! that talks to the outside world lives in the `shift-lookup` application
//! crate and plugs in through the traits in [`store`].

pub mod grid;
pub mod history;
pub mod models;
pub mod session;
pub mod store;
pub mod validate;
