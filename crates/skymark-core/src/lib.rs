//! `skymark-core` — the incremental sync engine behind skymark.
//!
//! The bookmark feed has no cursor and no "since" parameter: every run
//! re-fetches the same sliding window of entries. This crate turns that
//! repeatedly-refetched snapshot into at-most-once, chronologically ordered
//! side effects, using nothing but a flat key-value store of
//! "already posted" facts.
//!
//! # Architecture
//!
//! ```text
//! Vec<Entry>  (feed snapshot, one run)
//!     │
//!     ▼
//! SyncEngine  ← classifies against the TrackingStore, suppresses the
//!     │          first-run backlog, invokes the EntryAction per new
//!     │          entry in published order, marks after success
//!     ▼
//! TrackingStore  ← redb-backed in production, in-memory in tests;
//!                  garbage-collected down to the current feed window
//! ```

pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod store;
pub mod template;

pub use engine::{EntryAction, RunState, SyncEngine, SyncOutcome};
pub use entry::Entry;
pub use error::{CoreError, Result};
pub use store::{IdPage, MemoryStore, RedbStore, TrackingStore};
