//! The sync engine: one run of feed-snapshot reconciliation.
//!
//! Every run re-fetches the same cursorless feed window, so the engine
//! diffs the snapshot against the tracking store, posts only what is new,
//! and prunes tracking records that fell out of the window. A run steps
//! through an explicit state machine:
//!
//! ```text
//! Idle → Classifying → Suppressing ─────────────┐
//!                    ↘ Processing(0..n) ─→ Collecting → Done
//!                                       ↘ Aborted(i)
//! ```
//!
//! Ordering is an externally observable guarantee — the destination must
//! receive posts in feed chronology — so action invocations are strictly
//! sequential, and a failure at entry `i` aborts the run before `i + 1`
//! rather than skipping ahead. Marking happens only after an invocation
//! succeeds; a crash between the two re-posts that entry on the next run,
//! which is the accepted trade against silently losing it.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::entry::{sort_chronologically, Entry};
use crate::error::{CoreError, Result};
use crate::store::TrackingStore;

// ---------------------------------------------------------------------------
// EntryAction
// ---------------------------------------------------------------------------

/// The side effect performed once per new entry (render + post).
///
/// The engine treats it as opaque: any error aborts the run at that entry
/// so the destination never sees out-of-order posts on retry.
#[async_trait]
pub trait EntryAction: Send + Sync {
    async fn invoke(
        &self,
        entry: &Entry,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

// ---------------------------------------------------------------------------
// RunState / SyncOutcome
// ---------------------------------------------------------------------------

/// Where a run currently is, or where it finished.
///
/// `Processing(i)` and `Aborted(i)` index into the pending list (posting
/// order), making partial progress observable to callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Classifying,
    Suppressing,
    Processing(usize),
    Collecting,
    Done,
    Aborted(usize),
}

/// What a completed run did, for logging. Never persisted.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Entries newly posted this run, in posting order.
    pub posted: Vec<Entry>,
    /// Entries marked without posting by first-run suppression.
    pub suppressed: usize,
    /// Tracking records removed by garbage collection.
    pub pruned: usize,
    /// Garbage-collection errors that were logged and skipped.
    pub gc_errors: usize,
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

pub struct SyncEngine<'a> {
    store: &'a dyn TrackingStore,
    action: &'a dyn EntryAction,
    state: RunState,
}

impl<'a> SyncEngine<'a> {
    pub fn new(store: &'a dyn TrackingStore, action: &'a dyn EntryAction) -> Self {
        Self {
            store,
            action,
            state: RunState::Idle,
        }
    }

    /// The engine's current (or final) state. After `run` returns this is
    /// `Done`, or `Aborted(i)` when the action failed at pending entry `i`.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Reconcile one feed snapshot against the tracking store.
    ///
    /// Entries are re-sorted ascending by publication time (stable, so
    /// feed order breaks ties) before anything else, then classified,
    /// possibly suppressed, posted one at a time, and finally the store is
    /// garbage-collected down to the snapshot's id set.
    pub async fn run(&mut self, mut entries: Vec<Entry>) -> Result<SyncOutcome> {
        sort_chronologically(&mut entries);
        let mut outcome = SyncOutcome::default();

        self.state = RunState::Classifying;
        let pending = self.classify(&entries).await?;

        if !pending.is_empty() && pending.len() == entries.len() {
            // Nothing in the snapshot has ever been seen: this is the
            // first run against a fresh store, and the snapshot is the
            // feed's whole backlog window, not a burst of new bookmarks.
            // Mark everything without posting. A long enough gap between
            // runs (every tracked id aged out of the window) is
            // indistinguishable from a true first run and is suppressed
            // too; see DESIGN.md.
            self.state = RunState::Suppressing;
            info!(
                count = pending.len(),
                "first run detected; marking backlog as posted without posting"
            );
            for entry in &pending {
                self.mark(&entry.id).await?;
            }
            outcome.suppressed = pending.len();
        } else if !pending.is_empty() {
            info!(count = pending.len(), "posting new bookmark entries");
            for (i, entry) in pending.iter().enumerate() {
                self.state = RunState::Processing(i);
                if let Err(source) = self.action.invoke(entry).await {
                    self.state = RunState::Aborted(i);
                    return Err(CoreError::Action {
                        id: entry.id.clone(),
                        source,
                    });
                }
                // Mark immediately after success so a crash before the
                // next entry retries at most this one.
                if let Err(err) = self.mark(&entry.id).await {
                    self.state = RunState::Aborted(i);
                    return Err(err);
                }
                outcome.posted.push(entry.clone());
            }
        } else {
            debug!("no new bookmark entries");
        }

        self.state = RunState::Collecting;
        self.collect_garbage(&entries, &mut outcome).await;

        self.state = RunState::Done;
        Ok(outcome)
    }

    /// Partition the snapshot down to the not-yet-posted entries,
    /// preserving order. Store lookups are pure reads with no ordering
    /// dependency, so they are dispatched concurrently.
    async fn classify(&self, entries: &[Entry]) -> Result<Vec<Entry>> {
        let lookups = entries.iter().map(|entry| async move {
            self.store
                .exists(&entry.id)
                .await
                .map_err(|e| CoreError::Classify {
                    id: entry.id.clone(),
                    source: Box::new(e),
                })
        });
        let seen = futures::future::try_join_all(lookups).await?;

        Ok(entries
            .iter()
            .zip(seen)
            .filter(|(_, seen)| !seen)
            .map(|(entry, _)| entry.clone())
            .collect())
    }

    async fn mark(&self, id: &str) -> Result<()> {
        self.store.put(id).await.map_err(|e| CoreError::Mark {
            id: id.to_string(),
            source: Box::new(e),
        })
    }

    /// Delete tracking records whose ids fell out of the current feed
    /// window, draining the store's pagination fully. GC errors are
    /// logged and counted but never fail the run: the pass is idempotent
    /// and will catch up next time.
    async fn collect_garbage(&self, entries: &[Entry], outcome: &mut SyncOutcome) {
        let keep: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();

        let mut cursor: Option<String> = None;
        loop {
            let page = match self.store.list_page(cursor.as_deref()).await {
                Ok(page) => page,
                Err(err) => {
                    warn!(error = %err, "tracking-store listing failed; GC deferred to next run");
                    outcome.gc_errors += 1;
                    return;
                }
            };

            for id in &page.ids {
                if keep.contains(id.as_str()) {
                    continue;
                }
                match self.store.delete(id).await {
                    Ok(()) => outcome.pruned += 1,
                    Err(err) => {
                        warn!(id = %id, error = %err, "failed to prune stale tracking record");
                        outcome.gc_errors += 1;
                    }
                }
            }

            match page.cursor {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        if outcome.pruned > 0 {
            info!(pruned = outcome.pruned, "flushed stale entry ids");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
