//! Tracking store: "has this entry been posted" facts.
//!
//! The engine only ever needs four operations — existence check, idempotent
//! put, idempotent delete, and a paged listing — so the store is a trait
//! and any flat key-value backing satisfies it. Production uses redb;
//! tests inject [`MemoryStore`].
//!
//! Keys are namespaced (`entry:<id>` by default) so a store file can be
//! shared with unrelated data without collisions.

pub mod memory;
pub mod redb;

pub use self::memory::MemoryStore;
pub use self::redb::RedbStore;

use async_trait::async_trait;

use crate::error::Result;

/// Default key namespace, matching the feed-entry records.
pub const DEFAULT_NAMESPACE: &str = "entry:";

/// One page of a tracking-store listing.
///
/// `cursor` is `Some` when more pages remain; pass it back to
/// [`TrackingStore::list_page`] to continue. Consumers must drain every
/// page before treating the listing as complete.
#[derive(Debug, Clone, PartialEq)]
pub struct IdPage {
    pub ids: Vec<String>,
    pub cursor: Option<String>,
}

/// Persistence contract consumed by the sync engine.
///
/// No multi-key atomicity is assumed: every operation touches a single
/// key, and `put`/`delete` are idempotent.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// True iff `put(id)` has happened and not been deleted since.
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Record `id` as posted. No-op if already present.
    async fn put(&self, id: &str) -> Result<()>;

    /// Remove the record for `id`. Removing an absent id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// List tracked ids within the store's namespace, one page at a time.
    /// `cursor` is `None` for the first page.
    async fn list_page(&self, cursor: Option<&str>) -> Result<IdPage>;
}
