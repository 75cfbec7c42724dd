//! In-memory tracking store.
//!
//! The standard test double for the engine: a `BTreeSet` of ids behind a
//! mutex, with a configurable page size and per-operation failure
//! injection so store-error paths are reachable from tests.

use std::collections::{BTreeSet, HashSet};
use std::ops::Bound;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CoreError, Result};

use super::{IdPage, TrackingStore};

#[derive(Debug, Default)]
struct Inner {
    ids: BTreeSet<String>,
    fail_exists: HashSet<String>,
    fail_put: HashSet<String>,
    fail_delete: HashSet<String>,
    fail_list: bool,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            page_size: 128,
        }
    }

    /// Cap `list_page` at `page_size` ids, forcing cursor traversal.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Synchronous seeding helper for test setup.
    pub fn seed<I: IntoIterator<Item = S>, S: Into<String>>(&self, ids: I) {
        let mut inner = self.inner.lock().unwrap();
        inner.ids.extend(ids.into_iter().map(Into::into));
    }

    /// Snapshot of every tracked id, in key order.
    pub fn tracked(&self) -> Vec<String> {
        self.inner.lock().unwrap().ids.iter().cloned().collect()
    }

    /// Make `exists(id)` fail until cleared.
    pub fn fail_exists_for(&self, id: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_exists
            .insert(id.to_string());
    }

    /// Make `put(id)` fail until cleared.
    pub fn fail_put_for(&self, id: &str) {
        self.inner.lock().unwrap().fail_put.insert(id.to_string());
    }

    /// Make `delete(id)` fail until cleared.
    pub fn fail_delete_for(&self, id: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_delete
            .insert(id.to_string());
    }

    /// Make every `list_page` call fail.
    pub fn fail_list(&self) {
        self.inner.lock().unwrap().fail_list = true;
    }
}

#[async_trait]
impl TrackingStore for MemoryStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_exists.contains(id) {
            return Err(CoreError::Store(format!("injected read failure: {id}")));
        }
        Ok(inner.ids.contains(id))
    }

    async fn put(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_put.contains(id) {
            return Err(CoreError::Store(format!("injected write failure: {id}")));
        }
        inner.ids.insert(id.to_string());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete.contains(id) {
            return Err(CoreError::Store(format!("injected delete failure: {id}")));
        }
        inner.ids.remove(id);
        Ok(())
    }

    async fn list_page(&self, cursor: Option<&str>) -> Result<IdPage> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(CoreError::Store("injected listing failure".to_string()));
        }
        let range = match cursor {
            Some(c) => inner
                .ids
                .range::<str, _>((Bound::Excluded(c), Bound::Unbounded)),
            None => inner.ids.range::<str, _>(..),
        };
        let ids: Vec<String> = range.take(self.page_size).cloned().collect();
        let cursor = if ids.len() == self.page_size {
            ids.last().cloned()
        } else {
            None
        };
        Ok(IdPage { ids, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn paged_listing_drains_in_order() {
        let store = MemoryStore::new().with_page_size(2);
        store.seed(["e", "a", "c", "b", "d"]);

        let first = store.list_page(None).await.unwrap();
        assert_eq!(first.ids, ["a", "b"]);
        let second = store.list_page(first.cursor.as_deref()).await.unwrap();
        assert_eq!(second.ids, ["c", "d"]);
        let third = store.list_page(second.cursor.as_deref()).await.unwrap();
        assert_eq!(third.ids, ["e"]);
        assert_eq!(third.cursor, None);
    }

    #[tokio::test]
    async fn injected_exists_failure_surfaces() {
        let store = MemoryStore::new();
        store.fail_exists_for("bad");
        assert!(store.exists("bad").await.is_err());
        assert!(!store.exists("good").await.unwrap());
    }
}
