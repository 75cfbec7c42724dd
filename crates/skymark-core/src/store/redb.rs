//! redb-backed tracking store.
//!
//! A single `posted` table maps `<namespace><id>` string keys to unit
//! values; record existence is the only state. Pagination for
//! [`TrackingStore::list_page`] is a plain range scan resuming after the
//! last key of the previous page, so a cursor survives interleaved writes.

use std::ops::Bound;
use std::path::Path;

use async_trait::async_trait;
use redb::{Database, TableDefinition};

use crate::error::{CoreError, Result};

use super::{IdPage, TrackingStore, DEFAULT_NAMESPACE};

/// Key: `<namespace><entry id>`. Value: unit — existence is the fact.
const POSTED: TableDefinition<&str, ()> = TableDefinition::new("posted");

/// Page size for `list_page`. Mirrors the cap a managed KV store would
/// impose; callers must follow cursors regardless.
const PAGE_SIZE: usize = 128;

pub struct RedbStore {
    db: Database,
    namespace: String,
    page_size: usize,
}

impl RedbStore {
    /// Open or create the store at `path` with the default `entry:`
    /// namespace.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_namespace(path, DEFAULT_NAMESPACE)
    }

    /// Open or create the store at `path`, scoping all keys under
    /// `namespace`.
    pub fn open_with_namespace(path: &Path, namespace: &str) -> Result<Self> {
        let db = Database::create(path).map_err(|e| CoreError::Store(e.to_string()))?;
        // Ensure the table exists before any reads
        let wt = db
            .begin_write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        wt.open_table(POSTED)
            .map_err(|e| CoreError::Store(e.to_string()))?;
        wt.commit().map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(Self {
            db,
            namespace: namespace.to_string(),
            page_size: PAGE_SIZE,
        })
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.namespace, id)
    }
}

#[async_trait]
impl TrackingStore for RedbStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let table = rt
            .open_table(POSTED)
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let found = table
            .get(self.key(id).as_str())
            .map_err(|e| CoreError::Store(e.to_string()))?
            .is_some();
        Ok(found)
    }

    async fn put(&self, id: &str) -> Result<()> {
        let wt = self
            .db
            .begin_write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        {
            let mut table = wt
                .open_table(POSTED)
                .map_err(|e| CoreError::Store(e.to_string()))?;
            table
                .insert(self.key(id).as_str(), ())
                .map_err(|e| CoreError::Store(e.to_string()))?;
        }
        wt.commit().map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let wt = self
            .db
            .begin_write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        {
            let mut table = wt
                .open_table(POSTED)
                .map_err(|e| CoreError::Store(e.to_string()))?;
            table
                .remove(self.key(id).as_str())
                .map_err(|e| CoreError::Store(e.to_string()))?;
        }
        wt.commit().map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn list_page(&self, cursor: Option<&str>) -> Result<IdPage> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        let table = rt
            .open_table(POSTED)
            .map_err(|e| CoreError::Store(e.to_string()))?;

        // Resume strictly after the last key seen, or from the start of
        // the namespace for the first page.
        let start_key = match cursor {
            Some(c) => Bound::Excluded(self.key(c)),
            None => Bound::Included(self.namespace.clone()),
        };
        let start = match &start_key {
            Bound::Excluded(k) => Bound::Excluded(k.as_str()),
            Bound::Included(k) => Bound::Included(k.as_str()),
            Bound::Unbounded => Bound::Unbounded,
        };

        let mut ids = Vec::new();
        for row in table
            .range::<&str>((start, Bound::Unbounded))
            .map_err(|e| CoreError::Store(e.to_string()))?
        {
            let (key, _) = row.map_err(|e| CoreError::Store(e.to_string()))?;
            let key = key.value();
            let Some(id) = key.strip_prefix(self.namespace.as_str()) else {
                // Past the end of our namespace; keys are sorted.
                break;
            };
            ids.push(id.to_string());
            if ids.len() == self.page_size {
                break;
            }
        }

        let cursor = if ids.len() == self.page_size {
            ids.last().cloned()
        } else {
            None
        };
        Ok(IdPage { ids, cursor })
    }
}
