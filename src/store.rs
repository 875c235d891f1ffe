//! # Ticker Store
//!
//! Durable home of `TickerRecord` rows. The aggregator is the only writer;
//! discovery views only read.
//!
//! `InMemoryTickerStore` is a `DashMap` keyed by normalized symbol. An
//! `update` goes through `entry()`, which holds the write lock of the key's
//! shard for the whole read-merge-write: merges of one symbol serialize while
//! other symbols keep going.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fs;
use std::path::Path;

use crate::error::{MergeError, StoreError};
use crate::ticker::{normalize_symbol, TickerRecord};

pub trait TickerStore: Send + Sync {
    /// Point lookup; `symbol` is normalized (`pepe` finds `$PEPE`).
    fn get(&self, symbol: &str) -> Result<Option<TickerRecord>, StoreError>;

    /// Every row, in no particular order.
    fn all(&self) -> Result<Vec<TickerRecord>, StoreError>;

    /// Read-modify-write one symbol inside its critical section.
    ///
    /// `f` sees the current row (if any). On `Err` nothing is written and the
    /// previous row stays as it was.
    fn update<F>(&self, symbol: &str, f: F) -> Result<TickerRecord, MergeError>
    where
        F: FnOnce(Option<&TickerRecord>) -> Result<TickerRecord, MergeError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTickerStore {
    rows: DashMap<String, TickerRecord>,
}

impl InMemoryTickerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row as-is (restore path; bypasses merging).
    pub fn put(&self, rec: TickerRecord) {
        let key = normalize_symbol(&rec.ticker_symbol);
        self.rows.insert(key, rec);
    }

    /// Restore rows from a JSON snapshot written by `save_json`.
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let rows: Vec<TickerRecord> = serde_json::from_str(&content)?;
        let store = Self::new();
        for r in rows {
            store.put(r);
        }
        tracing::info!(
            target: "store",
            path = %path.display(),
            rows = store.len(),
            "snapshot loaded"
        );
        Ok(store)
    }

    /// Write all rows to `path` (temp file + rename), sorted by symbol.
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        let mut rows = self.all()?;
        rows.sort_by(|a, b| a.ticker_symbol.cmp(&b.ticker_symbol));
        let bytes = serde_json::to_vec_pretty(&rows)?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        tracing::info!(
            target: "store",
            path = %path.display(),
            rows = rows.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

impl TickerStore for InMemoryTickerStore {
    fn get(&self, symbol: &str) -> Result<Option<TickerRecord>, StoreError> {
        let key = normalize_symbol(symbol);
        Ok(self.rows.get(&key).map(|r| r.value().clone()))
    }

    fn all(&self) -> Result<Vec<TickerRecord>, StoreError> {
        Ok(self.rows.iter().map(|r| r.value().clone()).collect())
    }

    fn update<F>(&self, symbol: &str, f: F) -> Result<TickerRecord, MergeError>
    where
        F: FnOnce(Option<&TickerRecord>) -> Result<TickerRecord, MergeError>,
    {
        let key = normalize_symbol(symbol);
        match self.rows.entry(key) {
            Entry::Occupied(mut slot) => {
                let next = f(Some(slot.get()))?;
                slot.insert(next.clone());
                Ok(next)
            }
            Entry::Vacant(slot) => {
                let next = f(None)?;
                slot.insert(next.clone());
                Ok(next)
            }
        }
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
