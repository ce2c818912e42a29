//! Collection and history records.
//!
//! Two JSON files under one base directory, each guarded by its own lock
//! around every load-modify-save sequence:
//!
//! * `collections.json`: saves are an upsert keyed by collection id. A saved
//!   collection replaces the stored one wholesale (its entire `requests`
//!   list); collections not named in the save survive untouched.
//! * `history.json`: saves prepend and cap at `history_limit`.
//!
//! Callers that reorganize requests across collections (see
//! [`crate::collections::move_saved_request`]) must load the full set, apply
//! every mutation to that one snapshot and save the whole snapshot in a single
//! call. Saving only part of a mutated snapshot silently keeps the stored
//! version of every collection left out. Locks only serialize callers sharing
//! one `Store`; other processes are not coordinated.

mod file;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Settings;
use crate::domain::{Collection, HistoryItem};
use crate::error::{StorageError, StorageResult};
use crate::history::prepend_capped;

pub use file::{read_record, write_record};

pub const COLLECTIONS_FILE: &str = "collections.json";
pub const HISTORY_FILE: &str = "history.json";

#[derive(Debug)]
pub struct Store {
    base_dir: PathBuf,
    history_limit: usize,
    collections_lock: Mutex<()>,
    history_lock: Mutex<()>,
}

impl Store {
    pub fn new(base_dir: impl Into<PathBuf>, history_limit: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            history_limit,
            collections_lock: Mutex::new(()),
            history_lock: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.data_dir, settings.history_limit)
    }

    fn collections_path(&self) -> PathBuf {
        self.base_dir.join(COLLECTIONS_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.base_dir.join(HISTORY_FILE)
    }

    // ─── Collections ──────────────────────────────────────────────────────────

    /// Upsert by id. Output order of the stored list is unspecified.
    pub fn save_collections(&self, incoming: &[Collection]) -> StorageResult<()> {
        let _guard = lock(&self.collections_lock);
        let path = self.collections_path();
        let existing: Vec<Collection> = read_record(&path)?;
        write_merged(&path, existing, incoming)
    }

    pub fn load_collections(&self) -> StorageResult<Vec<Collection>> {
        let _guard = lock(&self.collections_lock);
        read_record(&self.collections_path())
    }

    /// Load, mutate and save the full collection set while holding the
    /// collections lock. Nothing is written when `mutate` fails.
    ///
    /// The save is still an upsert: a collection dropped from the snapshot
    /// stays in the stored record.
    pub fn update_collections<F, R, E>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<Collection>) -> Result<R, E>,
        E: From<StorageError>,
    {
        let _guard = lock(&self.collections_lock);
        let path = self.collections_path();
        let existing: Vec<Collection> = read_record(&path)?;
        let mut snapshot = existing.clone();
        let result = mutate(&mut snapshot)?;
        write_merged(&path, existing, &snapshot)?;
        Ok(result)
    }

    // ─── History ──────────────────────────────────────────────────────────────

    /// Prepend `incoming` (treated as newest regardless of timestamps) and
    /// keep the first `history_limit` items.
    pub fn save_history(&self, incoming: &[HistoryItem]) -> StorageResult<()> {
        let _guard = lock(&self.history_lock);
        let path = self.history_path();
        let existing: Vec<HistoryItem> = read_record(&path)?;
        let combined = prepend_capped(incoming, existing, self.history_limit);
        tracing::debug!(incoming = incoming.len(), total = combined.len(), "saving history");
        write_record(&path, &combined)
    }

    pub fn load_history(&self) -> StorageResult<Vec<HistoryItem>> {
        let _guard = lock(&self.history_lock);
        read_record(&self.history_path())
    }

    /// Empties the history record. Collections are not touched.
    pub fn delete_all_history(&self) -> StorageResult<()> {
        let _guard = lock(&self.history_lock);
        tracing::debug!("clearing history");
        write_record::<HistoryItem>(&self.history_path(), &[])
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Overlay `incoming` on `existing` by collection id and write the result.
fn write_merged(path: &Path, existing: Vec<Collection>, incoming: &[Collection]) -> StorageResult<()> {
    let mut by_id: HashMap<String, Collection> = existing
        .into_iter()
        .map(|collection| (collection.id.clone(), collection))
        .collect();
    for collection in incoming {
        by_id.insert(collection.id.clone(), collection.clone());
    }

    let merged: Vec<Collection> = by_id.into_values().collect();
    tracing::debug!(incoming = incoming.len(), total = merged.len(), "saving collections");
    write_record(path, &merged)
}

// The guarded value is `()`, so a poisoned lock carries no broken state.
fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
