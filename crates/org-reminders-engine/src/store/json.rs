use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::memory::{MemoryStore, StoreSnapshot};
use super::{
    ItemChanges, ItemFilter, ItemRecord, ListRecord, NewItem, ReminderStore, StoreResult,
};

/// A [`MemoryStore`] persisted as pretty JSON, rewritten after every
/// successful mutation.
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            log::info!("No store at {}, starting empty", path.display());
            StoreSnapshot::default()
        };
        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(snapshot),
        })
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + 'static) -> Self {
        self.inner = self.inner.with_clock(clock);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        self.inner.snapshot()
    }

    fn save(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self.inner.snapshot())?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn saved<T>(&self, result: Option<T>) -> StoreResult<Option<T>> {
        if result.is_some() {
            self.save()?;
        }
        Ok(result)
    }
}

impl ReminderStore for JsonFileStore {
    fn lists(&self) -> StoreResult<Vec<ListRecord>> {
        self.inner.lists()
    }

    fn create_list(&mut self, title: &str) -> StoreResult<Option<ListRecord>> {
        let result = self.inner.create_list(title)?;
        self.saved(result)
    }

    fn delete_list(&mut self, key: &str) -> StoreResult<Option<ListRecord>> {
        let result = self.inner.delete_list(key)?;
        self.saved(result)
    }

    fn items(&self, filter: ItemFilter) -> StoreResult<Vec<ItemRecord>> {
        self.inner.items(filter)
    }

    fn create_item(&mut self, item: &NewItem) -> StoreResult<Option<ItemRecord>> {
        let result = self.inner.create_item(item)?;
        self.saved(result)
    }

    fn update_item(&mut self, changes: &ItemChanges) -> StoreResult<Option<ItemRecord>> {
        let result = self.inner.update_item(changes)?;
        self.saved(result)
    }

    fn delete_item(&mut self, key: &str, list_key: &str) -> StoreResult<Option<ItemRecord>> {
        let result = self.inner.delete_item(key, list_key)?;
        self.saved(result)
    }
}
