use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    ItemChanges, ItemFilter, ItemRecord, ListRecord, NewItem, ReminderStore, StoreError,
    StoreResult,
};

/// Source of "now" for modification times.
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send>;

/// Everything a store holds, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub lists: Vec<ListRecord>,
    pub items: Vec<ItemRecord>,
}

/// In-process store. Keys are random UUIDs.
pub struct MemoryStore {
    data: StoreSnapshot,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }

    pub fn from_snapshot(data: StoreSnapshot) -> Self {
        Self {
            data,
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.data
    }

    /// Add an existing list record as is.
    pub fn insert_list(&mut self, record: ListRecord) {
        self.data.lists.push(record);
    }

    /// Add an existing item record as is.
    pub fn insert_item(&mut self, record: ItemRecord) {
        self.data.items.push(record);
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    fn list(&self, key: &str) -> Option<&ListRecord> {
        self.data.lists.iter().find(|list| list.key == key)
    }
}

impl ReminderStore for MemoryStore {
    fn lists(&self) -> StoreResult<Vec<ListRecord>> {
        Ok(self.data.lists.clone())
    }

    fn create_list(&mut self, title: &str) -> StoreResult<Option<ListRecord>> {
        let record = ListRecord {
            key: Uuid::new_v4().to_string(),
            title: title.to_string(),
        };
        self.data.lists.push(record.clone());
        Ok(Some(record))
    }

    fn delete_list(&mut self, key: &str) -> StoreResult<Option<ListRecord>> {
        let Some(index) = self.data.lists.iter().position(|list| list.key == key) else {
            return Ok(None);
        };
        self.data.items.retain(|item| item.list_key != key);
        Ok(Some(self.data.lists.remove(index)))
    }

    fn items(&self, filter: ItemFilter) -> StoreResult<Vec<ItemRecord>> {
        Ok(self
            .data
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    fn create_item(&mut self, item: &NewItem) -> StoreResult<Option<ItemRecord>> {
        let list = self
            .list(&item.list_key)
            .ok_or_else(|| StoreError::UnknownList(item.list_key.clone()))?;
        let now = self.now();
        let record = ItemRecord {
            key: Uuid::new_v4().to_string(),
            list_key: list.key.clone(),
            list_title: list.title.clone(),
            title: item.title.clone(),
            notes: item.notes.clone(),
            is_completed: item.is_completed,
            priority: item.priority,
            due: item.due,
            completed_at: item.is_completed.then_some(now),
            last_modified: Some(now),
        };
        self.data.items.push(record.clone());
        Ok(Some(record))
    }

    fn update_item(&mut self, changes: &ItemChanges) -> StoreResult<Option<ItemRecord>> {
        let list_title = self
            .list(&changes.list_key)
            .ok_or_else(|| StoreError::UnknownList(changes.list_key.clone()))?
            .title
            .clone();
        let now = self.now();
        let Some(record) = self.data.items.iter_mut().find(|i| i.key == changes.key) else {
            return Ok(None);
        };

        record.list_key = changes.list_key.clone();
        record.list_title = list_title;
        record.title = changes.title.clone();
        record.notes = changes.notes.clone();
        record.due = changes.due;
        record.priority = changes.priority;
        record.completed_at = match (record.is_completed, changes.is_completed) {
            (false, true) => Some(now),
            (_, false) => None,
            (true, true) => record.completed_at,
        };
        record.is_completed = changes.is_completed;
        record.last_modified = Some(now);
        Ok(Some(record.clone()))
    }

    fn delete_item(&mut self, key: &str, list_key: &str) -> StoreResult<Option<ItemRecord>> {
        let position = self
            .data
            .items
            .iter()
            .position(|item| item.key == key && item.list_key == list_key);
        Ok(position.map(|index| self.data.items.remove(index)))
    }
}
