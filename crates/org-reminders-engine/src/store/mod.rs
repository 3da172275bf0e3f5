//! The external reminder store.
//!
//! Sync only talks to the store through [`ReminderStore`]. Calls are
//! blocking, and a call that returns `Ok(None)` produced no record; sync
//! treats that like a failure for the one entity involved.

pub mod json;
pub mod memory;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use json::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unknown list: {0}")]
    UnknownList(String),
    #[error("List {0:?} has no store key yet")]
    MissingListKey(String),
    #[error("Item {0:?} has no store key")]
    MissingItemKey(String),
    #[error("Lists have no update operation")]
    ListUpdate,
    #[error("Store file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecord {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub key: String,
    pub list_key: String,
    pub list_title: String,
    pub title: String,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub priority: i32,
    pub due: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub last_modified: Option<NaiveDateTime>,
}

/// Fields for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub list_key: String,
    pub title: String,
    pub notes: Option<String>,
    pub due: Option<NaiveDateTime>,
    pub priority: i32,
    pub is_completed: bool,
}

/// Replacement fields for an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChanges {
    pub key: String,
    pub list_key: String,
    pub title: String,
    pub notes: Option<String>,
    pub due: Option<NaiveDateTime>,
    pub priority: i32,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemFilter {
    #[default]
    All,
    Incomplete,
    Completed,
}

impl ItemFilter {
    pub fn matches(self, record: &ItemRecord) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Incomplete => !record.is_completed,
            ItemFilter::Completed => record.is_completed,
        }
    }
}

pub trait ReminderStore {
    fn lists(&self) -> StoreResult<Vec<ListRecord>>;

    fn create_list(&mut self, title: &str) -> StoreResult<Option<ListRecord>>;

    /// Delete a list and every item in it.
    fn delete_list(&mut self, key: &str) -> StoreResult<Option<ListRecord>>;

    fn items(&self, filter: ItemFilter) -> StoreResult<Vec<ItemRecord>>;

    fn create_item(&mut self, item: &NewItem) -> StoreResult<Option<ItemRecord>>;

    fn update_item(&mut self, changes: &ItemChanges) -> StoreResult<Option<ItemRecord>>;

    fn delete_item(&mut self, key: &str, list_key: &str) -> StoreResult<Option<ItemRecord>>;
}
