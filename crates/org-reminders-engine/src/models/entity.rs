use serde::Serialize;

use super::date::{OrgDate, Stamp};

/// A list as both sides agree on it.
///
/// `id` is `None` until the store has assigned one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalList {
    pub id: Option<String>,
    pub title: String,
    pub is_deleted: bool,
}

impl CanonicalList {
    pub fn new(id: Option<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_deleted: false,
        }
    }
}

/// Lists are equal when their id and title are.
impl PartialEq for CanonicalList {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.title == other.title
    }
}

impl Eq for CanonicalList {}

/// A reminder item as both sides agree on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalItem {
    pub title: String,
    pub external_id: Option<String>,
    /// 0 (none), 1 (high), 5 (medium) or 9 (low).
    pub priority: i32,
    pub is_completed: bool,
    pub is_deleted: bool,
    pub due_date: Option<OrgDate>,
    pub completion_date: Option<OrgDate>,
    pub last_modified: Option<Stamp>,
    pub list: CanonicalList,
    pub notes: Option<String>,
    pub hash: Option<String>,
}

/// Either kind of entity, for reporting and document mutations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    List(CanonicalList),
    Item(CanonicalItem),
}

impl Entity {
    pub fn key(&self) -> Option<&str> {
        match self {
            Entity::List(list) => list.id.as_deref(),
            Entity::Item(item) => item.external_id.as_deref(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::List(_) => "list",
            Entity::Item(_) => "item",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Entity::List(list) => &list.title,
            Entity::Item(item) => &item.title,
        }
    }
}

impl From<CanonicalList> for Entity {
    fn from(list: CanonicalList) -> Self {
        Entity::List(list)
    }
}

impl From<CanonicalItem> for Entity {
    fn from(item: CanonicalItem) -> Self {
        Entity::Item(item)
    }
}
