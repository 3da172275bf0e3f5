//! Mapping between headlines, canonical entities and store records.
//!
//! Every function here is pure. Priorities use a fixed table: `A` is 1,
//! `B` is 5, `C` is 9 and no priority is 0.

use chrono::NaiveDateTime;

use crate::models::{
    CanonicalItem, CanonicalList, DateFormat, Headline, HeadlineId, OrgDate, Outline, Priority,
    Stamp, Status, keys,
};
use crate::store::{ItemChanges, ItemRecord, ListRecord, NewItem, StoreError};

pub fn priority_to_int(priority: Option<Priority>) -> i32 {
    match priority {
        Some(Priority::A) => 1,
        Some(Priority::B) => 5,
        Some(Priority::C) => 9,
        None => 0,
    }
}

pub fn priority_from_int(value: i32) -> Option<Priority> {
    match value {
        1 => Some(Priority::A),
        5 => Some(Priority::B),
        9 => Some(Priority::C),
        _ => None,
    }
}

/// Fold a store priority onto the table. Stores use the whole `1..=9`
/// range, where lower is more urgent.
pub fn normalize_priority(value: i32) -> i32 {
    match value {
        1..=4 => 1,
        5 => 5,
        6..=9 => 9,
        _ => 0,
    }
}

fn notes_of(text: Option<&str>) -> Option<String> {
    let trimmed = text?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn list_from_headline(headline: &Headline) -> CanonicalList {
    CanonicalList {
        id: headline.property(keys::LIST_ID).map(str::to_string),
        title: headline.title.clone(),
        is_deleted: headline.is_deleted(),
    }
}

/// The item at `id`, with its owning list taken from the outline parent.
pub fn item_from_headline(outline: &Outline, id: HeadlineId) -> CanonicalItem {
    let headline = &outline[id];
    let list = outline
        .parent(id)
        .map(|parent| list_from_headline(&outline[parent]))
        .unwrap_or_default();

    let last_modified = headline.property(keys::LAST_MODIFIED).and_then(|text| {
        let stamp = Stamp::parse(text);
        if stamp.is_none() {
            log::warn!("Ignoring unparseable {} {text:?}", keys::LAST_MODIFIED);
        }
        stamp
    });

    CanonicalItem {
        title: headline.title.clone(),
        external_id: headline.property(keys::EXTERNAL_ID).map(str::to_string),
        priority: priority_to_int(headline.priority),
        is_completed: headline.status == Some(Status::Done),
        is_deleted: headline.is_deleted(),
        due_date: headline
            .plan(keys::SCHEDULED)
            .and_then(|text| OrgDate::parse(text, DateFormat::Scheduled)),
        completion_date: headline
            .plan(keys::CLOSED)
            .and_then(|text| OrgDate::parse(text, DateFormat::Closed)),
        last_modified,
        list,
        notes: notes_of(headline.content.as_deref()),
        hash: headline.property(keys::HASH).map(str::to_string),
    }
}

/// Every list in document order.
pub fn lists_from_outline(outline: &Outline) -> Vec<CanonicalList> {
    outline
        .roots()
        .iter()
        .map(|id| list_from_headline(&outline[*id]))
        .collect()
}

/// Every item in document order.
pub fn items_from_outline(outline: &Outline) -> Vec<CanonicalItem> {
    outline
        .items()
        .into_iter()
        .map(|id| item_from_headline(outline, id))
        .collect()
}

pub fn headline_from_list(list: &CanonicalList) -> Headline {
    let mut headline = Headline::new(1, list.title.clone());
    if let Some(id) = &list.id {
        headline.set_property(keys::LIST_ID, id.clone());
    }
    if list.is_deleted {
        headline.tags.push(keys::DELETED.to_string());
    }
    headline
}

pub fn headline_from_item(item: &CanonicalItem) -> Headline {
    let mut headline = Headline::new(2, item.title.clone());
    headline.status = Some(if item.is_completed {
        Status::Done
    } else {
        Status::Todo
    });
    headline.priority = priority_from_int(item.priority);

    if let Some(due) = &item.due_date {
        headline
            .plans
            .insert(keys::SCHEDULED.to_string(), due.text().to_string());
    }
    if let Some(closed) = &item.completion_date {
        headline
            .plans
            .insert(keys::CLOSED.to_string(), closed.text().to_string());
    }

    if let Some(id) = &item.external_id {
        headline.set_property(keys::EXTERNAL_ID, id.clone());
    }
    if let Some(stamp) = &item.last_modified {
        headline.set_property(keys::LAST_MODIFIED, stamp.to_string());
    }
    if let Some(hash) = &item.hash {
        headline.set_property(keys::HASH, hash.clone());
    }

    if item.is_deleted {
        headline.tags.push(keys::DELETED.to_string());
    }
    headline.content = notes_of(item.notes.as_deref());
    headline
}

/// A one-list outline holding just `list`.
pub fn list_fragment(list: &CanonicalList) -> (Outline, HeadlineId) {
    let mut outline = Outline::new();
    let id = outline.push_root(headline_from_list(list));
    (outline, id)
}

/// An outline holding `item` under a headline for its list, so that
/// inserting it can find the list in the document.
pub fn item_fragment(item: &CanonicalItem) -> (Outline, HeadlineId) {
    let (mut outline, list) = list_fragment(&item.list);
    let id = outline.push_child(list, headline_from_item(item));
    (outline, id)
}

pub fn list_from_record(record: &ListRecord) -> CanonicalList {
    CanonicalList::new(Some(record.key.clone()), record.title.clone())
}

/// Build the canonical item for a store record.
///
/// Times are cut to what their text form can carry, so a store's sub-second
/// jitter never reads as a change, and the hash is computed fresh.
pub fn item_from_record(record: &ItemRecord) -> CanonicalItem {
    let mut item = CanonicalItem {
        title: record.title.clone(),
        external_id: Some(record.key.clone()),
        priority: normalize_priority(record.priority),
        is_completed: record.is_completed,
        is_deleted: false,
        due_date: record
            .due
            .map(|due| OrgDate::from_datetime(due, DateFormat::Scheduled)),
        completion_date: record
            .completed_at
            .map(|at| OrgDate::from_datetime(at, DateFormat::Closed)),
        last_modified: record.last_modified.map(Stamp::new),
        list: CanonicalList::new(Some(record.list_key.clone()), record.list_title.clone()),
        notes: notes_of(record.notes.as_deref()),
        hash: None,
    };
    item.hash = Some(item.compute_hash());
    item
}

fn due_of(item: &CanonicalItem) -> Option<NaiveDateTime> {
    item.due_date.as_ref().map(OrgDate::value)
}

/// Store request creating `item` in its list.
pub fn new_item(item: &CanonicalItem) -> Result<NewItem, StoreError> {
    let list_key = item
        .list
        .id
        .clone()
        .ok_or_else(|| StoreError::MissingListKey(item.list.title.clone()))?;
    Ok(NewItem {
        list_key,
        title: item.title.clone(),
        notes: item.notes.clone(),
        due: due_of(item),
        priority: item.priority,
        is_completed: item.is_completed,
    })
}

/// Store request overwriting the record of `item` with its fields.
pub fn item_changes(item: &CanonicalItem) -> Result<ItemChanges, StoreError> {
    let key = item
        .external_id
        .clone()
        .ok_or_else(|| StoreError::MissingItemKey(item.title.clone()))?;
    let list_key = item
        .list
        .id
        .clone()
        .ok_or_else(|| StoreError::MissingListKey(item.list.title.clone()))?;
    Ok(ItemChanges {
        key,
        list_key,
        title: item.title.clone(),
        notes: item.notes.clone(),
        due: due_of(item),
        priority: item.priority,
        is_completed: item.is_completed,
    })
}

/// The whole store as an outline: every list in store order, each followed
/// by its items in store order.
pub fn outline_from_store(lists: &[CanonicalList], items: &[CanonicalItem]) -> Outline {
    let mut outline = Outline::new();
    for list in lists {
        let parent = outline.push_root(headline_from_list(list));
        for item in items.iter().filter(|item| item.list.id == list.id) {
            outline.push_child(parent, headline_from_item(item));
        }
    }
    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::build_outline;
    use crate::tests::at;
    use chrono::Timelike;
    use org_reminders_syntax::parse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn record() -> ItemRecord {
        ItemRecord {
            key: "X1".into(),
            list_key: "L1".into(),
            list_title: "Work".into(),
            title: "Ship".into(),
            notes: Some("  by friday \n".into()),
            is_completed: true,
            priority: 3,
            due: Some(at(2025, 3, 9, 17, 0, 42)),
            completed_at: Some(at(2025, 3, 10, 9, 0, 0)),
            last_modified: Some(at(2025, 3, 10, 9, 0, 0).with_nanosecond(250_000_000).unwrap()),
        }
    }

    #[rstest]
    #[case(Some(Priority::A), 1)]
    #[case(Some(Priority::B), 5)]
    #[case(Some(Priority::C), 9)]
    #[case(None, 0)]
    fn test_priority_table(#[case] letter: Option<Priority>, #[case] value: i32) {
        assert_eq!(priority_to_int(letter), value);
        assert_eq!(priority_from_int(value), letter);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 1)]
    #[case(5, 5)]
    #[case(7, 9)]
    #[case(12, 0)]
    fn test_normalize_priority(#[case] value: i32, #[case] expected: i32) {
        assert_eq!(normalize_priority(value), expected);
    }

    #[test]
    fn test_item_from_headline() {
        let outline = build_outline(
            &parse(
                "* Work :DELETED:\n:PROPERTIES:\n:LIST-ID: L1\n:END:\n** DONE [#B] Ship\nCLOSED: [2025-03-10 Mon 09:00] SCHEDULED: <2025-03-09 Sun 17:00>\n:PROPERTIES:\n:EXTERNAL-ID: X1\n:LAST-MODIFIED: 2025-03-10 09:00:00\n:END:\n\n  notes  \n",
            ),
            0,
        );
        let item = item_from_headline(&outline, outline.items()[0]);

        assert_eq!(item.title, "Ship");
        assert_eq!(item.external_id.as_deref(), Some("X1"));
        assert_eq!(item.priority, 5);
        assert!(item.is_completed);
        assert!(!item.is_deleted);
        assert_eq!(
            item.due_date.map(|d| d.value()),
            Some(at(2025, 3, 9, 17, 0, 0))
        );
        assert_eq!(
            item.completion_date.map(|d| d.value()),
            Some(at(2025, 3, 10, 9, 0, 0))
        );
        assert_eq!(item.last_modified, Some(Stamp::new(at(2025, 3, 10, 9, 0, 0))));
        assert_eq!(item.notes.as_deref(), Some("notes"));
        assert_eq!(item.list.id.as_deref(), Some("L1"));
        assert!(item.list.is_deleted);
    }

    #[test]
    fn test_bad_last_modified_is_absent() {
        let outline = build_outline(
            &parse("* Work\n** TODO a\n:PROPERTIES:\n:LAST-MODIFIED: yesterday\n:END:\n"),
            0,
        );
        let item = item_from_headline(&outline, outline.items()[0]);
        assert_eq!(item.last_modified, None);
    }

    #[test]
    fn test_item_from_record_truncates_and_hashes() {
        let item = item_from_record(&record());

        assert_eq!(item.priority, 1);
        assert_eq!(item.notes.as_deref(), Some("by friday"));
        assert_eq!(item.due_date.as_ref().map(|d| d.text()), Some("<2025-03-09 Sun 17:00>"));
        assert_eq!(
            item.completion_date.as_ref().map(|d| d.text()),
            Some("[2025-03-10 Mon 09:00]")
        );
        assert_eq!(item.last_modified, Some(Stamp::new(at(2025, 3, 10, 9, 0, 0))));
        assert_eq!(item.list, CanonicalList::new(Some("L1".into()), "Work"));
        assert_eq!(item.modified(), None);
    }

    #[test]
    fn test_headline_from_item_round_trips_through_text() {
        // Given a store item written into a document
        let item = item_from_record(&record());
        let (fragment, id) = item_fragment(&item);
        let text = crate::parsing::serialize(&fragment, fragment.roots()[0]);

        // When the document is read back
        let outline = build_outline(&parse(&text), 0);
        let back = item_from_headline(&outline, outline.items()[0]);

        // Then the canonical item is unchanged
        assert_eq!(fragment.parent(id), Some(fragment.roots()[0]));
        assert_eq!(back, item);
    }

    #[test]
    fn test_headline_from_list_marks_deleted() {
        let mut list = CanonicalList::new(Some("L1".into()), "Work");
        list.is_deleted = true;
        let headline = headline_from_list(&list);

        assert_eq!(headline.level, 1);
        assert_eq!(headline.property(keys::LIST_ID), Some("L1"));
        assert!(headline.is_deleted());
        assert_eq!(list_from_headline(&headline), list);
    }

    #[test]
    fn test_store_requests_need_keys() {
        let mut item = item_from_record(&record());
        assert_eq!(item_changes(&item).unwrap().key, "X1");

        item.list.id = None;
        assert!(matches!(new_item(&item), Err(StoreError::MissingListKey(t)) if t == "Work"));

        item.external_id = None;
        assert!(matches!(item_changes(&item), Err(StoreError::MissingItemKey(_))));
    }

    #[test]
    fn test_outline_from_store_groups_items() {
        let lists = vec![
            CanonicalList::new(Some("L1".into()), "Work"),
            CanonicalList::new(Some("L2".into()), "Home"),
        ];
        let mut other = item_from_record(&record());
        other.list = lists[1].clone();
        let items = vec![item_from_record(&record()), other];

        let outline = outline_from_store(&lists, &items);

        assert_eq!(outline.roots().len(), 2);
        assert_eq!(outline.children(outline.roots()[0]).len(), 1);
        assert_eq!(outline.children(outline.roots()[1]).len(), 1);
    }
}
