use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use org_reminders_engine::models::{Stamp, keys};
use org_reminders_engine::store::{ItemFilter, ItemRecord, ListRecord, MemoryStore, ReminderStore};
use org_reminders_engine::sync::{RecordingReporter, SyncSession, SyncTarget, SyncVerb};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .unwrap()
}

fn now() -> Stamp {
    Stamp::new(at(10, 12, 0, 0))
}

/// A store with list `L1` "Work", stamping changes at 12:00:05.
fn work_store() -> MemoryStore {
    let mut store = MemoryStore::new().with_clock(|| at(10, 12, 0, 5));
    store.insert_list(ListRecord {
        key: "L1".into(),
        title: "Work".into(),
    });
    store
}

fn ship(last_modified: NaiveDateTime) -> ItemRecord {
    ItemRecord {
        key: "X1".into(),
        list_key: "L1".into(),
        list_title: "Work".into(),
        title: "Ship".into(),
        notes: None,
        is_completed: false,
        priority: 0,
        due: None,
        completed_at: None,
        last_modified: Some(last_modified),
    }
}

struct Fixture {
    _temp: TempDir,
    session: SyncSession<MemoryStore, RecordingReporter>,
}

impl Fixture {
    fn new(text: &str, store: MemoryStore) -> Self {
        let temp = TempDir::new().unwrap();
        let path: PathBuf = temp.path().join("reminders.org");
        std::fs::write(&path, text).unwrap();
        let session = SyncSession::open(path, store, RecordingReporter::new()).unwrap();
        Self {
            _temp: temp,
            session,
        }
    }

    fn actions(&self) -> Vec<(SyncTarget, SyncVerb, String)> {
        self.session.reporter().summary()
    }

    fn file(&self) -> String {
        std::fs::read_to_string(self.session.path()).unwrap()
    }

    fn store_items(&self) -> Vec<ItemRecord> {
        self.session.store().items(ItemFilter::All).unwrap()
    }

    /// Run another pass and check it has nothing left to do.
    fn assert_settled(&mut self) {
        let before = self.file();
        self.session.reporter_mut().clear();

        let summary = self.session.run_pass(now()).unwrap();

        assert_eq!(self.actions(), vec![]);
        assert_eq!((summary.actions, summary.failures), (0, 0));
        assert!(!summary.written);
        assert_eq!(self.file(), before);
    }
}

const WORK: &str = "* Work\n:PROPERTIES:\n:LIST-ID: L1\n:END:\n";

#[test]
fn new_list_is_created_in_store_and_keyed_in_document() {
    let mut fx = Fixture::new("* Groceries\n", MemoryStore::new());

    let summary = fx.session.run_pass(now()).unwrap();

    assert_eq!(
        fx.actions(),
        vec![
            (SyncTarget::Store, SyncVerb::Add, "Groceries".to_string()),
            (SyncTarget::Document, SyncVerb::Update, "Groceries".to_string()),
        ]
    );
    assert!(summary.written);
    let lists = fx.session.store().lists().unwrap();
    assert_eq!(lists.len(), 1);
    let doc = fx.session.document();
    let root = doc.headline(doc.outline().roots()[0]);
    assert_eq!(root.title, "Groceries");
    assert_eq!(root.property(keys::LIST_ID), Some(lists[0].key.as_str()));
    fx.assert_settled();
}

#[test]
fn new_item_in_new_list_reaches_store_in_one_pass() {
    let store = MemoryStore::new().with_clock(|| at(10, 12, 0, 5));
    let mut fx = Fixture::new("* Home\n** TODO Paint fence\n", store);

    fx.session.run_pass(now()).unwrap();

    assert_eq!(
        fx.actions(),
        vec![
            (SyncTarget::Store, SyncVerb::Add, "Home".to_string()),
            (SyncTarget::Document, SyncVerb::Update, "Home".to_string()),
            (SyncTarget::Store, SyncVerb::Add, "Paint fence".to_string()),
            (SyncTarget::Document, SyncVerb::Update, "Paint fence".to_string()),
        ]
    );
    let items = fx.store_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].list_title, "Home");
    let doc = fx.session.document();
    let paint = doc.headline(doc.outline().items()[0]);
    assert_eq!(paint.property(keys::EXTERNAL_ID), Some(items[0].key.as_str()));
    assert_eq!(paint.property(keys::LAST_MODIFIED), Some("2025-03-10 12:00:05"));
    fx.assert_settled();
}

#[test]
fn deleted_item_is_removed_from_both_sides() {
    // Given an item tagged DELETED that the store still has
    let mut store = work_store();
    store.insert_item(ship(at(9, 17, 0, 0)));
    let text = format!("{WORK}** TODO Ship :DELETED:\n:PROPERTIES:\n:EXTERNAL-ID: X1\n:END:\n");
    let mut fx = Fixture::new(&text, store);

    // When a pass runs
    fx.session.run_pass(now()).unwrap();

    // Then the store drops it and so does the file
    assert_eq!(
        fx.actions(),
        vec![
            (SyncTarget::Store, SyncVerb::Delete, "Ship".to_string()),
            (SyncTarget::Document, SyncVerb::Delete, "Ship".to_string()),
        ]
    );
    assert_eq!(fx.store_items(), vec![]);
    assert_eq!(fx.file(), WORK);
    fx.assert_settled();
}

#[test]
fn newer_document_edit_updates_store_once() {
    // Given the title was edited after the store last changed
    let mut store = work_store();
    store.insert_item(ship(at(9, 17, 0, 0)));
    let text = format!("{WORK}** TODO Ship it\n:PROPERTIES:\n:EXTERNAL-ID: X1\n:END:\n");
    let mut fx = Fixture::new(&text, store);

    // When a pass runs
    let summary = fx.session.run_pass(now()).unwrap();

    // Then exactly one store update is made
    assert_eq!(
        fx.actions(),
        vec![(SyncTarget::Store, SyncVerb::Update, "Ship it".to_string())]
    );
    assert_eq!(summary.stamped, 1);
    let items = fx.store_items();
    assert_eq!(items[0].title, "Ship it");
    assert_eq!(items[0].last_modified, Some(at(10, 12, 0, 5)));
    // And the document carries the store's modification time
    let doc = fx.session.document();
    let item = doc.headline(doc.outline().items()[0]);
    assert_eq!(item.property(keys::LAST_MODIFIED), Some("2025-03-10 12:00:05"));
    fx.assert_settled();
}

#[test]
fn newer_store_edit_rewrites_document_item() {
    let mut store = work_store();
    let mut record = ship(at(10, 11, 0, 0));
    record.title = "Ship today".into();
    record.priority = 1;
    store.insert_item(record);
    let text = format!(
        "{WORK}** TODO Ship\n:PROPERTIES:\n:EXTERNAL-ID: X1\n:LAST-MODIFIED: 2025-03-09 17:00:00\n:END:\n"
    );
    let mut fx = Fixture::new(&text, store);

    // The missing HASH makes this item look edited; stamp it in the past
    // so the store still wins.
    fx.session.run_pass(Stamp::new(at(9, 18, 0, 0))).unwrap();

    assert_eq!(
        fx.actions(),
        vec![(SyncTarget::Document, SyncVerb::Update, "Ship today".to_string())]
    );
    assert_eq!(fx.store_items()[0].title, "Ship today");
    let doc = fx.session.document();
    let item = doc.headline(doc.outline().items()[0]);
    assert_eq!(item.title, "Ship today");
    assert_eq!(item.property(keys::LAST_MODIFIED), Some("2025-03-10 11:00:00"));
    assert!(fx.file().contains("** TODO [#A] Ship today\n"));
    fx.assert_settled();
}

#[test]
fn store_only_item_is_added_under_its_list() {
    let mut store = work_store();
    store.insert_item(ship(at(9, 17, 0, 0)));
    let mut fx = Fixture::new(&format!("* Home\n{WORK}"), store);

    fx.session.run_pass(now()).unwrap();

    assert_eq!(
        fx.actions(),
        vec![
            (SyncTarget::Store, SyncVerb::Add, "Home".to_string()),
            (SyncTarget::Document, SyncVerb::Update, "Home".to_string()),
            (SyncTarget::Document, SyncVerb::Add, "Ship".to_string()),
        ]
    );
    let doc = fx.session.document();
    let roots = doc.outline().roots();
    assert_eq!(doc.outline().children(roots[0]).len(), 0);
    let work_items = doc.outline().children(roots[1]);
    assert_eq!(work_items.len(), 1);
    assert_eq!(
        doc.headline(work_items[0]).property(keys::EXTERNAL_ID),
        Some("X1")
    );
    fx.assert_settled();
}

#[test]
fn item_missing_from_store_is_dropped_from_document() {
    let text = format!("{WORK}** TODO Gone\n:PROPERTIES:\n:EXTERNAL-ID: X9\n:END:\n");
    let mut fx = Fixture::new(&text, work_store());

    fx.session.run_pass(now()).unwrap();

    assert_eq!(
        fx.actions(),
        vec![(SyncTarget::Document, SyncVerb::Delete, "Gone".to_string())]
    );
    assert_eq!(fx.file(), WORK);
    fx.assert_settled();
}

#[test]
fn exported_file_is_already_in_sync() {
    // Given a file written straight from the store
    let mut store = work_store();
    store.insert_item(ship(at(9, 17, 0, 0)));
    let mut fx = Fixture::new("", store);
    fx.session.sync_all().unwrap();

    // Then a pass finds nothing to do
    fx.assert_settled();
}

#[test]
fn list_statistics_follow_item_states() {
    let mut store = MemoryStore::new().with_clock(|| at(10, 12, 0, 0));
    store.insert_list(ListRecord {
        key: "L1".into(),
        title: "Buy milk".into(),
    });
    for (n, done) in [true, true, false, false, false].into_iter().enumerate() {
        let mut record = ship(at(9, 17, 0, 0));
        record.key = format!("X{n}");
        record.list_title = "Buy milk".into();
        record.title = format!("Item {n}");
        record.is_completed = done;
        record.completed_at = done.then(|| at(9, 18, 0, 0));
        store.insert_item(record);
    }
    let mut fx = Fixture::new("", store);

    fx.session.sync_all().unwrap();

    assert!(fx.file().starts_with("* Buy milk [2/5]\n"));
    let doc = fx.session.document();
    assert_eq!(doc.headline(doc.outline().roots()[0]).title, "Buy milk");
}

#[test]
fn list_missing_from_store_takes_its_items_along() {
    // Given a synced list the store no longer has
    let text = format!(
        "{WORK}** TODO a\n:PROPERTIES:\n:EXTERNAL-ID: X1\n:END:\n\
         ** TODO b\n:PROPERTIES:\n:EXTERNAL-ID: X2\n:END:\n"
    );
    let mut fx = Fixture::new(&text, MemoryStore::new());

    // When a pass runs
    let summary = fx.session.run_pass(now()).unwrap();

    // Then the list goes with its items and nothing is reported as failed
    assert_eq!(
        fx.actions(),
        vec![(SyncTarget::Document, SyncVerb::Delete, "Work".to_string())]
    );
    assert_eq!(summary.failures, 0);
    assert!(fx.session.reporter().failures.is_empty());
    assert_eq!(fx.file(), "");
    fx.assert_settled();
}

#[test]
fn deleted_list_never_synced_drops_its_new_items() {
    let mut fx = Fixture::new("* Old :DELETED:\n** TODO a\n", MemoryStore::new());

    let summary = fx.session.run_pass(now()).unwrap();

    assert_eq!(
        fx.actions(),
        vec![(SyncTarget::Document, SyncVerb::Delete, "Old".to_string())]
    );
    assert_eq!(summary.failures, 0);
    assert_eq!(fx.store_items(), vec![]);
    assert!(fx.session.store().lists().unwrap().is_empty());
    assert_eq!(fx.file(), "");
    fx.assert_settled();
}
