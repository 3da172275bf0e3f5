//! Key-based reconciliation of document-side and store-side entities.
//!
//! [`ReconciliationEngine::reconcile`] walks one entity kind at a time.
//! Store calls happen immediately; changes to the document are queued as
//! [`DocumentMutation`]s and written afterwards, in the order they were
//! decided.

use std::collections::{HashMap, HashSet};

use crate::convert;
use crate::models::{CanonicalItem, CanonicalList, Entity, Headline, Stamp};
use crate::store::{ReminderStore, StoreError, StoreResult};
use crate::sync::mutation::{DocumentMutation, Locator};
use crate::sync::{SyncAction, SyncFailure, SyncReporter, SyncTarget, SyncVerb};

/// Outcome of comparing one entity present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    InSync,
    DocumentWins,
    StoreWins,
    DeleteBoth,
}

pub trait Keyed {
    /// Store key, `None` until the store has assigned one.
    fn key(&self) -> Option<&str>;
}

pub trait Timestamped {
    fn last_modified(&self) -> Option<Stamp> {
        None
    }
}

pub trait ApplyToStore: Sized {
    fn create_in(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>>;

    /// Overwrite the store record with this entity's fields.
    fn push_to(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>>;

    fn delete_from(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>>;
}

/// An entity kind the engine can reconcile.
pub trait Reconcilable: Keyed + Timestamped + ApplyToStore + Clone + Into<Entity> {
    fn is_deleted(&self) -> bool;

    /// A headline carrying this entity's store key, for identity lookups.
    fn probe(&self) -> Headline;

    /// Key of the list this entity lives in, if it lives in one.
    fn list_key(&self) -> Option<&str> {
        None
    }

    /// Whether the document marks this entity's list DELETED.
    fn list_is_deleted(&self) -> bool {
        false
    }

    /// Fill in anything only known once lists were created this pass.
    fn adopt_lists(&mut self, _created: &[CanonicalList]) {}

    /// Compare the document side (`self`) with the store side.
    ///
    /// The later modification time wins; equal times need nothing. When
    /// only one side has a time, that side wins.
    fn verdict(&self, store_side: &Self) -> Verdict {
        if self.is_deleted() {
            return Verdict::DeleteBoth;
        }
        match (self.last_modified(), store_side.last_modified()) {
            (Some(ours), Some(theirs)) if ours == theirs => Verdict::InSync,
            (Some(ours), Some(theirs)) if ours > theirs => Verdict::DocumentWins,
            (Some(_), Some(_)) => Verdict::StoreWins,
            (Some(_), None) => Verdict::DocumentWins,
            (None, Some(_)) => Verdict::StoreWins,
            (None, None) => Verdict::InSync,
        }
    }
}

impl Keyed for CanonicalList {
    fn key(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Timestamped for CanonicalList {}

impl ApplyToStore for CanonicalList {
    fn create_in(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>> {
        Ok(store
            .create_list(&self.title)?
            .map(|record| convert::list_from_record(&record)))
    }

    fn push_to(&self, _store: &mut dyn ReminderStore) -> StoreResult<Option<Self>> {
        Err(StoreError::ListUpdate)
    }

    fn delete_from(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>> {
        let key = self.id.as_deref().unwrap_or_default();
        Ok(store
            .delete_list(key)?
            .map(|record| convert::list_from_record(&record)))
    }
}

impl Reconcilable for CanonicalList {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn probe(&self) -> Headline {
        convert::headline_from_list(self)
    }

    /// Lists carry no modification time: a differing title is taken from
    /// the store.
    fn verdict(&self, store_side: &Self) -> Verdict {
        if self.is_deleted {
            Verdict::DeleteBoth
        } else if self.title == store_side.title {
            Verdict::InSync
        } else {
            Verdict::StoreWins
        }
    }
}

impl Keyed for CanonicalItem {
    fn key(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

impl Timestamped for CanonicalItem {
    fn last_modified(&self) -> Option<Stamp> {
        self.last_modified
    }
}

impl ApplyToStore for CanonicalItem {
    fn create_in(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>> {
        let request = convert::new_item(self)?;
        Ok(store
            .create_item(&request)?
            .map(|record| convert::item_from_record(&record)))
    }

    fn push_to(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>> {
        let changes = convert::item_changes(self)?;
        Ok(store
            .update_item(&changes)?
            .map(|record| convert::item_from_record(&record)))
    }

    fn delete_from(&self, store: &mut dyn ReminderStore) -> StoreResult<Option<Self>> {
        let key = self
            .external_id
            .as_deref()
            .ok_or_else(|| StoreError::MissingItemKey(self.title.clone()))?;
        let list_key = self
            .list
            .id
            .as_deref()
            .ok_or_else(|| StoreError::MissingListKey(self.list.title.clone()))?;
        Ok(store
            .delete_item(key, list_key)?
            .map(|record| convert::item_from_record(&record)))
    }
}

impl Reconcilable for CanonicalItem {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn probe(&self) -> Headline {
        convert::headline_from_item(self)
    }

    fn list_key(&self) -> Option<&str> {
        self.list.id.as_deref()
    }

    fn list_is_deleted(&self) -> bool {
        self.list.is_deleted
    }

    fn adopt_lists(&mut self, created: &[CanonicalList]) {
        if self.list.id.is_some() {
            return;
        }
        if let Some(list) = created.iter().find(|l| l.title == self.list.title) {
            self.list.id = list.id.clone();
        }
    }
}

/// A document-side entity together with the headline it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<E> {
    pub entity: E,
    pub source: Headline,
}

/// Counts for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub actions: usize,
    pub failures: usize,
}

/// Reconciles one pass worth of entities against a store.
///
/// Lists must be reconciled before items so that items can find lists
/// created or deleted earlier in the same pass.
pub struct ReconciliationEngine<'a> {
    store: &'a mut dyn ReminderStore,
    reporter: &'a mut dyn SyncReporter,
    /// Time stamped on every report
    now: Stamp,
    /// Document changes, in decision order
    mutations: Vec<DocumentMutation>,
    /// Lists the store created this pass, for items still lacking a list key
    created_lists: Vec<CanonicalList>,
    /// Keys of lists leaving the document this pass
    deleted_lists: HashSet<String>,
    stats: ReconcileStats,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(
        store: &'a mut dyn ReminderStore,
        reporter: &'a mut dyn SyncReporter,
        now: Stamp,
    ) -> Self {
        Self {
            store,
            reporter,
            now,
            mutations: Vec::new(),
            created_lists: Vec::new(),
            deleted_lists: HashSet::new(),
            stats: ReconcileStats::default(),
        }
    }

    /// Reconcile one entity kind. Document-side entities are visited in
    /// document order, then store-only entities in store order.
    pub fn reconcile<E: Reconcilable>(&mut self, doc_side: &[Sourced<E>], store_side: &[E]) {
        let doc_keys: HashSet<&str> = doc_side.iter().filter_map(|d| d.entity.key()).collect();
        let store_index: HashMap<&str, &E> = store_side
            .iter()
            .filter_map(|s| s.key().map(|key| (key, s)))
            .collect();

        for sourced in doc_side {
            if self.in_deleted_list(&sourced.entity) {
                continue;
            }
            let mut ours = sourced.entity.clone();
            ours.adopt_lists(&self.created_lists);

            let key = ours.key().map(str::to_string);
            match key {
                None if ours.is_deleted() => {
                    // Never reached the store, so only the document has it.
                    let locator = Locator::Shape(sourced.source.clone());
                    self.queue(DocumentMutation::delete(locator, ours));
                }
                None => self.create(ours, &sourced.source),
                Some(key) => match store_index.get(key.as_str()) {
                    None => {
                        let locator = Locator::Identity(ours.probe());
                        let mutation = DocumentMutation::delete(locator, ours);
                        self.forget_list(&mutation.value);
                        self.queue(mutation);
                    }
                    Some(theirs) => self.sync_pair(ours, theirs),
                },
            }
        }

        for theirs in store_side {
            let known = theirs.key().is_some_and(|key| doc_keys.contains(key));
            if !known && !self.in_deleted_list(theirs) {
                self.queue(DocumentMutation::add(theirs.clone()));
            }
        }
    }

    /// The queued document changes, in decision order.
    pub fn finish(self) -> (Vec<DocumentMutation>, ReconcileStats) {
        (self.mutations, self.stats)
    }

    /// Items of a list going away this pass leave with its headline.
    fn in_deleted_list<E: Reconcilable>(&self, entity: &E) -> bool {
        entity.list_is_deleted()
            || entity
                .list_key()
                .is_some_and(|key| self.deleted_lists.contains(key))
    }

    fn forget_list(&mut self, entity: &Entity) {
        if let Entity::List(list) = entity
            && let Some(id) = &list.id
        {
            self.deleted_lists.insert(id.clone());
        }
    }

    fn create<E: Reconcilable>(&mut self, ours: E, source: &Headline) {
        self.report(SyncTarget::Store, SyncVerb::Add, &ours);
        match ours.create_in(&mut *self.store) {
            Ok(Some(created)) => {
                let entity: Entity = created.into();
                if let Entity::List(list) = &entity {
                    self.created_lists.push(list.clone());
                }
                let locator = Locator::Shape(source.clone());
                self.queue(DocumentMutation::update(locator, entity));
            }
            result => self.fail(SyncTarget::Store, SyncVerb::Add, ours, result.err()),
        }
    }

    fn sync_pair<E: Reconcilable>(&mut self, ours: E, theirs: &E) {
        match ours.verdict(theirs) {
            Verdict::InSync => {}
            Verdict::DeleteBoth => {
                self.report(SyncTarget::Store, SyncVerb::Delete, &ours);
                match ours.delete_from(&mut *self.store) {
                    Ok(Some(_)) => {
                        let entity: Entity = ours.clone().into();
                        self.forget_list(&entity);
                        let locator = Locator::Identity(ours.probe());
                        self.queue(DocumentMutation::delete(locator, entity));
                    }
                    result => self.fail(SyncTarget::Store, SyncVerb::Delete, ours, result.err()),
                }
            }
            Verdict::DocumentWins => {
                self.report(SyncTarget::Store, SyncVerb::Update, &ours);
                match ours.push_to(&mut *self.store) {
                    // The store stamps its own modification time; copy it
                    // back so both sides agree on the next pass.
                    Ok(Some(updated)) => self.mutations.push(DocumentMutation::update(
                        Locator::Identity(updated.probe()),
                        updated,
                    )),
                    result => self.fail(SyncTarget::Store, SyncVerb::Update, ours, result.err()),
                }
            }
            Verdict::StoreWins => {
                let locator = Locator::Identity(theirs.probe());
                self.queue(DocumentMutation::update(locator, theirs.clone()));
            }
        }
    }

    /// Queue a document mutation and report it.
    fn queue(&mut self, mutation: DocumentMutation) {
        let action = SyncAction::new(
            self.now,
            SyncTarget::Document,
            mutation.verb,
            mutation.value.clone(),
        );
        self.reporter.action(&action);
        self.stats.actions += 1;
        self.mutations.push(mutation);
    }

    fn report<E: Reconcilable>(&mut self, target: SyncTarget, verb: SyncVerb, entity: &E) {
        let action = SyncAction::new(self.now, target, verb, entity.clone());
        self.reporter.action(&action);
        self.stats.actions += 1;
    }

    fn fail<E: Reconcilable>(
        &mut self,
        target: SyncTarget,
        verb: SyncVerb,
        entity: E,
        error: Option<StoreError>,
    ) {
        let reason = error.map_or_else(|| "store returned no record".to_string(), |e| e.to_string());
        self.reporter.failure(&SyncFailure {
            at: self.now,
            target,
            verb,
            entity: entity.into(),
            reason,
        });
        self.stats.failures += 1;
    }
}
