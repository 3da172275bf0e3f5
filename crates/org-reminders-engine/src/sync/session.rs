use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::convert;
use crate::editing::{Document, DocumentError, DocumentWriter};
use crate::io::{IoError, read_org_file, read_org_file_or_empty, write_org_file};
use crate::models::{CanonicalItem, CanonicalList, Stamp, keys};
use crate::parsing::serialize;
use crate::store::{ItemFilter, ReminderStore, StoreError};
use crate::sync::engine::{ReconciliationEngine, Sourced};
use crate::sync::{SyncAction, SyncFailure, SyncReporter, SyncTarget, SyncVerb};

/// Where a sync pass is, or was when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStage {
    Idle,
    FetchStore,
    FetchDocument,
    Reconcile,
    ApplyDocumentMutations,
}

#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Io(#[from] IoError),
}

/// A pass that was aborted. Nothing of it is retained; the next pass starts
/// from [`PassStage::Idle`].
#[derive(Debug, thiserror::Error)]
#[error("Sync failed during {stage:?}: {source}")]
pub struct SyncError {
    pub stage: PassStage,
    #[source]
    pub source: PassError,
}

/// What a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Items whose HASH and LAST-MODIFIED were rewritten
    pub stamped: usize,
    /// Repeated items removed from the document
    pub duplicates: usize,
    pub actions: usize,
    pub failures: usize,
    /// Whether the org file was rewritten
    pub written: bool,
}

/// One org file synchronized with one store.
///
/// A session is the single writer of its document; every method that
/// changes it takes `&mut self`.
pub struct SyncSession<S, R> {
    path: PathBuf,
    doc: Document,
    store: S,
    reporter: R,
    stage: PassStage,
}

impl<S: ReminderStore, R: SyncReporter> SyncSession<S, R> {
    /// Open the org file at `path`. A missing file is an empty document.
    pub fn open(path: impl Into<PathBuf>, store: S, reporter: R) -> Result<Self, SyncError> {
        let path = path.into();
        let doc = read_org_file_or_empty(&path)
            .map_err(PassError::from)
            .and_then(|text| Ok(Document::load(&text)?))
            .map_err(|source| SyncError {
                stage: PassStage::FetchDocument,
                source,
            })?;

        Ok(Self {
            path,
            doc,
            store,
            reporter,
            stage: PassStage::Idle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    pub fn stage(&self) -> PassStage {
        self.stage
    }

    /// Run one full reconciliation pass.
    pub fn run_pass(&mut self, now: Stamp) -> Result<PassSummary, SyncError> {
        self.staged(|session| session.pass(now))
    }

    /// Stamp changed items and drop duplicates, without touching the store.
    pub fn update_hash(&mut self, now: Stamp) -> Result<PassSummary, SyncError> {
        self.staged(|session| {
            session.stage = PassStage::FetchDocument;
            let mut summary = PassSummary::default();
            let original = session.refresh_document(now, &mut summary)?;
            summary.written = session.save_if_changed(&original)?;
            Ok(summary)
        })
    }

    /// Replace the whole org file with the store's contents.
    pub fn sync_all(&mut self) -> Result<PassSummary, SyncError> {
        self.staged(|session| {
            session.stage = PassStage::FetchStore;
            let (lists, items) = session.fetch_store()?;

            session.stage = PassStage::ApplyDocumentMutations;
            let outline = convert::outline_from_store(&lists, &items);
            let mut text: String = outline
                .roots()
                .iter()
                .map(|root| serialize(&outline, *root))
                .collect();
            if text.starts_with('\n') {
                text.remove(0);
                text.push('\n');
            }
            log::info!(
                "Writing {} lists and {} items to {}",
                lists.len(),
                items.len(),
                session.path.display()
            );

            let original = read_org_file_or_empty(&session.path)?;
            session.doc.reload(&text)?;
            Ok(PassSummary {
                written: session.save_if_changed(&original)?,
                ..PassSummary::default()
            })
        })
    }

    fn staged<T>(
        &mut self,
        run: impl FnOnce(&mut Self) -> Result<T, PassError>,
    ) -> Result<T, SyncError> {
        let result = run(self);
        let stage = std::mem::replace(&mut self.stage, PassStage::Idle);
        result.map_err(|source| {
            log::error!("Sync pass aborted during {stage:?}: {source}");
            SyncError { stage, source }
        })
    }

    fn pass(&mut self, now: Stamp) -> Result<PassSummary, PassError> {
        let mut summary = PassSummary::default();

        self.stage = PassStage::FetchStore;
        let (store_lists, store_items) = self.fetch_store()?;

        self.stage = PassStage::FetchDocument;
        let original = self.refresh_document(now, &mut summary)?;
        let (doc_lists, doc_items) = self.document_side();

        self.stage = PassStage::Reconcile;
        let mut engine = ReconciliationEngine::new(&mut self.store, &mut self.reporter, now);
        engine.reconcile(&doc_lists, &store_lists);
        engine.reconcile(&doc_items, &store_items);
        let (mutations, stats) = engine.finish();
        summary.actions += stats.actions;
        summary.failures += stats.failures;

        self.stage = PassStage::ApplyDocumentMutations;
        for mutation in &mutations {
            if let Err(e) = mutation.apply(&mut self.doc) {
                self.reporter.failure(&SyncFailure {
                    at: now,
                    target: SyncTarget::Document,
                    verb: mutation.verb,
                    entity: mutation.value.clone(),
                    reason: e.to_string(),
                });
                summary.failures += 1;
            }
        }
        summary.written = self.save_if_changed(&original)?;

        log::debug!("Pass finished: {summary:?}");
        Ok(summary)
    }

    fn fetch_store(&self) -> Result<(Vec<CanonicalList>, Vec<CanonicalItem>), StoreError> {
        let lists = self
            .store
            .lists()?
            .iter()
            .map(convert::list_from_record)
            .collect();
        let items = self
            .store
            .items(ItemFilter::All)?
            .iter()
            .map(convert::item_from_record)
            .collect();
        Ok((lists, items))
    }

    /// Reload the file, stamp changed items and remove duplicates. Returns
    /// the text as read.
    fn refresh_document(
        &mut self,
        now: Stamp,
        summary: &mut PassSummary,
    ) -> Result<String, PassError> {
        let text = read_org_file_or_empty(&self.path)?;
        self.doc.reload(&text)?;
        summary.stamped = DocumentWriter::new(&mut self.doc).update_changed_hashes(now)?;
        summary.duplicates = self.remove_duplicates(now)?;
        summary.actions += summary.duplicates;
        Ok(text)
    }

    /// Delete every item repeating an EXTERNAL-ID seen earlier in the file.
    fn remove_duplicates(&mut self, now: Stamp) -> Result<usize, DocumentError> {
        let outline = self.doc.outline();
        let mut seen = HashSet::new();
        let repeated: Vec<_> = outline
            .items()
            .into_iter()
            .filter(|id| {
                outline[*id]
                    .property(keys::EXTERNAL_ID)
                    .is_some_and(|key| !seen.insert(key.to_string()))
            })
            .collect();

        // Later items first, so the ids of earlier ones stay valid.
        for id in repeated.iter().rev() {
            let item = convert::item_from_headline(self.doc.outline(), *id);
            self.reporter.action(&SyncAction::new(
                now,
                SyncTarget::Document,
                SyncVerb::Delete,
                item,
            ));
            DocumentWriter::new(&mut self.doc).delete(*id)?;
        }
        Ok(repeated.len())
    }

    fn document_side(&self) -> (Vec<Sourced<CanonicalList>>, Vec<Sourced<CanonicalItem>>) {
        let outline = self.doc.outline();
        let lists = outline
            .roots()
            .iter()
            .map(|id| Sourced {
                entity: convert::list_from_headline(&outline[*id]),
                source: outline[*id].clone(),
            })
            .collect();
        let items = outline
            .items()
            .into_iter()
            .map(|id| Sourced {
                entity: convert::item_from_headline(outline, id),
                source: outline[id].clone(),
            })
            .collect();
        (lists, items)
    }

    /// Overwrite the file if the document differs from `original`, then
    /// reparse what was written.
    fn save_if_changed(&mut self, original: &str) -> Result<bool, PassError> {
        let text = self.doc.text();
        if text == original {
            return Ok(false);
        }
        write_org_file(&self.path, &text)?;
        let written = read_org_file(&self.path)?;
        self.doc.reload(&written)?;
        Ok(true)
    }
}
