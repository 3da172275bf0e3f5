//! Two-way sync between the org document and a reminder store.
//!
//! A pass runs `Idle → FetchStore → FetchDocument → Reconcile →
//! ApplyDocumentMutations → Idle`. Lists are reconciled before items, each in
//! document order and then store order, so that reports and tie-breaks are
//! reproducible.

pub mod engine;
pub mod mutation;
pub mod report;
pub mod scheduler;
pub mod session;

pub use engine::{
    ApplyToStore, Keyed, ReconcileStats, Reconcilable, ReconciliationEngine, Sourced,
    Timestamped, Verdict,
};
pub use mutation::{DocumentMutation, Locator, MutationError};
pub use report::{
    LogReporter, RecordingReporter, SyncAction, SyncFailure, SyncReporter, SyncTarget, SyncVerb,
};
pub use scheduler::{Coalescer, OrgFileWatcher, Wake, WatchError, watch};
pub use session::{PassError, PassStage, PassSummary, SyncError, SyncSession};
