//! Two-way sync between an org outline file and a reminder store.
//!
//! Level-1 headlines are lists, level-2 headlines are reminder items. The
//! [`sync::SyncSession`] reads both sides, decides per entity which side
//! wins and writes the result back to each.

pub mod convert;
pub mod editing;
pub mod hashing;
pub mod io;
pub mod models;
pub mod parsing;
pub mod store;
pub mod sync;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{Document, DocumentError, DocumentWriter};
pub use io::*;
pub use models::{CanonicalItem, CanonicalList, Entity, Headline, Outline, Stamp};
pub use store::{JsonFileStore, MemoryStore, ReminderStore, StoreError};
pub use sync::{LogReporter, PassSummary, SyncError, SyncReporter, SyncSession};
