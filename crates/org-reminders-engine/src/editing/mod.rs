/*!
 * # Editing
 *
 * The org file lives in a single **`xi_rope::Rope`** buffer. It is the only
 * source of truth: headlines are never regenerated wholesale, only the span
 * of the one headline being changed is rewritten.
 *
 * - **`commands`**: `Cmd` text edits and their compilation to deltas
 * - **`document`**: `Document`, holding the rope, the syntax tree and the
 *   headline outline derived from it
 * - **`writer`**: `DocumentWriter`, splicing serialized headlines into the
 *   buffer by node range
 * - **`patch`**: what an applied command changed
 *
 * Every applied command reparses the buffer before returning, so node ranges
 * taken from the new outline are valid until the next command.
 *
 * ```rust
 * use org_reminders_engine::editing::{Document, DocumentWriter};
 *
 * let mut doc = Document::load("* Work\n** TODO Ship\n").unwrap();
 * let ship = doc.outline().items()[0];
 * DocumentWriter::new(&mut doc).delete(ship).unwrap();
 * assert_eq!(doc.text(), "* Work\n");
 * ```
 */

pub mod commands;
pub mod document;
pub mod patch;
pub mod writer;

pub use commands::Cmd;
pub use document::{Document, DocumentError, NodeRanges};
pub use patch::Patch;
pub use writer::DocumentWriter;
