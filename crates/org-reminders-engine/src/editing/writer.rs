//! Writing headlines back into the org text.
//!
//! Serialized headlines start with `\n` while sections own their trailing
//! newline. At a line start the writer therefore splices the serialized text
//! without its leading newline and with one appended; at the end of a file
//! lacking a final newline it inserts the text as serialized.
//!
//! `update` only rewrites the own-fields span of a headline, from its stars
//! to its first child section. Children keep their text byte for byte.
//!
//! Each write is one [`Cmd`], so the document reparses after every call and
//! the outline must be consulted again for fresh [`HeadlineId`]s.

use crate::convert;
use crate::editing::{Cmd, Document, DocumentError, Patch};
use crate::models::{Headline, HeadlineId, Outline, Stamp, keys};
use crate::parsing::{serialize, serialize_own};

/// Splices headlines into a [`Document`] by node range.
///
/// Every call applies exactly one command, after which the document has
/// been reparsed and all previously obtained [`HeadlineId`]s are invalid.
pub struct DocumentWriter<'a> {
    doc: &'a mut Document,
}

impl<'a> DocumentWriter<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        Self { doc }
    }

    /// Remove the headline together with its children.
    pub fn delete(&mut self, id: HeadlineId) -> Result<Patch, DocumentError> {
        let range = self.doc.ranges(id)?.node;
        log::debug!("Deleting headline at {range:?}");
        self.doc.apply(Cmd::DeleteRange { range })
    }

    /// Insert `id` from `fragment`, with its children, as the last child of
    /// the document headline matching its parent.
    ///
    /// Without a parent, or when the parent is not in the document, the
    /// headline is appended at the end.
    pub fn insert(&mut self, fragment: &Outline, id: HeadlineId) -> Result<Patch, DocumentError> {
        let parent = fragment
            .parent(id)
            .and_then(|parent| self.doc.find_by_identity(&fragment[parent]));
        let at = match parent {
            Some(parent) => self.doc.ranges(parent)?.node.end,
            None => self.doc.len(),
        };
        self.insert_at(fragment, id, at)
    }

    /// Insert `id` from `fragment`, with its children, at byte offset `at`.
    pub fn insert_at(
        &mut self,
        fragment: &Outline,
        id: HeadlineId,
        at: usize,
    ) -> Result<Patch, DocumentError> {
        let serialized = serialize(fragment, id);
        let text = if self.doc.at_line_start(at) {
            spliced(&serialized)
        } else {
            serialized
        };
        self.doc.apply(Cmd::InsertText { at, text })
    }

    /// Rewrite the headline's own fields from the outline, leaving the text
    /// of its children untouched.
    pub fn update(&mut self, id: HeadlineId) -> Result<Patch, DocumentError> {
        let range = self.doc.ranges(id)?.own();
        let text = spliced(&serialize_own(&self.doc.outline, id));
        self.doc.apply(Cmd::ReplaceRange { range, text })
    }

    /// Replace the headline's own fields with those of `fields` and write it.
    pub fn replace_fields(
        &mut self,
        id: HeadlineId,
        fields: &Headline,
    ) -> Result<Patch, DocumentError> {
        self.doc.headline_mut(id).assign_fields(fields);
        self.update(id)
    }

    /// Stamp `HASH` and `LAST-MODIFIED` on every item whose visible fields
    /// changed since it was last stamped. Returns how many were rewritten.
    pub fn update_changed_hashes(&mut self, as_of: Stamp) -> Result<usize, DocumentError> {
        let mut updated = 0;
        let mut index = 0;

        // Updates rebuild the outline, so items are addressed by position.
        while let Some(id) = self.doc.outline().items().get(index).copied() {
            index += 1;
            let item = convert::item_from_headline(self.doc.outline(), id);
            let Some(hash) = item.modified() else {
                continue;
            };

            log::info!(
                "Stamping changed item {:?} ({})",
                item.title,
                item.external_id.as_deref().unwrap_or("new")
            );
            let headline = self.doc.headline_mut(id);
            headline.set_property(keys::HASH, hash);
            headline.set_property(keys::LAST_MODIFIED, as_of.to_string());
            self.update(id)?;
            updated += 1;
        }

        Ok(updated)
    }
}

/// Serialized headlines start with a newline while sections own their
/// trailing one; turn the former into the latter.
fn spliced(serialized: &str) -> String {
    let mut text = serialized
        .strip_prefix('\n')
        .unwrap_or(serialized)
        .to_string();
    text.push('\n');
    text
}
