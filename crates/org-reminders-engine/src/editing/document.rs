//! The document model: one org file held as an `xi_rope` buffer, the
//! lossless syntax tree parsed from it, and the outline of lists and items
//! built from the tree.

use std::ops::Range;

use org_reminders_syntax::{SyntaxKind, SyntaxNode, parse, reparse};
use rowan::TextRange;
use xi_rope::Rope;

use crate::editing::commands::compile_command;
use crate::editing::{Cmd, Patch};
use crate::models::{Headline, HeadlineId, Outline, SyntaxRef};
use crate::parsing::build_outline;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Parser produced a {0:?} node instead of a root")]
    Parse(SyntaxKind),
    #[error("Stale syntax reference from generation {found}, document is at {current}")]
    StaleNode { found: u64, current: u64 },
    #[error("No section at {0:?} in the current syntax tree")]
    MissingNode(TextRange),
    #[error("Headline was not built from this document")]
    Unbound,
}

/// Byte spans of one headline's section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRanges {
    /// The whole section, children included
    pub node: Range<usize>,
    /// From the first child section to the end of the node
    pub children: Option<Range<usize>>,
}

impl NodeRanges {
    /// The headline's own fields: the node minus its children.
    pub fn own(&self) -> Range<usize> {
        let end = self
            .children
            .as_ref()
            .map_or(self.node.end, |children| children.start);
        self.node.start..end
    }
}

/// The org document: text buffer, syntax tree and headline outline.
///
/// The rope is the source of truth. Every applied command reparses the text
/// and rebuilds the outline, bumping `generation` so that syntax references
/// taken before the edit are rejected instead of resolving to the wrong span.
pub struct Document {
    /// Current text
    pub(crate) buffer: Rope,
    /// Syntax tree of `buffer`
    pub(crate) tree: SyntaxNode,
    /// Lists and items built from `tree`
    pub(crate) outline: Outline,
    /// Incremented whenever the tree is replaced
    pub(crate) generation: u64,
    /// Incremented on each applied command
    pub(crate) version: u64,
}

impl Document {
    pub fn load(text: &str) -> Result<Self, DocumentError> {
        let tree = parse(text);
        ensure_root(&tree)?;
        let outline = build_outline(&tree, 0);
        Ok(Self {
            buffer: Rope::from(text),
            tree,
            outline,
            generation: 0,
            version: 0,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::load(std::str::from_utf8(bytes)?)
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tree(&self) -> &SyntaxNode {
        &self.tree
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Top-level headlines (the lists), in document order.
    pub fn headlines(&self) -> impl Iterator<Item = &Headline> {
        self.outline.roots().iter().map(|id| &self.outline[*id])
    }

    pub fn headline(&self, id: HeadlineId) -> &Headline {
        &self.outline[id]
    }

    /// In-memory fields only. The text changes once the headline is written
    /// back with [`DocumentWriter::update`](crate::editing::DocumentWriter::update).
    pub fn headline_mut(&mut self, id: HeadlineId) -> &mut Headline {
        &mut self.outline[id]
    }

    pub fn find_by_identity(&self, probe: &Headline) -> Option<HeadlineId> {
        self.outline.find_by_identity(probe)
    }

    pub fn find_by_shape(&self, probe: &Headline) -> Option<HeadlineId> {
        self.outline.find_by_shape(probe)
    }

    /// Find the SECTION node a syntax reference points at in the live tree.
    pub fn resolve(&self, syntax: SyntaxRef) -> Result<SyntaxNode, DocumentError> {
        if syntax.generation != self.generation {
            return Err(DocumentError::StaleNode {
                found: syntax.generation,
                current: self.generation,
            });
        }
        self.tree
            .descendants()
            .find(|n| n.kind() == SyntaxKind::SECTION && n.text_range() == syntax.range)
            .ok_or(DocumentError::MissingNode(syntax.range))
    }

    /// Current byte spans of a headline, derived from the live tree.
    pub fn ranges(&self, id: HeadlineId) -> Result<NodeRanges, DocumentError> {
        let syntax = self.outline.syntax(id).ok_or(DocumentError::Unbound)?;
        let node = self.resolve(syntax)?;
        let node_range = to_range(node.text_range());
        let children = node
            .children()
            .find(|n| n.kind() == SyntaxKind::SECTION)
            .map(|first| usize::from(first.text_range().start())..node_range.end);
        Ok(NodeRanges {
            node: node_range,
            children,
        })
    }

    /// Apply a command, reparse and rebuild the outline.
    ///
    /// On a parse failure the document is left as it was.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, DocumentError> {
        let delta = compile_command(&cmd, self.buffer.len());

        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                xi_rope::delta::DeltaElement::Copy(from, to) => {
                    cursor += to - from;
                }
                xi_rope::delta::DeltaElement::Insert(inserted) => {
                    changed.push(cursor..cursor + inserted.len());
                    cursor += inserted.len();
                }
            }
        }

        let buffer = delta.apply(&self.buffer);
        let tree = reparse(&self.tree, &buffer.to_string());
        self.replace_tree(buffer, tree)?;
        self.version += 1;

        Ok(Patch {
            changed,
            version: self.version,
        })
    }

    /// Replace the whole text, e.g. after the file was written to disk.
    pub fn reload(&mut self, text: &str) -> Result<(), DocumentError> {
        let tree = parse(text);
        self.replace_tree(Rope::from(text), tree)
    }

    fn replace_tree(&mut self, buffer: Rope, tree: SyntaxNode) -> Result<(), DocumentError> {
        ensure_root(&tree)?;
        self.generation += 1;
        self.outline = build_outline(&tree, self.generation);
        self.buffer = buffer;
        self.tree = tree;
        Ok(())
    }

    /// Whether `at` is at the start of a line.
    pub(crate) fn at_line_start(&self, at: usize) -> bool {
        match self.buffer.prev_codepoint_offset(at) {
            Some(prev) => self.buffer.slice_to_cow(prev..at) == "\n",
            None => true,
        }
    }
}

fn ensure_root(tree: &SyntaxNode) -> Result<(), DocumentError> {
    match tree.kind() {
        SyntaxKind::ROOT => Ok(()),
        other => Err(DocumentError::Parse(other)),
    }
}

fn to_range(range: TextRange) -> Range<usize> {
    usize::from(range.start())..usize::from(range.end())
}
