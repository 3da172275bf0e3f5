use std::ops::{Index, IndexMut};

use rowan::TextRange;

use super::headline::{Headline, Status};

/// Index of a headline inside an [`Outline`].
///
/// Ids are only meaningful for the outline that issued them. A document
/// rebuilds its outline after every edit, so ids must not be kept across
/// writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadlineId(usize);

/// Where a headline's SECTION node sat in the syntax tree it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxRef {
    pub(crate) generation: u64,
    pub(crate) range: TextRange,
}

#[derive(Debug, Clone)]
struct OutlineNode {
    headline: Headline,
    parent: Option<HeadlineId>,
    children: Vec<HeadlineId>,
    syntax: Option<SyntaxRef>,
}

/// Arena of headlines: lists at the root, items as their children.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    nodes: Vec<OutlineNode>,
    roots: Vec<HeadlineId>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_root(&mut self, headline: Headline) -> HeadlineId {
        let id = self.push_node(headline, None);
        self.roots.push(id);
        id
    }

    pub fn push_child(&mut self, parent: HeadlineId, headline: Headline) -> HeadlineId {
        let id = self.push_node(headline, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_node(&mut self, headline: Headline, parent: Option<HeadlineId>) -> HeadlineId {
        let id = HeadlineId(self.nodes.len());
        self.nodes.push(OutlineNode {
            headline,
            parent,
            children: Vec::new(),
            syntax: None,
        });
        id
    }

    pub(crate) fn attach_syntax(&mut self, id: HeadlineId, syntax: SyntaxRef) {
        self.nodes[id.0].syntax = Some(syntax);
    }

    pub fn syntax(&self, id: HeadlineId) -> Option<SyntaxRef> {
        self.nodes[id.0].syntax
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level headlines, in document order. These are the lists.
    pub fn roots(&self) -> &[HeadlineId] {
        &self.roots
    }

    pub fn children(&self, id: HeadlineId) -> &[HeadlineId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: HeadlineId) -> Option<HeadlineId> {
        self.nodes[id.0].parent
    }

    /// Children of every list, flattened in document order.
    pub fn items(&self) -> Vec<HeadlineId> {
        self.roots
            .iter()
            .flat_map(|root| self.children(*root).iter().copied())
            .collect()
    }

    /// `(done, total)` over the children carrying a TODO keyword.
    pub fn statistics(&self, id: HeadlineId) -> (usize, usize) {
        self.children(id)
            .iter()
            .fold((0, 0), |(done, total), child| match self[*child].status {
                Some(Status::Done) => (done + 1, total + 1),
                Some(Status::Todo) => (done, total + 1),
                None => (done, total),
            })
    }

    /// Find the list or item carrying the same store key as `probe`.
    pub fn find_by_identity(&self, probe: &Headline) -> Option<HeadlineId> {
        let key = probe.identity_key();
        let candidates = if probe.level == 1 {
            self.roots.clone()
        } else {
            self.items()
        };
        let wanted = probe.property(key)?;
        candidates
            .into_iter()
            .find(|id| self[*id].property(key) == Some(wanted))
    }

    /// Find the first list or item with the same title, priority, status
    /// and level as `probe`.
    pub fn find_by_shape(&self, probe: &Headline) -> Option<HeadlineId> {
        self.roots
            .iter()
            .copied()
            .chain(self.items())
            .find(|id| self[*id].same_shape(probe))
    }

    /// Like [`Outline::find_by_shape`], skipping headlines that already
    /// carry a store key.
    pub fn find_unkeyed_by_shape(&self, probe: &Headline) -> Option<HeadlineId> {
        let key = probe.identity_key();
        self.roots
            .iter()
            .copied()
            .chain(self.items())
            .find(|id| self[*id].property(key).is_none() && self[*id].same_shape(probe))
    }
}

impl Index<HeadlineId> for Outline {
    type Output = Headline;

    fn index(&self, id: HeadlineId) -> &Headline {
        &self.nodes[id.0].headline
    }
}

impl IndexMut<HeadlineId> for Outline {
    fn index_mut(&mut self, id: HeadlineId) -> &mut Headline {
        &mut self.nodes[id.0].headline
    }
}
