use crate::{
    editing::Document,
    tags::{Oracle, TagSet, WanaKana},
};

use super::reconcile::{Decoration, reconcile_with};

/// Holds the decoration set for the most recent cycle.
///
/// Every [`update`](Self::update) recomputes from scratch; the cached list is
/// only what the host reads between cycles, never an input to the next one.
pub struct LivePreview<O = WanaKana> {
    tags: TagSet,
    oracle: O,
    decorations: Vec<Decoration>,
}

impl LivePreview<WanaKana> {
    pub fn new(tags: TagSet) -> Self {
        Self::with_oracle(tags, WanaKana)
    }
}

impl<O: Oracle> LivePreview<O> {
    pub fn with_oracle(tags: TagSet, oracle: O) -> Self {
        Self {
            tags,
            oracle,
            decorations: Vec::new(),
        }
    }

    /// Rebuilds decorations for `text` with the caret at `caret`.
    pub fn update(&mut self, text: &str, caret: usize) -> &[Decoration] {
        self.decorations = reconcile_with(text, caret, &self.tags, &self.oracle);
        &self.decorations
    }

    /// Rebuilds decorations from an editing document's text and caret.
    pub fn sync(&mut self, doc: &Document) -> &[Decoration] {
        self.update(&doc.text(), doc.caret())
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
}
