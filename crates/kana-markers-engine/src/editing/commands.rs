use thiserror::Error;
use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::Document;
use crate::tags::TagDefinition;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("offset {offset} is past the end of the document (length {len})")]
    OutOfBounds { offset: usize, len: usize },

    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("range {start}..{end} is inverted")]
    InvertedRange { start: usize, end: usize },
}

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: std::ops::Range<usize>,
    },
    /// Inserts `open` immediately followed by `close`, caret between them.
    InsertMarkerPair {
        at: usize,
        open: String,
        close: String,
    },
    MoveCaret {
        to: usize,
    },
}

impl Cmd {
    /// Empty marker pair for `tag` at `at`.
    pub fn insert_marker(tag: &TagDefinition, at: usize) -> Self {
        Cmd::InsertMarkerPair {
            at,
            open: tag.open().to_string(),
            close: tag.close().to_string(),
        }
    }
}

/// Checks every offset the command touches against the current buffer.
pub(crate) fn validate_command(doc: &Document, cmd: &Cmd) -> Result<(), EditError> {
    match cmd {
        Cmd::InsertText { at, .. } | Cmd::InsertMarkerPair { at, .. } => check_offset(doc, *at),
        Cmd::MoveCaret { to } => check_offset(doc, *to),
        Cmd::DeleteRange { range } => {
            if range.start > range.end {
                return Err(EditError::InvertedRange {
                    start: range.start,
                    end: range.end,
                });
            }
            check_offset(doc, range.start)?;
            check_offset(doc, range.end)
        }
    }
}

fn check_offset(doc: &Document, offset: usize) -> Result<(), EditError> {
    let len = doc.len();
    if offset > len {
        return Err(EditError::OutOfBounds { offset, len });
    }
    if offset < len && !doc.buffer.is_codepoint_boundary(offset) {
        return Err(EditError::NotCharBoundary(offset));
    }
    Ok(())
}

/// Compile a command into a delta; `None` for caret-only commands.
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Option<Delta<RopeInfo>> {
    match cmd {
        Cmd::InsertText { at, text } => {
            let mut builder = Builder::new(doc.len());
            builder.replace(*at..*at, Rope::from(text));
            Some(builder.build())
        }
        Cmd::DeleteRange { range } => {
            let mut builder = Builder::new(doc.len());
            builder.delete(range.clone());
            Some(builder.build())
        }
        Cmd::InsertMarkerPair { at, open, close } => {
            let mut builder = Builder::new(doc.len());
            builder.replace(*at..*at, Rope::from(format!("{open}{close}")));
            Some(builder.build())
        }
        Cmd::MoveCaret { .. } => None,
    }
}

/// Where the caret ends up after `cmd`.
pub(crate) fn transform_caret_for_command(caret: usize, cmd: &Cmd) -> usize {
    match cmd {
        Cmd::InsertText { at, text } => {
            // Typing at the caret pushes it along
            if *at <= caret { caret + text.len() } else { caret }
        }
        Cmd::DeleteRange { range } => {
            if range.end <= caret {
                caret - range.len()
            } else if range.start >= caret {
                caret
            } else {
                // Deletion swallowed the caret - collapse to deletion point
                range.start
            }
        }
        Cmd::InsertMarkerPair { at, open, .. } => at + open.len(),
        Cmd::MoveCaret { to } => *to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{Conversion, TagDefinition};

    #[test]
    fn insert_marker_uses_tag_delimiters() {
        let tag = TagDefinition::new("kk", Conversion::Katakana).unwrap();
        assert_eq!(
            Cmd::insert_marker(&tag, 3),
            Cmd::InsertMarkerPair {
                at: 3,
                open: "{kk}".to_string(),
                close: "{/kk}".to_string(),
            }
        );
    }

    #[test]
    fn caret_shifts_for_insert_before_or_at() {
        let cmd = Cmd::InsertText {
            at: 2,
            text: "abc".to_string(),
        };
        assert_eq!(transform_caret_for_command(2, &cmd), 5);
        assert_eq!(transform_caret_for_command(4, &cmd), 7);
        assert_eq!(transform_caret_for_command(1, &cmd), 1);
    }

    #[test]
    fn caret_follows_deletions() {
        let cmd = Cmd::DeleteRange { range: 2..5 };
        assert_eq!(transform_caret_for_command(8, &cmd), 5);
        assert_eq!(transform_caret_for_command(5, &cmd), 2);
        assert_eq!(transform_caret_for_command(3, &cmd), 2);
        assert_eq!(transform_caret_for_command(2, &cmd), 2);
        assert_eq!(transform_caret_for_command(1, &cmd), 1);
    }

    #[test]
    fn caret_lands_between_marker_delimiters() {
        let cmd = Cmd::InsertMarkerPair {
            at: 4,
            open: "{hg}".to_string(),
            close: "{/hg}".to_string(),
        };
        assert_eq!(transform_caret_for_command(0, &cmd), 8);
        assert_eq!(transform_caret_for_command(20, &cmd), 8);
    }
}
