use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::commands::{compile_command, transform_caret_for_command, validate_command};
use crate::editing::{Cmd, EditError, Patch};

/// Editable text plus the caret the live preview keys off.
///
/// ## Usage Pattern
///
/// ```rust
/// # use kana_markers_engine::editing::{Document, Cmd};
/// let mut doc = Document::new("ka");
/// doc.apply(Cmd::InsertText { at: 2, text: "na".to_string() }).unwrap();
/// assert_eq!(doc.text(), "kana");
/// assert_eq!(doc.caret(), 4);
/// ```
pub struct Document {
    /// xi-rope buffer containing the entire document as UTF-8 bytes
    pub(crate) buffer: Rope,
    /// Caret as a byte offset in buffer
    pub(crate) caret: usize,
    /// Version counter incremented on each text edit
    pub(crate) version: u64,
}

impl Document {
    /// Creates a document with the caret at the end.
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let caret = buffer.len();
        Self {
            buffer,
            caret,
            version: 0,
        }
    }

    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply command to document
    ///
    /// 1. Validate every offset the command names
    /// 2. Compile the command to a Delta (caret moves have none)
    /// 3. Apply the Delta to the buffer
    /// 4. Transform the caret and bump the version for text edits
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        validate_command(self, &cmd)?;

        let mut changed = Vec::new();
        if let Some(delta) = compile_command(self, &cmd) {
            changed = changed_ranges(&delta);
            self.buffer = delta.apply(&self.buffer);
            self.version += 1;
        }

        self.caret = transform_caret_for_command(self.caret, &cmd);

        Ok(Patch {
            changed,
            caret: self.caret,
            version: self.version,
        })
    }

    /// Offset of the character before `offset`, or 0.
    pub fn prev_char_boundary(&self, offset: usize) -> usize {
        self.buffer.prev_codepoint_offset(offset).unwrap_or(0)
    }

    /// Offset of the character after `offset`, or the document length.
    pub fn next_char_boundary(&self, offset: usize) -> usize {
        self.buffer
            .next_codepoint_offset(offset)
            .unwrap_or_else(|| self.len())
    }

    /// Zero-based line and character column of `offset`.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len());
        let line = self.buffer.line_of_offset(offset);
        let line_start = self.buffer.offset_of_line(line);
        let col = self.buffer.slice_to_cow(line_start..offset).chars().count();
        (line, col)
    }

    /// Offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        let line = self.buffer.line_of_offset(offset.min(self.len()));
        self.buffer.offset_of_line(line)
    }

    /// Offset of the newline ending the line containing `offset`, or the
    /// document length on the last line.
    pub fn line_end(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        let rest = self.buffer.slice_to_cow(offset..self.len());
        offset + rest.find('\n').unwrap_or(rest.len())
    }
}

/// Ranges in the new text touched by `delta`.
///
/// Walks Copy/Insert elements; a gap between consecutive copies in the old
/// text is a deletion and shows up as an empty range.
fn changed_ranges(delta: &Delta<RopeInfo>) -> Vec<std::ops::Range<usize>> {
    let mut changed = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;
    for op in delta.els.iter() {
        match op {
            xi_rope::delta::DeltaElement::Copy(from, to) => {
                if *from > old_pos {
                    changed.push(new_pos..new_pos);
                }
                new_pos += to - from;
                old_pos = *to;
            }
            xi_rope::delta::DeltaElement::Insert(inserted) => {
                let start = new_pos;
                new_pos += inserted.len();
                changed.push(start..new_pos);
            }
        }
    }
    if old_pos < delta.base_len {
        changed.push(new_pos..new_pos);
    }
    changed
}
