/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges in the new text that were inserted; deletions appear as
    /// empty ranges at the point where text disappeared.
    pub changed: Vec<std::ops::Range<usize>>,
    pub caret: usize,
    pub version: u64,
}
