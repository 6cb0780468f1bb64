use super::span::Span;

/// One marker found by the scanner, already converted.
///
/// Produced fresh on every scan and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpan {
    /// Full span including both delimiters.
    pub span: Span,
    /// Span of the text between the delimiters.
    pub inner: Span,
    /// Name of the tag that matched.
    pub tag: String,
    /// Position of that tag in the tag set (tie-break key).
    pub tag_index: usize,
    /// Inner text exactly as written.
    pub raw_inner: String,
    /// Oracle output for `raw_inner`.
    pub display: String,
}
