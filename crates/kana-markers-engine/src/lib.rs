pub mod decorations;
pub mod editing;
pub mod scanning;
pub mod tags;

// Re-export key types for easier usage
pub use decorations::{
    Decoration, KanaWidget, LivePreview, Replacement, Widget, reconcile, reconcile_with, render,
    render_with, replacements, replacements_with,
};
pub use editing::{Cmd, Document, EditError, Patch};
pub use scanning::{MarkerSpan, Span, scan, scan_with};
pub use tags::{Conversion, ConvertError, Oracle, TagDefinition, TagError, TagSet, WanaKana};
