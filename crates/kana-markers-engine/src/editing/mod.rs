/*!
 * # Editing Core
 *
 * A small editing model for hosts that do not bring their own buffer.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The whole document lives in one **`xi_rope::Rope`**
 * - Edits are expressed as **Deltas** built from commands
 * - Saving writes the rope bytes verbatim; marker rendering never touches them
 *
 * ### 2. Command-Based Editing
 * - Every change is a **`Cmd`** compiled to a Delta and applied immediately
 * - The caret is transformed through each command
 * - `Cmd::InsertMarkerPair` inserts an empty `{tag}{/tag}` pair and leaves
 *   the caret between the delimiters, so the new marker starts out raw
 *
 * ### 3. Decorations Are Derived, Not Stored
 * - After each patch the host calls the reconciler (or
 *   [`LivePreview::sync`](crate::decorations::LivePreview::sync)) with the
 *   new text and caret; nothing here caches decorations
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` with rope buffer, caret and version
 * - **`commands`**: `Cmd` enum, validation and delta compilation
 * - **`patch`**: edit result metadata (changed ranges, caret, version)
 *
 * ## Usage Pattern
 *
 * ```rust
 * use kana_markers_engine::editing::{Cmd, Document};
 * use kana_markers_engine::tags::TagSet;
 *
 * let tags = TagSet::default();
 * let mut doc = Document::new("Hello ");
 * let hg = tags.get("hg").unwrap();
 *
 * let patch = doc.apply(Cmd::insert_marker(hg, doc.caret())).unwrap();
 * assert_eq!(doc.text(), "Hello {hg}{/hg}");
 * assert_eq!(patch.caret, "Hello {hg}".len());
 * ```
 */

pub mod commands;
pub mod document;
pub mod patch;

pub use commands::{Cmd, EditError};
pub use document::Document;
pub use patch::Patch;
