//! # Decorations
//!
//! Turns scanned markers into what the host draws.
//!
//! - **`reconcile`**: caret exclusion, ordering and the first-wins overlap
//!   guard, producing `Decoration`s for the live editing surface
//! - **`render`**: the same pipeline without a caret, producing plain-text
//!   `Replacement`s and the substituted output for static previews
//! - **`widget`**: the `Widget` contract and `KanaWidget`
//! - **`preview`**: `LivePreview`, holding the latest decoration set
//!
//! Nothing here is incremental: each call rescans the full text, so the
//! caret rule can never act on stale spans.

pub mod preview;
pub mod reconcile;
pub mod render;
pub mod widget;

pub use preview::LivePreview;
pub use reconcile::{Decoration, reconcile, reconcile_with};
pub use render::{Replacement, apply_replacements, render, render_with, replacements, replacements_with};
pub use widget::{KanaWidget, Widget};
