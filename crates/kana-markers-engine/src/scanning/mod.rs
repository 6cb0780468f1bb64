//! # Marker Scanning
//!
//! Cursor-based search for `open … close` marker pairs.
//!
//! ## Modules
//!
//! - **`span`**: `Span`, a half-open byte range into the document
//! - **`cursor`**: `Cursor` for forward delimiter search with position tracking
//! - **`types`**: `MarkerSpan`, a matched and converted marker
//! - **`scanner`**: `scan()` / `scan_with()` entry points
//!
//! ## Matching Rules
//!
//! Each tag is scanned on its own, in tag-set order. An opening delimiter
//! pairs with the nearest following closing delimiter and the search resumes
//! right after that closing delimiter, so one tag's matches never overlap
//! each other. Spans of different tags may overlap; the reconciler resolves
//! that.

pub mod cursor;
pub mod scanner;
pub mod span;
pub mod types;

pub use scanner::{scan, scan_with};
pub use span::Span;
pub use types::MarkerSpan;
