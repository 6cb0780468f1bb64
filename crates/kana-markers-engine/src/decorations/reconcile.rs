use crate::{
    scanning::{MarkerSpan, Span, scan_with},
    tags::{Oracle, TagSet, WanaKana},
};

use super::widget::KanaWidget;

/// Instruction to draw `widget` over `span` without touching the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoration {
    pub span: Span,
    pub widget: KanaWidget,
}

/// Builds the decoration list for one render cycle using the default oracle.
pub fn reconcile(text: &str, caret: usize, tags: &TagSet) -> Vec<Decoration> {
    reconcile_with(text, caret, tags, &WanaKana)
}

/// Builds the decoration list for one render cycle.
///
/// 1. Scan every tag.
/// 2. Drop markers touching the caret (`start <= caret <= end`) so the raw
///    markup stays editable.
/// 3. Order by start, then by tag-set position.
/// 4. Drop any marker overlapping one already kept.
///
/// Recomputed from scratch on every call.
pub fn reconcile_with<O>(text: &str, caret: usize, tags: &TagSet, oracle: &O) -> Vec<Decoration>
where
    O: Oracle + ?Sized,
{
    let candidates = scan_with(text, tags, oracle)
        .into_iter()
        .filter(|m| !m.span.contains_inclusive(caret));

    resolve_overlaps(candidates)
        .into_iter()
        .map(|m| Decoration {
            span: m.span,
            widget: KanaWidget::new(m.display),
        })
        .collect()
}

/// Sorts markers by `(start, tag_index)` and keeps the first of any
/// overlapping pair, walking left to right.
pub(crate) fn resolve_overlaps(markers: impl IntoIterator<Item = MarkerSpan>) -> Vec<MarkerSpan> {
    let mut sorted: Vec<MarkerSpan> = markers.into_iter().collect();
    sorted.sort_by_key(|m| (m.span.start, m.tag_index));

    let mut kept: Vec<MarkerSpan> = Vec::with_capacity(sorted.len());
    for marker in sorted {
        if let Some(last) = kept.last()
            && last.span.overlaps(marker.span)
        {
            log::debug!(
                "{} marker at {:?} overlaps {} marker at {:?}; keeping the earlier one",
                marker.tag,
                marker.span,
                last.tag,
                last.span
            );
            continue;
        }
        kept.push(marker);
    }
    kept
}
