use crate::tags::{ConvertError, Oracle, TagDefinition, TagSet, WanaKana};

use super::{cursor::Cursor, span::Span, types::MarkerSpan};

/// Scans `text` for markers of every tag in `tags`, converting with the
/// default `wana_kana` oracle.
pub fn scan(text: &str, tags: &TagSet) -> Vec<MarkerSpan> {
    scan_with(text, tags, &WanaKana)
}

/// Scans `text` for markers of every tag in `tags`.
///
/// # Output order
/// Grouped by tag in tag-set order, and by ascending start within a tag.
/// Spans of different tags may overlap.
///
/// # Failures
/// Nothing is surfaced. An opening delimiter without a closing one yields no
/// span; a span the oracle rejects is skipped and scanning retries from the
/// character after its opening delimiter's first character.
pub fn scan_with<O>(text: &str, tags: &TagSet, oracle: &O) -> Vec<MarkerSpan>
where
    O: Oracle + ?Sized,
{
    let mut out = vec![];
    for (tag_index, tag) in tags.iter().enumerate() {
        scan_tag(text, tag, tag_index, oracle, &mut out);
    }
    log::trace!("scanned {} bytes, {} marker(s)", text.len(), out.len());
    out
}

/// Why an opening delimiter did not produce a span.
enum Miss {
    /// No closing delimiter anywhere after the opener.
    Unclosed,
    /// The oracle refused the inner text.
    Rejected(ConvertError),
}

fn scan_tag<O>(
    text: &str,
    tag: &TagDefinition,
    tag_index: usize,
    oracle: &O,
    out: &mut Vec<MarkerSpan>,
) where
    O: Oracle + ?Sized,
{
    let mut cur = Cursor::new(text, 0);

    while let Some(start) = cur.seek(tag.open()) {
        match try_parse_marker(&mut cur, tag, tag_index, oracle) {
            Ok(marker) => out.push(marker),
            // Any later opener would miss the same closing delimiter.
            Err(Miss::Unclosed) => break,
            Err(Miss::Rejected(err)) => {
                log::debug!("dropping {} marker at {start}: {err}", tag.name());
                cur.reset_to(start);
                cur.bump_char();
            }
        }
    }
}

/// Parses one marker with the cursor sitting on an opening delimiter.
///
/// On success the cursor is left just past the closing delimiter.
fn try_parse_marker<O>(
    cur: &mut Cursor<'_>,
    tag: &TagDefinition,
    tag_index: usize,
    oracle: &O,
) -> Result<MarkerSpan, Miss>
where
    O: Oracle + ?Sized,
{
    let start = cur.pos();
    cur.bump_n(tag.open().len());
    let inner_start = cur.pos();

    let inner_end = cur.seek(tag.close()).ok_or(Miss::Unclosed)?;
    cur.bump_n(tag.close().len());
    let end = cur.pos();

    let inner = Span::new(inner_start, inner_end);
    let raw_inner = inner.slice(cur.s).to_string();
    let display = oracle
        .convert(tag.conversion(), &raw_inner)
        .map_err(Miss::Rejected)?;

    Ok(MarkerSpan {
        span: Span::new(start, end),
        inner,
        tag: tag.name().to_string(),
        tag_index,
        raw_inner,
        display,
    })
}
