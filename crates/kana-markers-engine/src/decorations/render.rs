use crate::{
    scanning::{Span, scan_with},
    tags::{Oracle, TagSet, WanaKana},
};

use super::reconcile::resolve_overlaps;

/// Plain-text substitution for the static (non-interactive) preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Span,
    pub text: String,
}

pub fn replacements(text: &str, tags: &TagSet) -> Vec<Replacement> {
    replacements_with(text, tags, &WanaKana)
}

/// Markers to substitute, sorted and non-overlapping. No caret involved.
pub fn replacements_with<O>(text: &str, tags: &TagSet, oracle: &O) -> Vec<Replacement>
where
    O: Oracle + ?Sized,
{
    resolve_overlaps(scan_with(text, tags, oracle))
        .into_iter()
        .map(|m| Replacement {
            span: m.span,
            text: m.display,
        })
        .collect()
}

pub fn render(text: &str, tags: &TagSet) -> String {
    render_with(text, tags, &WanaKana)
}

/// Returns `text` with every retained marker replaced by its display text.
///
/// The input is never modified; text outside markers is copied verbatim.
pub fn render_with<O>(text: &str, tags: &TagSet, oracle: &O) -> String
where
    O: Oracle + ?Sized,
{
    apply_replacements(text, &replacements_with(text, tags, oracle))
}

/// Splices sorted, non-overlapping replacements into `text`.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    for r in replacements {
        out.push_str(&text[copied_to..r.span.start]);
        out.push_str(&r.text);
        copied_to = r.span.end;
    }
    out.push_str(&text[copied_to..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scanning::scan, tags::Conversion, tags::ConvertError};
    use pretty_assertions::assert_eq;

    fn upper(_: Conversion, s: &str) -> Result<String, ConvertError> {
        Ok(s.to_uppercase())
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        let text = "nothing {to} see {/here}\nreally";
        assert_eq!(render(text, &TagSet::default()), text);
        assert!(replacements(text, &TagSet::default()).is_empty());
    }

    #[test]
    fn replaces_every_marker_in_place() {
        let out = render_with("a{hg}b{/hg}c{kk}d{/kk}e", &TagSet::default(), &upper);
        assert_eq!(out, "aBcDe");
    }

    #[test]
    fn overlapping_markers_first_wins() {
        let out = render_with("{hg}ab{kk}cd{/hg}ef{/kk}", &TagSet::default(), &upper);
        assert_eq!(out, "AB{KK}CDef{/kk}");
    }

    #[test]
    fn rendered_output_contains_no_markers() {
        let tags = TagSet::default();
        let out = render("{hg}sushi{/hg} to {kk}tesuto{/kk}", &tags);
        assert_eq!(out, "すし to テスト");
        assert!(scan(&out, &tags).is_empty());
        assert_eq!(render(&out, &tags), out);
    }

    #[test]
    fn replacement_sink_reports_ranges() {
        let reps = replacements_with("x{hk}y{/hk}", &TagSet::default(), &upper);
        assert_eq!(
            reps,
            vec![Replacement {
                span: Span::new(1, 11),
                text: "Y".to_string(),
            }]
        );
    }
}
