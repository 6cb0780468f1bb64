/// Something the host can draw in place of a replaced text range.
pub trait Widget {
    /// Produces the renderable content for this widget.
    fn render(&self) -> String;

    /// Plain text for hosts that draw cells rather than markup.
    fn text(&self) -> &str;
}

/// Inline widget showing converted kana.
///
/// Equality and hashing look only at the content, so the host may reuse any
/// widget with the same text in place of another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KanaWidget {
    content: String,
}

impl KanaWidget {
    /// CSS class carried by the rendered element.
    pub const CLASS: &'static str = "japanese-render";

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Widget for KanaWidget {
    fn render(&self) -> String {
        format!(
            r#"<span class="{}">{}</span>"#,
            Self::CLASS,
            html_escape::encode_text(&self.content)
        )
    }

    fn text(&self) -> &str {
        &self.content
    }
}
