//! Inline markup for annotated text spans.

use notionsite_shared::RichTextSpan;

/// Render spans in order, wrapping each one's text in its annotations.
///
/// Wrappers nest in a fixed order, innermost first: bold, italic,
/// strikethrough, underline, code, then the link. Text is emitted as-is.
pub fn render_rich_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &RichTextSpan) -> String {
    let mut html = span.plain_text.clone();
    let annotations = &span.annotations;

    if annotations.bold {
        html = format!("<strong>{html}</strong>");
    }
    if annotations.italic {
        html = format!("<em>{html}</em>");
    }
    if annotations.strikethrough {
        html = format!("<del>{html}</del>");
    }
    if annotations.underline {
        html = format!("<u>{html}</u>");
    }
    if annotations.code {
        html = format!("<code>{html}</code>");
    }
    if let Some(href) = &span.href {
        html = format!(r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{html}</a>"#);
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_wraps_emphasis_wraps_bold() {
        let span = RichTextSpan::plain("hi").bold().italic().link("http://x");
        assert_eq!(
            render_rich_text(&[span]),
            r#"<a href="http://x" target="_blank" rel="noopener noreferrer"><em><strong>hi</strong></em></a>"#
        );
    }

    #[test]
    fn all_annotations_nest_in_order() {
        let span = RichTextSpan::plain("x")
            .code()
            .underline()
            .strikethrough()
            .italic()
            .bold();
        assert_eq!(
            render_rich_text(&[span]),
            "<code><u><del><em><strong>x</strong></em></del></u></code>"
        );
    }

    #[test]
    fn spans_concatenate_without_escaping() {
        let spans = [
            RichTextSpan::plain("a < b "),
            RichTextSpan::plain("& c").bold(),
        ];
        assert_eq!(render_rich_text(&spans), "a < b <strong>& c</strong>");
        assert_eq!(render_rich_text(&[]), "");
    }
}
