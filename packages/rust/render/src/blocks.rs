//! Block-level markup.
//!
//! Consecutive list items of one kind are grouped into a single `<ul>` or
//! `<ol>`. Any other block, or a list item of the other kind, closes the open
//! list first. Children are read from [`Block::children`], so the tree must
//! be materialized before rendering.

use notionsite_shared::{Block, BlockKind, MediaBlock, RichTextSpan, first_plain_text};

use crate::rich_text::render_rich_text;

/// Attributes shared by every link that opens in a new tab.
const NEW_TAB: &str = r#"target="_blank" rel="noopener noreferrer""#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Accumulates output and the currently open list.
#[derive(Default)]
struct Writer {
    html: String,
    list: Option<ListKind>,
    items: String,
}

impl Writer {
    fn close_list(&mut self) {
        if let Some(kind) = self.list.take() {
            let tag = kind.tag();
            self.html.push_str(&format!("<{tag}>{}</{tag}>", self.items));
            self.items.clear();
        }
    }

    fn list_item(&mut self, kind: ListKind, spans: &[RichTextSpan]) {
        if self.list != Some(kind) {
            self.close_list();
            self.list = Some(kind);
        }
        self.items
            .push_str(&format!("<li>{}</li>", render_rich_text(spans)));
    }

    fn block(&mut self, markup: String) {
        self.close_list();
        self.html.push_str(&markup);
    }

    fn finish(mut self) -> String {
        self.close_list();
        self.html
    }
}

/// Render a sequence of sibling blocks.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = Writer::default();

    for block in blocks {
        match &block.kind {
            BlockKind::BulletedListItem { bulleted_list_item } => {
                out.list_item(ListKind::Bulleted, &bulleted_list_item.rich_text)
            }
            BlockKind::NumberedListItem { numbered_list_item } => {
                out.list_item(ListKind::Numbered, &numbered_list_item.rich_text)
            }
            // Unrendered blocks still close an open list.
            _ => out.block(render_block(block).unwrap_or_default()),
        }
    }

    out.finish()
}

/// Markup for one non-list block, or `None` when it renders nothing.
fn render_block(block: &Block) -> Option<String> {
    let html = match &block.kind {
        BlockKind::Paragraph { paragraph } => wrap("p", &paragraph.rich_text),
        BlockKind::Heading1 { heading_1 } => wrap("h1", &heading_1.rich_text),
        BlockKind::Heading2 { heading_2 } => wrap("h2", &heading_2.rich_text),
        BlockKind::Heading3 { heading_3 } => wrap("h3", &heading_3.rich_text),
        BlockKind::Quote { quote } => wrap("blockquote", &quote.rich_text),

        BlockKind::Callout { callout } => {
            let icon = callout
                .icon
                .as_ref()
                .and_then(|icon| icon.emoji())
                .map(|emoji| format!(r#"<div class="callout-icon">{emoji}</div>"#))
                .unwrap_or_default();
            format!(
                r#"<div class="callout">{icon}<div class="callout-content">{}</div></div>"#,
                render_rich_text(&callout.rich_text)
            )
        }

        BlockKind::Code { code } => {
            let body = code.rich_text.first().map_or("", |span| span.plain_text.as_str());
            format!(
                r#"<pre><code class="language-{}">{body}</code></pre>"#,
                code.language
            )
        }

        BlockKind::Image { image } => {
            let src = image.url()?;
            let alt = caption_text(image).unwrap_or("");
            format!(r#"<img src="{src}" alt="{alt}" />"#)
        }

        BlockKind::Video { video } => {
            let src = video.url()?;
            format!(
                r#"<div class="video-container"><video controls src="{src}">{}</video></div>"#,
                render_rich_text(&video.caption)
            )
        }

        BlockKind::File { file } => {
            let href = file.url()?;
            let name = caption_text(file).unwrap_or("Download file");
            format!(r#"<a href="{href}" class="file-link" {NEW_TAB}>{name}</a>"#)
        }

        BlockKind::Divider => "<hr />".to_string(),

        BlockKind::ToDo { to_do } => {
            let checked = if to_do.checked { "checked " } else { "" };
            format!(
                r#"<div class="to-do-item"><input type="checkbox" {checked}disabled /><span>{}</span></div>"#,
                render_rich_text(&to_do.rich_text)
            )
        }

        BlockKind::Toggle { toggle } => format!(
            "<details><summary>{}</summary>{}</details>",
            render_rich_text(&toggle.rich_text),
            children_of(block)
        ),

        BlockKind::Table { .. } if block.has_children => {
            format!("<table><tbody>{}</tbody></table>", children_of(block))
        }
        BlockKind::Table { .. } => return None,

        BlockKind::TableRow { table_row } => {
            let cells: String = table_row
                .cells
                .iter()
                .map(|cell| format!("<td>{}</td>", render_rich_text(cell)))
                .collect();
            format!("<tr>{cells}</tr>")
        }

        BlockKind::Bookmark { bookmark } => {
            let label = if bookmark.caption.is_empty() {
                bookmark.url.clone()
            } else {
                render_rich_text(&bookmark.caption)
            };
            format!(
                r#"<a href="{}" class="bookmark" {NEW_TAB}>{label}</a>"#,
                bookmark.url
            )
        }

        BlockKind::Embed { embed } => format!(
            r#"<div class="embed-container"><iframe src="{}" frameborder="0" allowfullscreen></iframe></div>"#,
            embed.url
        ),

        BlockKind::TableOfContents => {
            r#"<div class="table-of-contents">Table of Contents</div>"#.to_string()
        }

        BlockKind::BulletedListItem { .. }
        | BlockKind::NumberedListItem { .. }
        | BlockKind::Unsupported => return None,
    };

    Some(html)
}

fn wrap(tag: &str, spans: &[RichTextSpan]) -> String {
    format!("<{tag}>{}</{tag}>", render_rich_text(spans))
}

fn caption_text(media: &MediaBlock) -> Option<&str> {
    first_plain_text(&media.caption)
}

/// Rendered children, only for blocks flagged as having them.
fn children_of(block: &Block) -> String {
    if block.has_children {
        render_blocks(&block.children)
    } else {
        String::new()
    }
}
