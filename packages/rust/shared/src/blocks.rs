//! Page content blocks.
//!
//! A [`Block`] deserializes straight from the content store's block objects.
//! Its `children` are never sent inline upstream; they are filled in by the
//! materialization step in `notionsite-render`.

use serde::{Deserialize, Serialize};

use crate::types::{FileUrl, Icon, RichTextSpan};

/// One node of a page's content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    /// Whether the store holds child blocks for this block.
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Materialized children; empty until fetched.
    #[serde(skip)]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            kind,
            children: Vec::new(),
        }
    }

    /// Attach already-fetched children and mark the block as a parent.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = true;
        self.children = children;
        self
    }

    /// Whether rendering this block uses its children.
    pub fn renders_children(&self) -> bool {
        self.has_children && matches!(self.kind, BlockKind::Toggle { .. } | BlockKind::Table { .. })
    }
}

/// Payload of text-only blocks (paragraphs, headings, list items, quotes, toggles).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
}

impl TextBlock {
    pub fn new(rich_text: Vec<RichTextSpan>) -> Self {
        Self { rich_text }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub language: String,
}

/// Image, video and file payloads: a URL from one of two sources plus a caption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<FileUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
}

impl MediaBlock {
    /// External URL if present, otherwise the hosted file URL.
    pub fn url(&self) -> Option<&str> {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|f| f.url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn external(url: impl Into<String>) -> Self {
        Self {
            external: Some(FileUrl { url: url.into() }),
            ..Self::default()
        }
    }

    pub fn hosted(url: impl Into<String>) -> Self {
        Self {
            file: Some(FileUrl { url: url.into() }),
            ..Self::default()
        }
    }

    pub fn with_caption(mut self, caption: Vec<RichTextSpan>) -> Self {
        self.caption = caption;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub table_width: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRowBlock {
    /// One rich-text run list per column.
    #[serde(default)]
    pub cells: Vec<Vec<RichTextSpan>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
}

/// Block payload, discriminated by the upstream `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph {
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextBlock,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextBlock,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextBlock,
    },
    BulletedListItem {
        bulleted_list_item: TextBlock,
    },
    NumberedListItem {
        numbered_list_item: TextBlock,
    },
    Quote {
        quote: TextBlock,
    },
    Callout {
        callout: CalloutBlock,
    },
    Toggle {
        toggle: TextBlock,
    },
    ToDo {
        to_do: ToDoBlock,
    },
    Code {
        code: CodeBlock,
    },
    Image {
        image: MediaBlock,
    },
    Video {
        video: MediaBlock,
    },
    File {
        file: MediaBlock,
    },
    Divider,
    Table {
        #[serde(default)]
        table: TableBlock,
    },
    TableRow {
        table_row: TableRowBlock,
    },
    Bookmark {
        bookmark: LinkBlock,
    },
    Embed {
        embed: LinkBlock,
    },
    TableOfContents,
    /// Any block type this site does not render.
    #[serde(other)]
    Unsupported,
}

impl BlockKind {
    pub fn paragraph(spans: Vec<RichTextSpan>) -> Self {
        BlockKind::Paragraph {
            paragraph: TextBlock::new(spans),
        }
    }

    pub fn bulleted(spans: Vec<RichTextSpan>) -> Self {
        BlockKind::BulletedListItem {
            bulleted_list_item: TextBlock::new(spans),
        }
    }

    pub fn numbered(spans: Vec<RichTextSpan>) -> Self {
        BlockKind::NumberedListItem {
            numbered_list_item: TextBlock::new(spans),
        }
    }

    pub fn toggle(spans: Vec<RichTextSpan>) -> Self {
        BlockKind::Toggle {
            toggle: TextBlock::new(spans),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_typed_blocks() {
        let blocks: Vec<Block> = serde_json::from_value(json!([
            { "object": "block", "id": "b1", "type": "heading_2", "has_children": false,
              "heading_2": { "rich_text": [{ "plain_text": "Goals" }], "is_toggleable": false } },
            { "object": "block", "id": "b2", "type": "divider", "has_children": false, "divider": {} },
            { "object": "block", "id": "b3", "type": "toggle", "has_children": true,
              "toggle": { "rich_text": [{ "plain_text": "More" }], "color": "default" } },
            { "object": "block", "id": "b4", "type": "image", "has_children": false,
              "image": { "type": "file", "file": { "url": "https://f/x.png" }, "caption": [] } },
            { "object": "block", "id": "b5", "type": "column_list", "has_children": true, "column_list": {} }
        ]))
        .expect("deserialize blocks");

        assert!(matches!(&blocks[0].kind, BlockKind::Heading2 { heading_2 } if heading_2.rich_text[0].plain_text == "Goals"));
        assert_eq!(blocks[1].kind, BlockKind::Divider);
        assert!(blocks[2].renders_children());
        match &blocks[3].kind {
            BlockKind::Image { image } => assert_eq!(image.url(), Some("https://f/x.png")),
            other => panic!("expected image, got {other:?}"),
        }
        assert_eq!(blocks[4].kind, BlockKind::Unsupported);
        assert!(!blocks[4].renders_children());
        assert!(blocks.iter().all(|b| b.children.is_empty()));
    }

    #[test]
    fn media_prefers_external_url() {
        let media = MediaBlock {
            external: Some(FileUrl { url: "https://ext/a.mp4".into() }),
            file: Some(FileUrl { url: "https://hosted/a.mp4".into() }),
            caption: vec![],
        };
        assert_eq!(media.url(), Some("https://ext/a.mp4"));
        assert_eq!(MediaBlock::default().url(), None);
    }
}
