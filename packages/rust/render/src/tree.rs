//! Block tree materialization.

use futures::future::BoxFuture;
use tracing::{debug, instrument};

use notionsite_client::{ContentStore, list_all_children};
use notionsite_shared::{Block, Result, recover};

use crate::blocks::render_blocks;

/// Fetch the children of `block_id`, then recursively fill in the children
/// of every toggle and table among them.
///
/// Only the top-level listing can fail; a nested listing that fails is
/// logged and leaves that block's children empty.
pub async fn fetch_block_tree(store: &dyn ContentStore, block_id: &str) -> Result<Vec<Block>> {
    let mut blocks = list_all_children(store, block_id).await?;

    for block in blocks.iter_mut().filter(|b| b.renders_children()) {
        let children = nested_children(store, &block.id).await;
        block.children = children;
    }

    Ok(blocks)
}

fn nested_children<'a>(
    store: &'a dyn ContentStore,
    block_id: &'a str,
) -> BoxFuture<'a, Vec<Block>> {
    Box::pin(recover(
        "block children",
        block_id,
        Vec::new(),
        fetch_block_tree(store, block_id),
    ))
}

/// Render a page's full content tree to markup.
#[instrument(skip(store))]
pub async fn fetch_page_content(store: &dyn ContentStore, page_id: &str) -> Result<String> {
    let blocks = fetch_block_tree(store, page_id).await?;
    debug!(blocks = blocks.len(), "page content fetched");
    Ok(render_blocks(&blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notionsite_client::MemoryStore;
    use notionsite_shared::{BlockKind, RichTextSpan, TableBlock, TableRowBlock};

    fn text(s: &str) -> Vec<RichTextSpan> {
        vec![RichTextSpan::plain(s)]
    }

    fn parent(id: &str, kind: BlockKind) -> Block {
        Block {
            has_children: true,
            ..Block::new(id, kind)
        }
    }

    #[tokio::test]
    async fn materializes_nested_toggles() {
        let store = MemoryStore::new()
            .with_children(
                "page",
                vec![
                    Block::new("p1", BlockKind::paragraph(text("Intro"))),
                    parent("t1", BlockKind::toggle(text("Outer"))),
                ],
            )
            .with_children("t1", vec![parent("t2", BlockKind::toggle(text("Inner")))])
            .with_children("t2", vec![Block::new("leaf", BlockKind::bulleted(text("deep")))]);

        let html = fetch_page_content(&store, "page").await.unwrap();
        assert_eq!(
            html,
            "<p>Intro</p><details><summary>Outer</summary><details><summary>Inner</summary><ul><li>deep</li></ul></details></details>"
        );
    }

    #[tokio::test]
    async fn renders_table_rows() {
        let row = |id: &str, a: &str| {
            Block::new(
                id,
                BlockKind::TableRow {
                    table_row: TableRowBlock {
                        cells: vec![text(a)],
                    },
                },
            )
        };
        let store = MemoryStore::new()
            .with_children(
                "page",
                vec![parent(
                    "tbl",
                    BlockKind::Table {
                        table: TableBlock { table_width: 1 },
                    },
                )],
            )
            .with_children("tbl", vec![row("r1", "x"), row("r2", "y")]);

        let html = fetch_page_content(&store, "page").await.unwrap();
        assert_eq!(
            html,
            "<table><tbody><tr><td>x</td></tr><tr><td>y</td></tr></tbody></table>"
        );
    }

    #[tokio::test]
    async fn nested_failure_leaves_subtree_empty() {
        let store = MemoryStore::new()
            .with_children(
                "page",
                vec![
                    parent("t1", BlockKind::toggle(text("Broken"))),
                    Block::new("p1", BlockKind::paragraph(text("After"))),
                ],
            )
            .failing("t1");

        let html = fetch_page_content(&store, "page").await.unwrap();
        assert_eq!(
            html,
            "<details><summary>Broken</summary></details><p>After</p>"
        );
    }

    #[tokio::test]
    async fn skips_children_of_other_blocks() {
        let store = MemoryStore::new().with_children(
            "page",
            vec![parent("p1", BlockKind::paragraph(text("Has kids")))],
        );

        let blocks = fetch_block_tree(&store, "page").await.unwrap();
        assert!(blocks[0].children.is_empty());
        assert_eq!(store.children_requests("p1"), 0);
    }

    #[tokio::test]
    async fn top_level_failure_propagates() {
        let store = MemoryStore::new().failing("page");
        assert!(fetch_page_content(&store, "page").await.is_err());
    }

    #[test]
    fn deserialized_children_render() {
        let blocks: Vec<Block> = serde_json::from_value(serde_json::json!([
            { "id": "a", "type": "numbered_list_item", "has_children": false,
              "numbered_list_item": { "rich_text": [{ "plain_text": "one" }] } },
            { "id": "b", "type": "numbered_list_item", "has_children": false,
              "numbered_list_item": { "rich_text": [{ "plain_text": "two" }] } }
        ]))
        .unwrap();
        assert_eq!(render_blocks(&blocks), "<ol><li>one</li><li>two</li></ol>");
    }
}
