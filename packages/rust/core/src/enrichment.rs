//! Optional per-page work: rendering page content and saving assets.
//!
//! Neither step can fail a collection. Failures are logged through
//! [`recover`] and replaced with an empty body or a missing asset.

use std::future::Future;

use futures::stream::{self, StreamExt};

use notionsite_client::ContentStore;
use notionsite_render::fetch_page_content;
use notionsite_shared::{Page, recover};

use crate::assets::{AssetRequest, AssetStore};

/// Rendered content of a page, or `""` when it cannot be fetched.
pub async fn page_content(store: &dyn ContentStore, page_id: &str) -> String {
    recover(
        "page content",
        page_id,
        String::new(),
        fetch_page_content(store, page_id),
    )
    .await
}

/// Persist an asset, returning its public path on success.
pub async fn save_asset(assets: &dyn AssetStore, request: Option<AssetRequest>) -> Option<String> {
    let request = request?;
    recover("asset", &request.id, None, async {
        assets.save(&request).await.map(Some)
    })
    .await
}

/// Run `enrich` for every page, at most `concurrency` at a time, and return
/// the results in page order once all have finished.
pub async fn for_each_page<'a, T, F, Fut>(
    pages: &'a [Page],
    concurrency: usize,
    enrich: F,
) -> Vec<T>
where
    F: FnMut(&'a Page) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(pages)
        .map(enrich)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use notionsite_client::MemoryStore;
    use notionsite_shared::{Block, BlockKind, NotionSiteError, Result, RichTextSpan};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::assets::AssetFolder;

    struct FailingAssets;

    #[async_trait]
    impl AssetStore for FailingAssets {
        async fn save(&self, _request: &AssetRequest) -> Result<String> {
            Err(NotionSiteError::Asset("disk full".into()))
        }
    }

    #[tokio::test]
    async fn content_failure_yields_empty_string() {
        let store = MemoryStore::new()
            .with_children(
                "ok",
                vec![Block::new(
                    "b",
                    BlockKind::paragraph(vec![RichTextSpan::plain("Hello")]),
                )],
            )
            .failing("broken");

        assert_eq!(page_content(&store, "ok").await, "<p>Hello</p>");
        assert_eq!(page_content(&store, "broken").await, "");
    }

    #[tokio::test]
    async fn asset_failure_yields_none() {
        let request = AssetRequest {
            id: "p1".into(),
            url: "https://x/icon.png".into(),
            folder: AssetFolder::Projects,
        };

        assert_eq!(save_asset(&FailingAssets, Some(request)).await, None);
        assert_eq!(save_asset(&FailingAssets, None).await, None);
    }

    #[tokio::test]
    async fn fan_out_is_bounded_and_ordered() {
        let pages: Vec<Page> = (0..10).map(|i| Page::new(format!("p{i}"))).collect();
        let running = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let ids = for_each_page(&pages, 3, |page| {
            let running = &running;
            let peak = &peak;
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                page.id.clone()
            }
        })
        .await;

        let expected: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        assert_eq!(ids, expected);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
