//! Exhaustive cursor pagination.
//!
//! [`paginate`] drives any cursor listing to completion and returns one
//! aggregated [`ListResponse`] with `has_more = false` and no cursor; every
//! other metadata field comes from the final page. Pages are fetched strictly
//! in sequence and transport errors are returned as-is.

use std::future::Future;

use serde_json::Value;
use tracing::{debug, instrument};

use notionsite_shared::{Block, NotionSiteError, Page, Result};

use crate::{ContentStore, Filter, ListResponse, MAX_PAGE_SIZE, QueryRequest};

/// Fetch every page of a cursor listing, starting without a cursor.
pub async fn paginate<T, F, Fut>(mut fetch_page: F) -> Result<ListResponse<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListResponse<T>>>,
{
    let mut results = Vec::new();
    let mut cursor: Option<String> = None;
    let mut has_more = true;
    let mut last: Option<ListResponse<T>> = None;

    while has_more {
        let mut response = fetch_page(cursor.take()).await?;
        results.append(&mut response.results);

        has_more = response.has_more;
        cursor = response.next_cursor.take();
        if has_more && cursor.is_none() {
            return Err(NotionSiteError::Pagination(
                "response reported more results without a next cursor".into(),
            ));
        }
        last = Some(response);
    }

    let last = last.ok_or_else(|| NotionSiteError::Pagination("no response returned".into()))?;

    Ok(ListResponse {
        object: last.object,
        results,
        has_more: false,
        next_cursor: None,
        extra: last.extra,
    })
}

/// Query every record of a data source matching `filter`.
///
/// Each page is narrowed to records carrying a property map before it is
/// appended, so data-source references and other shapes are dropped.
#[instrument(skip(store, filter))]
pub async fn query_all(
    store: &dyn ContentStore,
    data_source_id: &str,
    filter: Option<&Filter>,
) -> Result<ListResponse<Page>> {
    let mut page_count = 0usize;

    let response = paginate(|cursor| {
        page_count += 1;
        let request = QueryRequest {
            filter: filter.cloned(),
            start_cursor: cursor,
            page_size: Some(MAX_PAGE_SIZE),
        };
        async move {
            let response = store.query_data_source(data_source_id, &request).await?;
            page_records(response)
        }
    })
    .await?;

    debug!(
        pages = page_count,
        records = response.results.len(),
        "data source query complete"
    );

    Ok(response)
}

/// List every direct child of a block or page.
pub async fn list_all_children(store: &dyn ContentStore, block_id: &str) -> Result<Vec<Block>> {
    let response = paginate(|cursor| async move {
        store.list_block_children(block_id, cursor.as_deref()).await
    })
    .await?;

    Ok(response.results)
}

/// Keep only records with a property map and decode them as pages.
fn page_records(response: ListResponse<Value>) -> Result<ListResponse<Page>> {
    let ListResponse {
        object,
        results,
        has_more,
        next_cursor,
        extra,
    } = response;

    let pages = results
        .into_iter()
        .filter(|record| record.get("properties").is_some())
        .map(|record| {
            serde_json::from_value::<Page>(record)
                .map_err(|e| NotionSiteError::parse(format!("malformed page record: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ListResponse {
        object,
        results: pages,
        has_more,
        next_cursor,
        extra,
    })
}
