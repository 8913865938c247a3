//! In-memory [`ContentStore`] for tests and offline fixtures.
//!
//! Records are served in insertion order, split into pages of a configurable
//! size. Query filters are evaluated against page properties; records without
//! properties always pass so callers see the same mixed shapes the remote
//! store can return.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use notionsite_shared::{Block, NotionSiteError, Page, Result};

use crate::{ContentStore, DataSourceRef, DatabaseInfo, ListResponse, MAX_PAGE_SIZE, QueryRequest};

#[derive(Debug, Default)]
struct CallLog {
    database_lookups: HashMap<String, usize>,
    queries: HashMap<String, Vec<QueryRequest>>,
    children: HashMap<String, usize>,
}

/// A scripted content store held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    page_size: usize,
    databases: HashMap<String, DatabaseInfo>,
    records: HashMap<String, Vec<Value>>,
    children: HashMap<String, Vec<Block>>,
    failing: HashSet<String>,
    calls: Mutex<CallLog>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE as usize,
            databases: HashMap::new(),
            records: HashMap::new(),
            children: HashMap::new(),
            failing: HashSet::new(),
            calls: Mutex::new(CallLog::default()),
        }
    }

    /// Split listings into pages of `size` records.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Register a database exposing the given `(id, name)` data sources.
    pub fn with_database(mut self, database_id: &str, data_sources: &[(&str, &str)]) -> Self {
        let info = DatabaseInfo {
            id: database_id.to_string(),
            data_sources: data_sources
                .iter()
                .map(|(id, name)| DataSourceRef {
                    id: id.to_string(),
                    name: Some(name.to_string()),
                })
                .collect(),
        };
        self.databases.insert(database_id.to_string(), info);
        self
    }

    /// Serve raw records from a data source.
    pub fn with_records(mut self, data_source_id: &str, records: Vec<Value>) -> Self {
        self.records
            .entry(data_source_id.to_string())
            .or_default()
            .extend(records);
        self
    }

    /// Serve typed pages from a data source.
    pub fn with_pages(self, data_source_id: &str, pages: &[Page]) -> Self {
        let records = pages
            .iter()
            .map(|page| serde_json::to_value(page).unwrap_or(Value::Null))
            .collect();
        self.with_records(data_source_id, records)
    }

    /// Serve the direct children of a block or page.
    pub fn with_children(mut self, block_id: &str, children: Vec<Block>) -> Self {
        self.children.insert(block_id.to_string(), children);
        self
    }

    /// Make every request for `id` (database, data source or block) fail.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Number of metadata lookups made for a database.
    pub fn database_lookups(&self, database_id: &str) -> usize {
        self.log().database_lookups.get(database_id).copied().unwrap_or(0)
    }

    /// Number of query requests made against a data source.
    pub fn query_count(&self, data_source_id: &str) -> usize {
        self.log().queries.get(data_source_id).map_or(0, Vec::len)
    }

    /// Requests made against a data source, in order.
    pub fn queries(&self, data_source_id: &str) -> Vec<QueryRequest> {
        self.log().queries.get(data_source_id).cloned().unwrap_or_default()
    }

    /// Number of child-listing requests made for a block.
    pub fn children_requests(&self, block_id: &str) -> usize {
        self.log().children.get(block_id).copied().unwrap_or(0)
    }

    fn log(&self) -> std::sync::MutexGuard<'_, CallLog> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_failing(&self, id: &str) -> Result<()> {
        if self.failing.contains(id) {
            return Err(NotionSiteError::Api {
                status: 500,
                code: "internal_server_error".into(),
                message: format!("scripted failure for {id}"),
            });
        }
        Ok(())
    }

    /// Slice `items` into the page starting at `cursor`.
    fn page_of<T: Clone>(&self, items: &[T], cursor: Option<&str>) -> Result<ListResponse<T>> {
        let start = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| NotionSiteError::validation(format!("invalid cursor {c}")))?,
        };
        let end = (start + self.page_size).min(items.len());
        let slice = items.get(start..end).unwrap_or_default().to_vec();

        Ok(if end < items.len() {
            ListResponse::more(slice, end.to_string())
        } else {
            ListResponse::last(slice)
        })
    }
}

fn not_found(kind: &str, id: &str) -> NotionSiteError {
    NotionSiteError::Api {
        status: 404,
        code: "object_not_found".into(),
        message: format!("Could not find {kind} with ID: {id}"),
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo> {
        *self
            .log()
            .database_lookups
            .entry(database_id.to_string())
            .or_default() += 1;
        self.check_failing(database_id)?;

        self.databases
            .get(database_id)
            .cloned()
            .ok_or_else(|| not_found("database", database_id))
    }

    async fn query_data_source(
        &self,
        data_source_id: &str,
        request: &QueryRequest,
    ) -> Result<ListResponse<Value>> {
        self.log()
            .queries
            .entry(data_source_id.to_string())
            .or_default()
            .push(request.clone());
        self.check_failing(data_source_id)?;

        let records = self
            .records
            .get(data_source_id)
            .ok_or_else(|| not_found("data source", data_source_id))?;

        let matching: Vec<Value> = records
            .iter()
            .filter(|record| match (&request.filter, record.get("properties")) {
                (Some(filter), Some(_)) => serde_json::from_value::<Page>((*record).clone())
                    .map(|page| filter.matches(&page))
                    .unwrap_or(true),
                _ => true,
            })
            .cloned()
            .collect();

        self.page_of(&matching, request.start_cursor.as_deref())
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<ListResponse<Block>> {
        *self.log().children.entry(block_id.to_string()).or_default() += 1;
        self.check_failing(block_id)?;

        let children = self
            .children
            .get(block_id)
            .ok_or_else(|| not_found("block", block_id))?;

        self.page_of(children, start_cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_pages_with_cursors() {
        let store = MemoryStore::new()
            .with_page_size(2)
            .with_pages("ds", &[Page::new("a"), Page::new("b"), Page::new("c")]);

        let first = store
            .query_data_source("ds", &QueryRequest::default())
            .await
            .unwrap();
        assert_eq!(first.results.len(), 2);
        assert!(first.has_more);

        let second = store
            .query_data_source(
                "ds",
                &QueryRequest {
                    start_cursor: first.next_cursor.clone(),
                    ..QueryRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.results.len(), 1);
        assert!(!second.has_more);
        assert_eq!(store.query_count("ds"), 2);
    }

    #[tokio::test]
    async fn unknown_and_failing_ids_error() {
        let store = MemoryStore::new()
            .with_database("db", &[("ds", "Main")])
            .failing("broken");

        assert!(matches!(
            store.retrieve_database("missing").await,
            Err(NotionSiteError::Api { status: 404, .. })
        ));
        assert!(matches!(
            store.list_block_children("broken", None).await,
            Err(NotionSiteError::Api { status: 500, .. })
        ));
        assert_eq!(store.database_lookups("missing"), 1);
    }
}
