//! Content-store access: the [`ContentStore`] seam, its HTTP and in-memory
//! implementations, query filters, and exhaustive cursor pagination.
//!
//! Everything above this crate talks to the store through
//! `Arc<dyn ContentStore>`, so tests swap in [`MemoryStore`].

pub mod filter;
pub mod http;
pub mod memory;
pub mod paginate;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use notionsite_shared::{Block, Result};

pub use filter::{Condition, Filter, SelectCondition};
pub use http::NotionClient;
pub use memory::MemoryStore;
pub use paginate::{list_all_children, paginate, query_all};

/// Largest page size the store accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Remaining metadata (`type`, `request_id`, ...), kept as sent.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl<T> ListResponse<T> {
    /// A final (or only) page.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            object: "list".into(),
            results,
            has_more: false,
            next_cursor: None,
            extra: serde_json::Map::new(),
        }
    }

    /// A page followed by another at `cursor`.
    pub fn more(results: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            has_more: true,
            next_cursor: Some(cursor.into()),
            ..Self::last(results)
        }
    }
}

/// Reference to a data source inside a database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Database metadata; only the data source list is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: String,
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
}

/// Body of a data source query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

// ---------------------------------------------------------------------------
// ContentStore
// ---------------------------------------------------------------------------

/// The remote content store.
///
/// Each call is a single request; pagination is driven by [`paginate`].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a database's metadata, including its data sources.
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo>;

    /// Fetch one page of records from a data source.
    ///
    /// Results are raw objects: the store may return non-page records.
    async fn query_data_source(
        &self,
        data_source_id: &str,
        request: &QueryRequest,
    ) -> Result<ListResponse<Value>>;

    /// Fetch one page of a block's (or page's) direct children.
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<ListResponse<Block>>;
}
