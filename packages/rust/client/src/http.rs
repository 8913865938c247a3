//! HTTP implementation of [`ContentStore`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use notionsite_shared::{Block, NotionConfig, NotionSiteError, Result};

use crate::{ContentStore, DatabaseInfo, ListResponse, MAX_PAGE_SIZE, QueryRequest};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("notionsite/", env!("CARGO_PKG_VERSION"));

/// Error body sent with non-success responses.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Authenticated client for the content store's REST API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base: String,
    token: String,
    version: String,
}

impl NotionClient {
    /// Build a client from the `[notion]` config section and a token.
    pub fn new(config: &NotionConfig, token: impl Into<String>) -> Result<Self> {
        let base = Url::parse(&config.api_base).map_err(|e| {
            NotionSiteError::config(format!("invalid api_base '{}': {e}", config.api_base))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotionSiteError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: base.as_str().trim_end_matches('/').to_string(),
            token: token.into(),
            version: config.notion_version.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base)
    }

    /// Send an authenticated request and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .send()
            .await
            .map_err(|e| NotionSiteError::Network(format!("{what}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            return Err(NotionSiteError::Api {
                status: status.as_u16(),
                code: body.code,
                message: if body.message.is_empty() {
                    format!("{what}: HTTP {status}")
                } else {
                    body.message
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| NotionSiteError::parse(format!("{what}: invalid response body: {e}")))
    }
}

#[async_trait]
impl ContentStore for NotionClient {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo> {
        debug!(database_id, "retrieving database");
        let url = self.endpoint(&format!("databases/{database_id}"));
        self.send(self.client.get(url), &format!("database {database_id}"))
            .await
    }

    async fn query_data_source(
        &self,
        data_source_id: &str,
        request: &QueryRequest,
    ) -> Result<ListResponse<Value>> {
        debug!(data_source_id, cursor = ?request.start_cursor, "querying data source");
        let url = self.endpoint(&format!("data_sources/{data_source_id}/query"));
        self.send(
            self.client.post(url).json(request),
            &format!("data source {data_source_id}"),
        )
        .await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<ListResponse<Block>> {
        debug!(block_id, cursor = ?start_cursor, "listing block children");
        let url = self.endpoint(&format!("blocks/{block_id}/children"));

        let page_size = MAX_PAGE_SIZE.to_string();
        let mut query = vec![("page_size", page_size.as_str())];
        if let Some(cursor) = start_cursor {
            query.push(("start_cursor", cursor));
        }

        self.send(
            self.client.get(url).query(&query),
            &format!("children of {block_id}"),
        )
        .await
    }
}
