//! Icon and logo persistence.
//!
//! Mappers only need the public path an asset will be served from; the
//! [`AssetStore`] collaborator does the download. Both derive the file
//! extension through [`asset_extension`] so the two always agree.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use notionsite_shared::{NotionSiteError, Page, Result};

/// Directory (under the assets root) an asset is saved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetFolder {
    Projects,
    WorkingGroups,
    Committees,
    Members,
}

impl AssetFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetFolder::Projects => "projects",
            AssetFolder::WorkingGroups => "working-groups",
            AssetFolder::Committees => "committees",
            AssetFolder::Members => "members",
        }
    }
}

impl std::fmt::Display for AssetFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension of the last path segment of `url`, ignoring the
/// query string.
pub fn asset_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    let (_, extension) = segment.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Public path `/assets/{folder}/{id}.{ext}`, or `None` when the URL has no
/// extension.
pub fn asset_path(folder: AssetFolder, id: &str, url: &str) -> Option<String> {
    let extension = asset_extension(url)?;
    Some(format!("/assets/{folder}/{id}.{extension}"))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One asset to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub id: String,
    pub url: String,
    pub folder: AssetFolder,
}

impl AssetRequest {
    /// The page's icon, when it is an image.
    pub fn icon(page: &Page, folder: AssetFolder) -> Option<Self> {
        Some(Self {
            id: page.id.clone(),
            url: page.icon_url()?.to_string(),
            folder,
        })
    }

    /// A member page's logo: the first hosted file of its `Logo` property.
    pub fn logo(page: &Page) -> Option<Self> {
        Some(Self {
            id: page.id.clone(),
            url: page.first_file_url("Logo")?.to_string(),
            folder: AssetFolder::Members,
        })
    }

    /// Public path the asset is served from.
    pub fn public_path(&self) -> Option<String> {
        asset_path(self.folder, &self.id, &self.url)
    }
}

// ---------------------------------------------------------------------------
// AssetStore
// ---------------------------------------------------------------------------

/// Persists assets and returns their public path.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn save(&self, request: &AssetRequest) -> Result<String>;
}

/// Downloads assets over HTTP and writes them under a root directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    client: Client,
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("notionsite/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| NotionSiteError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            root: root.into(),
        })
    }

    async fn download(&self, url: &str, extension: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)
            .map_err(|e| NotionSiteError::Asset(format!("invalid URL {url}: {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NotionSiteError::Asset(format!("download of {url} failed: {e}")))?;

        let body = if extension == "svg" {
            response.text().await.map(String::into_bytes)
        } else {
            response.bytes().await.map(|b| b.to_vec())
        };
        body.map_err(|e| NotionSiteError::Asset(format!("reading {url} failed: {e}")))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    #[instrument(skip_all, fields(id = %request.id, folder = %request.folder))]
    async fn save(&self, request: &AssetRequest) -> Result<String> {
        let extension = asset_extension(&request.url).ok_or_else(|| {
            NotionSiteError::Asset(format!("no file extension in {}", request.url))
        })?;

        let bytes = self.download(&request.url, &extension).await?;

        let dir = self.root.join(request.folder.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| NotionSiteError::io(&dir, e))?;

        let path = dir.join(format!("{}.{extension}", request.id));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| NotionSiteError::io(&path, e))?;

        debug!(path = %path.display(), size = bytes.len(), "asset saved");
        Ok(format!("/assets/{}/{}.{extension}", request.folder, request.id))
    }
}
