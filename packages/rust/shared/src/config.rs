//! Application configuration for notionsite.
//!
//! User config lives at `~/.notionsite/notionsite.toml` unless a path is given.
//! Environment variables override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotionSiteError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "notionsite.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".notionsite";

// ---------------------------------------------------------------------------
// Config structs (matching notionsite.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Content store connection settings.
    #[serde(default)]
    pub notion: NotionConfig,

    /// Databases the collections are built from.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Where generated collections and assets go.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[notion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Name of the env var holding the integration token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Base URL of the API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Value sent in the `Notion-Version` header.
    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            api_base: default_api_base(),
            notion_version: default_notion_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_token_env() -> String {
    "NOTION_TOKEN".into()
}
fn default_api_base() -> String {
    "https://api.notion.com".into()
}
fn default_notion_version() -> String {
    "2025-09-03".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// A database plus an optional pinned data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database (container) id.
    #[serde(default)]
    pub database_id: String,

    /// Data source id; when unset the first data source of the database is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
}

/// `[sources.*]` sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Projects database; working groups and committees live here too.
    #[serde(default)]
    pub projects: SourceConfig,

    /// Role-assignment (subscription) database.
    #[serde(default)]
    pub subscriptions: SourceConfig,

    /// Member organizations database.
    #[serde(default)]
    pub members: SourceConfig,
}

impl SourcesConfig {
    /// Iterate `(label, source)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SourceConfig)> {
        [
            ("projects", &self.projects),
            ("subscriptions", &self.subscriptions),
            ("members", &self.members),
        ]
        .into_iter()
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the collection JSON files are written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Directory downloaded icons and logos are written to.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Maximum pages rendered concurrently per collection.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            assets_dir: default_assets_dir(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_output_dir() -> String {
    "content".into()
}
fn default_assets_dir() -> String {
    "public/assets".into()
}
fn default_concurrency() -> usize {
    8
}

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

/// Env var holding the database id for a source label, e.g. `NOTION_PROJECTS_DATABASE_ID`.
pub fn database_id_env(label: &str) -> String {
    format!("NOTION_{}_DATABASE_ID", label.to_ascii_uppercase())
}

/// Env var pinning the data source for a source label, e.g. `NOTION_PROJECTS_DATA_SOURCE_ID`.
pub fn data_source_id_env(label: &str) -> String {
    format!("NOTION_{}_DATA_SOURCE_ID", label.to_ascii_uppercase())
}

impl AppConfig {
    /// Apply `NOTION_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: String| lookup(&key).filter(|v| !v.trim().is_empty());

        for (label, source) in [
            ("projects", &mut self.sources.projects),
            ("subscriptions", &mut self.sources.subscriptions),
            ("members", &mut self.sources.members),
        ] {
            if let Some(id) = lookup(database_id_env(label)) {
                source.database_id = id;
            }
            if let Some(id) = lookup(data_source_id_env(label)) {
                source.data_source_id = Some(id);
            }
        }
    }

    /// Check that every source names a database.
    pub fn validate_sources(&self) -> Result<()> {
        let missing: Vec<String> = self
            .sources
            .iter()
            .filter(|(_, source)| source.database_id.trim().is_empty())
            .map(|(label, _)| database_id_env(label))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(NotionSiteError::config(format!(
                "missing database ids; set {} or the [sources] section",
                missing.join(", ")
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.notionsite/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NotionSiteError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.notionsite/notionsite.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NotionSiteError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NotionSiteError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NotionSiteError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NotionSiteError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NotionSiteError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the integration token from the env var named in the config.
pub fn resolve_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.notion.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(NotionSiteError::config(format!(
            "integration token not found. Set the {var_name} environment variable."
        ))),
    }
}
