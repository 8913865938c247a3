//! Data-source discovery for configured databases.
//!
//! Every query targets a data source, but configuration names databases.
//! [`DataSourceResolver`] looks up a database's data sources once and caches
//! the chosen id for the lifetime of the resolver. A data source id supplied
//! in configuration short-circuits the lookup entirely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use notionsite_client::ContentStore;
use notionsite_shared::{NotionSiteError, Result, SourceConfig, data_source_id_env};
use tracing::{debug, info, instrument, warn};

// ---------------------------------------------------------------------------
// DataSourceTarget
// ---------------------------------------------------------------------------

/// What to resolve: a database, an optional known data source, and a label
/// used in diagnostics and env var hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceTarget {
    pub database_id: String,
    pub data_source_id: Option<String>,
    pub label: String,
}

impl DataSourceTarget {
    pub fn new(label: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            data_source_id: None,
            label: label.into(),
        }
    }

    pub fn with_data_source(mut self, data_source_id: impl Into<String>) -> Self {
        self.data_source_id = Some(data_source_id.into());
        self
    }
}

impl From<(&str, &SourceConfig)> for DataSourceTarget {
    fn from((label, source): (&str, &SourceConfig)) -> Self {
        Self {
            database_id: source.database_id.clone(),
            data_source_id: source
                .data_source_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
            label: label.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// DataSourceResolver
// ---------------------------------------------------------------------------

/// Resolves databases to data sources, memoized per database id.
pub struct DataSourceResolver {
    store: Arc<dyn ContentStore>,
    cache: Mutex<HashMap<String, String>>,
}

impl DataSourceResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return the data source to query for `target`.
    ///
    /// A database with no data sources is an error. When a database exposes
    /// several, the first is used and a warning names the env var that pins
    /// a specific one.
    #[instrument(skip_all, fields(label = %target.label, database_id = %target.database_id))]
    pub async fn resolve(&self, target: &DataSourceTarget) -> Result<String> {
        if let Some(id) = &target.data_source_id {
            debug!(data_source_id = %id, "using configured data source");
            return Ok(id.clone());
        }

        if let Some(id) = self.cached(&target.database_id) {
            debug!(data_source_id = %id, "data source cache hit");
            return Ok(id);
        }

        let info = self.store.retrieve_database(&target.database_id).await?;
        let Some(first) = info.data_sources.first() else {
            return Err(NotionSiteError::NoDataSources {
                label: target.label.clone(),
            });
        };

        if info.data_sources.len() > 1 {
            warn!(
                label = %target.label,
                candidates = info.data_sources.len(),
                chosen = %first.name.as_deref().unwrap_or(&first.id),
                data_source_id = %first.id,
                "database has multiple data sources; using the first. Set {} to pick another",
                data_source_id_env(&target.label)
            );
        }

        let resolved = self.insert(&target.database_id, &first.id);
        info!(data_source_id = %resolved, "data source resolved");
        Ok(resolved)
    }

    fn cached(&self, database_id: &str) -> Option<String> {
        self.lock().get(database_id).cloned()
    }

    /// Cache `data_source_id` unless another caller got there first; returns
    /// whichever value ends up cached.
    fn insert(&self, database_id: &str, data_source_id: &str) -> String {
        self.lock()
            .entry(database_id.to_string())
            .or_insert_with(|| data_source_id.to_string())
            .clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
