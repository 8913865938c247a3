//! Collection writer.
//!
//! Serializes the four collections to pretty JSON arrays in one directory.
//! Each file is written to a temp file and renamed into place, so a reader
//! never sees a half-written collection.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use notionsite_shared::{Collections, NotionSiteError, Result};

pub const PROJECTS_FILE: &str = "projects.json";
pub const MEMBERS_FILE: &str = "members.json";
pub const WORKING_GROUPS_FILE: &str = "working-groups.json";
pub const COMMITTEES_FILE: &str = "committees.json";

/// Write every collection under `dir`, returning the written paths.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_collections(dir: &Path, collections: &Collections) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| NotionSiteError::io(dir, e))?;

    let written = vec![
        write_json(dir, PROJECTS_FILE, &collections.projects)?,
        write_json(dir, MEMBERS_FILE, &collections.members)?,
        write_json(dir, WORKING_GROUPS_FILE, &collections.working_groups)?,
        write_json(dir, COMMITTEES_FILE, &collections.committees)?,
    ];

    info!(files = written.len(), "collections written");
    Ok(written)
}

/// Write a JSON file (pretty-printed) atomically.
fn write_json<T: Serialize>(dir: &Path, filename: &str, data: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| NotionSiteError::validation(format!("JSON serialization failed: {e}")))?;

    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.tmp"));

    std::fs::write(&temp, &json).map_err(|e| NotionSiteError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| NotionSiteError::io(&target, e))?;

    debug!(path = %target.display(), size = json.len(), "wrote JSON file");
    Ok(target)
}
