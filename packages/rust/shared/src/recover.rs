//! Local recovery for optional enrichment steps.
//!
//! Rendering page content, materializing nested blocks and saving assets may
//! fail without failing the collection they belong to. [`recover`] is the one
//! place those failures are logged and replaced with a default.

use std::fmt::Display;
use std::future::Future;

use tracing::warn;

use crate::error::Result;

/// Await `fut`, returning `default` (and logging a warning) on error.
///
/// `context` names the step, `id` the record it ran for.
pub async fn recover<T, F>(context: &str, id: impl Display, default: T, fut: F) -> T
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => value,
        Err(e) => {
            warn!(context, id = %id, error = %e, "recovered from failure");
            default
        }
    }
}
