//! Core pipeline orchestration and domain logic for notionsite.
//!
//! This crate ties together discovery, querying, rendering, and entity
//! mapping into one build that produces the site's four collections.

pub mod assembler;
pub mod assets;
pub mod enrichment;
pub mod mappers;
pub mod people;
pub mod pipeline;
pub mod queries;

pub use assembler::write_collections;
pub use assets::{AssetFolder, AssetRequest, AssetStore, FsAssetStore};
pub use pipeline::{CollectionKind, Pipeline, ProgressReporter, SilentProgress};
