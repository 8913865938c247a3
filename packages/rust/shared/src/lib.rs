//! Shared types, error model, and configuration for notionsite.
//!
//! This crate is the foundation depended on by all other notionsite crates.
//! It provides:
//! - [`NotionSiteError`], the unified error type
//! - Raw records ([`Page`], [`PropertyValue`], [`Block`], [`RichTextSpan`])
//! - Entity shapes ([`Project`], [`Member`], [`WorkingGroup`], [`Committee`])
//! - Configuration ([`AppConfig`], config loading, env overrides)
//! - [`recover`] for optional steps whose failure is logged, not propagated

pub mod blocks;
pub mod config;
pub mod entities;
pub mod error;
pub mod recover;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use blocks::{
    Block, BlockKind, CalloutBlock, CodeBlock, LinkBlock, MediaBlock, TableBlock, TableRowBlock,
    TextBlock, ToDoBlock,
};
pub use config::{
    AppConfig, NotionConfig, OutputConfig, SourceConfig, SourcesConfig, config_dir,
    config_file_path, data_source_id_env, database_id_env, init_config, load_config,
    load_config_from, resolve_token,
};
pub use entities::{
    Collections, Committee, Member, ParentRef, Person, Project, RelatedProject, WorkingGroup,
};
pub use error::{NotionSiteError, Result};
pub use recover::recover;
pub use types::{
    Annotations, DateValue, FileObject, FileUrl, Formula, Icon, Page, PropertyValue, RelationRef,
    RichTextSpan, Rollup, SelectOption, first_plain_text,
};
