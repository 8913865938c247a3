//! Page content rendering.
//!
//! Rendering is split in two steps:
//! - [`fetch_block_tree`] walks the store and materializes the children of
//!   every block whose markup embeds them (toggles and tables).
//! - [`render_blocks`] turns the materialized tree into markup. It is a
//!   plain synchronous function with no I/O.
//!
//! [`fetch_page_content`] runs both for a page.

pub mod blocks;
pub mod rich_text;
pub mod tree;

pub use blocks::render_blocks;
pub use rich_text::render_rich_text;
pub use tree::{fetch_block_tree, fetch_page_content};
