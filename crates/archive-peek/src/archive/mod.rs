//! Everything about reading what's inside an archive: the entry model, the listing backends,
//! the cached catalog reader, the 7-Zip table parser and the tree builder.

pub mod backends;
pub mod cache;
pub mod catalog;
pub mod entry;
pub mod table_parser;
pub mod tree;

#[cfg(test)]
mod test_archives;

pub use catalog::{ArchiveCatalogReader, LOCKED_MESSAGE, NO_CAPABLE_TOOL_MESSAGE};
pub use entry::{ArchiveEntry, SENTINEL_MARKER, format_size};
pub use table_parser::parse_listing_table;
pub use tree::{TreeNode, build_entry_tree};
