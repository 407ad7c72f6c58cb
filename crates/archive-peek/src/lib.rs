// Deny unused code to catch dead code early
#![deny(unused)]
// Warn on unused dependencies to catch platform-specific cfg mismatches
#![warn(unused_crate_dependencies)]
// Warn on redundant path prefixes (e.g., std::path::Path when Path is imported)
#![warn(unused_qualifications)]
// Use log::* macros instead of println!/eprintln! for proper log level control
#![deny(clippy::print_stdout, clippy::print_stderr)]

// env_logger and clap are only used by the binary
use clap as _;
use env_logger as _;

pub mod archive;
pub mod cancel;
mod ignore_poison;
pub mod monitor;
pub mod settings;
pub mod stats;

pub use archive::{ArchiveCatalogReader, ArchiveEntry, TreeNode, build_entry_tree, format_size, parse_listing_table};
pub use cancel::{CancellationToken, Cancelled};
pub use monitor::{DisplaySurface, HoverMonitor, ItemResolver, MonitorRunner};
pub use settings::{Settings, load_settings};
pub use stats::{StatisticsCounter, StatsSnapshot};
