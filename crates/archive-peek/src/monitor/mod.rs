//! Hover monitoring: watch what the pointer is over, and show an archive's listing when it's an
//! archive.

pub mod collaborators;
pub mod detection;
pub mod poll_loop;
pub mod presentation;
pub mod runner;


pub use collaborators::{DisplaySurface, HoveredItem, ItemResolver, ScreenPoint, ScreenRect};
pub use detection::{ARCHIVE_EXTENSIONS, find_archive_file, is_archive_extension};
pub use poll_loop::{HoverMonitor, POPUP_OFFSET, TickOutcome};
pub use presentation::{ListingBody, ListingView, build_listing_view, is_image_file};
pub use runner::MonitorRunner;
