//! Turns a listing into what the popup shows: truncated list or tree, footer, image preview.

use std::path::Path;

use serde::Serialize;

use crate::archive::entry::ArchiveEntry;
use crate::archive::tree::{TreeNode, build_entry_tree};
use crate::settings::Settings;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub const IMAGE_PREVIEW_FOOTER: &str = "Image preview requires extraction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingBody {
    Flat(Vec<ArchiveEntry>),
    Tree(Vec<TreeNode>),
    /// Placeholder for a lone image; contents are never extracted.
    ImagePreview(ArchiveEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub body: ListingBody,
    /// Entries in the listing before truncation.
    pub total_count: usize,
    pub footer: String,
}

pub fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

pub fn build_listing_view(entries: Vec<ArchiveEntry>, settings: &Settings) -> ListingView {
    let total_count = entries.len();

    if settings.enable_image_preview
        && let [only] = entries.as_slice()
        && !only.is_directory()
        && is_image_file(only.name())
    {
        return ListingView {
            body: ListingBody::ImagePreview(only.clone()),
            total_count,
            footer: String::from(IMAGE_PREVIEW_FOOTER),
        };
    }

    let max_display = settings.max_display_entries.max(1);
    let footer = if total_count > max_display {
        format!("... and {} more entries", total_count - max_display)
    } else {
        format!("{} entries", total_count)
    };

    let mut shown = entries;
    shown.truncate(max_display);
    let body = if settings.enable_tree_view {
        ListingBody::Tree(build_entry_tree(&shown))
    } else {
        ListingBody::Flat(shown)
    };

    ListingView {
        body,
        total_count,
        footer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(count: usize) -> Vec<ArchiveEntry> {
        (0..count).map(|i| ArchiveEntry::file(format!("f{}.txt", i), 1)).collect()
    }

    #[test]
    fn short_listing_is_flat_with_count_footer() {
        let view = build_listing_view(files(3), &Settings::default());
        assert_eq!(view.footer, "3 entries");
        assert_eq!(view.total_count, 3);
        assert!(matches!(view.body, ListingBody::Flat(ref shown) if shown.len() == 3));
    }

    #[test]
    fn long_listing_is_truncated() {
        let settings = Settings {
            max_display_entries: 2,
            ..Settings::default()
        };
        let view = build_listing_view(files(5), &settings);
        assert_eq!(view.footer, "... and 3 more entries");
        assert_eq!(view.total_count, 5);
        assert!(matches!(view.body, ListingBody::Flat(ref shown) if shown.len() == 2));
    }

    #[test]
    fn tree_view_builds_roots() {
        let settings = Settings {
            enable_tree_view: true,
            ..Settings::default()
        };
        let entries = vec![ArchiveEntry::file("a/b/file.txt", 1), ArchiveEntry::file("a/c.txt", 1)];
        let view = build_listing_view(entries, &settings);
        let ListingBody::Tree(roots) = view.body else {
            panic!("expected tree body");
        };
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "a");
    }

    #[test]
    fn single_image_becomes_preview_stub() {
        let entries = vec![ArchiveEntry::file("holiday/beach.JPG", 2048)];
        let view = build_listing_view(entries.clone(), &Settings::default());
        assert_eq!(view.body, ListingBody::ImagePreview(entries[0].clone()));
        assert_eq!(view.footer, IMAGE_PREVIEW_FOOTER);

        let disabled = Settings {
            enable_image_preview: false,
            ..Settings::default()
        };
        assert!(matches!(build_listing_view(entries, &disabled).body, ListingBody::Flat(_)));
    }

    #[test]
    fn image_detection() {
        assert!(is_image_file("a.png"));
        assert!(is_image_file("dir/b.WebP"));
        assert!(!is_image_file("c.txt"));
        assert!(!is_image_file("png"));
    }
}
