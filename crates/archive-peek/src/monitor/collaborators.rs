//! Interfaces to the platform pieces the monitor drives but doesn't own: finding what's under the
//! pointer, and painting the popup.

use std::path::PathBuf;

use crate::monitor::presentation::ListingView;

/// Screen coordinates in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, width, height }
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.left
            && point.x <= self.left.saturating_add(self.width)
            && point.y >= self.top
            && point.y <= self.top.saturating_add(self.height)
    }
}

/// The file-browser item under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoveredItem {
    /// As shown by the browser, so the extension may be hidden.
    pub name: String,
    pub folder: PathBuf,
    /// False when the pointer is over some other application's window.
    pub in_file_browser: bool,
}

/// Maps the pointer to the item beneath it. Platform adapters implement this with accessibility
/// or shell automation APIs.
pub trait ItemResolver: Send + Sync {
    fn pointer_position(&self) -> Option<ScreenPoint>;

    /// `None` when nothing resolvable is under `point`, including on any lookup failure.
    fn resolve(&self, point: ScreenPoint) -> Option<HoveredItem>;
}

/// The popup. Calls may come from background tasks, so implementations marshal to their UI
/// thread themselves.
pub trait DisplaySurface: Send + Sync {
    fn show_loading(&self, label: &str, at: ScreenPoint);
    fn show_entries(&self, label: &str, listing: &ListingView, at: ScreenPoint);
    fn hide(&self);
    fn is_visible(&self) -> bool;
    /// Whether the popup accepts pointer input (scrolling its list, for example).
    fn is_interactive(&self) -> bool;
    fn bounds(&self) -> ScreenRect;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_its_edges() {
        let rect = ScreenRect::new(10, 20, 100, 50);
        assert!(rect.contains(ScreenPoint::new(10, 20)));
        assert!(rect.contains(ScreenPoint::new(110, 70)));
        assert!(!rect.contains(ScreenPoint::new(111, 70)));
        assert!(!rect.contains(ScreenPoint::new(50, 19)));
    }
}
