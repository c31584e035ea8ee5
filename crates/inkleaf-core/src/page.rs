//! Vertical page layout over the infinite canvas.
//!
//! Pages stack downward with a fixed gap between them. Every mapping from a
//! scene y coordinate to a page index lives here so hit-testing, export, and
//! guides agree on the boundaries.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// A4 width at 96 dpi, in scene units.
pub const A4_WIDTH_PX: f64 = 794.0;

/// A4 height at 96 dpi, in scene units.
pub const A4_HEIGHT_PX: f64 = 1123.0;

/// Default vertical gap between consecutive pages.
pub const DEFAULT_PAGE_GAP: f64 = 8.0;

/// Page dimensions and inter-page gap, in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    pub gap: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: A4_WIDTH_PX,
            height: A4_HEIGHT_PX,
            gap: DEFAULT_PAGE_GAP,
        }
    }
}

impl PageLayout {
    pub fn new(width: f64, height: f64, gap: f64) -> Self {
        Self { width, height, gap }
    }

    /// Vertical distance from the top of one page to the top of the next.
    pub fn stride(&self) -> f64 {
        self.height + self.gap
    }

    /// Page index owning a scene y coordinate. Points above the first page
    /// clamp to page 0; points in a gap belong to the page above it.
    pub fn page_index_at(&self, y: f64) -> usize {
        (y / self.stride()).floor().max(0.0) as usize
    }

    /// `(top, bottom)` of a page's printable area in scene coordinates.
    pub fn page_span(&self, index: usize) -> (f64, f64) {
        let top = index as f64 * self.stride();
        (top, top + self.height)
    }

    /// Printable rect of a page in scene coordinates.
    pub fn page_rect(&self, index: usize) -> Rect {
        let (top, bottom) = self.page_span(index);
        Rect::new(0.0, top, self.width, bottom)
    }

    /// Total canvas height covered by `count` pages and the gaps between them.
    pub fn total_height(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        count as f64 * self.height + (count - 1) as f64 * self.gap
    }

    /// Whether a vertical span `(min_y, max_y)` overlaps a page's printable area.
    pub fn intersects_page(&self, index: usize, min_y: f64, max_y: f64) -> bool {
        let (top, bottom) = self.page_span(index);
        max_y >= top && min_y <= bottom
    }
}
