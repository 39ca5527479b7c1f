//! Row virtualization and the scroll-proximity prefetch trigger.
//!
//! Geometry is expressed in virtual pixels: every row has the same estimated
//! height, so the terminal (one text line per row) and a pixel-based client
//! share the same thresholds.

use std::ops::Range;

/// Estimated height of one row.
pub const DEFAULT_ROW_HEIGHT: u32 = 35;
/// Rows rendered beyond each edge of the visible window.
pub const DEFAULT_OVERSCAN: usize = 10;
/// Remaining distance to the bottom that triggers the next page.
pub const PREFETCH_THRESHOLD: u32 = 300;

/// Scroll position of the table container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Full height of the scrollable content.
    pub scroll_height: u32,
    /// Offset of the visible window from the top.
    pub scroll_top: u32,
    /// Height of the visible window.
    pub client_height: u32,
}

impl ScrollMetrics {
    pub fn distance_to_bottom(&self) -> u32 {
        self.scroll_height
            .saturating_sub(self.scroll_top)
            .saturating_sub(self.client_height)
    }
}

/// Decides whether the next page should be requested.
///
/// `total` of `None` means the server has not reported one yet.
pub fn should_fetch_more(
    metrics: ScrollMetrics,
    threshold: u32,
    is_fetching: bool,
    loaded: usize,
    total: Option<u64>,
) -> bool {
    metrics.distance_to_bottom() < threshold
        && !is_fetching
        && total.is_none_or(|t| (loaded as u64) < t)
}

/// Fixed-height row virtualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Virtualizer {
    pub row_height: u32,
    pub overscan: usize,
}

impl Default for Virtualizer {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl Virtualizer {
    pub fn new(row_height: u32, overscan: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            overscan,
        }
    }

    pub fn total_size(&self, row_count: usize) -> u32 {
        (row_count as u32).saturating_mul(self.row_height)
    }

    /// Rows intersecting `[scroll_top, scroll_top + client_height)`, widened by
    /// the overscan and clamped to `0..row_count`.
    pub fn window(&self, scroll_top: u32, client_height: u32, row_count: usize) -> Range<usize> {
        if row_count == 0 {
            return 0..0;
        }
        let first = (scroll_top / self.row_height) as usize;
        let last = scroll_top
            .saturating_add(client_height)
            .div_ceil(self.row_height) as usize;

        let start = first.saturating_sub(self.overscan).min(row_count);
        let end = last.saturating_add(self.overscan).min(row_count);
        start..end.max(start)
    }

    /// Space above the first rendered row.
    pub fn padding_top(&self, window: &Range<usize>) -> u32 {
        self.total_size(window.start)
    }

    /// Metrics for a list scrolled so that row `offset` is at the top of a
    /// `visible_rows` tall window.
    pub fn metrics_for_rows(&self, offset: usize, visible_rows: usize, row_count: usize) -> ScrollMetrics {
        ScrollMetrics {
            scroll_height: self.total_size(row_count),
            scroll_top: self.total_size(offset),
            client_height: self.total_size(visible_rows),
        }
    }
}
