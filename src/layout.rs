//! Layout model: cumulative page offsets along the scroll axis.
//!
//! Pages are stacked top to bottom with a fixed gap between neighbours.
//! `offsets[i]` is the start of the (i+1)-th page; the final entry is the end
//! of the last page, with no trailing gap.

use std::time::Instant;

use log::{info, trace};

/// Natural size of a page in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the page along the scroll axis.
    pub fn extent(&self) -> u32 {
        self.height
    }
}

/// Compute the `N + 1` cumulative start positions for `page_sizes`.
///
/// `N = 0` yields `[0]`; `N = 1` yields `[0, height]`.
pub fn compute_offsets(page_sizes: &[PageSize], gap: u32) -> Vec<u32> {
    let n = page_sizes.len();
    let mut offsets = Vec::with_capacity(n + 1);
    offsets.push(0);

    let mut acc: u32 = 0;
    for (i, size) in page_sizes.iter().enumerate() {
        acc = acc.saturating_add(size.extent());
        if i + 1 < n {
            acc = acc.saturating_add(gap);
        }
        offsets.push(acc);
    }
    offsets
}

/// Page sizes plus their derived offsets. Shared read-only by every viewport
/// showing the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    page_sizes: Vec<PageSize>,
    offsets: Vec<u32>,
    gap: u32,
}

impl Layout {
    pub fn new(page_sizes: Vec<PageSize>, gap: u32) -> Self {
        let start = Instant::now();
        let offsets = compute_offsets(&page_sizes, gap);
        info!(
            "layout: {} pages, gap={}, total extent={} in {:.2}ms",
            page_sizes.len(),
            gap,
            offsets.last().copied().unwrap_or(0),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Self {
            page_sizes,
            offsets,
            gap,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_sizes.is_empty()
    }

    pub fn gap(&self) -> u32 {
        self.gap
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    /// Clamp a 1-based page number into `[1, N]` (1 for an empty layout).
    pub fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.page_count().max(1))
    }

    /// Size of the 1-based `page`, or zero if out of range.
    pub fn page_size(&self, page: usize) -> PageSize {
        page.checked_sub(1)
            .and_then(|i| self.page_sizes.get(i))
            .copied()
            .unwrap_or_default()
    }

    pub fn extent(&self, page: usize) -> u32 {
        self.page_size(page).extent()
    }

    /// Start offset of the 1-based `page` (`offsets[page - 1]`).
    pub fn page_start(&self, page: usize) -> u32 {
        let idx = page.saturating_sub(1).min(self.offsets.len() - 1);
        self.offsets[idx]
    }

    /// End boundary of the 1-based `page` (`offsets[page]`): the next page's
    /// start, or the document end for the last page.
    pub fn page_end(&self, page: usize) -> u32 {
        let idx = page.min(self.offsets.len() - 1);
        self.offsets[idx]
    }

    /// Total scrollable length (`offsets[N]`).
    pub fn total_extent(&self) -> u32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// 1-based page whose `[start, next start)` interval contains `offset`,
    /// clamped to `[1, N]`. A gap belongs to the page above it.
    pub fn page_at(&self, offset: u32) -> usize {
        let n = self.page_count();
        if n == 0 {
            return 1;
        }
        let page = self.offsets[..n].partition_point(|&start| start <= offset);
        let page = page.clamp(1, n);
        trace!("layout: offset {offset} -> page {page}");
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, w: u32, h: u32) -> Vec<PageSize> {
        vec![PageSize::new(w, h); n]
    }

    #[test]
    fn empty_document_has_single_zero_offset() {
        assert_eq!(compute_offsets(&[], 5), vec![0]);
        let layout = Layout::new(Vec::new(), 5);
        assert_eq!(layout.total_extent(), 0);
        assert_eq!(layout.page_at(100), 1);
        assert_eq!(layout.extent(1), 0);
        assert_eq!(layout.page_start(1), 0);
        assert_eq!(layout.page_end(1), 0);
    }

    #[test]
    fn single_page_has_no_gap() {
        assert_eq!(compute_offsets(&uniform(1, 800, 1014), 5), vec![0, 1014]);
    }

    #[test]
    fn uniform_pages_large_document() {
        let offsets = compute_offsets(&uniform(426, 800, 1014), 5);
        assert_eq!(offsets.len(), 427);
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], 1019);
        assert_eq!(offsets[2], 2038);
        assert_eq!(offsets[425], 432_056);
        assert_eq!(offsets[426], 433_070);
        for (i, &o) in offsets.iter().enumerate().take(426) {
            assert_eq!(o, i as u32 * 1019);
        }
    }

    #[test]
    fn mixed_sizes_are_non_decreasing() {
        let sizes = vec![
            PageSize::new(600, 800),
            PageSize::new(800, 0),
            PageSize::new(600, 300),
        ];
        let offsets = compute_offsets(&sizes, 10);
        assert_eq!(offsets, vec![0, 810, 820, 1120]);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn page_at_boundaries() {
        let layout = Layout::new(uniform(3, 800, 100), 5);
        // offsets: [0, 105, 210, 310]
        assert_eq!(layout.page_at(0), 1);
        assert_eq!(layout.page_at(99), 1);
        assert_eq!(layout.page_at(102), 1); // gap belongs to the page above
        assert_eq!(layout.page_at(105), 2);
        assert_eq!(layout.page_at(209), 2);
        assert_eq!(layout.page_at(210), 3);
        assert_eq!(layout.page_at(10_000), 3);
    }

    #[test]
    fn page_accessors_clamp_out_of_range() {
        let layout = Layout::new(uniform(2, 800, 100), 5);
        assert_eq!(layout.clamp_page(0), 1);
        assert_eq!(layout.clamp_page(7), 2);
        assert_eq!(layout.page_size(3), PageSize::default());
        assert_eq!(layout.page_start(2), 105);
        assert_eq!(layout.page_end(2), 205);
        assert_eq!(layout.page_end(9), 205);
    }
}
