//! Scroll position mapping between absolute offsets and page-relative
//! positions.
//!
//! The relative form `(page, fraction)` does not depend on device metrics, so
//! it survives resizes and page re-rendering; it is what each viewport
//! persists.

use crate::layout::Layout;

/// Page-relative scroll position. `fraction` is nominally in `[0, 1]`; it
/// slightly exceeds 1 when the offset lies in the gap below the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeScroll {
    /// 1-based page number.
    pub page: usize,
    pub fraction: f64,
}

impl RelativeScroll {
    pub fn top_of(page: usize) -> Self {
        Self {
            page,
            fraction: 0.0,
        }
    }
}

/// Express `offset` relative to `page` (clamped to the layout).
///
/// Offsets above the page start map to fraction 0; a zero-extent page maps to
/// fraction 0.
pub fn to_relative(offset: u32, layout: &Layout, page: usize) -> RelativeScroll {
    let page = layout.clamp_page(page);
    let extent = layout.extent(page);
    let fraction = if extent == 0 {
        0.0
    } else {
        f64::from(offset.saturating_sub(layout.page_start(page))) / f64::from(extent)
    };
    RelativeScroll { page, fraction }
}

/// Recover the absolute offset of `relative` against `layout`, rounded to
/// the nearest device unit.
pub fn to_absolute(relative: RelativeScroll, layout: &Layout) -> u32 {
    let page = layout.clamp_page(relative.page);
    let start = f64::from(layout.page_start(page));
    let extent = f64::from(layout.extent(page));
    let v = (start + relative.fraction * extent).round();
    if v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v as u32
    }
}
