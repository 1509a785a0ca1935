//! Page-window selection: which pages must be materialized around the
//! current one.

use std::ops::RangeInclusive;

/// Select the bounded window (at most three pages) around `current`.
///
/// The result is a contiguous, 1-based range that always contains the
/// clamped current page when `total >= 1`, and is empty when `total == 0`.
///
/// - `total <= 2`: every page
/// - first page: `{1, 2}`
/// - last page: `{N-1, N}`
/// - otherwise: `{p-1, p, p+1}`
pub fn select_window(current: usize, total: usize) -> RangeInclusive<usize> {
    match total {
        0 => RangeInclusive::new(1, 0),
        1 | 2 => 1..=total,
        _ => {
            let p = current.clamp(1, total);
            if p == 1 {
                1..=2
            } else if p == total {
                total - 1..=total
            } else {
                p - 1..=p + 1
            }
        }
    }
}
