//! Incremental scrolling and page navigation for a single viewport.
//!
//! Each step is atomic from the caller's perspective: apply the new offset,
//! detect a page-boundary crossing, materialize the new window, persist the
//! relative position.

use log::debug;

use super::state::ViewportState;
use crate::config::ScrollConfig;
use crate::source::PageSource;
use crate::surface::{Axis, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Result of one step or navigation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Offset in effect after the surface clamped it.
    pub offset: u32,
    pub page: usize,
    /// True when the current page changed.
    pub crossed: bool,
    /// Pages rendered by this step.
    pub materialized: Vec<usize>,
}

/// Scroll by `step` device units in `direction`.
pub(super) fn scroll(
    state: &mut ViewportState,
    surface: &mut dyn Surface,
    source: &dyn PageSource,
    config: &ScrollConfig,
    direction: Direction,
    step: u32,
) -> StepOutcome {
    let current = surface.read_scroll(Axis::Vertical);
    let page = state.current_page;
    let layout = std::rc::Rc::clone(&state.layout);

    let (requested, crossed) = match direction {
        Direction::Forward => {
            let page_end = layout.page_end(page);
            let new = surface.apply_scroll(Axis::Vertical, current.saturating_add(step));
            (new, new > page_end && page < layout.page_count())
        }
        Direction::Backward => {
            let page_beg = layout.page_start(page);
            let new = surface.apply_scroll(Axis::Vertical, current.saturating_sub(step));
            (new, new < page_beg && page > 1)
        }
    };

    let mut materialized = Vec::new();
    if crossed {
        let target = layout.page_at(requested);
        debug!(
            "step {direction:?}: offset {current} -> {requested} crosses page {page} -> {target}"
        );
        state.set_current_page(surface, target);
        materialized = state.materialize_window(source, config);
    } else {
        debug!("step {direction:?}: offset {current} -> {requested} (page {page})");
    }

    let offset = state.set_scroll(surface, requested);
    StepOutcome {
        offset,
        page: state.current_page,
        crossed,
        materialized,
    }
}

/// Make `page` current and scroll to its start.
pub(super) fn goto_page(
    state: &mut ViewportState,
    surface: &mut dyn Surface,
    source: &dyn PageSource,
    config: &ScrollConfig,
    page: usize,
) -> StepOutcome {
    let before = state.current_page;
    state.set_current_page(surface, page);
    let materialized = state.materialize_window(source, config);
    let start = state.layout.page_start(state.current_page);
    debug!("goto page {page}: page {before} -> {}, offset {start}", state.current_page);
    let offset = state.set_scroll(surface, start);
    StepOutcome {
        offset,
        page: state.current_page,
        crossed: before != state.current_page,
        materialized,
    }
}
