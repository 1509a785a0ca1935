//! Viewport synchronization: re-apply a viewport's persisted position after
//! attach, resize or becoming visible again, and move viewports onto a new
//! layout.

use log::debug;
use std::rc::Rc;

use super::state::ViewportState;
use crate::config::ScrollConfig;
use crate::layout::Layout;
use crate::placeholder::Placeholders;
use crate::position::to_absolute;
use crate::source::PageSource;
use crate::surface::{Axis, Surface};

/// Push the stored position back onto the surface.
///
/// The vertical offset is recomputed from the relative position against the
/// current layout; the horizontal offset is restored verbatim. Nothing is
/// stored, so repeating this is side-effect free. Returns the vertical offset
/// applied, or `None` if no position was ever stored.
pub(super) fn restore(state: &ViewportState, surface: &mut dyn Surface) -> Option<u32> {
    surface.set_content_extent(state.layout.total_extent());
    surface.set_current_page(state.current_page);

    let applied = state.relative_scroll.map(|rel| {
        let v = to_absolute(rel, &state.layout);
        let applied = surface.apply_scroll(Axis::Vertical, v);
        debug!(
            "sync {:?}: relative page={} fraction={:.4} -> offset {v} (applied {applied})",
            state.viewport, rel.page, rel.fraction
        );
        applied
    });
    if applied.is_none() {
        debug!("sync {:?}: no stored position, keeping current offset", state.viewport);
    }

    if let Some(h) = state.hscroll {
        surface.apply_scroll(Axis::Horizontal, h);
    }
    applied
}

/// Track a change of viewport width: re-center page placeholders.
pub(super) fn refresh_width(state: &mut ViewportState, width: u32, config: &ScrollConfig) {
    if state.viewport_width == width {
        return;
    }
    debug!(
        "sync {:?}: width {} -> {width}, re-centering pages",
        state.viewport, state.viewport_width
    );
    state.viewport_width = width;
    state.size_placeholders(config);
}

/// Move `state` onto `layout` after page sizes changed.
///
/// Images rendered at the old size are dropped and the window around the
/// current page is rendered again. The relative position is kept and the
/// state is flagged, so the next command re-applies it with [`restore`]
/// before reading the surface's stale offset.
pub(super) fn adopt_layout(
    state: &mut ViewportState,
    layout: Rc<Layout>,
    source: &dyn PageSource,
    config: &ScrollConfig,
) {
    let n = layout.page_count();
    if n != state.placeholders.page_count() {
        debug!(
            "sync {:?}: page count {} -> {n}, recreating placeholders",
            state.viewport,
            state.placeholders.page_count()
        );
        state.placeholders = Placeholders::create(n, state.viewport);
    } else {
        for &page in &state.materialized {
            if let Some(ph) = state.placeholders.page_mut(page) {
                ph.clear_content();
            }
        }
    }
    state.materialized.clear();
    state.layout = layout;

    state.current_page = state.layout.clamp_page(state.current_page);
    if let Some(rel) = state.relative_scroll.as_mut() {
        rel.page = state.layout.clamp_page(rel.page);
    }

    state.size_placeholders(config);
    state.materialize_window(source, config);
    state.pending_restore = true;
}
