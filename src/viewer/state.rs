//! Per-viewport state: placeholders, shared layout, persisted position,
//! materialized pages.

use log::{debug, trace, warn};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::config::ScrollConfig;
use crate::layout::Layout;
use crate::placeholder::Placeholders;
use crate::position::{RelativeScroll, to_relative};
use crate::source::PageSource;
use crate::surface::{Axis, Surface, ViewportId};
use crate::window::select_window;

/// Everything one viewport knows about the document it shows.
#[derive(Debug, Clone)]
pub struct ViewportState {
    pub(super) viewport: ViewportId,
    pub(super) placeholders: Placeholders,
    pub(super) layout: Rc<Layout>,
    /// `None` until the first scroll is stored.
    pub(super) relative_scroll: Option<RelativeScroll>,
    pub(super) materialized: BTreeSet<usize>,
    pub(super) hscroll: Option<u32>,
    pub(super) current_page: usize,
    /// Width seen at the last synchronization, used for centering.
    pub(super) viewport_width: u32,
    /// The layout changed since the surface last had the position applied.
    pub(super) pending_restore: bool,
}

impl ViewportState {
    /// Fresh state: new placeholders sized from `layout`, nothing rendered.
    pub(super) fn fresh(
        viewport: ViewportId,
        layout: Rc<Layout>,
        viewport_width: u32,
        config: &ScrollConfig,
    ) -> Self {
        let placeholders = Placeholders::create(layout.page_count(), viewport);
        let mut state = Self {
            viewport,
            placeholders,
            layout,
            relative_scroll: None,
            materialized: BTreeSet::new(),
            hscroll: None,
            current_page: 1,
            viewport_width,
            pending_restore: false,
        };
        state.size_placeholders(config);
        state
    }

    /// Copy of `other` rebound to `viewport`. The layout is shared, not
    /// recomputed.
    pub(super) fn cloned_from(other: &ViewportState, viewport: ViewportId, viewport_width: u32) -> Self {
        Self {
            viewport,
            placeholders: other.placeholders.clone_for_viewport(viewport),
            layout: Rc::clone(&other.layout),
            relative_scroll: other.relative_scroll,
            materialized: other.materialized.clone(),
            hscroll: other.hscroll,
            current_page: other.current_page,
            viewport_width,
            pending_restore: false,
        }
    }

    pub fn viewport(&self) -> ViewportId {
        self.viewport
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn layout(&self) -> &Rc<Layout> {
        &self.layout
    }

    pub fn relative_scroll(&self) -> Option<RelativeScroll> {
        self.relative_scroll
    }

    pub fn materialized(&self) -> &BTreeSet<usize> {
        &self.materialized
    }

    pub fn hscroll(&self) -> Option<u32> {
        self.hscroll
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// True between a relayout and the next time this viewport's surface is
    /// synchronized.
    pub fn pending_restore(&self) -> bool {
        self.pending_restore
    }

    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    /// Give every page placeholder its natural size and every separator the
    /// gap height and the width of the page above it.
    pub(super) fn size_placeholders(&mut self, config: &ScrollConfig) {
        let layout = Rc::clone(&self.layout);
        let width = self.viewport_width;
        for page in 1..=layout.page_count() {
            let size = layout.page_size(page);
            if let Some(ph) = self.placeholders.page_mut(page) {
                if !ph.has_content() {
                    ph.size = size;
                }
                ph.set_page_content(None, width, config.page_background);
            }
            if let Some(sep) = self.placeholders.separator_mut(page) {
                sep.set_separator_content(layout.gap(), size.width, Some(config.separation_color));
            }
        }
    }

    /// Store `offset` as the persisted relative position, then apply it to
    /// the surface. Returns the offset the surface settled on.
    pub(super) fn set_scroll(&mut self, surface: &mut dyn Surface, offset: u32) -> u32 {
        let rel = to_relative(offset, &self.layout, self.current_page);
        trace!(
            "viewport {:?}: store relative page={} fraction={:.4} for offset {offset}",
            self.viewport, rel.page, rel.fraction
        );
        self.relative_scroll = Some(rel);
        surface.apply_scroll(Axis::Vertical, offset)
    }

    /// Move the current page, keeping it within `[1, N]`.
    pub(super) fn set_current_page(&mut self, surface: &mut dyn Surface, page: usize) {
        let page = self.layout.clamp_page(page);
        if page != self.current_page {
            debug!(
                "viewport {:?}: current page {} -> {page}",
                self.viewport, self.current_page
            );
        }
        self.current_page = page;
        surface.set_current_page(page);
    }

    /// Render `page` and attach it to its placeholder. Pages already
    /// materialized are left alone. Returns true if the page was rendered.
    pub(super) fn materialize(
        &mut self,
        source: &dyn PageSource,
        page: usize,
        config: &ScrollConfig,
    ) -> bool {
        if self.materialized.contains(&page) {
            return false;
        }
        let target = self.layout.page_size(page);
        let Some(ph) = self.placeholders.page_mut(page) else {
            debug!("viewport {:?}: no placeholder for page {page}, skipped", self.viewport);
            return false;
        };
        match source.render_page(page, target) {
            Ok(image) => {
                ph.set_page_content(Some(image), self.viewport_width, config.page_background);
                self.materialized.insert(page);
                debug!("viewport {:?}: materialized page {page}", self.viewport);
                true
            }
            Err(e) => {
                warn!("viewport {:?}: rendering page {page} failed: {e:#}", self.viewport);
                false
            }
        }
    }

    /// Materialize every page in the window around the current page.
    /// Returns the pages newly rendered.
    pub(super) fn materialize_window(
        &mut self,
        source: &dyn PageSource,
        config: &ScrollConfig,
    ) -> Vec<usize> {
        let window = select_window(self.current_page, self.page_count());
        let rendered: Vec<usize> = window
            .filter(|&p| self.materialize(source, p, config))
            .collect();
        if config.evict_outside_window {
            self.evict_outside_window();
        }
        rendered
    }

    /// Drop content of materialized pages outside the current window.
    pub(super) fn evict_outside_window(&mut self) {
        let window = select_window(self.current_page, self.page_count());
        let to_evict: Vec<usize> = self
            .materialized
            .iter()
            .copied()
            .filter(|p| !window.contains(p))
            .collect();
        for page in to_evict {
            if let Some(ph) = self.placeholders.page_mut(page) {
                ph.clear_content();
            }
            self.materialized.remove(&page);
            trace!("viewport {:?}: evict page {page}", self.viewport);
        }
    }
}
