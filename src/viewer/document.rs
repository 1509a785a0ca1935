//! A document shown continuously in any number of viewports.

use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

use super::state::ViewportState;
use super::stepper::{self, Direction, StepOutcome};
use super::sync;
use crate::config::ScrollConfig;
use crate::layout::Layout;
use crate::source::PageSource;
use crate::surface::{Axis, Surface, ViewportId};

/// Owns the shared [`Layout`] and one [`ViewportState`] per attached
/// viewport.
///
/// Every operation takes the viewport's [`Surface`] explicitly; state is
/// looked up by the surface's id and only that viewport's state is touched.
/// Operations on a disposed surface are skipped and return `None`.
pub struct ContinuousDocument<S: PageSource> {
    source: S,
    config: ScrollConfig,
    layout: Option<Rc<Layout>>,
    viewports: HashMap<ViewportId, ViewportState>,
    /// Viewport of the most recent command; new viewports clone from it.
    last_active: Option<ViewportId>,
    layout_builds: usize,
}

impl<S: PageSource> ContinuousDocument<S> {
    pub fn new(source: S, config: ScrollConfig) -> Self {
        Self {
            source,
            config,
            layout: None,
            viewports: HashMap::new(),
            last_active: None,
            layout_builds: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the page source. Call [`relayout`](Self::relayout)
    /// after changing page sizes.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn layout(&self) -> Option<&Rc<Layout>> {
        self.layout.as_ref()
    }

    /// Number of times the layout was computed from the source.
    pub fn layout_builds(&self) -> usize {
        self.layout_builds
    }

    pub fn state(&self, viewport: ViewportId) -> Option<&ViewportState> {
        self.viewports.get(&viewport)
    }

    pub fn viewport_count(&self) -> usize {
        self.viewports.len()
    }

    /// Attach `surface`, or re-synchronize it after a resize or after it
    /// became visible again.
    ///
    /// A new viewport clones the placeholders of an existing one when there
    /// is one, otherwise placeholders and layout are built fresh. Then the
    /// stored relative position is turned back into an absolute offset
    /// against the current layout and applied. Returns the applied vertical
    /// offset, `None` when no position is stored yet or the surface is gone.
    pub fn sync_viewport(&mut self, surface: &mut dyn Surface) -> Option<u32> {
        let id = surface.id();
        if !surface.is_live() {
            debug!("sync {id:?}: viewport is gone, skipped");
            return None;
        }
        let width = surface.width();

        if !self.viewports.contains_key(&id) {
            let state = match self.clone_source() {
                Some(other) => {
                    info!("attach {id:?}: cloning placeholders from {:?}", other.viewport());
                    ViewportState::cloned_from(other, id, other.viewport_width)
                }
                None => {
                    info!("attach {id:?}: building placeholders");
                    let layout = self.ensure_layout();
                    let mut state = ViewportState::fresh(id, layout, width, &self.config);
                    state.materialize_window(&self.source, &self.config);
                    state
                }
            };
            self.viewports.insert(id, state);
        }

        let state = self.viewports.get_mut(&id)?;
        sync::refresh_width(state, width, &self.config);
        state.pending_restore = false;
        sync::restore(state, surface)
    }

    /// Forget a destroyed viewport.
    pub fn detach(&mut self, viewport: ViewportId) -> bool {
        if self.last_active == Some(viewport) {
            self.last_active = None;
        }
        let removed = self.viewports.remove(&viewport).is_some();
        if removed {
            info!("detach {viewport:?}: {} viewport(s) left", self.viewports.len());
        }
        removed
    }

    pub fn scroll_forward(&mut self, surface: &mut dyn Surface) -> Option<StepOutcome> {
        let step = self.config.step_size;
        self.scroll_by(surface, Direction::Forward, step)
    }

    pub fn scroll_backward(&mut self, surface: &mut dyn Surface) -> Option<StepOutcome> {
        let step = self.config.step_size;
        self.scroll_by(surface, Direction::Backward, step)
    }

    /// One step of `step` device units.
    pub fn scroll_by(
        &mut self,
        surface: &mut dyn Surface,
        direction: Direction,
        step: u32,
    ) -> Option<StepOutcome> {
        let id = self.prepare(surface)?;
        let state = self.viewports.get_mut(&id)?;
        Some(stepper::scroll(
            state,
            surface,
            &self.source,
            &self.config,
            direction,
            step,
        ))
    }

    /// Jump to the start of `page` (clamped to the document).
    pub fn goto_page(&mut self, surface: &mut dyn Surface, page: usize) -> Option<StepOutcome> {
        let id = self.prepare(surface)?;
        let state = self.viewports.get_mut(&id)?;
        Some(stepper::goto_page(state, surface, &self.source, &self.config, page))
    }

    pub fn next_page(&mut self, surface: &mut dyn Surface) -> Option<StepOutcome> {
        let page = self.current_page_of(surface).saturating_add(1);
        self.goto_page(surface, page)
    }

    pub fn previous_page(&mut self, surface: &mut dyn Surface) -> Option<StepOutcome> {
        let page = self.current_page_of(surface).saturating_sub(1);
        self.goto_page(surface, page)
    }

    pub fn first_page(&mut self, surface: &mut dyn Surface) -> Option<StepOutcome> {
        self.goto_page(surface, 1)
    }

    pub fn last_page(&mut self, surface: &mut dyn Surface) -> Option<StepOutcome> {
        let last = self.source.page_count();
        self.goto_page(surface, last)
    }

    /// Scroll horizontally and remember the offset for later restores.
    pub fn set_hscroll(&mut self, surface: &mut dyn Surface, offset: u32) -> Option<u32> {
        let id = self.prepare(surface)?;
        let applied = surface.apply_scroll(Axis::Horizontal, offset);
        let state = self.viewports.get_mut(&id)?;
        state.hscroll = Some(applied);
        Some(applied)
    }

    /// Rebuild the layout from the source's current page sizes and move every
    /// viewport onto it. Each viewport gets its new absolute offset on its
    /// next [`sync_viewport`](Self::sync_viewport) or command, whichever
    /// comes first.
    pub fn relayout(&mut self) {
        let layout = Rc::new(self.build_layout());
        self.layout = Some(Rc::clone(&layout));
        for state in self.viewports.values_mut() {
            sync::adopt_layout(state, Rc::clone(&layout), &self.source, &self.config);
        }
    }

    fn current_page_of(&self, surface: &dyn Surface) -> usize {
        self.viewports
            .get(&surface.id())
            .map_or(1, ViewportState::current_page)
    }

    /// Id of a live surface, attaching it first if needed. A viewport left
    /// on a replaced layout is re-synchronized so commands never read an
    /// offset computed against the old one.
    fn prepare(&mut self, surface: &mut dyn Surface) -> Option<ViewportId> {
        let id = surface.id();
        if !surface.is_live() {
            debug!("command on {id:?}: viewport is gone, skipped");
            return None;
        }
        let stale = self.viewports.get(&id).is_none_or(ViewportState::pending_restore);
        if stale {
            self.sync_viewport(surface);
        }
        self.last_active = Some(id);
        Some(id)
    }

    /// The viewport a newly attached one should copy from.
    fn clone_source(&self) -> Option<&ViewportState> {
        self.last_active
            .and_then(|id| self.viewports.get(&id))
            .or_else(|| self.viewports.values().min_by_key(|s| s.viewport()))
    }

    fn ensure_layout(&mut self) -> Rc<Layout> {
        if let Some(layout) = &self.layout {
            return Rc::clone(layout);
        }
        let layout = Rc::new(self.build_layout());
        self.layout = Some(Rc::clone(&layout));
        layout
    }

    fn build_layout(&mut self) -> Layout {
        let n = self.source.page_count();
        let sizes = (1..=n).map(|p| self.source.page_size(p)).collect();
        self.layout_builds += 1;
        Layout::new(sizes, self.config.page_gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSize;
    use crate::source::SyntheticPages;
    use crate::surface::VirtualSurface;

    fn doc(n: usize) -> ContinuousDocument<SyntheticPages> {
        ContinuousDocument::new(
            SyntheticPages::uniform(n, PageSize::new(800, 1014)),
            ScrollConfig::default(),
        )
    }

    #[test]
    fn first_attach_builds_layout_and_window() {
        let mut d = doc(5);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        assert_eq!(d.sync_viewport(&mut s), None);
        assert_eq!(d.layout_builds(), 1);
        let st = d.state(ViewportId(1)).unwrap();
        assert_eq!(st.placeholders().page_count(), 5);
        assert_eq!(st.materialized().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(s.content_extent(), 4 * 1019 + 1014);
    }

    #[test]
    fn commands_attach_implicitly() {
        let mut d = doc(3);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        let out = d.scroll_forward(&mut s).unwrap();
        assert_eq!(out.offset, 50);
        assert_eq!(d.viewport_count(), 1);
    }

    #[test]
    fn dead_surface_is_skipped() {
        let mut d = doc(3);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        d.sync_viewport(&mut s);
        s.dispose();
        assert_eq!(d.scroll_forward(&mut s), None);
        assert_eq!(d.sync_viewport(&mut s), None);
        assert_eq!(d.set_hscroll(&mut s, 10), None);
    }

    #[test]
    fn page_navigation() {
        let mut d = doc(4);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        d.sync_viewport(&mut s);
        assert_eq!(d.next_page(&mut s).unwrap().page, 2);
        assert_eq!(d.next_page(&mut s).unwrap().page, 3);
        assert_eq!(d.previous_page(&mut s).unwrap().page, 2);
        assert_eq!(d.last_page(&mut s).unwrap().page, 4);
        assert_eq!(d.next_page(&mut s).unwrap().page, 4);
        let out = d.first_page(&mut s).unwrap();
        assert_eq!((out.page, out.offset), (1, 0));
        assert_eq!(d.previous_page(&mut s).unwrap().page, 1);
    }

    #[test]
    fn detach_removes_state() {
        let mut d = doc(3);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        d.sync_viewport(&mut s);
        assert!(d.detach(ViewportId(1)));
        assert!(!d.detach(ViewportId(1)));
        assert_eq!(d.viewport_count(), 0);
        assert!(d.layout().is_some());
    }

    #[test]
    fn hscroll_is_restored_on_sync() {
        let mut d = doc(3);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        d.sync_viewport(&mut s);
        d.set_hscroll(&mut s, 64);
        s.apply_scroll(Axis::Horizontal, 0);
        d.sync_viewport(&mut s);
        assert_eq!(s.read_scroll(Axis::Horizontal), 64);
    }

    #[test]
    fn command_after_relayout_resyncs_first() {
        let mut d = doc(10);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        d.goto_page(&mut s, 9);
        d.source_mut().resize_all(PageSize::new(100, 100));
        d.relayout();
        assert!(d.state(ViewportId(1)).unwrap().pending_restore());

        let out = d.scroll_forward(&mut s).unwrap();
        let total = d.layout().unwrap().total_extent();
        assert_eq!(total, 10 * 100 + 9 * 5);
        assert!(out.offset <= total);
        assert_eq!(s.content_extent(), total);
        assert!(!d.state(ViewportId(1)).unwrap().pending_restore());
        let rel = d.state(ViewportId(1)).unwrap().relative_scroll().unwrap();
        assert_eq!(rel.page, out.page);
        assert!(rel.fraction <= 1.0 + 5.0 / 100.0);
    }

    #[test]
    fn width_change_recenters_pages() {
        let mut d = doc(3);
        let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
        d.sync_viewport(&mut s);
        assert_eq!(d.state(ViewportId(1)).unwrap().placeholders().page(1).unwrap().leading_spacer, 0);
        s.resize(1000, 600);
        d.sync_viewport(&mut s);
        assert_eq!(d.state(ViewportId(1)).unwrap().placeholders().page(1).unwrap().leading_spacer, 100);
    }
}
