//! Byte-driven scroll scenarios shared by the fuzz target and `reproduce`.
//!
//! Header (4 bytes): page count, page height, gap, eviction flag.
//! Then pairs of `(op, arg)`; bit 4 of `op` picks one of two viewports.

use std::rc::Rc;

use log::debug;
use pagescroll::config::ScrollConfig;
use pagescroll::layout::PageSize;
use pagescroll::source::{PageSource, SyntheticPages};
use pagescroll::surface::{Axis, Surface, ViewportId, VirtualSurface};
use pagescroll::viewer::{ContinuousDocument, Direction};
use pagescroll::window::select_window;

const PAGE_WIDTH: u32 = 600;

pub fn run(data: &[u8]) {
    let [pages, height, gap, flags, ops @ ..] = data else {
        return;
    };
    let n = usize::from(*pages % 40);
    let size = PageSize::new(PAGE_WIDTH, 1 + u32::from(*height) * 8);
    let config = ScrollConfig {
        page_gap: u32::from(*gap % 16),
        evict_outside_window: flags & 1 == 1,
        ..ScrollConfig::default()
    };
    debug!("scenario: {n} pages of {size:?}, {config:?}");

    let mut doc = ContinuousDocument::new(SyntheticPages::uniform(n, size), config);
    let mut surfaces = [
        VirtualSurface::new(ViewportId(1), 800, 600),
        VirtualSurface::new(ViewportId(2), 640, 480),
    ];

    for pair in ops.chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        let idx = usize::from((op >> 4) & 1);
        let surface = &mut surfaces[idx];
        let step = u32::from(arg) * 8;
        debug!("op {:#04x} arg {arg} on viewport {}", op & 0x0f, idx + 1);

        match op & 0x0f {
            0 => {
                doc.scroll_by(surface, Direction::Forward, step);
            }
            1 => {
                doc.scroll_by(surface, Direction::Backward, step);
            }
            2 => {
                doc.goto_page(surface, usize::from(arg));
            }
            3 => {
                doc.next_page(surface);
            }
            4 => {
                doc.previous_page(surface);
            }
            5 => {
                doc.sync_viewport(surface);
            }
            6 => {
                surface.resize(200 + step, 100 + u32::from(arg) * 4);
                doc.sync_viewport(surface);
            }
            7 => {
                let new = PageSize::new(PAGE_WIDTH / 2 + u32::from(arg), 1 + step);
                doc.source_mut().resize_all(new);
                doc.relayout();
            }
            8 => surface.dispose(),
            9 => {
                let id = surface.id();
                doc.detach(id);
                *surface = VirtualSurface::new(id, 800, 600);
            }
            10 => {
                doc.set_hscroll(surface, step);
            }
            _ => {
                doc.scroll_by(surface, Direction::Forward, 50);
            }
        }
        check(&doc, &surfaces);
    }
}

fn check(doc: &ContinuousDocument<SyntheticPages>, surfaces: &[VirtualSurface]) {
    let n = doc.source().page_count();
    for surface in surfaces {
        let Some(state) = doc.state(surface.id()) else {
            continue;
        };
        let layout = doc.layout().expect("attached viewport implies a layout");
        assert!(Rc::ptr_eq(layout, state.layout()), "stale layout");
        assert_eq!(state.placeholders().page_count(), n);
        assert_eq!(state.placeholders().separator_count(), n.saturating_sub(1));
        assert!(state.placeholders().is_bound_to(surface.id()));

        let page = state.current_page();
        assert!((1..=n.max(1)).contains(&page), "current page {page} out of range");

        let window = select_window(page, n);
        for p in window.clone() {
            assert!(state.materialized().contains(&p), "page {p} not materialized");
        }
        if doc.config().evict_outside_window {
            assert!(
                state.materialized().iter().all(|p| window.contains(p)),
                "page outside window kept: {:?}",
                state.materialized()
            );
        }

        if let Some(rel) = state.relative_scroll() {
            assert_eq!(rel.page, page, "position stored against another page");
        }

        if surface.is_live() {
            let offset = surface.read_scroll(Axis::Vertical);
            assert!(offset <= surface.max_scroll());
            if !state.pending_restore() {
                assert_eq!(surface.content_extent(), layout.total_extent());
                assert!(
                    offset <= layout.total_extent(),
                    "offset {offset} past document end {}",
                    layout.total_extent()
                );
            }
        }
    }
}
