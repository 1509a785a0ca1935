use std::rc::Rc;

use pagescroll::config::ScrollConfig;
use pagescroll::layout::PageSize;
use pagescroll::placeholder::Owner;
use pagescroll::source::{PageSource, SyntheticPages};
use pagescroll::surface::{Axis, Surface, ViewportId, VirtualSurface};
use pagescroll::viewer::{ContinuousDocument, Direction};
use pagescroll::window::select_window;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn letter_doc(n: usize) -> ContinuousDocument<SyntheticPages> {
    ContinuousDocument::new(
        SyntheticPages::uniform(n, PageSize::new(784, 1014)),
        ScrollConfig::default(),
    )
}

fn pages(set: &std::collections::BTreeSet<usize>) -> Vec<usize> {
    set.iter().copied().collect()
}

#[test]
fn test_offsets_for_426_pages() {
    init_log();
    let mut doc = letter_doc(426);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 800);
    doc.sync_viewport(&mut s);
    let layout = doc.layout().expect("layout built on attach");
    assert_eq!(layout.offsets().len(), 427);
    assert_eq!(&layout.offsets()[..3], &[0, 1019, 2038]);
    assert_eq!(layout.total_extent(), 425 * 1019 + 1014);
    assert_eq!(s.content_extent(), layout.total_extent());
}

#[test]
fn test_twenty_one_steps_cross_into_page_two() {
    init_log();
    let mut doc = letter_doc(10);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 800);
    doc.sync_viewport(&mut s);

    let mut crossings = Vec::new();
    for i in 1..=21 {
        let out = doc.scroll_forward(&mut s).expect("live viewport");
        if out.crossed {
            crossings.push((i, out.offset, out.page, out.materialized.clone()));
        }
    }
    assert_eq!(crossings, vec![(21, 1050, 2, vec![3])]);
    assert_eq!(s.read_scroll(Axis::Vertical), 1050);
    assert_eq!(s.current_page(), 2);

    let state = doc.state(ViewportId(1)).expect("attached");
    assert_eq!(state.current_page(), 2);
    assert_eq!(pages(state.materialized()), vec![1, 2, 3]);
    let rel = state.relative_scroll().expect("position stored");
    assert_eq!(rel.page, 2);
    assert!((rel.fraction - 31.0 / 1014.0).abs() < 1e-9);
}

#[test]
fn test_backward_from_page_three_returns_to_page_two() {
    init_log();
    let mut doc = letter_doc(10);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 800);
    doc.goto_page(&mut s, 3);
    let out = doc
        .scroll_by(&mut s, Direction::Backward, 50)
        .expect("live viewport");
    assert_eq!(out.offset, 1988);
    assert!(out.crossed);
    assert_eq!(out.page, 2);
}

#[test]
fn test_second_viewport_shares_layout() {
    init_log();
    let mut doc = letter_doc(426);
    let mut a = VirtualSurface::new(ViewportId(1), 800, 800);
    let mut b = VirtualSurface::new(ViewportId(2), 800, 800);
    doc.sync_viewport(&mut a);
    for _ in 0..21 {
        doc.scroll_forward(&mut a);
    }
    let queries = doc.source().size_query_count();
    doc.sync_viewport(&mut b);

    assert_eq!(doc.layout_builds(), 1, "layout must not be recomputed");
    assert_eq!(doc.source().size_query_count(), queries);

    let sa = doc.state(ViewportId(1)).expect("a attached");
    let sb = doc.state(ViewportId(2)).expect("b attached");
    assert!(Rc::ptr_eq(sa.layout(), sb.layout()));
    assert_eq!(sb.placeholders().page_count(), 426);
    assert_eq!(sb.placeholders().separator_count(), 425);
    assert!(sb.placeholders().is_bound_to(ViewportId(2)));
    assert!(sa.placeholders().is_bound_to(ViewportId(1)));
    assert!(
        sb.placeholders()
            .pages()
            .iter()
            .all(|p| p.owner == Owner::Bound(ViewportId(2)))
    );

    // Clone starts where the source viewport was.
    assert_eq!(sb.current_page(), 2);
    assert_eq!(b.read_scroll(Axis::Vertical), 1050);
}

#[test]
fn test_viewports_scroll_independently() {
    init_log();
    let mut doc = letter_doc(10);
    let mut a = VirtualSurface::new(ViewportId(1), 800, 800);
    let mut b = VirtualSurface::new(ViewportId(2), 800, 800);
    doc.sync_viewport(&mut a);
    doc.sync_viewport(&mut b);

    doc.goto_page(&mut b, 7);
    doc.scroll_forward(&mut a);

    assert_eq!(a.read_scroll(Axis::Vertical), 50);
    assert_eq!(doc.state(ViewportId(1)).map(|s| s.current_page()), Some(1));
    assert_eq!(doc.state(ViewportId(2)).map(|s| s.current_page()), Some(7));
    assert_eq!(
        pages(doc.state(ViewportId(2)).expect("b").materialized()),
        vec![1, 2, 6, 7, 8]
    );
    assert_eq!(pages(doc.state(ViewportId(1)).expect("a").materialized()), vec![1, 2]);
}

#[test]
fn test_repeated_sync_is_idempotent() {
    init_log();
    let mut doc = letter_doc(10);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 800);
    doc.sync_viewport(&mut s);
    for _ in 0..30 {
        doc.scroll_forward(&mut s);
    }
    let before = doc.state(ViewportId(1)).cloned().expect("attached");
    let renders = doc.source().render_count();

    let first = doc.sync_viewport(&mut s);
    let second = doc.sync_viewport(&mut s);
    assert_eq!(first, Some(1500));
    assert_eq!(first, second);

    let after = doc.state(ViewportId(1)).expect("attached");
    assert_eq!(after.placeholders().page_count(), 10);
    assert_eq!(after.relative_scroll(), before.relative_scroll());
    assert_eq!(after.materialized(), before.materialized());
    assert_eq!(doc.source().render_count(), renders);
    assert_eq!(doc.viewport_count(), 1);
}

#[test]
fn test_relayout_keeps_relative_position() {
    init_log();
    let mut doc = letter_doc(6);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 400);
    doc.goto_page(&mut s, 3);
    doc.scroll_by(&mut s, Direction::Forward, 507);
    assert_eq!(s.read_scroll(Axis::Vertical), 2038 + 507);

    doc.source_mut().resize_all(PageSize::new(392, 507));
    doc.relayout();
    assert_eq!(doc.layout_builds(), 2);

    let applied = doc.sync_viewport(&mut s).expect("position stored");
    // Same spot, halfway down page 3, on the smaller pages.
    assert_eq!(applied, 2 * 512 + 254);
    let state = doc.state(ViewportId(1)).expect("attached");
    assert_eq!(state.current_page(), 3);
    assert_eq!(pages(state.materialized()), vec![2, 3, 4]);
    assert_eq!(
        state.placeholders().page(3).map(|p| p.size),
        Some(PageSize::new(392, 507))
    );
}

#[test]
fn test_step_after_relayout_keeps_page() {
    init_log();
    let mut doc = letter_doc(10);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 400);
    doc.goto_page(&mut s, 3);
    doc.scroll_by(&mut s, Direction::Forward, 507);

    doc.source_mut().resize_all(PageSize::new(392, 507));
    doc.relayout();

    // No explicit sync: the step itself must start from the rescaled offset.
    let out = doc.scroll_forward(&mut s).expect("live viewport");
    assert_eq!(out.offset, 2 * 512 + 254 + 50);
    assert_eq!(out.page, 3);
    assert!(!out.crossed);
    assert_eq!(s.content_extent(), 10 * 507 + 9 * 5);

    let rel = doc
        .state(ViewportId(1))
        .and_then(|st| st.relative_scroll())
        .expect("position stored");
    assert_eq!(rel.page, 3);
    assert!((rel.fraction - 304.0 / 507.0).abs() < 1e-9);
}

#[test]
fn test_shrunk_pages_keep_offset_inside_document() {
    init_log();
    let mut doc = letter_doc(10);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
    doc.goto_page(&mut s, 9);

    doc.source_mut().resize_all(PageSize::new(100, 100));
    doc.relayout();
    let out = doc.scroll_forward(&mut s).expect("live viewport");

    let total = doc.layout().expect("layout").total_extent();
    assert!(out.offset <= total, "offset {} past {total}", out.offset);
    let state = doc.state(ViewportId(1)).expect("attached");
    let rel = state.relative_scroll().expect("position stored");
    assert_eq!(rel.page, state.current_page());
    assert!(rel.fraction <= 1.0 + 5.0 / 100.0, "fraction {}", rel.fraction);
}

#[test]
fn test_disposed_viewport_is_skipped() {
    init_log();
    let mut doc = letter_doc(5);
    let mut a = VirtualSurface::new(ViewportId(1), 800, 800);
    let mut b = VirtualSurface::new(ViewportId(2), 800, 800);
    doc.sync_viewport(&mut a);
    doc.sync_viewport(&mut b);
    b.dispose();

    assert!(doc.scroll_forward(&mut b).is_none());
    assert!(doc.goto_page(&mut b, 4).is_none());
    assert_eq!(doc.sync_viewport(&mut b), None);
    assert_eq!(doc.state(ViewportId(2)).map(|s| s.current_page()), Some(1));

    // The live one is unaffected.
    assert!(doc.scroll_forward(&mut a).is_some());
    assert!(doc.detach(ViewportId(2)));
    assert_eq!(doc.viewport_count(), 1);
}

#[test]
fn test_eviction_keeps_window_only() {
    init_log();
    let config = ScrollConfig {
        evict_outside_window: true,
        ..ScrollConfig::default()
    };
    let mut doc = ContinuousDocument::new(
        SyntheticPages::uniform(20, PageSize::new(784, 1014)),
        config,
    );
    let mut s = VirtualSurface::new(ViewportId(1), 800, 800);
    doc.sync_viewport(&mut s);

    for page in [5, 12, 19, 2] {
        doc.goto_page(&mut s, page);
        let state = doc.state(ViewportId(1)).expect("attached");
        let window: Vec<usize> = select_window(page, 20).collect();
        assert_eq!(pages(state.materialized()), window);
        let rendered: Vec<usize> = state
            .placeholders()
            .pages()
            .iter()
            .filter(|p| p.has_content())
            .map(|p| p.page)
            .collect();
        assert_eq!(rendered, window);
    }
}

#[test]
fn test_window_always_materialized_while_scrolling() {
    init_log();
    let mut doc = letter_doc(8);
    let mut s = VirtualSurface::new(ViewportId(1), 800, 600);
    doc.sync_viewport(&mut s);

    let mut steps = 0;
    while s.read_scroll(Axis::Vertical) < s.max_scroll() && steps < 1000 {
        doc.scroll_forward(&mut s);
        steps += 1;
        let state = doc.state(ViewportId(1)).expect("attached");
        for page in select_window(state.current_page(), state.page_count()) {
            assert!(
                state.materialized().contains(&page),
                "page {page} missing at offset {}",
                s.read_scroll(Axis::Vertical)
            );
        }
    }
    assert!(steps < 1000, "scrolling forward must reach the end");
    assert_eq!(doc.source().render_count(), doc.source().page_count());
}

#[test]
fn test_render_failure_leaves_page_unmaterialized() {
    init_log();

    struct Flaky(SyntheticPages);

    impl PageSource for Flaky {
        fn page_count(&self) -> usize {
            self.0.page_count()
        }
        fn page_size(&self, page: usize) -> PageSize {
            self.0.page_size(page)
        }
        fn render_page(
            &self,
            page: usize,
            target: PageSize,
        ) -> anyhow::Result<pagescroll::source::PageImage> {
            if page == 2 {
                anyhow::bail!("page 2 is corrupt");
            }
            self.0.render_page(page, target)
        }
    }

    let mut doc = ContinuousDocument::new(
        Flaky(SyntheticPages::uniform(3, PageSize::new(784, 1014))),
        ScrollConfig::default(),
    );
    let mut s = VirtualSurface::new(ViewportId(1), 800, 800);
    doc.sync_viewport(&mut s);
    let state = doc.state(ViewportId(1)).expect("attached");
    assert_eq!(pages(state.materialized()), vec![1]);
    assert!(!state.placeholders().page(2).expect("page 2").has_content());
}
