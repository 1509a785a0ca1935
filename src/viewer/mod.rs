//! Continuous-scroll viewer machinery.
//!
//! Layout:
//!   document.rs : `ContinuousDocument`, the per-document owner of the shared
//!                 layout and of one `ViewportState` per viewport
//!   state.rs    : per-viewport placeholders, position, materialized pages
//!   sync.rs     : attach / reconfigure / relayout
//!   stepper.rs  : incremental scroll and page navigation
//!   input.rs    : key bindings
//!   terminal.rs : interactive text front-end
//!
//! Bounded window:
//!   At most three pages around the current one must be rendered at any time
//!   (see `window::select_window`). Pages leaving the window stay rendered
//!   unless `evict_outside_window` is set.

mod document;
pub mod input;
mod state;
mod stepper;
mod sync;
mod terminal;

pub use document::ContinuousDocument;
pub use state::ViewportState;
pub use stepper::{Direction, StepOutcome};

use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};

use crate::config::Config;
use crate::layout::PageSize;
use crate::source::SyntheticPages;
use crate::surface::{Axis, Surface, ViewportId, VirtualSurface};
use input::{Action, InputAccumulator, map_key_event};

/// Options for the interactive session.
pub struct RunOptions {
    /// Natural page size before any fitting.
    pub page_size: PageSize,
    /// Rescale pages to the terminal width on every resize.
    pub fit_width: bool,
}

/// Run the interactive viewer over `source` until the user quits.
pub fn run(source: SyntheticPages, config: &Config, opts: &RunOptions) -> anyhow::Result<()> {
    terminal::check_tty()?;

    let mut screen = terminal::screen_size()?;
    let mut guard = terminal::RawGuard::enter()?;

    let mut doc = ContinuousDocument::new(source, config.scroll.clone());
    let mut surface = VirtualSurface::new(ViewportId(1), screen.width_px(), screen.height_px());
    if opts.fit_width {
        fit_to_width(&mut doc, opts.page_size, screen.width_px());
    }
    doc.sync_viewport(&mut surface);

    let mut acc = InputAccumulator::new();
    redraw(&doc, &surface, &screen, acc.peek())?;

    loop {
        let ev = event::read()?;
        debug!("event: {:?}", ev);

        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                match map_key_event(key, &mut acc, &config.keys) {
                    Some(Action::Quit) => break,
                    Some(Action::ScrollForward(count)) => {
                        for _ in 0..count {
                            doc.scroll_forward(&mut surface);
                        }
                    }
                    Some(Action::ScrollBackward(count)) => {
                        for _ in 0..count {
                            doc.scroll_backward(&mut surface);
                        }
                    }
                    Some(Action::NextPage(count)) => {
                        for _ in 0..count {
                            doc.next_page(&mut surface);
                        }
                    }
                    Some(Action::PreviousPage(count)) => {
                        for _ in 0..count {
                            doc.previous_page(&mut surface);
                        }
                    }
                    Some(Action::FirstPage) => {
                        doc.first_page(&mut surface);
                    }
                    Some(Action::LastPage) => {
                        doc.last_page(&mut surface);
                    }
                    Some(Action::GotoPage(n)) => {
                        doc.goto_page(&mut surface, n as usize);
                    }
                    Some(Action::CancelInput | Action::Digit) => {}
                    None => acc.reset(),
                }
            }
            Event::Resize(cols, rows) => {
                let ws = crossterm::terminal::window_size()?;
                screen = terminal::screen_from(cols, rows, ws.width, ws.height);
                info!("resize: {cols}x{rows} cells, {}x{}px", screen.width_px(), screen.height_px());
                surface.resize(screen.width_px(), screen.height_px());
                if opts.fit_width {
                    fit_to_width(&mut doc, opts.page_size, screen.width_px());
                }
                doc.sync_viewport(&mut surface);
            }
            _ => continue,
        }
        redraw(&doc, &surface, &screen, acc.peek())?;
    }

    guard.cleanup();
    Ok(())
}

/// Scale every page to `width`, keeping the aspect ratio, and relayout.
fn fit_to_width(doc: &mut ContinuousDocument<SyntheticPages>, natural: PageSize, width: u32) {
    if natural.width == 0 || width == 0 {
        return;
    }
    let height = (u64::from(natural.height) * u64::from(width) / u64::from(natural.width)) as u32;
    debug!("fit width: {}x{} -> {width}x{height}", natural.width, natural.height);
    doc.source_mut().resize_all(PageSize::new(width, height));
    doc.relayout();
}

fn redraw(
    doc: &ContinuousDocument<SyntheticPages>,
    surface: &VirtualSurface,
    screen: &terminal::Screen,
    acc_peek: Option<u32>,
) -> anyhow::Result<()> {
    let Some(state) = doc.state(surface.id()) else {
        return Ok(());
    };
    let vscroll = surface.read_scroll(Axis::Vertical);
    terminal::draw_pages(state, screen, vscroll)?;
    terminal::draw_status_bar(state, screen, vscroll, acc_peek)?;
    Ok(())
}
