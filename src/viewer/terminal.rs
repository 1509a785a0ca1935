//! Terminal I/O layer: raw mode, page map, status bar.
//!
//! Pages are drawn as text rows: each terminal row stands for `cell_h`
//! device units of the continuous surface, so the placeholder layout (pages,
//! gaps, centering) is visible without any image protocol.

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    style::{self, Stylize},
    terminal,
};
use std::io::{self, Write, stdout};

use super::state::ViewportState;
use crate::color::Color;
use crate::window::select_window;

/// Fallback cell size when the terminal does not report pixel dimensions.
const FALLBACK_CELL_W: u32 = 8;
const FALLBACK_CELL_H: u32 = 16;

// ---------------------------------------------------------------------------
// RawGuard — restores raw mode / alternate screen on Drop
// ---------------------------------------------------------------------------

pub(super) struct RawGuard {
    cleaned: bool,
}

impl RawGuard {
    pub(super) fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        stdout().execute(terminal::EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        Ok(Self { cleaned: false })
    }

    pub(super) fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        let mut out = stdout();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// ---------------------------------------------------------------------------
// Screen geometry
// ---------------------------------------------------------------------------

/// Terminal grid plus the device size of one cell.
#[derive(Debug, Clone, Copy)]
pub(super) struct Screen {
    pub cols: u16,
    pub rows: u16,
    pub cell_w: u32,
    pub cell_h: u32,
}

impl Screen {
    /// Rows available for pages (the last row is the status bar).
    pub fn page_rows(&self) -> u16 {
        self.rows.saturating_sub(1)
    }

    pub fn width_px(&self) -> u32 {
        u32::from(self.cols) * self.cell_w
    }

    pub fn height_px(&self) -> u32 {
        u32::from(self.page_rows()) * self.cell_h
    }
}

pub(super) fn screen_size() -> io::Result<Screen> {
    let ws = terminal::window_size()?;
    Ok(screen_from(ws.columns, ws.rows, ws.width, ws.height))
}

pub(super) fn screen_from(cols: u16, rows: u16, pixel_w: u16, pixel_h: u16) -> Screen {
    let cell_w = if cols > 0 && pixel_w > 0 {
        u32::from(pixel_w / cols).max(1)
    } else {
        FALLBACK_CELL_W
    };
    let cell_h = if rows > 0 && pixel_h > 0 {
        u32::from(pixel_h / rows).max(1)
    } else {
        FALLBACK_CELL_H
    };
    Screen {
        cols,
        rows,
        cell_w,
        cell_h,
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// What one terminal row shows.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum RowKind {
    /// A page row; `first` marks the row holding the page's top edge.
    Page { page: usize, first: bool },
    Gap { page: usize },
    Empty,
}

/// Classify terminal row `row` at vertical offset `vscroll`.
pub(super) fn classify_row(state: &ViewportState, screen: &Screen, vscroll: u32, row: u16) -> RowKind {
    let layout = state.layout();
    if layout.is_empty() {
        return RowKind::Empty;
    }
    let y = vscroll.saturating_add(u32::from(row) * screen.cell_h);
    if y >= layout.total_extent() {
        return RowKind::Empty;
    }
    let page = layout.page_at(y);
    let start = layout.page_start(page);
    if y >= start + layout.extent(page) {
        RowKind::Gap { page }
    } else {
        RowKind::Page {
            page,
            first: y < start + screen.cell_h,
        }
    }
}

fn term_color(c: Color) -> style::Color {
    style::Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Draw the visible part of the continuous surface.
pub(super) fn draw_pages(state: &ViewportState, screen: &Screen, vscroll: u32) -> io::Result<()> {
    let mut out = stdout();
    let width = screen.cols as usize;

    for row in 0..screen.page_rows() {
        out.queue(cursor::MoveTo(0, row))?;
        match classify_row(state, screen, vscroll, row) {
            RowKind::Page { page, first } => {
                let Some(ph) = state.placeholders().page(page) else {
                    continue;
                };
                let spacer = (ph.leading_spacer / screen.cell_w) as usize;
                let page_cols = ((ph.size.width / screen.cell_w) as usize)
                    .clamp(1, width.saturating_sub(spacer).max(1));
                let label = if first {
                    let status = if ph.has_content() { "rendered" } else { "pending" };
                    format!(" page {page} ({status})")
                } else {
                    String::new()
                };
                let body: String = format!("{label:<page_cols$}").chars().take(page_cols).collect();
                write!(out, "{:spacer$}", "")?;
                if ph.has_content() {
                    let bg = term_color(ph.background.unwrap_or_default());
                    write!(out, "{}", body.on(bg).black())?;
                } else {
                    write!(out, "{}", body.on_dark_grey().white())?;
                }
                out.queue(terminal::Clear(terminal::ClearType::UntilNewLine))?;
            }
            RowKind::Gap { page } => {
                let color = state
                    .placeholders()
                    .separator(page)
                    .and_then(|s| s.background)
                    .unwrap_or_default();
                let line = "─".repeat(width);
                write!(out, "{}", line.with(term_color(color)))?;
            }
            RowKind::Empty => {
                out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
            }
        }
    }
    out.queue(style::ResetColor)?;
    out.flush()
}

/// Draw the status bar on the last terminal row.
///
/// `acc_peek`: shown as `:12_` while a count is being typed.
pub(super) fn draw_status_bar(
    state: &ViewportState,
    screen: &Screen,
    vscroll: u32,
    acc_peek: Option<u32>,
) -> io::Result<()> {
    let mut out = stdout();
    out.queue(cursor::MoveTo(0, screen.rows.saturating_sub(1)))?;

    let n = state.page_count();
    let window: Vec<String> = select_window(state.current_page(), n)
        .map(|p| p.to_string())
        .collect();
    let rel = state
        .relative_scroll()
        .map_or_else(|| "-".to_string(), |r| format!("{}+{:.3}", r.page, r.fraction));

    let middle = match acc_peek {
        Some(count) => format!(" :{count}_ | page {}/{n} | y={vscroll}", state.current_page()),
        None => format!(
            " page {}/{n} | y={vscroll}/{} | rel {rel} | window [{}] | rendered {}  [j/k n/p g/G q]",
            state.current_page(),
            state.layout().total_extent(),
            window.join(","),
            state.materialized().len(),
        ),
    };

    let padded = format!("{:<width$}", middle, width = screen.cols as usize);
    let clipped: String = padded.chars().take(screen.cols as usize).collect();
    write!(out, "{}", clipped.on_dark_grey().white())?;
    out.queue(style::ResetColor)?;
    out.flush()
}

pub(super) fn check_tty() -> anyhow::Result<()> {
    use std::io::IsTerminal;
    // Only stdout matters. crossterm's `use-dev-tty` reads keyboard from /dev/tty
    // (Unix) or Console API (Windows), so stdin being a pipe is always fine.
    if !io::stdout().is_terminal() {
        anyhow::bail!(
            "pagescroll view requires an interactive terminal.\n\
             \n\
             For a non-interactive run, use: pagescroll simulate"
        );
    }
    Ok(())
}
