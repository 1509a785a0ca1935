//! UI-side collaborator: a viewport that can be scrolled.
//!
//! The real toolkit implements [`Surface`]; [`VirtualSurface`] is a
//! headless viewport used by the CLI, the fuzzer and tests.

use log::trace;

/// Identity of a viewport. Stable for the viewport's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// A display area showing the document.
pub trait Surface {
    fn id(&self) -> ViewportId;

    /// False once the viewport has been disposed. Updates for a dead
    /// viewport are skipped.
    fn is_live(&self) -> bool {
        true
    }

    /// Visible width in device units.
    fn width(&self) -> u32;

    fn read_scroll(&self, axis: Axis) -> u32;

    /// Apply a scroll offset. Returns the offset actually in effect after the
    /// surface clamped it to the content extent.
    fn apply_scroll(&mut self, axis: Axis, offset: u32) -> u32;

    /// Total document length along the scroll axis, for clamping.
    fn set_content_extent(&mut self, _extent: u32) {}

    /// Current page indicator (1-based), for mode lines and the like.
    fn set_current_page(&mut self, _page: usize) {}
}

/// A headless viewport with a fixed visible area.
#[derive(Debug, Clone)]
pub struct VirtualSurface {
    id: ViewportId,
    width: u32,
    height: u32,
    vscroll: u32,
    hscroll: u32,
    extent: u32,
    current_page: usize,
    live: bool,
}

impl VirtualSurface {
    pub fn new(id: ViewportId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            vscroll: 0,
            hscroll: 0,
            extent: 0,
            current_page: 1,
            live: true,
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Change the visible area. The current offset is re-clamped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.vscroll = self.vscroll.min(self.max_scroll());
    }

    /// Mark the viewport as disposed.
    pub fn dispose(&mut self) {
        self.live = false;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn content_extent(&self) -> u32 {
        self.extent
    }

    /// Maximum vertical offset.
    pub fn max_scroll(&self) -> u32 {
        self.extent.saturating_sub(self.height)
    }
}

impl Surface for VirtualSurface {
    fn id(&self) -> ViewportId {
        self.id
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn read_scroll(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Vertical => self.vscroll,
            Axis::Horizontal => self.hscroll,
        }
    }

    fn apply_scroll(&mut self, axis: Axis, offset: u32) -> u32 {
        match axis {
            Axis::Vertical => {
                self.vscroll = offset.min(self.max_scroll());
                trace!("surface {:?}: vscroll {offset} -> {}", self.id, self.vscroll);
                self.vscroll
            }
            Axis::Horizontal => {
                self.hscroll = offset;
                self.hscroll
            }
        }
    }

    fn set_content_extent(&mut self, extent: u32) {
        self.extent = extent;
        self.vscroll = self.vscroll.min(self.max_scroll());
    }

    fn set_current_page(&mut self, page: usize) {
        self.current_page = page;
    }
}
