//! Placeholder layer: one addressable region per page and per inter-page gap.
//!
//! Placeholders are purely virtual descriptors. Their position along the
//! scroll axis comes from the [`Layout`](crate::layout::Layout); they only
//! carry size, content, background and ownership. Each viewport owns its own
//! [`Placeholders`]; they are never shared.

use log::{debug, trace};

use crate::color::Color;
use crate::layout::PageSize;
use crate::source::PageImage;
use crate::surface::ViewportId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Page,
    Separator,
}

/// Which viewport a placeholder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Detached,
    /// Duplicated from another viewport, not yet rebound.
    PendingAttach,
    Bound(ViewportId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// 1-based page number. For a separator, the page above it.
    pub page: usize,
    pub size: PageSize,
    pub content: Option<PageImage>,
    /// Horizontal centering spacer in front of the page image.
    pub leading_spacer: u32,
    pub background: Option<Color>,
    pub owner: Owner,
}

impl Placeholder {
    fn new(kind: PlaceholderKind, page: usize) -> Self {
        Self {
            kind,
            page,
            size: PageSize::default(),
            content: None,
            leading_spacer: 0,
            background: None,
            owner: Owner::Detached,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Attach a rendered page image.
    ///
    /// The placeholder takes the image's natural size; a centering spacer is
    /// prepended when the viewport is wider than the page. Without an image
    /// the prior content is kept and only the spacer follows the new width.
    pub fn set_page_content(
        &mut self,
        image: Option<PageImage>,
        viewport_width: u32,
        background: Color,
    ) {
        if let Some(image) = image {
            self.size = image.size;
            self.content = Some(image);
            self.background = Some(background);
        }
        self.leading_spacer = centering_spacer(viewport_width, self.size.width);
        trace!(
            "placeholder: page {} size={}x{} spacer={} content={}",
            self.page,
            self.size.width,
            self.size.height,
            self.leading_spacer,
            self.content.is_some()
        );
    }

    /// Size a separator to `(matched_width, gap_height)`.
    pub fn set_separator_content(&mut self, gap_height: u32, matched_width: u32, color: Option<Color>) {
        self.size = PageSize::new(matched_width, gap_height);
        if let Some(c) = color {
            self.background = Some(c);
        }
    }

    /// Drop the attached image, keeping size and background.
    pub fn clear_content(&mut self) {
        self.content = None;
    }
}

/// `floor((viewport_width - displayed_width) / 2)`, or 0 when the page fills
/// the viewport.
pub fn centering_spacer(viewport_width: u32, displayed_width: u32) -> u32 {
    viewport_width.saturating_sub(displayed_width) / 2
}

/// The per-viewport arena of page and separator placeholders, indexed by
/// 1-based page number.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholders {
    pages: Vec<Placeholder>,
    separators: Vec<Placeholder>,
}

impl Placeholders {
    /// Allocate `n` page placeholders and `n - 1` separators, bound to
    /// `viewport`.
    pub fn create(n: usize, viewport: ViewportId) -> Self {
        let pages = (1..=n)
            .map(|p| Placeholder::new(PlaceholderKind::Page, p))
            .collect();
        let separators = (1..n)
            .map(|p| Placeholder::new(PlaceholderKind::Separator, p))
            .collect();
        let mut set = Self { pages, separators };
        set.bind(viewport);
        debug!("placeholders: created {n} pages for {viewport:?}");
        set
    }

    /// Duplicate every placeholder (size and content included) and rebind the
    /// copies to `viewport`.
    pub fn clone_for_viewport(&self, viewport: ViewportId) -> Self {
        let mut set = self.clone();
        set.for_each_mut(|ph| ph.owner = Owner::PendingAttach);
        set.bind(viewport);
        debug!(
            "placeholders: cloned {} pages for {viewport:?}",
            set.pages.len()
        );
        set
    }

    fn bind(&mut self, viewport: ViewportId) {
        self.for_each_mut(|ph| ph.owner = Owner::Bound(viewport));
    }

    fn for_each_mut(&mut self, mut f: impl FnMut(&mut Placeholder)) {
        self.pages.iter_mut().for_each(&mut f);
        self.separators.iter_mut().for_each(&mut f);
    }

    /// True when every placeholder is bound to `viewport`.
    pub fn is_bound_to(&self, viewport: ViewportId) -> bool {
        self.pages
            .iter()
            .chain(&self.separators)
            .all(|ph| ph.owner == Owner::Bound(viewport))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn separator_count(&self) -> usize {
        self.separators.len()
    }

    pub fn page(&self, page: usize) -> Option<&Placeholder> {
        self.pages.get(page.checked_sub(1)?)
    }

    pub fn page_mut(&mut self, page: usize) -> Option<&mut Placeholder> {
        self.pages.get_mut(page.checked_sub(1)?)
    }

    /// The separator below `page` (none after the last page).
    pub fn separator(&self, page: usize) -> Option<&Placeholder> {
        self.separators.get(page.checked_sub(1)?)
    }

    pub fn separator_mut(&mut self, page: usize) -> Option<&mut Placeholder> {
        self.separators.get_mut(page.checked_sub(1)?)
    }

    pub fn pages(&self) -> &[Placeholder] {
        &self.pages
    }

    pub fn separators(&self) -> &[Placeholder] {
        &self.separators
    }
}
