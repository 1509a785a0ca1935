//! Document-side collaborator: page count, page sizes, page rendering.
//!
//! Rasterization itself lives outside this crate. [`PageSource`] is the seam;
//! [`SyntheticPages`] is an in-memory source for dry runs, the CLI and tests.

use std::cell::Cell;
use std::sync::Arc;

use anyhow::{Result, bail};
use log::trace;

use crate::layout::PageSize;

/// A rendered page image, ready to be attached to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// 1-based page number.
    pub page: usize,
    pub size: PageSize,
    /// Encoded image bytes; the format is the renderer's business.
    /// Empty for sources that produce no pixels.
    pub data: Arc<[u8]>,
}

/// Provides page metadata and synchronous rendering.
///
/// Page numbers are 1-based.
pub trait PageSource {
    fn page_count(&self) -> usize;

    fn page_size(&self, page: usize) -> PageSize;

    /// Render `page` at `target` size. Assumed cheap (pre-rendered or cached).
    fn render_page(&self, page: usize, target: PageSize) -> Result<PageImage>;
}

/// In-memory pages with fixed sizes and no pixel output.
///
/// Counts render and size-query calls so callers can observe how much work
/// the scroll machinery triggered.
#[derive(Debug, Default)]
pub struct SyntheticPages {
    sizes: Vec<PageSize>,
    renders: Cell<usize>,
    size_queries: Cell<usize>,
}

impl SyntheticPages {
    pub fn uniform(count: usize, size: PageSize) -> Self {
        Self::from_sizes(vec![size; count])
    }

    pub fn from_sizes(sizes: Vec<PageSize>) -> Self {
        Self {
            sizes,
            renders: Cell::new(0),
            size_queries: Cell::new(0),
        }
    }

    /// Replace every page's size (e.g. after a zoom or fit-width change).
    pub fn resize_all(&mut self, size: PageSize) {
        for s in &mut self.sizes {
            *s = size;
        }
    }

    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    pub fn size_query_count(&self) -> usize {
        self.size_queries.get()
    }
}

impl PageSource for SyntheticPages {
    fn page_count(&self) -> usize {
        self.sizes.len()
    }

    fn page_size(&self, page: usize) -> PageSize {
        self.size_queries.set(self.size_queries.get() + 1);
        page.checked_sub(1)
            .and_then(|i| self.sizes.get(i))
            .copied()
            .unwrap_or_default()
    }

    fn render_page(&self, page: usize, target: PageSize) -> Result<PageImage> {
        if page == 0 || page > self.sizes.len() {
            bail!("page {page} out of range (1..={})", self.sizes.len());
        }
        self.renders.set(self.renders.get() + 1);
        trace!("synthetic: render page {page} at {}x{}", target.width, target.height);
        Ok(PageImage {
            page,
            size: target,
            data: Arc::from(Vec::new()),
        })
    }
}
