//! Continuous multi-page scrolling for paginated document viewers.
//!
//! Pages are stacked on one scrollable surface with fixed gaps between them.
//! Only a window of at most three pages around the current one must be
//! rendered, and each viewport keeps its position as `(page, fraction)` so it
//! survives resizes and re-rendering.

pub mod color;
pub mod config;
pub mod layout;
pub mod placeholder;
pub mod position;
pub mod source;
pub mod surface;
pub mod viewer;
pub mod window;
