//! Boundary to the windowed list that renders the popup rows.

use serde::Deserialize;

/// How the popup is sized against the anchor control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopperFit {
    /// At least as wide as the anchor.
    #[default]
    MinWidth,
    /// Exactly as wide as the anchor.
    Anchor,
    /// A fixed width in columns.
    Fixed(u16),
}

/// The renderer of the total-options sequence.
///
/// The engine only ever asks the renderer to do things; nothing it renders
/// flows back into selection state.
pub trait Viewport {
    /// Ensure row `index` of the total-options sequence is inside the viewport.
    fn ensure_index_in_view(&mut self, index: usize);

    /// Size the popup against the anchor.
    fn fit_popper(&mut self, _fit: PopperFit) {}
}

/// A viewport that ignores every request, for hosts without a popup.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoViewport;

impl Viewport for NoViewport {
    fn ensure_index_in_view(&mut self, _index: usize) {}
}
