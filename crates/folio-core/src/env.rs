//! Environment seams: document readiness and layout.
//!
//! Both are read-only from the controllers' point of view, except for the
//! document-level scroll lock which only the preloader touches.

use crate::element::{ElementId, ImageId};

/// Document ready state, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn is_complete(self) -> bool {
        matches!(self, ReadyState::Complete)
    }
}

/// Load status of one tracked image at the moment it was sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageStatus {
    pub id: ImageId,
    pub complete: bool,
}

/// The hosting document.
pub trait Document: Send + Sync {
    /// Current ready state.
    fn ready_state(&self) -> ReadyState;

    /// All tracked images with their current load status.
    fn images(&self) -> Vec<ImageStatus>;

    /// Suppress or restore document scrolling.
    fn set_scroll_locked(&self, locked: bool);
}

/// Element bounds in document coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Current layout, queried when trigger offsets are (re)computed.
pub trait Layout: Send + Sync {
    /// Bounds of an element, or `None` if it is not laid out.
    fn bounds(&self, element: ElementId) -> Option<Rect>;

    /// Height of the viewport in pixels.
    fn viewport_height(&self) -> f32;

    /// Total scrollable document height in pixels.
    fn document_height(&self) -> f32;
}
