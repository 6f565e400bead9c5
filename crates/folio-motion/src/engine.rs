//! The motion engine seam.
//!
//! The tweening engine is a black box: it interpolates properties over time
//! or over externally supplied progress. Everything in this crate talks to
//! it through `MotionEngine`, which keeps the lifecycle logic testable with
//! a mock and lets the runtime plug in whatever engine renders the page.

use std::sync::Arc;
use std::time::Duration;

use folio_core::{ElementId, Timeline, TweenVars};

/// Engine-assigned identifier of a running tween or timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// Called with eased progress in [0, 1] on every engine frame.
pub type UpdateFn = Arc<dyn Fn(f32) + Send + Sync>;

/// Called once when a tween or timeline finishes.
pub type CompleteFn = Box<dyn FnOnce() + Send>;

/// How a tween advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Start on creation and advance with the clock.
    Immediate,
    /// Created paused; advances with the clock once `play` is called.
    Paused,
    /// Progress is set externally through `seek`, optionally eased towards
    /// the requested value over `smoothing`.
    Scrubbed { smoothing: Option<Duration> },
}

/// Everything the engine needs to create one tween.
pub struct TweenRequest {
    pub targets: Vec<ElementId>,
    pub vars: TweenVars,
    pub playback: Playback,
    pub on_update: Option<UpdateFn>,
    pub on_complete: Option<CompleteFn>,
}

impl TweenRequest {
    /// A tween that starts immediately, with no callbacks.
    pub fn new(targets: Vec<ElementId>, vars: TweenVars) -> Self {
        Self {
            targets,
            vars,
            playback: Playback::Immediate,
            on_update: None,
            on_complete: None,
        }
    }

    pub fn playback(mut self, playback: Playback) -> Self {
        self.playback = playback;
        self
    }

    pub fn on_update(mut self, f: UpdateFn) -> Self {
        self.on_update = Some(f);
        self
    }

    pub fn on_complete(mut self, f: CompleteFn) -> Self {
        self.on_complete = Some(f);
        self
    }
}

impl std::fmt::Debug for TweenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenRequest")
            .field("targets", &self.targets)
            .field("vars", &self.vars)
            .field("playback", &self.playback)
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// The tweening engine.
///
/// Implementations must not invoke callbacks for a tween after `kill`
/// returns, and must never invoke callbacks while the caller is inside one
/// of these methods.
#[cfg_attr(test, mockall::automock)]
pub trait MotionEngine: Send + Sync {
    /// Create a tween. A repeating tween never completes; it runs until
    /// killed.
    fn tween(&self, request: TweenRequest) -> TweenId;

    /// Create and start a timeline.
    fn timeline(&self, timeline: Timeline, on_complete: Option<CompleteFn>) -> TweenId;

    /// Set the target progress of a scrubbed tween.
    fn seek(&self, id: TweenId, progress: f32);

    /// Start a paused tween. No-op if it already runs or finished.
    fn play(&self, id: TweenId);

    /// Stop a tween and drop its callbacks. No-op for unknown ids.
    fn kill(&self, id: TweenId);
}
