//! Preloader progress and exit sequence.
//!
//! ## Phases
//!
//! ```text
//! Polling ──(window loaded | settle)──► Ramping ──(ramp done)──► Exiting ──(exit done)──► Done
//!    │                                     │                        │
//!  image loads raise progress,         90 → 100 over 0.5s       300ms pause, then
//!  capped at 90                        counter = floor(value)   exit timeline
//! ```
//!
//! Progress is published on a watch channel; every change is a
//! notification. The completion callback is a `FnOnce` held in an
//! `Option`, so it runs at most once. The document scroll lock is held by
//! a guard that is released on `Done` and on drop, whatever the phase.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use folio_core::{
    Document, Ease, ElementId, ImageId, Origin, Position, PreloaderConfig, Property, Props,
    Timeline, TweenVars,
};
use folio_motion::CompleteFn;

use crate::effect::Effect;

/// Wait before ramping when the document was already loaded at start.
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);
/// Pause between reaching 100 and the exit sequence.
pub const EXIT_PAUSE: Duration = Duration::from_millis(300);
/// Highest progress reachable before the window has loaded.
pub const POLLING_CAP: u8 = 90;

const RAMP_SECS: f32 = 0.5;

// =============================================================================
// Scroll Lock
// =============================================================================

/// Holds the document scroll lock for as long as it lives.
pub struct ScrollLockGuard {
    document: Arc<dyn Document>,
}

impl ScrollLockGuard {
    pub fn acquire(document: Arc<dyn Document>) -> Self {
        document.set_scroll_locked(true);
        tracing::debug!("Scroll locked");
        Self { document }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.document.set_scroll_locked(false);
        tracing::debug!("Scroll unlocked");
    }
}

// =============================================================================
// Events and Phases
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloaderPhase {
    Polling,
    Ramping,
    Exiting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreloaderEvent {
    /// A tracked image finished loading.
    ImageLoaded(ImageId),
    /// The window finished loading.
    WindowLoaded,
    /// The settle delay after an already-loaded start elapsed.
    SettleElapsed,
    /// Eased ramp progress in [0, 1].
    RampFrame(f32),
    RampComplete,
    PauseElapsed,
    ExitComplete,
}

/// The elements the preloader animates.
#[derive(Debug, Clone, PartialEq)]
pub struct PreloaderElements {
    pub overlay: ElementId,
    pub counter: ElementId,
    pub label: ElementId,
    /// Bar track and fill, when the bar is rendered.
    pub bar: Option<BarElements>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarElements {
    pub track: ElementId,
    pub fill: ElementId,
}

impl PreloaderElements {
    pub fn new(with_bar: bool) -> Self {
        Self {
            overlay: ElementId::new(),
            counter: ElementId::new(),
            label: ElementId::new(),
            bar: with_bar.then(|| BarElements {
                track: ElementId::new(),
                fill: ElementId::new(),
            }),
        }
    }
}

// =============================================================================
// Preloader
// =============================================================================

pub struct Preloader {
    phase: PreloaderPhase,
    visited: Vec<PreloaderPhase>,
    elements: PreloaderElements,
    config: PreloaderConfig,
    progress: watch::Sender<u8>,
    /// Readiness floor from the document state at start.
    floor: u8,
    tracked: HashSet<ImageId>,
    loaded: HashSet<ImageId>,
    exit_started: bool,
    scroll_lock: Option<ScrollLockGuard>,
    on_complete: Option<CompleteFn>,
}

impl Preloader {
    pub fn new(
        elements: PreloaderElements,
        config: PreloaderConfig,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            phase: PreloaderPhase::Polling,
            visited: vec![PreloaderPhase::Polling],
            elements,
            config,
            progress,
            floor: 0,
            tracked: HashSet::new(),
            loaded: HashSet::new(),
            exit_started: false,
            scroll_lock: None,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn phase(&self) -> PreloaderPhase {
        self.phase
    }

    /// Phases entered so far, in order, without repeats.
    pub fn visited(&self) -> &[PreloaderPhase] {
        &self.visited
    }

    /// Currently displayed progress.
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    /// Subscribe to progress changes.
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn elements(&self) -> &PreloaderElements {
        &self.elements
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.is_some()
    }

    fn bar(&self) -> Option<BarElements> {
        self.elements.bar.filter(|_| self.config.show_progress_bar)
    }

    /// Lock scrolling, play the entrance and take the first readiness sample.
    pub fn start(&mut self, document: Arc<dyn Document>) -> Vec<Effect<PreloaderEvent>> {
        if self.scroll_lock.is_some() || self.phase != PreloaderPhase::Polling {
            return Vec::new();
        }
        self.scroll_lock = Some(ScrollLockGuard::acquire(document.clone()));

        let mut effects = self.entrance();

        let ready = document.ready_state().is_complete();
        self.floor = if ready { 50 } else { 20 };
        for image in document.images() {
            self.tracked.insert(image.id);
            if image.complete {
                self.loaded.insert(image.id);
            }
        }
        tracing::info!(
            "Preloader started: document {}, {}/{} images loaded",
            if ready { "complete" } else { "loading" },
            self.loaded.len(),
            self.tracked.len()
        );
        effects.extend(self.set_progress(self.baseline().min(POLLING_CAP)));

        if ready {
            effects.push(Effect::after(SETTLE_DELAY, PreloaderEvent::SettleElapsed));
        }
        effects
    }

    /// Progress implied by readiness alone.
    fn baseline(&self) -> u8 {
        let images = if self.tracked.is_empty() {
            70.0
        } else {
            50.0 + 30.0 * self.loaded.len() as f32 / self.tracked.len() as f32
        };
        (self.floor as f32).max(images).floor() as u8
    }

    fn entrance(&self) -> Vec<Effect<PreloaderEvent>> {
        let rise = TweenVars::from_to(
            Props::new().with(Property::Opacity, 0.0).with(Property::Y, 20.0),
            Props::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
        )
        .duration(0.6)
        .ease(Ease::Power2Out);

        let mut effects = vec![
            Effect::animate(vec![self.elements.counter], rise.clone()),
            Effect::animate(vec![self.elements.label], rise),
        ];
        if let Some(bar) = self.bar() {
            let fade = TweenVars::from_to(
                Props::new().with(Property::Opacity, 0.0),
                Props::new().with(Property::Opacity, 1.0),
            )
            .duration(0.6)
            .ease(Ease::Power2Out);
            effects.push(Effect::animate(vec![bar.track], fade));
        }
        effects
    }

    /// Raise the displayed progress. Lower values are ignored.
    fn set_progress(&mut self, value: u8) -> Vec<Effect<PreloaderEvent>> {
        let value = value.min(100);
        if value <= self.progress() {
            return Vec::new();
        }
        self.progress.send_replace(value);
        tracing::trace!("Progress {}", value);

        match self.bar() {
            Some(bar) => {
                let fill = TweenVars::to(Props::new().with(Property::ScaleX, value as f32 / 100.0))
                    .duration(0.3)
                    .ease(Ease::Power2Out)
                    .origin(Origin::Left);
                vec![Effect::animate(vec![bar.fill], fill)]
            }
            None => Vec::new(),
        }
    }

    fn enter(&mut self, phase: PreloaderPhase) {
        tracing::debug!("Preloader {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.visited.push(phase);
    }

    /// Apply an event. Events the current phase does not accept are ignored.
    pub fn handle(&mut self, event: PreloaderEvent) -> Vec<Effect<PreloaderEvent>> {
        match (self.phase, event) {
            (PreloaderPhase::Polling, PreloaderEvent::ImageLoaded(id)) => {
                if !self.tracked.contains(&id) || !self.loaded.insert(id) {
                    return Vec::new();
                }
                self.set_progress(self.baseline().min(POLLING_CAP))
            }

            (PreloaderPhase::Polling, PreloaderEvent::WindowLoaded | PreloaderEvent::SettleElapsed) => {
                self.enter(PreloaderPhase::Ramping);
                let mut effects = self.set_progress(POLLING_CAP);
                let ramp = TweenVars::from_to(
                    Props::new().with(Property::Value, POLLING_CAP as f32),
                    Props::new().with(Property::Value, 100.0),
                )
                .duration(RAMP_SECS)
                .ease(Ease::Power2InOut);
                effects.push(Effect::Tween {
                    targets: vec![self.elements.counter],
                    vars: ramp,
                    on_update: Some(Arc::new(PreloaderEvent::RampFrame)),
                    on_complete: Some(PreloaderEvent::RampComplete),
                });
                effects
            }

            (PreloaderPhase::Ramping, PreloaderEvent::RampFrame(p)) => {
                let value = (POLLING_CAP as f32 + 10.0 * p.clamp(0.0, 1.0)).floor() as u8;
                self.set_progress(value)
            }

            (PreloaderPhase::Ramping, PreloaderEvent::RampComplete) => {
                let mut effects = self.set_progress(100);
                self.enter(PreloaderPhase::Exiting);
                effects.push(Effect::after(EXIT_PAUSE, PreloaderEvent::PauseElapsed));
                effects
            }

            (PreloaderPhase::Exiting, PreloaderEvent::PauseElapsed) if !self.exit_started => {
                self.exit_started = true;
                vec![Effect::Timeline {
                    timeline: self.exit_timeline(),
                    on_complete: Some(PreloaderEvent::ExitComplete),
                }]
            }

            (PreloaderPhase::Exiting, PreloaderEvent::ExitComplete) if self.exit_started => {
                self.enter(PreloaderPhase::Done);
                self.scroll_lock = None;
                if let Some(on_complete) = self.on_complete.take() {
                    tracing::info!("Preloader done");
                    on_complete();
                }
                Vec::new()
            }

            (phase, event) => {
                tracing::trace!("Ignoring {:?} in {:?}", event, phase);
                Vec::new()
            }
        }
    }

    fn exit_timeline(&self) -> Timeline {
        let rise_out = |secs| {
            TweenVars::to(Props::new().with(Property::Opacity, 0.0).with(Property::Y, -30.0))
                .duration(secs)
                .ease(Ease::Power2InOut)
        };
        let bar = self.bar().map(|b| vec![b.fill]).unwrap_or_default();

        Timeline::new()
            .then(vec![self.elements.counter], rise_out(0.5), Position::Sequential)
            .then(vec![self.elements.label], rise_out(0.5), Position::overlap(0.3))
            .then(
                bar,
                TweenVars::to(Props::new().with(Property::ScaleX, 0.0))
                    .duration(0.6)
                    .ease(Ease::Power2InOut)
                    .origin(Origin::Right),
                Position::overlap(0.3),
            )
            .then(
                vec![self.elements.overlay],
                TweenVars::to(Props::new().with(Property::YPercent, -100.0))
                    .duration(0.8)
                    .ease(Ease::Power3InOut),
                Position::overlap(0.4),
            )
    }
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader")
            .field("phase", &self.phase)
            .field("progress", &self.progress())
            .field("images", &(self.loaded.len(), self.tracked.len()))
            .finish()
    }
}
