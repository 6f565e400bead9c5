//! Headless engines for simulation and tests.
//!
//! `HeadlessEngine` keeps per-element property values and advances tweens
//! when told to; `HeadlessScroll` eases a scroll position towards a target.
//! Neither renders anything.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use folio_core::{Ease, ElementId, Property, ScrollConfig, Timeline, TweenVars};

use crate::engine::{CompleteFn, MotionEngine, Playback, TweenId, TweenRequest, UpdateFn};
use crate::frame::SmoothScroll;

// =============================================================================
// Headless Engine
// =============================================================================

/// Resting value of a property that was never animated.
fn resting(property: Property) -> f32 {
    match property {
        Property::Opacity | Property::Scale | Property::ScaleX | Property::ScaleY => 1.0,
        _ => 0.0,
    }
}

/// One property of one element over one time window.
#[derive(Debug)]
struct Track {
    element: ElementId,
    property: Property,
    from: Option<f32>,
    to: f32,
    start: Duration,
    duration: Duration,
    ease: Ease,
}

impl Track {
    fn local_progress(&self, at: Duration) -> Option<f32> {
        if at < self.start {
            return None;
        }
        if self.duration.is_zero() {
            return Some(1.0);
        }
        let t = (at - self.start).as_secs_f32() / self.duration.as_secs_f32();
        Some(self.ease.apply(t.min(1.0)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RunState {
    Paused,
    Playing,
    Scrubbing {
        smoothing: Option<Duration>,
        target: f32,
        current: f32,
    },
    Finished,
}

struct Running {
    tracks: Vec<Track>,
    length: Duration,
    elapsed: Duration,
    ease: Ease,
    repeat: bool,
    state: RunState,
    on_update: Option<UpdateFn>,
    on_complete: Option<CompleteFn>,
}

fn tracks_for(targets: &[ElementId], vars: &TweenVars, offset: Duration) -> Vec<Track> {
    let mut tracks = Vec::new();
    for (i, element) in targets.iter().enumerate() {
        let stagger = vars.stagger.map(|s| s * i as u32).unwrap_or_default();
        for (property, to) in vars.to.iter() {
            tracks.push(Track {
                element: *element,
                property,
                from: vars.from.get(property),
                to,
                start: offset + vars.delay + stagger,
                duration: vars.duration,
                ease: vars.ease,
            });
        }
    }
    tracks
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    tweens: BTreeMap<TweenId, Running>,
    values: HashMap<(ElementId, Property), f32>,
}

impl Inner {
    fn insert(&mut self, running: Running) -> TweenId {
        self.next_id += 1;
        let id = TweenId(self.next_id);
        // Explicit start values apply as soon as the tween exists.
        for track in &running.tracks {
            if let Some(from) = track.from {
                self.values.insert((track.element, track.property), from);
            }
        }
        self.tweens.insert(id, running);
        id
    }

    fn apply(values: &mut HashMap<(ElementId, Property), f32>, tracks: &mut [Track], at: Duration) {
        for track in tracks.iter_mut() {
            let Some(p) = track.local_progress(at) else {
                continue;
            };
            let key = (track.element, track.property);
            let from = *track
                .from
                .get_or_insert_with(|| values.get(&key).copied().unwrap_or(resting(key.1)));
            values.insert(key, from + (track.to - from) * p);
        }
    }
}

/// A deterministic engine advanced by explicit `advance` calls.
#[derive(Default)]
pub struct HeadlessEngine {
    inner: Mutex<Inner>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance all running tweens by `dt`, then invoke callbacks. Tweens
    /// that finished are dropped once their callbacks ran.
    pub fn advance(&self, dt: Duration) {
        let mut updates: Vec<(TweenId, UpdateFn, f32)> = Vec::new();
        let mut completions: Vec<(TweenId, CompleteFn)> = Vec::new();
        {
            let mut guard = self.inner.lock();
            let Inner { tweens, values, .. } = &mut *guard;
            for (id, running) in tweens.iter_mut() {
                let progress = match running.state {
                    RunState::Paused | RunState::Finished => continue,
                    RunState::Playing if running.repeat && !running.length.is_zero() => {
                        let cycle = running.length.as_nanos();
                        let at = ((running.elapsed + dt).as_nanos() % cycle) as u64;
                        running.elapsed = Duration::from_nanos(at);
                        Inner::apply(values, &mut running.tracks, running.elapsed);
                        let linear = running.elapsed.as_secs_f32() / running.length.as_secs_f32();
                        running.ease.apply(linear)
                    }
                    RunState::Playing => {
                        running.elapsed = (running.elapsed + dt).min(running.length);
                        let at = running.elapsed;
                        Inner::apply(values, &mut running.tracks, at);
                        let linear = if running.length.is_zero() {
                            1.0
                        } else {
                            at.as_secs_f32() / running.length.as_secs_f32()
                        };
                        if at >= running.length {
                            running.state = RunState::Finished;
                            if let Some(f) = running.on_complete.take() {
                                completions.push((*id, f));
                            }
                        }
                        running.ease.apply(linear)
                    }
                    RunState::Scrubbing {
                        smoothing,
                        target,
                        current,
                    } => {
                        let next = match smoothing {
                            Some(s) if !s.is_zero() => {
                                let k = (dt.as_secs_f32() / s.as_secs_f32()).min(1.0);
                                let v = current + (target - current) * k;
                                if (target - v).abs() < 1e-3 {
                                    target
                                } else {
                                    v
                                }
                            }
                            _ => target,
                        };
                        if next == current && running.elapsed == running.length.mul_f32(next) {
                            continue;
                        }
                        running.state = RunState::Scrubbing {
                            smoothing,
                            target,
                            current: next,
                        };
                        running.elapsed = running.length.mul_f32(next);
                        let at = running.elapsed;
                        Inner::apply(values, &mut running.tracks, at);
                        next
                    }
                };
                if let Some(f) = &running.on_update {
                    updates.push((*id, f.clone(), progress));
                }
            }
        }

        for (id, f, progress) in updates {
            if self.exists(id) {
                f(progress);
            }
        }
        for (id, f) in completions {
            if self.exists(id) {
                f();
            }
        }

        self.inner
            .lock()
            .tweens
            .retain(|_, running| running.state != RunState::Finished);
    }

    fn exists(&self, id: TweenId) -> bool {
        self.inner.lock().tweens.contains_key(&id)
    }

    /// Current value of an element property.
    pub fn value(&self, element: ElementId, property: Property) -> f32 {
        self.inner
            .lock()
            .values
            .get(&(element, property))
            .copied()
            .unwrap_or(resting(property))
    }

    /// Whether a tween exists and has not finished.
    pub fn is_running(&self, id: TweenId) -> bool {
        self.inner
            .lock()
            .tweens
            .get(&id)
            .is_some_and(|r| r.state != RunState::Finished)
    }

    /// Number of tweens neither finished nor killed.
    pub fn tween_count(&self) -> usize {
        self.inner.lock().tweens.len()
    }
}

impl MotionEngine for HeadlessEngine {
    fn tween(&self, request: TweenRequest) -> TweenId {
        let length = request.vars.total_duration(request.targets.len());
        let state = match request.playback {
            Playback::Immediate => RunState::Playing,
            Playback::Paused => RunState::Paused,
            Playback::Scrubbed { smoothing } => RunState::Scrubbing {
                smoothing,
                target: 0.0,
                current: 0.0,
            },
        };
        let running = Running {
            tracks: tracks_for(&request.targets, &request.vars, Duration::ZERO),
            length,
            elapsed: Duration::ZERO,
            ease: request.vars.ease,
            repeat: request.vars.repeat,
            state,
            on_update: request.on_update,
            on_complete: request.on_complete,
        };
        self.inner.lock().insert(running)
    }

    fn timeline(&self, timeline: Timeline, on_complete: Option<CompleteFn>) -> TweenId {
        let mut tracks = Vec::new();
        for (start, step) in timeline.step_starts().into_iter().zip(timeline.steps()) {
            tracks.extend(tracks_for(&step.targets, &step.vars, start));
        }
        let running = Running {
            tracks,
            length: timeline.total_duration(),
            elapsed: Duration::ZERO,
            ease: Ease::Linear,
            repeat: false,
            state: RunState::Playing,
            on_update: None,
            on_complete,
        };
        self.inner.lock().insert(running)
    }

    fn seek(&self, id: TweenId, progress: f32) {
        if let Some(running) = self.inner.lock().tweens.get_mut(&id) {
            if let RunState::Scrubbing {
                smoothing, current, ..
            } = running.state
            {
                running.state = RunState::Scrubbing {
                    smoothing,
                    target: progress.clamp(0.0, 1.0),
                    current,
                };
            }
        }
    }

    fn play(&self, id: TweenId) {
        if let Some(running) = self.inner.lock().tweens.get_mut(&id) {
            if running.state == RunState::Paused {
                running.state = RunState::Playing;
            }
        }
    }

    fn kill(&self, id: TweenId) {
        self.inner.lock().tweens.remove(&id);
    }
}

// =============================================================================
// Headless Scroll
// =============================================================================

/// Smooth scrolling.
///
/// With a non-zero `lerp` the position moves that fraction of the remaining
/// distance per frame. With `lerp` at 0 every new target is reached over
/// `duration` seconds on an `expo.out` curve. Wheel deltas are scaled by
/// `wheel_multiplier` and animate only when `smooth_wheel` is set; touch
/// deltas are scaled by `touch_multiplier` and always jump. An `infinite`
/// scroll is unbounded and reports its position wrapped into the limit.
#[derive(Debug, Clone)]
pub struct HeadlessScroll {
    config: ScrollConfig,
    position: f32,
    target: f32,
    limit: f32,
    timed: Option<Timed>,
    last_ms: Option<f64>,
}

/// A duration-based move in flight.
#[derive(Debug, Clone, Copy)]
struct Timed {
    from: f32,
    elapsed: f32,
}

impl HeadlessScroll {
    pub fn new(config: &ScrollConfig, limit: f32) -> Self {
        let mut config = config.clone();
        config.lerp = config.lerp.clamp(0.0, 1.0);
        Self {
            config,
            position: 0.0,
            target: 0.0,
            limit: limit.max(0.0),
            timed: None,
            last_ms: None,
        }
    }

    /// Request an animated scroll to `y`.
    pub fn scroll_to(&mut self, y: f32) {
        self.target = self.bound(y);
        if self.config.lerp == 0.0 {
            self.timed = Some(Timed {
                from: self.position,
                elapsed: 0.0,
            });
        }
    }

    /// Mouse wheel input.
    pub fn wheel(&mut self, delta: f32) {
        let y = self.target + delta * self.config.wheel_multiplier;
        if self.config.smooth_wheel {
            self.scroll_to(y);
        } else {
            self.jump(y);
        }
    }

    /// Touch input.
    pub fn touch(&mut self, delta: f32) {
        self.jump(self.target + delta * self.config.touch_multiplier);
    }

    /// Move to `y` without animating.
    pub fn jump(&mut self, y: f32) {
        self.target = self.bound(y);
        self.position = self.target;
        self.timed = None;
    }

    /// Change the scrollable range; takes effect on the next `resize`.
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit.max(0.0);
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// No animation is in flight.
    pub fn is_settled(&self) -> bool {
        self.timed.is_none() && self.position == self.target
    }

    fn bound(&self, y: f32) -> f32 {
        if self.config.infinite {
            y
        } else {
            y.clamp(0.0, self.limit)
        }
    }
}

impl SmoothScroll for HeadlessScroll {
    fn raf(&mut self, time_ms: f64) -> f32 {
        let dt = self.last_ms.map_or(0.0, |last| ((time_ms - last) / 1000.0).max(0.0)) as f32;
        self.last_ms = Some(time_ms);

        if let Some(mut timed) = self.timed {
            timed.elapsed += dt;
            let t = timed.elapsed / self.config.duration;
            if t >= 1.0 || !t.is_finite() {
                self.position = self.target;
                self.timed = None;
            } else {
                self.position = timed.from + (self.target - timed.from) * Ease::ExpoOut.apply(t);
                self.timed = Some(timed);
            }
        } else {
            let delta = self.target - self.position;
            if delta.abs() < 0.5 {
                self.position = self.target;
            } else {
                self.position += delta * self.config.lerp;
            }
        }
        self.position()
    }

    fn resize(&mut self) {
        if !self.config.infinite {
            self.target = self.target.clamp(0.0, self.limit);
            self.position = self.position.clamp(0.0, self.limit);
        }
    }

    fn position(&self) -> f32 {
        if self.config.infinite && self.limit > 0.0 {
            self.position.rem_euclid(self.limit)
        } else {
            self.position
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Position, Props};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_immediate_tween_runs_to_completion() {
        let engine = HeadlessEngine::new();
        let el = ElementId::new();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        let vars = TweenVars::from_to(
            Props::new().with(Property::Opacity, 0.0),
            Props::new().with(Property::Opacity, 1.0),
        )
        .duration(1.0)
        .ease(Ease::Linear);
        let id = engine.tween(
            TweenRequest::new(vec![el], vars).on_complete(Box::new(move || {
                d.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(engine.value(el, Property::Opacity), 0.0);
        engine.advance(ms(500));
        assert!(approx_eq(engine.value(el, Property::Opacity), 0.5));
        assert!(engine.is_running(id));
        engine.advance(ms(600));
        assert_eq!(engine.value(el, Property::Opacity), 1.0);
        assert!(!engine.is_running(id));
        engine.advance(ms(100));
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_paused_tween_waits_for_play() {
        let engine = HeadlessEngine::new();
        let el = ElementId::new();
        let vars = TweenVars::to(Props::new().with(Property::Y, 100.0))
            .duration(1.0)
            .ease(Ease::Linear);
        let id = engine.tween(TweenRequest::new(vec![el], vars).playback(Playback::Paused));

        engine.advance(ms(500));
        assert_eq!(engine.value(el, Property::Y), 0.0);
        engine.play(id);
        engine.advance(ms(500));
        assert!(approx_eq(engine.value(el, Property::Y), 50.0));
    }

    #[test]
    fn test_scrubbed_tween_follows_seek() {
        let engine = HeadlessEngine::new();
        let el = ElementId::new();
        let vars = TweenVars::from_to(
            Props::new().with(Property::Scale, 0.5),
            Props::new().with(Property::Scale, 1.0),
        )
        .ease(Ease::Linear);
        let id = engine.tween(
            TweenRequest::new(vec![el], vars).playback(Playback::Scrubbed { smoothing: None }),
        );

        engine.seek(id, 0.5);
        engine.advance(ms(16));
        assert!(approx_eq(engine.value(el, Property::Scale), 0.75));
        engine.seek(id, 0.0);
        engine.advance(ms(16));
        assert!(approx_eq(engine.value(el, Property::Scale), 0.5));
    }

    #[test]
    fn test_smoothed_scrub_catches_up() {
        let engine = HeadlessEngine::new();
        let el = ElementId::new();
        let vars = TweenVars::to(Props::new().with(Property::Y, 100.0)).ease(Ease::Linear);
        let id = engine.tween(TweenRequest::new(vec![el], vars).playback(Playback::Scrubbed {
            smoothing: Some(Duration::from_secs(1)),
        }));

        engine.seek(id, 1.0);
        engine.advance(ms(250));
        let partial = engine.value(el, Property::Y);
        assert!(partial > 0.0 && partial < 100.0);
        for _ in 0..100 {
            engine.advance(ms(250));
        }
        assert!(approx_eq(engine.value(el, Property::Y), 100.0));
    }

    #[test]
    fn test_killed_tween_never_calls_back() {
        let engine = HeadlessEngine::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let vars = TweenVars::to(Props::new().with(Property::X, 10.0)).duration(1.0);
        let id = engine.tween(TweenRequest::new(vec![ElementId::new()], vars).on_update(Arc::new(
            move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            },
        )));

        engine.advance(ms(100));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        engine.kill(id);
        engine.advance(ms(100));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.tween_count(), 0);
    }

    #[test]
    fn test_timeline_completes_after_total_duration() {
        let engine = HeadlessEngine::new();
        let a = ElementId::new();
        let b = ElementId::new();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        let out = |secs| {
            TweenVars::to(Props::new().with(Property::Opacity, 0.0))
                .duration(secs)
                .ease(Ease::Linear)
        };
        let timeline = Timeline::new()
            .then(vec![a], out(0.5), Position::Sequential)
            .then(vec![b], out(0.5), Position::overlap(0.3));
        engine.timeline(
            timeline,
            Some(Box::new(move || {
                d.fetch_add(1, Ordering::SeqCst);
            })),
        );

        engine.advance(ms(200));
        assert!(approx_eq(engine.value(b, Property::Opacity), 1.0));
        engine.advance(ms(300));
        assert!(approx_eq(engine.value(a, Property::Opacity), 0.0));
        assert_eq!(done.load(Ordering::SeqCst), 0);
        engine.advance(ms(200));
        assert!(approx_eq(engine.value(b, Property::Opacity), 0.0));
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stagger_offsets_targets() {
        let engine = HeadlessEngine::new();
        let a = ElementId::new();
        let b = ElementId::new();
        let vars = TweenVars::from_to(
            Props::new().with(Property::Opacity, 0.0),
            Props::new().with(Property::Opacity, 1.0),
        )
        .duration(0.2)
        .stagger(0.2)
        .ease(Ease::Linear);
        engine.tween(TweenRequest::new(vec![a, b], vars));

        engine.advance(ms(200));
        assert!(approx_eq(engine.value(a, Property::Opacity), 1.0));
        assert!(approx_eq(engine.value(b, Property::Opacity), 0.0));
        engine.advance(ms(200));
        assert!(approx_eq(engine.value(b, Property::Opacity), 1.0));
    }

    #[test]
    fn test_headless_scroll_eases_to_target() {
        let mut scroll = HeadlessScroll::new(&ScrollConfig::default(), 4000.0);
        scroll.scroll_to(1000.0);
        let first = scroll.raf(16.0);
        assert!(approx_eq(first, 100.0));
        for _ in 0..200 {
            scroll.raf(16.0);
        }
        assert_eq!(scroll.position(), 1000.0);

        scroll.scroll_to(10_000.0);
        assert_eq!(scroll.target(), 4000.0);
        scroll.set_limit(500.0);
        scroll.resize();
        assert_eq!(scroll.target(), 500.0);
        assert_eq!(scroll.position(), 500.0);
    }

    #[test]
    fn test_headless_scroll_duration_mode() {
        let config = ScrollConfig {
            lerp: 0.0,
            duration: 1.0,
            ..ScrollConfig::default()
        };
        let mut scroll = HeadlessScroll::new(&config, 4000.0);
        scroll.raf(0.0);
        scroll.scroll_to(1000.0);
        let half = scroll.raf(500.0);
        assert!(approx_eq(half, 1000.0 * Ease::ExpoOut.apply(0.5)));
        assert!(!scroll.is_settled());
        assert_eq!(scroll.raf(1000.0), 1000.0);
        assert!(scroll.is_settled());
    }

    #[test]
    fn test_headless_scroll_wheel_and_touch() {
        let config = ScrollConfig {
            smooth_wheel: false,
            wheel_multiplier: 2.0,
            touch_multiplier: 3.0,
            ..ScrollConfig::default()
        };
        let mut scroll = HeadlessScroll::new(&config, 4000.0);
        scroll.wheel(100.0);
        assert_eq!(scroll.position(), 200.0);
        scroll.touch(100.0);
        assert_eq!(scroll.position(), 500.0);

        let mut smooth = HeadlessScroll::new(&ScrollConfig::default(), 4000.0);
        smooth.wheel(100.0);
        assert_eq!(smooth.position(), 0.0);
        assert_eq!(smooth.target(), 100.0);
        assert!(approx_eq(smooth.raf(16.0), 10.0));
    }

    #[test]
    fn test_headless_scroll_infinite_wraps() {
        let config = ScrollConfig {
            infinite: true,
            ..ScrollConfig::default()
        };
        let mut scroll = HeadlessScroll::new(&config, 1000.0);
        scroll.jump(2500.0);
        assert_eq!(scroll.target(), 2500.0);
        assert_eq!(scroll.position(), 500.0);
        scroll.jump(-200.0);
        assert_eq!(scroll.position(), 800.0);
        scroll.resize();
        assert_eq!(scroll.target(), -200.0);
    }

    #[test]
    fn test_finished_tweens_are_dropped() {
        let engine = HeadlessEngine::new();
        let el = ElementId::new();
        let fade = || TweenVars::to(Props::new().with(Property::Opacity, 0.0)).duration(0.1);
        for _ in 0..20 {
            engine.tween(TweenRequest::new(vec![el], fade()));
            engine.timeline(Timeline::new().then(vec![el], fade(), Position::Sequential), None);
        }
        let scrubbed = engine.tween(
            TweenRequest::new(vec![el], fade()).playback(Playback::Scrubbed { smoothing: None }),
        );
        assert_eq!(engine.tween_count(), 41);

        engine.advance(ms(200));
        assert_eq!(engine.tween_count(), 1);
        assert!(engine.is_running(scrubbed));
    }

    #[test]
    fn test_repeating_tween_wraps_and_never_completes() {
        let engine = HeadlessEngine::new();
        let el = ElementId::new();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        let vars = TweenVars::from_to(
            Props::new().with(Property::Rotation, 0.0),
            Props::new().with(Property::Rotation, 360.0),
        )
        .duration(1.0)
        .ease(Ease::Linear)
        .repeat_forever();
        let id = engine.tween(TweenRequest::new(vec![el], vars).on_complete(Box::new(move || {
            d.fetch_add(1, Ordering::SeqCst);
        })));

        engine.advance(ms(250));
        assert!(approx_eq(engine.value(el, Property::Rotation), 90.0));
        engine.advance(ms(1000));
        assert!(approx_eq(engine.value(el, Property::Rotation), 90.0));
        assert!(engine.is_running(id));
        assert_eq!(done.load(Ordering::SeqCst), 0);

        engine.kill(id);
        assert_eq!(engine.tween_count(), 0);
    }
}
