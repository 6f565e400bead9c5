//! Per-frame wiring between smooth scrolling and scroll triggers.
//!
//! The smooth-scroll engine is advanced first on every tick, then its
//! position is pushed to the lifecycle manager, so the scroll position of
//! frame N is what tweens of frame N see.

use std::time::Duration;

use crate::manager::LifecycleManager;

/// The smooth-scroll engine.
pub trait SmoothScroll: Send {
    /// Advance to `time_ms` and return the animated scroll position.
    fn raf(&mut self, time_ms: f64) -> f32;

    /// Re-read viewport and content dimensions.
    fn resize(&mut self);

    /// Current animated scroll position.
    fn position(&self) -> f32;
}

/// Drives a smooth-scroll engine and feeds the lifecycle manager.
pub struct FrameDriver<S: SmoothScroll> {
    scroll: S,
    manager: LifecycleManager,
    frames: u64,
}

impl<S: SmoothScroll> FrameDriver<S> {
    pub fn new(scroll: S, manager: LifecycleManager) -> Self {
        Self {
            scroll,
            manager,
            frames: 0,
        }
    }

    /// Run one frame at `time` since start. Returns the scroll position.
    pub fn tick(&mut self, time: Duration) -> f32 {
        // Lag smoothing is off: the frame time is passed through as-is.
        let y = self.scroll.raf(time.as_secs_f64() * 1000.0);
        self.manager.on_scroll(y);
        self.frames += 1;
        y
    }

    /// Viewport changed size: re-measure scrolling, then trigger offsets.
    pub fn resize(&mut self) {
        self.scroll.resize();
        self.manager.refresh();
        tracing::debug!("Resize handled after {} frames", self.frames);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scroll(&self) -> &S {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut S {
        &mut self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockMotionEngine, TweenId};
    use crate::recipe::Recipe;
    use folio_core::{ElementId, Layout, Rect, Region};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StepScroll {
        step: f32,
        y: f32,
        resized: usize,
    }

    impl SmoothScroll for StepScroll {
        fn raf(&mut self, _time_ms: f64) -> f32 {
            self.y += self.step;
            self.y
        }
        fn resize(&mut self) {
            self.resized += 1;
        }
        fn position(&self) -> f32 {
            self.y
        }
    }

    struct FlatLayout;

    impl Layout for FlatLayout {
        fn bounds(&self, _element: ElementId) -> Option<Rect> {
            Some(Rect::new(1000.0, 1000.0))
        }
        fn viewport_height(&self) -> f32 {
            1000.0
        }
        fn document_height(&self) -> f32 {
            3000.0
        }
    }

    #[test]
    fn test_tick_feeds_scroll_to_triggers() {
        let seeks = Arc::new(AtomicUsize::new(0));
        let s = seeks.clone();
        let mut engine = MockMotionEngine::new();
        engine.expect_tween().returning(|_| TweenId(1));
        engine.expect_seek().returning(move |_, _| {
            s.fetch_add(1, Ordering::SeqCst);
        });
        engine.expect_kill().returning(|_| ());

        let manager = LifecycleManager::new(Arc::new(engine), Arc::new(FlatLayout));
        // Document trigger spans 0..2000.
        let _scope = manager.register(vec![(
            Some(Region::new(ElementId::new())),
            Recipe::VerticalProgressFill,
        )]);
        let initial = seeks.load(Ordering::SeqCst);

        let mut driver = FrameDriver::new(
            StepScroll {
                step: 100.0,
                y: 0.0,
                resized: 0,
            },
            manager,
        );
        assert_eq!(driver.tick(Duration::from_millis(16)), 100.0);
        assert_eq!(driver.tick(Duration::from_millis(32)), 200.0);
        assert_eq!(driver.frames(), 2);
        assert_eq!(seeks.load(Ordering::SeqCst), initial + 2);
    }

    #[test]
    fn test_resize_refreshes() {
        let mut engine = MockMotionEngine::new();
        engine.expect_tween().returning(|_| TweenId(1));
        engine.expect_seek().returning(|_, _| ());
        engine.expect_kill().returning(|_| ());
        let manager = LifecycleManager::new(Arc::new(engine), Arc::new(FlatLayout));

        let mut driver = FrameDriver::new(
            StepScroll {
                step: 0.0,
                y: 0.0,
                resized: 0,
            },
            manager,
        );
        driver.resize();
        assert_eq!(driver.scroll().resized, 1);
        assert_eq!(driver.scroll().position(), 0.0);
    }
}
