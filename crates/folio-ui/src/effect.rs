//! Effects produced by the UI state machines.
//!
//! Controllers never talk to the engine or the clock directly. Each
//! transition returns a list of effects; the runtime executes them and turns
//! engine callbacks and elapsed timers back into events.
//!
//! ```text
//! event ──► controller.handle() ──► Vec<Effect<E>> ──► App::execute()
//!   ▲                                                      │
//!   └──────────── timers / engine callbacks ◄──────────────┘
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use folio_core::{ElementId, Timeline, TweenVars};

/// Maps per-frame tween progress to an event.
pub type FrameEvent<E> = Arc<dyn Fn(f32) -> E + Send + Sync>;

pub enum Effect<E> {
    /// Play a tween now.
    Tween {
        targets: Vec<ElementId>,
        vars: TweenVars,
        on_update: Option<FrameEvent<E>>,
        on_complete: Option<E>,
    },
    /// Play a timeline now.
    Timeline {
        timeline: Timeline,
        on_complete: Option<E>,
    },
    /// Deliver `event` after `delay`.
    After { delay: Duration, event: E },
}

impl<E: Send + 'static> Effect<E> {
    /// A fire-and-forget tween.
    pub fn animate(targets: Vec<ElementId>, vars: TweenVars) -> Self {
        Effect::Tween {
            targets,
            vars,
            on_update: None,
            on_complete: None,
        }
    }

    pub fn after(delay: Duration, event: E) -> Self {
        Effect::After { delay, event }
    }

    /// Re-target the effect's events, e.g. to wrap them for a parent.
    pub fn map<F: Send + 'static>(self, f: fn(E) -> F) -> Effect<F> {
        match self {
            Effect::Tween {
                targets,
                vars,
                on_update,
                on_complete,
            } => Effect::Tween {
                targets,
                vars,
                on_update: on_update.map(|g| -> FrameEvent<F> { Arc::new(move |p| f(g(p))) }),
                on_complete: on_complete.map(f),
            },
            Effect::Timeline {
                timeline,
                on_complete,
            } => Effect::Timeline {
                timeline,
                on_complete: on_complete.map(f),
            },
            Effect::After { delay, event } => Effect::After {
                delay,
                event: f(event),
            },
        }
    }

    /// The event delivered when this effect finishes, if any.
    pub fn completion(&self) -> Option<&E> {
        match self {
            Effect::Tween { on_complete, .. } | Effect::Timeline { on_complete, .. } => {
                on_complete.as_ref()
            }
            Effect::After { event, .. } => Some(event),
        }
    }
}

impl Effect<Infallible> {
    /// Widen an effect that never produces events.
    pub fn widen<F: Send + 'static>(self) -> Effect<F> {
        self.map(|never| match never {})
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for Effect<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Tween {
                targets,
                vars,
                on_update,
                on_complete,
            } => f
                .debug_struct("Tween")
                .field("targets", &targets.len())
                .field("vars", vars)
                .field("on_update", &on_update.is_some())
                .field("on_complete", on_complete)
                .finish(),
            Effect::Timeline {
                timeline,
                on_complete,
            } => f
                .debug_struct("Timeline")
                .field("steps", &timeline.steps().len())
                .field("on_complete", on_complete)
                .finish(),
            Effect::After { delay, event } => f
                .debug_struct("After")
                .field("delay", delay)
                .field("event", event)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Property, Props};

    #[derive(Debug, PartialEq)]
    enum Inner {
        Frame(f32),
        Done,
    }

    #[derive(Debug, PartialEq)]
    enum Outer {
        Inner(Inner),
    }

    #[test]
    fn test_map_wraps_every_event() {
        let effect: Effect<Inner> = Effect::Tween {
            targets: vec![ElementId::new()],
            vars: TweenVars::to(Props::new().with(Property::Value, 100.0)),
            on_update: Some(Arc::new(Inner::Frame)),
            on_complete: Some(Inner::Done),
        };

        match effect.map(Outer::Inner) {
            Effect::Tween {
                on_update: Some(update),
                on_complete,
                ..
            } => {
                assert_eq!(update(0.5), Outer::Inner(Inner::Frame(0.5)));
                assert_eq!(on_complete, Some(Outer::Inner(Inner::Done)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_completion_of_timer() {
        let effect = Effect::after(Duration::from_millis(300), Inner::Done);
        assert_eq!(effect.completion(), Some(&Inner::Done));
        assert!(Effect::<Inner>::animate(vec![], TweenVars::to(Props::new()))
            .completion()
            .is_none());
    }
}
