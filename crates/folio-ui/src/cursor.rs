//! Custom pointer: a trailing ring and a fast inner dot.
//!
//! The ring morphs to the bounds of hovered interactive elements and keeps
//! tracking them while they move. Pointer moves during a morph do not move
//! the ring; they are remembered so the ring returns to the pointer when
//! the hover ends.

use std::convert::Infallible;

use folio_core::{CursorConfig, Ease, ElementId, Position, Property, Props, Timeline, TweenVars};

use crate::effect::Effect;

type CursorEffect = Effect<Infallible>;

/// Viewport-space box of a hovered element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Pointer entered the viewport.
    Enter { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    /// Pointer left the viewport.
    Leave,
    /// Pointer entered an interactive element.
    HoverStart {
        element: ElementId,
        bounds: Bounds,
        label: Option<String>,
    },
    /// The hovered element moved or resized.
    HoverMoved { bounds: Bounds },
    HoverEnd,
    Click,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CursorState {
    #[default]
    Hidden,
    Following,
    Morphed {
        target: ElementId,
        label: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorElements {
    pub ring: ElementId,
    pub dot: ElementId,
}

impl CursorElements {
    pub fn new() -> Self {
        Self {
            ring: ElementId::new(),
            dot: ElementId::new(),
        }
    }
}

impl Default for CursorElements {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Cursor {
    state: CursorState,
    elements: CursorElements,
    config: CursorConfig,
    pointer: (f32, f32),
}

impl Cursor {
    pub fn new(elements: CursorElements, config: CursorConfig) -> Self {
        Self {
            state: CursorState::Hidden,
            elements,
            config,
            pointer: (-100.0, -100.0),
        }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// Text shown inside the morphed ring, if any.
    pub fn label(&self) -> Option<&str> {
        match &self.state {
            CursorState::Morphed { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    /// Place both parts off-screen and invisible.
    pub fn init(&self) -> Vec<CursorEffect> {
        if !self.config.enabled {
            return Vec::new();
        }
        let hidden = set(Props::new()
            .with(Property::X, -100.0)
            .with(Property::Y, -100.0)
            .with(Property::Opacity, 0.0)
            .with(Property::XPercent, -50.0)
            .with(Property::YPercent, -50.0));
        vec![
            Effect::animate(vec![self.elements.ring], hidden.clone()),
            Effect::animate(vec![self.elements.dot], hidden),
        ]
    }

    pub fn handle(&mut self, event: PointerEvent) -> Vec<CursorEffect> {
        if !self.config.enabled {
            return Vec::new();
        }
        let CursorElements { ring, dot } = self.elements;

        match event {
            PointerEvent::Enter { x, y } => {
                self.pointer = (x, y);
                if self.state == CursorState::Hidden {
                    self.state = CursorState::Following;
                }
                let at = set(Props::new().with(Property::X, x).with(Property::Y, y));
                let show = TweenVars::to(Props::new().with(Property::Opacity, 1.0).with(Property::Scale, 1.0))
                    .duration(0.4)
                    .ease(Ease::Power2Out);
                vec![
                    Effect::animate(vec![ring], at.clone()),
                    Effect::animate(vec![dot], at),
                    Effect::animate(vec![ring], show.clone()),
                    Effect::animate(vec![dot], show),
                ]
            }

            PointerEvent::Move { x, y } => {
                self.pointer = (x, y);
                if self.state != CursorState::Following {
                    return Vec::new();
                }
                let to = Props::new().with(Property::X, x).with(Property::Y, y);
                vec![
                    Effect::animate(
                        vec![ring],
                        TweenVars::to(to.clone()).duration(0.6).ease(Ease::Power2Out),
                    ),
                    Effect::animate(vec![dot], TweenVars::to(to).duration(0.15).ease(Ease::Power2Out)),
                ]
            }

            PointerEvent::Leave => {
                self.state = CursorState::Hidden;
                let hide = TweenVars::to(Props::new().with(Property::Opacity, 0.0).with(Property::Scale, 0.0))
                    .duration(0.3)
                    .ease(Ease::Power2Out);
                vec![
                    Effect::animate(vec![ring], hide.clone()),
                    Effect::animate(vec![dot], hide),
                ]
            }

            PointerEvent::HoverStart {
                element,
                bounds,
                label,
            } => {
                self.state = CursorState::Morphed {
                    target: element,
                    label,
                };
                let (cx, cy) = bounds.center();
                let morph = TweenVars::to(
                    Props::new()
                        .with(Property::X, cx)
                        .with(Property::Y, cy)
                        .with(Property::Width, bounds.width)
                        .with(Property::Height, bounds.height),
                )
                .duration(0.4)
                .ease(Ease::Power3Out);
                let hide_dot = TweenVars::to(Props::new().with(Property::Scale, 0.0).with(Property::Opacity, 0.0))
                    .duration(0.3)
                    .ease(Ease::Power2Out);
                vec![
                    Effect::animate(vec![ring], morph),
                    Effect::animate(vec![dot], hide_dot),
                ]
            }

            PointerEvent::HoverMoved { bounds } => {
                if !matches!(self.state, CursorState::Morphed { .. }) {
                    return Vec::new();
                }
                let (cx, cy) = bounds.center();
                vec![Effect::animate(
                    vec![ring],
                    TweenVars::to(Props::new().with(Property::X, cx).with(Property::Y, cy))
                        .duration(0.2)
                        .ease(Ease::Power2Out),
                )]
            }

            PointerEvent::HoverEnd => {
                if !matches!(self.state, CursorState::Morphed { .. }) {
                    return Vec::new();
                }
                self.state = CursorState::Following;
                let (x, y) = self.pointer;
                let size = self.config.size_px;
                let reset = TweenVars::to(
                    Props::new()
                        .with(Property::Width, size)
                        .with(Property::Height, size)
                        .with(Property::X, x)
                        .with(Property::Y, y),
                )
                .duration(0.4)
                .ease(Ease::Power3Out);
                let show_dot = TweenVars::to(Props::new().with(Property::Scale, 1.0).with(Property::Opacity, 1.0))
                    .duration(0.3)
                    .ease(Ease::Power2Out);
                vec![
                    Effect::animate(vec![ring], reset),
                    Effect::animate(vec![dot], show_dot),
                ]
            }

            PointerEvent::Click => {
                let (pressed, rebound) = match self.state {
                    CursorState::Morphed { .. } => (0.95, Ease::Power2Out),
                    _ => (0.8, Ease::BackOut),
                };
                let timeline = Timeline::new()
                    .then(
                        vec![ring],
                        TweenVars::to(Props::new().with(Property::Scale, pressed))
                            .duration(0.1)
                            .ease(Ease::Power2Out),
                        Position::Sequential,
                    )
                    .then(
                        vec![ring],
                        TweenVars::to(Props::new().with(Property::Scale, 1.0))
                            .duration(0.2)
                            .ease(rebound),
                        Position::Sequential,
                    );
                vec![Effect::Timeline {
                    timeline,
                    on_complete: None,
                }]
            }
        }
    }
}

/// An instant tween.
fn set(props: Props) -> TweenVars {
    TweenVars::to(props).duration(0.0).ease(Ease::Linear)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> Cursor {
        Cursor::new(CursorElements::new(), CursorConfig::default())
    }

    fn ring_target(effects: &[CursorEffect], cursor: &Cursor, property: Property) -> Option<f32> {
        effects.iter().rev().find_map(|e| match e {
            Effect::Tween { targets, vars, .. } if targets == &vec![cursor.elements.ring] => {
                vars.to.get(property)
            }
            _ => None,
        })
    }

    #[test]
    fn test_hidden_until_enter() {
        let mut c = cursor();
        assert!(c.handle(PointerEvent::Move { x: 10.0, y: 10.0 }).is_empty());
        assert_eq!(c.state(), &CursorState::Hidden);

        let effects = c.handle(PointerEvent::Enter { x: 5.0, y: 6.0 });
        assert_eq!(effects.len(), 4);
        assert_eq!(c.state(), &CursorState::Following);
        assert_eq!(c.pointer(), (5.0, 6.0));
    }

    #[test]
    fn test_follow_uses_slow_ring_and_fast_dot() {
        let mut c = cursor();
        c.handle(PointerEvent::Enter { x: 0.0, y: 0.0 });
        let effects = c.handle(PointerEvent::Move { x: 40.0, y: 50.0 });
        let durations: Vec<f32> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Tween { vars, .. } => Some(vars.duration.as_secs_f32()),
                _ => None,
            })
            .collect();
        assert_eq!(durations.len(), 2);
        assert!((durations[0] - 0.6).abs() < 1e-6);
        assert!((durations[1] - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_morph_and_return() {
        let mut c = cursor();
        c.handle(PointerEvent::Enter { x: 0.0, y: 0.0 });
        let button = ElementId::new();
        let bounds = Bounds {
            left: 100.0,
            top: 200.0,
            width: 120.0,
            height: 40.0,
        };
        let effects = c.handle(PointerEvent::HoverStart {
            element: button,
            bounds,
            label: Some("View".to_string()),
        });
        assert_eq!(ring_target(&effects, &c, Property::X), Some(160.0));
        assert_eq!(ring_target(&effects, &c, Property::Width), Some(120.0));
        assert_eq!(c.label(), Some("View"));

        // Moves while morphed are remembered but do not move the ring.
        assert!(c.handle(PointerEvent::Move { x: 300.0, y: 310.0 }).is_empty());

        let effects = c.handle(PointerEvent::HoverEnd);
        assert_eq!(ring_target(&effects, &c, Property::Width), Some(32.0));
        assert_eq!(ring_target(&effects, &c, Property::X), Some(300.0));
        assert_eq!(c.state(), &CursorState::Following);
        assert_eq!(c.label(), None);
    }

    #[test]
    fn test_hover_moved_tracks_only_when_morphed() {
        let mut c = cursor();
        c.handle(PointerEvent::Enter { x: 0.0, y: 0.0 });
        let bounds = Bounds {
            left: 0.0,
            top: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(c.handle(PointerEvent::HoverMoved { bounds }).is_empty());
        c.handle(PointerEvent::HoverStart {
            element: ElementId::new(),
            bounds,
            label: None,
        });
        assert_eq!(c.handle(PointerEvent::HoverMoved { bounds }).len(), 1);
    }

    #[test]
    fn test_click_pulse_depends_on_state() {
        let mut c = cursor();
        c.handle(PointerEvent::Enter { x: 0.0, y: 0.0 });
        let pulse = |effects: Vec<CursorEffect>| match effects.as_slice() {
            [Effect::Timeline { timeline, .. }] => (
                timeline.steps()[0].vars.to.get(Property::Scale),
                timeline.steps()[1].vars.ease,
            ),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(pulse(c.handle(PointerEvent::Click)), (Some(0.8), Ease::BackOut));

        c.handle(PointerEvent::HoverStart {
            element: ElementId::new(),
            bounds: Bounds::default(),
            label: None,
        });
        assert_eq!(pulse(c.handle(PointerEvent::Click)), (Some(0.95), Ease::Power2Out));
    }

    #[test]
    fn test_leave_hides() {
        let mut c = cursor();
        c.handle(PointerEvent::Enter { x: 0.0, y: 0.0 });
        let effects = c.handle(PointerEvent::Leave);
        assert_eq!(ring_target(&effects, &c, Property::Opacity), Some(0.0));
        assert_eq!(c.state(), &CursorState::Hidden);
    }

    #[test]
    fn test_disabled_cursor_does_nothing() {
        let config = CursorConfig {
            enabled: false,
            ..CursorConfig::default()
        };
        let mut c = Cursor::new(CursorElements::new(), config);
        assert!(c.init().is_empty());
        assert!(c.handle(PointerEvent::Enter { x: 1.0, y: 1.0 }).is_empty());
        assert_eq!(c.state(), &CursorState::Hidden);
    }
}
