//! Slide-out navigation menu.
//!
//! `Opening` and `Closing` exist only while a sequence is in flight; they
//! make open and close requests during an animation no-ops. Each sequence
//! carries a token, and a completion whose token is not the latest one is
//! ignored.

use folio_core::{Ease, ElementId, Position, Property, Props, Timeline, TweenVars};

use crate::effect::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// The sequence with this token finished.
    SequenceComplete(u64),
}

/// The elements the menu animates.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuElements {
    pub overlay: ElementId,
    pub panel: ElementId,
    /// Links and the footer block, in display order.
    pub items: Vec<ElementId>,
}

impl MenuElements {
    pub fn new(items: usize) -> Self {
        Self {
            overlay: ElementId::new(),
            panel: ElementId::new(),
            items: (0..items).map(|_| ElementId::new()).collect(),
        }
    }
}

#[derive(Debug)]
pub struct Menu {
    state: MenuState,
    elements: MenuElements,
    sequence: u64,
}

impl Menu {
    pub fn new(elements: MenuElements) -> Self {
        Self {
            state: MenuState::Closed,
            elements,
            sequence: 0,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Whether the overlay takes pointer input (clicking it closes the menu).
    pub fn accepts_pointer(&self) -> bool {
        matches!(self.state, MenuState::Opening | MenuState::Open)
    }

    pub fn elements(&self) -> &MenuElements {
        &self.elements
    }

    /// Start the open sequence. No-op unless closed.
    pub fn request_open(&mut self) -> Vec<Effect<MenuEvent>> {
        if self.state != MenuState::Closed {
            tracing::trace!("Open ignored while {:?}", self.state);
            return Vec::new();
        }
        let timeline = self.open_timeline();
        self.play(MenuState::Opening, timeline)
    }

    /// Start the close sequence. No-op unless open.
    pub fn request_close(&mut self) -> Vec<Effect<MenuEvent>> {
        if self.state != MenuState::Open {
            tracing::trace!("Close ignored while {:?}", self.state);
            return Vec::new();
        }
        let timeline = self.close_timeline();
        self.play(MenuState::Closing, timeline)
    }

    /// Open when closed, close when open, otherwise nothing.
    pub fn toggle(&mut self) -> Vec<Effect<MenuEvent>> {
        match self.state {
            MenuState::Closed => self.request_open(),
            MenuState::Open => self.request_close(),
            MenuState::Opening | MenuState::Closing => Vec::new(),
        }
    }

    pub fn handle(&mut self, event: MenuEvent) -> Vec<Effect<MenuEvent>> {
        let MenuEvent::SequenceComplete(token) = event;
        if token != self.sequence {
            tracing::trace!("Stale menu sequence {} (current {})", token, self.sequence);
            return Vec::new();
        }
        let settled = match self.state {
            MenuState::Opening => MenuState::Open,
            MenuState::Closing => MenuState::Closed,
            stable => stable,
        };
        if settled != self.state {
            tracing::debug!("Menu {:?} -> {:?}", self.state, settled);
            self.state = settled;
        }
        Vec::new()
    }

    fn play(&mut self, state: MenuState, timeline: Timeline) -> Vec<Effect<MenuEvent>> {
        self.sequence += 1;
        tracing::debug!("Menu {:?} -> {:?}", self.state, state);
        self.state = state;
        vec![Effect::Timeline {
            timeline,
            on_complete: Some(MenuEvent::SequenceComplete(self.sequence)),
        }]
    }

    fn open_timeline(&self) -> Timeline {
        Timeline::new()
            .then(
                vec![self.elements.overlay],
                TweenVars::to(Props::new().with(Property::Opacity, 1.0))
                    .duration(0.3)
                    .ease(Ease::Power2Out),
                Position::Sequential,
            )
            .then(
                vec![self.elements.panel],
                TweenVars::to(Props::new().with(Property::XPercent, 0.0))
                    .duration(0.6)
                    .ease(Ease::Power3Out),
                Position::overlap(0.2),
            )
            .then(
                self.elements.items.clone(),
                TweenVars::from_to(
                    Props::new()
                        .with(Property::Opacity, 0.0)
                        .with(Property::Y, 30.0)
                        .with(Property::RotateX, -15.0),
                    Props::new()
                        .with(Property::Opacity, 1.0)
                        .with(Property::Y, 0.0)
                        .with(Property::RotateX, 0.0),
                )
                .duration(0.5)
                .stagger(0.1)
                .ease(Ease::Power2Out),
                Position::overlap(0.3),
            )
    }

    fn close_timeline(&self) -> Timeline {
        Timeline::new()
            .then(
                self.elements.items.clone(),
                TweenVars::to(Props::new().with(Property::Opacity, 0.0).with(Property::Y, -20.0))
                    .duration(0.3)
                    .stagger(0.05)
                    .ease(Ease::Power2In),
                Position::Sequential,
            )
            .then(
                vec![self.elements.panel],
                TweenVars::to(Props::new().with(Property::XPercent, 100.0))
                    .duration(0.5)
                    .ease(Ease::Power3In),
                Position::overlap(0.2),
            )
            .then(
                vec![self.elements.overlay],
                TweenVars::to(Props::new().with(Property::Opacity, 0.0))
                    .duration(0.3)
                    .ease(Ease::Power2In),
                Position::overlap(0.4),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(effects: &[Effect<MenuEvent>]) -> u64 {
        match effects {
            [Effect::Timeline {
                on_complete: Some(MenuEvent::SequenceComplete(t)),
                ..
            }] => *t,
            other => panic!("expected one timeline, got {:?}", other),
        }
    }

    fn menu() -> Menu {
        Menu::new(MenuElements::new(5))
    }

    #[test]
    fn test_open_then_close() {
        let mut menu = menu();
        let t = token(&menu.request_open());
        assert_eq!(menu.state(), MenuState::Opening);
        assert!(menu.accepts_pointer());
        menu.handle(MenuEvent::SequenceComplete(t));
        assert_eq!(menu.state(), MenuState::Open);

        let t = token(&menu.request_close());
        assert_eq!(menu.state(), MenuState::Closing);
        assert!(!menu.accepts_pointer());
        menu.handle(MenuEvent::SequenceComplete(t));
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_open_requests_while_opening_or_open_are_noops() {
        let mut menu = menu();
        let t = token(&menu.request_open());
        assert!(menu.request_open().is_empty());
        assert!(menu.toggle().is_empty());
        assert_eq!(menu.state(), MenuState::Opening);

        menu.handle(MenuEvent::SequenceComplete(t));
        assert!(menu.request_open().is_empty());
        assert_eq!(menu.state(), MenuState::Open);
    }

    #[test]
    fn test_close_requests_while_closed_or_closing_are_noops() {
        let mut menu = menu();
        assert!(menu.request_close().is_empty());
        assert_eq!(menu.state(), MenuState::Closed);

        let t = token(&menu.request_open());
        menu.handle(MenuEvent::SequenceComplete(t));
        let t = token(&menu.request_close());
        assert!(menu.request_close().is_empty());
        assert_eq!(menu.state(), MenuState::Closing);
        menu.handle(MenuEvent::SequenceComplete(t));
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut menu = menu();
        let open = token(&menu.request_open());
        menu.handle(MenuEvent::SequenceComplete(open));
        let close = token(&menu.request_close());

        // A late completion of the open sequence must not settle the close.
        menu.handle(MenuEvent::SequenceComplete(open));
        assert_eq!(menu.state(), MenuState::Closing);
        menu.handle(MenuEvent::SequenceComplete(close));
        assert_eq!(menu.state(), MenuState::Closed);
        menu.handle(MenuEvent::SequenceComplete(close));
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_toggle() {
        let mut menu = menu();
        let t = token(&menu.toggle());
        menu.handle(MenuEvent::SequenceComplete(t));
        assert_eq!(menu.state(), MenuState::Open);
        let t = token(&menu.toggle());
        menu.handle(MenuEvent::SequenceComplete(t));
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_sequence_shapes() {
        let mut menu = menu();
        let effects = menu.request_open();
        let Effect::Timeline { timeline, .. } = &effects[0] else {
            panic!("expected timeline");
        };
        let steps = timeline.steps();
        assert_eq!(steps[0].targets, vec![menu.elements().overlay]);
        assert_eq!(steps[2].targets.len(), 5);
        assert_eq!(steps[2].vars.from.get(Property::RotateX), Some(-15.0));
        // 0.3 + 0.6 - 0.2 = 0.7, items start at 0.4 and run 0.5 + 4 * 0.1.
        assert!((timeline.total_duration().as_secs_f32() - 1.3).abs() < 1e-3);

        let t = token(&effects);
        menu.handle(MenuEvent::SequenceComplete(t));
        let effects = menu.request_close();
        let Effect::Timeline { timeline, .. } = &effects[0] else {
            panic!("expected timeline");
        };
        let steps = timeline.steps();
        assert_eq!(steps[0].targets.len(), 5);
        assert_eq!(steps[1].vars.to.get(Property::XPercent), Some(100.0));
        assert_eq!(steps[2].targets, vec![menu.elements().overlay]);
    }
}
