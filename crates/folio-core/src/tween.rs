//! Tween and timeline descriptors.
//!
//! These are plain data handed to the motion engine. A descriptor is never
//! mutated after it has been submitted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::element::ElementId;

/// Longest span a descriptor accepts, in seconds.
pub const MAX_SECS: f32 = 3600.0;

/// Seconds to a `Duration`. Negative and NaN become zero; anything above
/// `MAX_SECS` is capped.
pub fn span(secs: f32) -> Duration {
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f32(secs.clamp(0.0, MAX_SECS))
}

// =============================================================================
// Properties
// =============================================================================

/// An animatable visual property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Opacity,
    X,
    Y,
    XPercent,
    YPercent,
    Scale,
    ScaleX,
    ScaleY,
    RotateX,
    Rotation,
    Width,
    Height,
    StrokeDashoffset,
    /// A bare numeric value with no visual target (e.g. a progress counter).
    Value,
}

/// Ordered property assignments. Later assignments of the same property win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Props(Vec<(Property, f32)>);

impl Props {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder-style assignment.
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    /// Assign a property, replacing any earlier value.
    pub fn set(&mut self, property: Property, value: f32) {
        if let Some(slot) = self.0.iter_mut().find(|(p, _)| *p == property) {
            slot.1 = value;
        } else {
            self.0.push((property, value));
        }
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.0.iter().find(|(p, _)| *p == property).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(Property, f32)> for Props {
    fn from_iter<I: IntoIterator<Item = (Property, f32)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (p, v) in iter {
            props.set(p, v);
        }
        props
    }
}

/// Transform origin for scale tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Left,
    Right,
    Top,
    Center,
}

// =============================================================================
// Tween Vars
// =============================================================================

/// Description of one tween: start values, end values and timing.
///
/// An empty `from` means "start from the element's current values".
#[derive(Debug, Clone, PartialEq)]
pub struct TweenVars {
    pub from: Props,
    pub to: Props,
    pub duration: Duration,
    pub delay: Duration,
    pub ease: Ease,
    /// Offset between consecutive targets.
    pub stagger: Option<Duration>,
    pub origin: Option<Origin>,
    /// Restart from the beginning forever instead of completing.
    pub repeat: bool,
}

impl TweenVars {
    /// Tween from current values to `to`.
    pub fn to(to: Props) -> Self {
        Self {
            from: Props::new(),
            to,
            duration: Duration::from_millis(500),
            delay: Duration::ZERO,
            ease: Ease::Power2Out,
            stagger: None,
            origin: None,
            repeat: false,
        }
    }

    /// Tween from explicit start values to `to`.
    pub fn from_to(from: Props, to: Props) -> Self {
        Self {
            from,
            ..Self::to(to)
        }
    }

    pub fn duration(mut self, secs: f32) -> Self {
        self.duration = span(secs);
        self
    }

    pub fn delay(mut self, secs: f32) -> Self {
        self.delay = span(secs);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, secs: f32) -> Self {
        self.stagger = Some(span(secs));
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn repeat_forever(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Wall-clock length when applied to `targets` elements, stagger included.
    /// For a repeating tween this is the length of one cycle.
    pub fn total_duration(&self, targets: usize) -> Duration {
        let spread = match self.stagger {
            Some(step) if targets > 1 => step * (targets as u32 - 1),
            _ => Duration::ZERO,
        };
        self.delay + self.duration + spread
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Where a timeline step is placed relative to what precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Start when the timeline so far ends.
    Sequential,
    /// Start this long before the timeline so far ends (`"-=0.3"`).
    Overlap(Duration),
    /// Start this long after the timeline so far ends (`"+=0.1"`).
    Gap(Duration),
    /// Start at an absolute time from the timeline origin.
    At(Duration),
}

impl Position {
    pub fn overlap(secs: f32) -> Self {
        Position::Overlap(span(secs))
    }

    pub fn gap(secs: f32) -> Self {
        Position::Gap(span(secs))
    }
}

/// One step of a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStep {
    pub targets: Vec<ElementId>,
    pub vars: TweenVars,
    pub position: Position,
}

/// A sequence of tweens with relative placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Steps with no targets are dropped, matching the
    /// engine's behavior for missing elements.
    pub fn then(mut self, targets: Vec<ElementId>, vars: TweenVars, position: Position) -> Self {
        if !targets.is_empty() {
            self.steps.push(TimelineStep {
                targets,
                vars,
                position,
            });
        }
        self
    }

    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start time of each step.
    pub fn step_starts(&self) -> Vec<Duration> {
        let mut starts = Vec::with_capacity(self.steps.len());
        let mut end = Duration::ZERO;
        for step in &self.steps {
            let start = match step.position {
                Position::Sequential => end,
                Position::Overlap(d) => end.saturating_sub(d),
                Position::Gap(d) => end + d,
                Position::At(t) => t,
            };
            end = end.max(start + step.vars.total_duration(step.targets.len()));
            starts.push(start);
        }
        starts
    }

    /// Total wall-clock length of the timeline.
    pub fn total_duration(&self) -> Duration {
        self.step_starts()
            .into_iter()
            .zip(&self.steps)
            .map(|(start, step)| start + step.vars.total_duration(step.targets.len()))
            .max()
            .unwrap_or(Duration::ZERO)
    }
}
