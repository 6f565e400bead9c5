//! Fixed animation recipes.
//!
//! Each recipe turns a rendered region into one binding: start values, end
//! values and, except for the entrance, a scroll trigger region.

use folio_core::{
    Ease, EdgeOffset, Origin, Property, Props, Region, Scrub, TriggerSpec, TweenVars,
};

use crate::binding::AnimationBinding;

/// Horizontal drift direction for marquee-style parallax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// A named animation recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recipe {
    /// Children rise and fade in once, on mount. No trigger.
    HeroEntrance,
    /// Element rises 100px and fades in while its top crosses 80%..50%.
    FadeUp,
    /// Element grows from half size while its top crosses 80%..50%.
    ScaleUp,
    /// Children (or the element) drift sideways while the element passes
    /// through the viewport. Smoothed scrub.
    HorizontalParallax { direction: Direction, shift_pct: f32 },
    /// Element moves down by `distance` while passing through the viewport.
    VerticalParallax { distance: f32, smoothing: Option<f32> },
    /// Children fade in one after another while the top crosses 70%..40%.
    StaggeredChildrenFade,
    /// Element fills vertically with whole-document scroll progress.
    VerticalProgressFill,
    /// Signature paths draw in one after another while the element passes
    /// top 80%..bottom 60%. Dash offsets are fractions of each path length.
    SignatureDraw,
    /// Element turns a full circle every `period_secs`, forever. No trigger.
    Spin { period_secs: f32 },
}

impl Recipe {
    /// Parallax used for stacked images: deeper images move further.
    pub fn image_parallax(index: usize) -> Self {
        Recipe::VerticalParallax {
            distance: (index as f32 + 1.0) * 30.0,
            smoothing: Some(1.0),
        }
    }

    /// Marquee text drifting 10% in `direction`.
    pub fn marquee(direction: Direction) -> Self {
        Recipe::HorizontalParallax {
            direction,
            shift_pct: 10.0,
        }
    }

    /// Circular text badge: one turn every 30 seconds.
    pub fn circular_text() -> Self {
        Recipe::Spin { period_secs: 30.0 }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recipe::HeroEntrance => "hero-entrance",
            Recipe::FadeUp => "fade-up",
            Recipe::ScaleUp => "scale-up",
            Recipe::HorizontalParallax { .. } => "horizontal-parallax",
            Recipe::VerticalParallax { .. } => "vertical-parallax",
            Recipe::StaggeredChildrenFade => "staggered-children-fade",
            Recipe::VerticalProgressFill => "vertical-progress-fill",
            Recipe::SignatureDraw => "signature-draw",
            Recipe::Spin { .. } => "spin",
        }
    }

    /// Build the binding for a region.
    ///
    /// Returns `None` when the recipe animates children and the region has
    /// none, since there would be nothing to animate.
    pub fn binding(&self, region: &Region) -> Option<AnimationBinding> {
        let el = region.element;
        let builder = match *self {
            Recipe::HeroEntrance => {
                if region.children.is_empty() {
                    return None;
                }
                let vars = TweenVars::from_to(
                    Props::new().with(Property::Y, 100.0).with(Property::Opacity, 0.0),
                    Props::new().with(Property::Y, 0.0).with(Property::Opacity, 1.0),
                )
                .duration(1.2)
                .stagger(0.2)
                .ease(Ease::Power3Out);
                AnimationBinding::builder(el, vars).targets(region.children.clone())
            }
            Recipe::FadeUp => {
                let vars = TweenVars::from_to(
                    Props::new().with(Property::Opacity, 0.0).with(Property::Y, 100.0),
                    Props::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
                )
                .ease(Ease::Linear);
                AnimationBinding::builder(el, vars).trigger(entrance_trigger(region, Scrub::Locked))
            }
            Recipe::ScaleUp => {
                let vars = TweenVars::from_to(
                    Props::new().with(Property::Scale, 0.5),
                    Props::new().with(Property::Scale, 1.0),
                )
                .ease(Ease::Linear);
                AnimationBinding::builder(el, vars).trigger(entrance_trigger(region, Scrub::Locked))
            }
            Recipe::HorizontalParallax {
                direction,
                shift_pct,
            } => {
                let shift = match direction {
                    Direction::Left => -shift_pct,
                    Direction::Right => shift_pct,
                };
                let vars =
                    TweenVars::to(Props::new().with(Property::XPercent, shift)).ease(Ease::Linear);
                let targets = if region.children.is_empty() {
                    vec![el]
                } else {
                    region.children.clone()
                };
                AnimationBinding::builder(el, vars)
                    .targets(targets)
                    .trigger(pass_through_trigger(region, Scrub::smoothed(5.0)))
            }
            Recipe::VerticalParallax {
                distance,
                smoothing,
            } => {
                let scrub = smoothing.map(Scrub::smoothed).unwrap_or(Scrub::Locked);
                let vars = TweenVars::to(Props::new().with(Property::Y, distance)).ease(Ease::Linear);
                AnimationBinding::builder(el, vars).trigger(pass_through_trigger(region, scrub))
            }
            Recipe::StaggeredChildrenFade => {
                if region.children.is_empty() {
                    return None;
                }
                let vars = TweenVars::from_to(
                    Props::new().with(Property::Opacity, 0.0).with(Property::Y, 50.0),
                    Props::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
                )
                .stagger(0.1)
                .ease(Ease::Linear);
                let trigger = TriggerSpec::element(
                    el,
                    EdgeOffset::new(0.0, 0.7),
                    EdgeOffset::new(0.0, 0.4),
                    Scrub::Locked,
                );
                AnimationBinding::builder(el, vars)
                    .targets(region.children.clone())
                    .trigger(trigger)
            }
            Recipe::VerticalProgressFill => {
                let vars = TweenVars::from_to(
                    Props::new().with(Property::ScaleY, 0.0),
                    Props::new().with(Property::ScaleY, 1.0),
                )
                .ease(Ease::Linear)
                .origin(Origin::Top);
                AnimationBinding::builder(el, vars).trigger(TriggerSpec::document(Scrub::Locked))
            }
            Recipe::SignatureDraw => {
                let vars = TweenVars::from_to(
                    Props::new().with(Property::StrokeDashoffset, 1.0),
                    Props::new().with(Property::StrokeDashoffset, 0.0),
                )
                .duration(1.0)
                .stagger(0.3)
                .ease(Ease::Linear);
                let trigger = TriggerSpec::element(
                    el,
                    EdgeOffset::new(0.0, 0.8),
                    EdgeOffset::new(1.0, 0.6),
                    Scrub::smoothed(1.0),
                );
                let targets = if region.children.is_empty() {
                    vec![el]
                } else {
                    region.children.clone()
                };
                AnimationBinding::builder(el, vars).targets(targets).trigger(trigger)
            }
            Recipe::Spin { period_secs } => {
                let vars = TweenVars::from_to(
                    Props::new().with(Property::Rotation, 0.0),
                    Props::new().with(Property::Rotation, 360.0),
                )
                .duration(period_secs)
                .ease(Ease::Linear)
                .origin(Origin::Center)
                .repeat_forever();
                AnimationBinding::builder(el, vars)
            }
        };
        Some(builder.label(self.label()).build())
    }
}

/// `"top 80%"` to `"top 50%"` on the region's element.
fn entrance_trigger(region: &Region, scrub: Scrub) -> TriggerSpec {
    TriggerSpec::element(
        region.element,
        EdgeOffset::new(0.0, 0.8),
        EdgeOffset::new(0.0, 0.5),
        scrub,
    )
}

/// `"top bottom"` to `"bottom top"`: the whole time the element is visible.
fn pass_through_trigger(region: &Region, scrub: Scrub) -> TriggerSpec {
    TriggerSpec::element(
        region.element,
        EdgeOffset::new(0.0, 1.0),
        EdgeOffset::new(1.0, 0.0),
        scrub,
    )
}
