//! Easing curves.
//!
//! Names follow the `family.direction` convention used in motion configs,
//! e.g. `"power2.out"`. `apply` maps linear progress in [0, 1] onto the curve.

use serde::{Deserialize, Serialize};

/// Overshoot used by `Ease::BackOut`.
const BACK_OVERSHOOT: f32 = 1.7;

/// An easing curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    #[serde(rename = "none")]
    Linear,
    #[serde(rename = "power2.in")]
    Power2In,
    #[serde(rename = "power2.out")]
    Power2Out,
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "power3.in")]
    Power3In,
    #[serde(rename = "power3.out")]
    Power3Out,
    #[serde(rename = "power3.inOut")]
    Power3InOut,
    #[serde(rename = "back.out")]
    BackOut,
    #[serde(rename = "expo.out")]
    ExpoOut,
}

impl Ease {
    /// Map linear progress onto the curve. Input is clamped to [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2In => ease_in(t, 3),
            Ease::Power2Out => ease_out(t, 3),
            Ease::Power2InOut => ease_in_out(t, 3),
            Ease::Power3In => ease_in(t, 4),
            Ease::Power3Out => ease_out(t, 4),
            Ease::Power3InOut => ease_in_out(t, 4),
            Ease::BackOut => {
                let u = t - 1.0;
                1.0 + (BACK_OVERSHOOT + 1.0) * u.powi(3) + BACK_OVERSHOOT * u.powi(2)
            }
            Ease::ExpoOut if t >= 1.0 => 1.0,
            Ease::ExpoOut => 1.0 - 2f32.powf(-10.0 * t),
        }
    }

    /// Whether the curve slows down towards its end.
    pub fn decelerates(self) -> bool {
        !matches!(self, Ease::Linear | Ease::Power2In | Ease::Power3In)
    }
}

fn ease_in(t: f32, power: i32) -> f32 {
    t.powi(power)
}

fn ease_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

fn ease_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        (2.0 * t).powi(power) / 2.0
    } else {
        1.0 - (2.0 * (1.0 - t)).powi(power) / 2.0
    }
}
