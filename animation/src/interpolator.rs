//! Interpolators map the elapsed fraction of an animation to the fraction that is applied.

use std::{f64::consts::PI, fmt, sync::Arc};

/// Maps the linear elapsed fraction of an animation (`0.0..=1.0`) to an eased fraction.
///
/// The result may leave the `0..1` range (for example when anticipating or overshooting).
pub trait Interpolator: fmt::Debug + Send + Sync {
    fn interpolation(&self, input: f64) -> f64;
}

pub type SharedInterpolator = Arc<dyn Interpolator>;

/// The standard interpolators of the view animation model.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Interpolation {
    Linear,
    /// Starts slowly and speeds up. A factor of 1.0 is a parabola.
    Accelerate { factor: f64 },
    /// Starts quickly and slows down. A factor of 1.0 is an inverted parabola.
    Decelerate { factor: f64 },
    /// Starts and ends slowly, fastest in the middle.
    #[default]
    AccelerateDecelerate,
    /// Moves backwards first, then flings forward.
    Anticipate { tension: f64 },
    /// Flings forward, overshoots the end, and comes back.
    Overshoot { tension: f64 },
    /// Anticipates and overshoots. The tension is scaled by 1.5 internally.
    AnticipateOvershoot { tension: f64 },
    /// Bounces at the end.
    Bounce,
    /// Repeats a sine wave `cycles` times.
    Cycle { cycles: f64 },
}

impl Interpolation {
    pub const fn accelerate() -> Self {
        Self::Accelerate { factor: 1.0 }
    }

    pub const fn decelerate() -> Self {
        Self::Decelerate { factor: 1.0 }
    }

    pub const fn anticipate() -> Self {
        Self::Anticipate { tension: 2.0 }
    }

    pub const fn overshoot() -> Self {
        Self::Overshoot { tension: 2.0 }
    }

    pub const fn anticipate_overshoot() -> Self {
        Self::AnticipateOvershoot { tension: 2.0 }
    }

    pub fn shared(self) -> SharedInterpolator {
        Arc::new(self)
    }
}

impl Interpolator for Interpolation {
    fn interpolation(&self, t: f64) -> f64 {
        match *self {
            Interpolation::Linear => t,
            Interpolation::Accelerate { factor } => {
                if factor == 1.0 {
                    t * t
                } else {
                    t.powf(2.0 * factor)
                }
            }
            Interpolation::Decelerate { factor } => {
                if factor == 1.0 {
                    1.0 - (1.0 - t) * (1.0 - t)
                } else {
                    1.0 - (1.0 - t).powf(2.0 * factor)
                }
            }
            Interpolation::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
            Interpolation::Anticipate { tension } => anticipate(t, tension),
            Interpolation::Overshoot { tension } => overshoot(t - 1.0, tension) + 1.0,
            Interpolation::AnticipateOvershoot { tension } => {
                let tension = tension * 1.5;
                if t < 0.5 {
                    0.5 * anticipate(t * 2.0, tension)
                } else {
                    0.5 * (overshoot(t * 2.0 - 2.0, tension) + 2.0)
                }
            }
            Interpolation::Bounce => bounce_out(t),
            Interpolation::Cycle { cycles } => (2.0 * cycles * PI * t).sin(),
        }
    }
}

fn anticipate(t: f64, tension: f64) -> f64 {
    t * t * ((tension + 1.0) * t - tension)
}

fn overshoot(t: f64, tension: f64) -> f64 {
    t * t * ((tension + 1.0) * t + tension)
}

fn bounce_out(t: f64) -> f64 {
    fn bounce(t: f64) -> f64 {
        t * t * 8.0
    }

    let t = t * 1.1226;
    if t < 0.3535 {
        bounce(t)
    } else if t < 0.7408 {
        bounce(t - 0.54719) + 0.7
    } else if t < 0.9644 {
        bounce(t - 0.8526) + 0.9
    } else {
        bounce(t - 1.0435) + 0.95
    }
}
