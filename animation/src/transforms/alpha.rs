use log::warn;
use motion_geometry::Transformation;

use super::lerp;
use crate::{Animation, AnimationState, Millis};

/// Animates the opacity from one value to another.
#[derive(Debug)]
pub struct AlphaAnimation {
    state: AnimationState,
    from: f64,
    to: f64,
}

impl AlphaAnimation {
    /// `from` and `to` are clamped to `0.0..=1.0`.
    pub fn new(from: f64, to: f64, duration: Millis) -> Self {
        Self {
            state: AnimationState::with_duration(duration),
            from: alpha(from),
            to: alpha(to),
        }
    }
}

impl Animation for AlphaAnimation {
    fn state(&self) -> &AnimationState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    fn apply_transformation(
        &mut self,
        interpolated_time: f64,
        transformation: &mut Transformation,
    ) {
        transformation.set_alpha(lerp(self.from, self.to, interpolated_time));
    }

    fn has_alpha(&self) -> bool {
        true
    }

    fn will_change_transformation_matrix(&self) -> bool {
        false
    }

    fn will_change_bounds(&self) -> bool {
        false
    }
}

fn alpha(mut v: f64) -> f64 {
    if v.is_nan() {
        warn!("Alpha provided with NaN, set to 1.0");
        v = 1.0;
    }
    let clamped = v.clamp(0.0, 1.0);
    if clamped != v {
        warn!("Alpha clamped to be in the 0.0..1.0 range, was: {v}");
    }
    clamped
}
