use motion_geometry::{Affine2, AffineExt, Point, Size, Transformation};

use super::lerp;
use crate::{Animation, AnimationState, Dimension, Millis};

/// Rotates the object around a pivot point. Angles are in degrees.
#[derive(Debug)]
pub struct RotateAnimation {
    state: AnimationState,
    from_degrees: f64,
    to_degrees: f64,
    pivot_x: Dimension,
    pivot_y: Dimension,
    pivot: Point,
}

impl RotateAnimation {
    /// Rotate around the origin of the object.
    pub fn new(from_degrees: f64, to_degrees: f64, duration: Millis) -> Self {
        Self::with_pivot(
            from_degrees,
            to_degrees,
            Dimension::default(),
            Dimension::default(),
            duration,
        )
    }

    pub fn with_pivot(
        from_degrees: f64,
        to_degrees: f64,
        pivot_x: impl Into<Dimension>,
        pivot_y: impl Into<Dimension>,
        duration: Millis,
    ) -> Self {
        let mut animation = Self {
            state: AnimationState::with_duration(duration),
            from_degrees,
            to_degrees,
            pivot_x: pivot_x.into(),
            pivot_y: pivot_y.into(),
            pivot: Point::ZERO,
        };
        animation.resolve(Size::EMPTY, Size::EMPTY);
        animation
    }

    fn resolve(&mut self, size: Size, parent_size: Size) {
        self.pivot = Point::new(
            self.pivot_x.resolve(size.width, parent_size.width),
            self.pivot_y.resolve(size.height, parent_size.height),
        );
    }
}

impl Animation for RotateAnimation {
    fn state(&self) -> &AnimationState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    fn initialize(&mut self, size: Size, parent_size: Size) {
        self.reset();
        self.state.mark_initialized();
        self.resolve(size, parent_size);
    }

    fn apply_transformation(
        &mut self,
        interpolated_time: f64,
        transformation: &mut Transformation,
    ) {
        let degrees = lerp(self.from_degrees, self.to_degrees, interpolated_time);
        let pivot = self.pivot * self.scale_factor();
        transformation.set_matrix(Affine2::from_rotation_degrees_about(degrees, pivot));
    }
}
