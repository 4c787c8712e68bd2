use motion_geometry::{Affine2, AffineExt, Point, Size, Transformation};

use super::lerp;
use crate::{Animation, AnimationState, Dimension, Millis};

/// Scales the object around a pivot point.
#[derive(Debug)]
pub struct ScaleAnimation {
    state: AnimationState,
    from_x: f64,
    to_x: f64,
    from_y: f64,
    to_y: f64,
    pivot_x: Dimension,
    pivot_y: Dimension,
    pivot: Point,
}

impl ScaleAnimation {
    /// Scale around the origin of the object.
    pub fn new(from_x: f64, to_x: f64, from_y: f64, to_y: f64, duration: Millis) -> Self {
        Self::with_pivot(
            from_x,
            to_x,
            from_y,
            to_y,
            Dimension::default(),
            Dimension::default(),
            duration,
        )
    }

    pub fn with_pivot(
        from_x: f64,
        to_x: f64,
        from_y: f64,
        to_y: f64,
        pivot_x: impl Into<Dimension>,
        pivot_y: impl Into<Dimension>,
        duration: Millis,
    ) -> Self {
        let mut animation = Self {
            state: AnimationState::with_duration(duration),
            from_x,
            to_x,
            from_y,
            to_y,
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

impl Animation for ScaleAnimation {
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
        let mut sx = 1.0;
        let mut sy = 1.0;
        if self.from_x != 1.0 || self.to_x != 1.0 {
            sx = lerp(self.from_x, self.to_x, interpolated_time);
        }
        if self.from_y != 1.0 || self.to_y != 1.0 {
            sy = lerp(self.from_y, self.to_y, interpolated_time);
        }

        let pivot = self.pivot * self.scale_factor();
        transformation.set_matrix(Affine2::from_scale_about(sx, sy, pivot));
    }
}
