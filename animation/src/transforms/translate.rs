use motion_geometry::{Affine2, Size, Transformation, Vector2};

use super::lerp;
use crate::{Animation, AnimationState, Dimension, Millis};

/// Moves the object from one offset to another.
#[derive(Debug)]
pub struct TranslateAnimation {
    state: AnimationState,
    from_x: Dimension,
    to_x: Dimension,
    from_y: Dimension,
    to_y: Dimension,
    /// `from_x`, `to_x`, `from_y`, `to_y` resolved by the last `initialize()`.
    resolved: [f64; 4],
}

impl TranslateAnimation {
    pub fn new(
        from_x: impl Into<Dimension>,
        to_x: impl Into<Dimension>,
        from_y: impl Into<Dimension>,
        to_y: impl Into<Dimension>,
        duration: Millis,
    ) -> Self {
        let mut animation = Self {
            state: AnimationState::with_duration(duration),
            from_x: from_x.into(),
            to_x: to_x.into(),
            from_y: from_y.into(),
            to_y: to_y.into(),
            resolved: [0.0; 4],
        };
        animation.resolve(Size::EMPTY, Size::EMPTY);
        animation
    }

    fn resolve(&mut self, size: Size, parent_size: Size) {
        self.resolved = [
            self.from_x.resolve(size.width, parent_size.width),
            self.to_x.resolve(size.width, parent_size.width),
            self.from_y.resolve(size.height, parent_size.height),
            self.to_y.resolve(size.height, parent_size.height),
        ];
    }
}

impl Animation for TranslateAnimation {
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
        let [from_x, to_x, from_y, to_y] = self.resolved;
        let dx = lerp(from_x, to_x, interpolated_time);
        let dy = lerp(from_y, to_y, interpolated_time);
        transformation.set_matrix(Affine2::from_translation(Vector2::new(dx, dy)));
    }
}
