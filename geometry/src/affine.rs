use crate::{Affine2, Point, Vector2};

/// Constructors for the matrices view animations produce.
pub trait AffineExt {
    /// A rotation by `degrees` around `pivot`.
    ///
    /// Positive angles rotate clockwise on a y-down screen.
    fn from_rotation_degrees_about(degrees: f64, pivot: Point) -> Self;

    /// A non-uniform scale around `pivot`.
    fn from_scale_about(sx: f64, sy: f64, pivot: Point) -> Self;
}

impl AffineExt for Affine2 {
    fn from_rotation_degrees_about(degrees: f64, pivot: Point) -> Self {
        let rotation = Affine2::from_angle(degrees.to_radians());
        around(rotation, pivot)
    }

    fn from_scale_about(sx: f64, sy: f64, pivot: Point) -> Self {
        let scale = Affine2::from_scale(Vector2::new(sx, sy));
        around(scale, pivot)
    }
}

fn around(matrix: Affine2, pivot: Point) -> Affine2 {
    if pivot.is_zero() {
        return matrix;
    }
    let pivot: Vector2 = pivot.into();
    Affine2::from_translation(pivot) * matrix * Affine2::from_translation(-pivot)
}
