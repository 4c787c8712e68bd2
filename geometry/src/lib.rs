//! 2D geometry for view animations: points, sizes, and the affine/alpha [`Transformation`] that
//! animations produce.

mod affine;
mod point;
mod size;
mod transformation;

pub use affine::*;
pub use point::*;
pub use size::*;
pub use transformation::*;

pub type Affine2 = glam::DAffine2;
pub type Vector2 = glam::DVec2;
