//! View animations: animations that produce a [`Transformation`] per frame, and
//! [`AnimationSet`], which plays a group of them together and composes their transformations.
//!
//! Frames are advanced synchronously by the caller, once per frame, through
//! [`Animation::transformation_at`].
//!
//! [`Transformation`]: motion_geometry::Transformation

mod animation;
mod animation_set;
mod dimension;
mod interpolator;
mod listener;
mod time;
mod transforms;

#[cfg(test)]
mod testing;

pub use animation::*;
pub use animation_set::*;
pub use dimension::*;
pub use interpolator::*;
pub use listener::*;
pub use time::*;
pub use transforms::*;
