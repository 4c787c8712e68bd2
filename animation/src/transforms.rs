//! The basic animations: alpha, translation, scale, and rotation.

mod alpha;
mod rotate;
mod scale;
mod translate;

pub use alpha::AlphaAnimation;
pub use rotate::RotateAnimation;
pub use scale::ScaleAnimation;
pub use translate::TranslateAnimation;

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
