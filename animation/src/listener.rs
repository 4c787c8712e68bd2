use std::sync::Arc;

use crate::Animation;

/// Receives lifecycle notifications of an animation.
///
/// Notifications are delivered synchronously from inside the frame that caused them. Every
/// callback receives the animation that caused it. A listener of a child in an
/// [`AnimationSet`](crate::AnimationSet) must use that reference instead of locking the child's
/// handle, because the set holds the handle's lock while the child runs.
pub trait AnimationListener: Send + Sync {
    fn on_animation_start(&self, _animation: &mut dyn Animation) {}
    fn on_animation_end(&self, _animation: &mut dyn Animation) {}
    fn on_animation_repeat(&self, _animation: &mut dyn Animation) {}
}

pub type SharedListener = Arc<dyn AnimationListener>;
