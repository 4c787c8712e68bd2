//! Test doubles shared by the unit tests of this crate.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use motion_geometry::Transformation;

use crate::{Animation, AnimationListener, AnimationState, Millis};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An animation that writes a fixed transformation and records the interpolated time it was
/// applied with.
#[derive(Debug)]
pub struct Recorder {
    state: AnimationState,
    transformation: Transformation,
    last_applied: Option<f64>,
    alpha: bool,
}

impl Recorder {
    pub fn new(duration: Millis) -> Self {
        Self {
            state: AnimationState::with_duration(duration),
            transformation: Transformation::IDENTITY,
            last_applied: None,
            alpha: false,
        }
    }

    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn with_start_offset(mut self, start_offset: Millis) -> Self {
        self.set_start_offset(start_offset);
        self
    }

    pub fn with_alpha(mut self) -> Self {
        self.alpha = true;
        self
    }

    pub fn last_applied(&self) -> Option<f64> {
        self.last_applied
    }
}

impl Animation for Recorder {
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
        self.last_applied = Some(interpolated_time);
        transformation.set(&self.transformation);
    }

    fn has_alpha(&self) -> bool {
        self.alpha
    }

    fn will_change_transformation_matrix(&self) -> bool {
        self.transformation.matrix() != Transformation::IDENTITY.matrix()
    }

    fn will_change_bounds(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct CountingListener {
    starts: AtomicUsize,
    ends: AtomicUsize,
    repeats: AtomicUsize,
}

impl CountingListener {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn ends(&self) -> usize {
        self.ends.load(Ordering::SeqCst)
    }

    pub fn repeats(&self) -> usize {
        self.repeats.load(Ordering::SeqCst)
    }
}

impl AnimationListener for CountingListener {
    fn on_animation_start(&self, _animation: &mut dyn Animation) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_animation_end(&self, _animation: &mut dyn Animation) {
        self.ends.fetch_add(1, Ordering::SeqCst);
    }

    fn on_animation_repeat(&self, _animation: &mut dyn Animation) {
        self.repeats.fetch_add(1, Ordering::SeqCst);
    }
}

/// Restarts the animation it listens to when it ends, a limited number of times.
#[derive(Debug)]
pub struct RestartingListener {
    remaining: AtomicUsize,
    ends_seen: AtomicUsize,
}

impl RestartingListener {
    pub fn shared(restarts: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining: AtomicUsize::new(restarts),
            ends_seen: AtomicUsize::new(0),
        })
    }

    /// How often the end was notified while the animation reported itself as ended.
    pub fn ends_seen(&self) -> usize {
        self.ends_seen.load(Ordering::SeqCst)
    }
}

impl AnimationListener for RestartingListener {
    fn on_animation_end(&self, animation: &mut dyn Animation) {
        if animation.has_ended() {
            self.ends_seen.fetch_add(1, Ordering::SeqCst);
        }
        let restart = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if restart {
            animation.start();
        }
    }
}
