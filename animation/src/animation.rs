use std::{fmt, sync::Arc};

use log::{debug, trace, warn};
use motion_geometry::{Size, Transformation};
use parking_lot::Mutex;

use crate::{
    AnimationClock, AnimationListener, CANCELED, Interpolation, Interpolator, Millis,
    START_ON_FIRST_FRAME, SharedInterpolator, SharedListener,
};

/// What happens when an animation reaches its end and still has repeats left.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Start over from the beginning.
    #[default]
    Restart,
    /// Play backwards, then forwards again, alternating on every repeat.
    Reverse,
}

/// How many times an animation repeats after its first run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RepeatCount {
    Times(u32),
    Infinite,
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Times(0)
    }
}

/// A shared, lockable animation.
///
/// Children of an [`AnimationSet`](crate::AnimationSet) are referred to through handles, so the
/// caller can keep controlling an animation after adding it to a set.
pub type AnimationHandle = Arc<Mutex<dyn Animation>>;

/// Wrap an animation into an [`AnimationHandle`].
pub fn shared(animation: impl Animation + 'static) -> AnimationHandle {
    let handle: AnimationHandle = Arc::new(Mutex::new(animation));
    handle
}

/// Timing and lifecycle state every animation carries.
pub struct AnimationState {
    pub(crate) duration: Millis,
    pub(crate) start_offset: Millis,
    pub(crate) start_time: Millis,
    pub(crate) fill_before: bool,
    pub(crate) fill_after: bool,
    pub(crate) fill_enabled: bool,
    pub(crate) repeat_mode: RepeatMode,
    pub(crate) repeat_count: RepeatCount,
    /// Number of repeats already played.
    pub(crate) repeated: u32,
    /// `true` while a reversed repeat plays backwards.
    pub(crate) cycle_flip: bool,
    pub(crate) started: bool,
    pub(crate) ended: bool,
    pub(crate) more: bool,
    /// Report one more frame after the animation ended, so that the final state gets drawn.
    pub(crate) one_more_time: bool,
    pub(crate) initialized: bool,
    pub(crate) interpolator: Option<SharedInterpolator>,
    pub(crate) listener: Option<SharedListener>,
    pub(crate) scale_factor: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            duration: 0,
            start_offset: 0,
            start_time: START_ON_FIRST_FRAME,
            fill_before: true,
            fill_after: false,
            fill_enabled: false,
            repeat_mode: RepeatMode::default(),
            repeat_count: RepeatCount::default(),
            repeated: 0,
            cycle_flip: false,
            started: false,
            ended: false,
            more: true,
            one_more_time: true,
            initialized: false,
            interpolator: None,
            listener: None,
            scale_factor: 1.0,
        }
    }
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationState")
            .field("duration", &self.duration)
            .field("start_offset", &self.start_offset)
            .field("start_time", &self.start_time)
            .field("fill_before", &self.fill_before)
            .field("fill_after", &self.fill_after)
            .field("fill_enabled", &self.fill_enabled)
            .field("repeat_mode", &self.repeat_mode)
            .field("repeat_count", &self.repeat_count)
            .field("repeated", &self.repeated)
            .field("started", &self.started)
            .field("ended", &self.ended)
            .field("interpolator", &self.interpolator)
            .field("listener", &self.listener.is_some())
            .field("scale_factor", &self.scale_factor)
            .finish_non_exhaustive()
    }
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Millis) -> Self {
        Self {
            duration: non_negative(duration),
            ..Self::default()
        }
    }

    pub(crate) fn reset(&mut self) {
        self.initialized = false;
        self.cycle_flip = false;
        self.repeated = 0;
        self.more = true;
        self.one_more_time = true;
    }

    pub(crate) fn restart_at(&mut self, start_time: Millis) {
        self.start_time = start_time;
        self.started = false;
        self.ended = false;
        self.cycle_flip = false;
        self.repeated = 0;
        self.more = true;
    }

    /// Mark the animation as initialized.
    ///
    /// Implementations that override [`Animation::initialize`] call this after
    /// [`Animation::reset`].
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }
}

/// Invoke `f` with the listener of `animation`, if there is one.
///
/// The listener is cloned out of the state first, so it receives the animation itself and may
/// inspect or restart it.
pub(crate) fn notify(
    animation: &mut dyn Animation,
    f: impl FnOnce(&dyn AnimationListener, &mut dyn Animation),
) {
    if let Some(listener) = animation.state().listener.clone() {
        f(&*listener, animation);
    }
}

/// Access to an animation as a trait object.
///
/// Implemented for every sized [`Animation`], so that the provided trait methods can hand `self`
/// to a listener.
pub trait AsAnimation {
    fn as_animation(&self) -> &dyn Animation;
    fn as_animation_mut(&mut self) -> &mut dyn Animation;
}

impl<T: Animation> AsAnimation for T {
    fn as_animation(&self) -> &dyn Animation {
        self
    }

    fn as_animation_mut(&mut self) -> &mut dyn Animation {
        self
    }
}

/// An animation that produces a [`Transformation`] for a point in time.
///
/// Implementors provide access to their [`AnimationState`] and override
/// [`apply_transformation`](Animation::apply_transformation). Everything else has a default that
/// implements the common timing model: start offset, fill behavior, repeats, interpolation, and
/// listener notifications.
pub trait Animation: AsAnimation + fmt::Debug + Send {
    fn state(&self) -> &AnimationState;
    fn state_mut(&mut self) -> &mut AnimationState;

    /// Write the transformation at `interpolated_time` into `transformation`.
    ///
    /// `interpolated_time` is the elapsed fraction after the interpolator was applied.
    fn apply_transformation(
        &mut self,
        _interpolated_time: f64,
        _transformation: &mut Transformation,
    ) {
    }

    /// Prepare the animation for an object of `size` inside a parent of `parent_size`.
    fn initialize(&mut self, _size: Size, _parent_size: Size) {
        self.reset();
        self.state_mut().mark_initialized();
    }

    fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    /// Reset the animation so that it can be initialized and run again.
    fn reset(&mut self) {
        self.state_mut().reset();
    }

    /// Cancel the animation.
    ///
    /// Notifies the end if the animation was running. A cancelled animation ends on its next
    /// frame.
    fn cancel(&mut self) {
        let state = self.state_mut();
        let was_running = state.started && !state.ended;
        if was_running {
            debug!("Animation canceled while running");
            state.ended = true;
        }
        state.start_time = CANCELED;
        state.more = false;
        state.one_more_time = false;

        if was_running {
            notify(self.as_animation_mut(), |l, a| l.on_animation_end(a));
        }
    }

    fn is_canceled(&self) -> bool {
        self.state().start_time == CANCELED
    }

    fn start_time(&self) -> Millis {
        self.state().start_time
    }

    /// Set the time the animation starts. This also clears the started, ended, and repeat state.
    fn set_start_time(&mut self, start_time: Millis) {
        self.state_mut().restart_at(start_time);
    }

    /// Start on the first frame that is requested.
    fn start(&mut self) {
        self.set_start_time(START_ON_FIRST_FRAME);
    }

    fn start_now(&mut self, clock: &AnimationClock) {
        self.set_start_time(clock.now());
    }

    fn duration(&self) -> Millis {
        self.state().duration
    }

    fn set_duration(&mut self, duration: Millis) {
        self.state_mut().duration = non_negative(duration);
    }

    fn start_offset(&self) -> Millis {
        self.state().start_offset
    }

    fn set_start_offset(&mut self, start_offset: Millis) {
        self.state_mut().start_offset = start_offset;
    }

    fn fill_before(&self) -> bool {
        self.state().fill_before
    }

    fn set_fill_before(&mut self, fill_before: bool) {
        self.state_mut().fill_before = fill_before;
    }

    fn fill_after(&self) -> bool {
        self.state().fill_after
    }

    fn set_fill_after(&mut self, fill_after: bool) {
        self.state_mut().fill_after = fill_after;
    }

    /// If fill is enabled, `fill_before` and `fill_after` decide whether the animation applies
    /// outside of its active window. Otherwise it always applies.
    fn fill_enabled(&self) -> bool {
        self.state().fill_enabled
    }

    fn set_fill_enabled(&mut self, fill_enabled: bool) {
        self.state_mut().fill_enabled = fill_enabled;
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.state().repeat_mode
    }

    fn set_repeat_mode(&mut self, repeat_mode: RepeatMode) {
        self.state_mut().repeat_mode = repeat_mode;
    }

    fn repeat_count(&self) -> RepeatCount {
        self.state().repeat_count
    }

    fn set_repeat_count(&mut self, repeat_count: RepeatCount) {
        self.state_mut().repeat_count = repeat_count;
    }

    fn interpolator(&self) -> Option<&SharedInterpolator> {
        self.state().interpolator.as_ref()
    }

    fn set_interpolator(&mut self, interpolator: SharedInterpolator) {
        self.state_mut().interpolator = Some(interpolator);
    }

    /// Install the default interpolator if none is set.
    fn ensure_interpolator(&mut self) {
        self.state_mut()
            .interpolator
            .get_or_insert_with(|| Interpolation::default().shared());
    }

    fn set_listener(&mut self, listener: Option<SharedListener>) {
        self.state_mut().listener = listener;
    }

    /// The scale factor passed to the last
    /// [`scaled_transformation_at`](Animation::scaled_transformation_at).
    fn scale_factor(&self) -> f64 {
        self.state().scale_factor
    }

    fn has_started(&self) -> bool {
        self.state().started
    }

    fn has_ended(&self) -> bool {
        self.state().ended
    }

    /// `true` if the last frame asked for more frames.
    fn is_running(&self) -> bool {
        self.state().more
    }

    fn has_alpha(&self) -> bool {
        false
    }

    fn will_change_transformation_matrix(&self) -> bool {
        true
    }

    fn will_change_bounds(&self) -> bool {
        true
    }

    /// Scale duration and start offset of the current run.
    fn scale_current_duration(&mut self, scale: f64) {
        if !scale.is_finite() || scale < 0.0 {
            warn!("Ignoring invalid duration scale: {scale}");
            return;
        }
        let state = self.state_mut();
        state.duration = (state.duration as f64 * scale) as Millis;
        state.start_offset = (state.start_offset as f64 * scale) as Millis;
    }

    /// An estimate of how long the animation runs including all of its repeats.
    ///
    /// Infinitely repeating animations return [`Millis::MAX`].
    fn compute_duration_hint(&self) -> Millis {
        let single = self.start_offset().saturating_add(self.duration());
        match self.repeat_count() {
            RepeatCount::Times(n) => single.saturating_mul(Millis::from(n) + 1),
            RepeatCount::Infinite => Millis::MAX,
        }
    }

    /// Compute the transformation at `current_time` into `out`.
    ///
    /// Returns `true` while the animation needs more frames. After the animation ended, one more
    /// `true` is returned so that the final frame gets drawn.
    fn transformation_at(&mut self, current_time: Millis, out: &mut Transformation) -> bool {
        if self.state().start_time == START_ON_FIRST_FRAME {
            self.state_mut().start_time = current_time;
        }

        let canceled = self.is_canceled();
        let state = self.state_mut();
        let begin = state.start_time.saturating_add(state.start_offset);
        let mut normalized = if state.duration != 0 {
            current_time.saturating_sub(begin) as f64 / state.duration as f64
        } else if current_time < state.start_time {
            0.0
        } else {
            1.0
        };

        let expired = normalized >= 1.0 || canceled;
        let mut more = !expired;

        if !state.fill_enabled {
            normalized = normalized.clamp(0.0, 1.0);
        }

        let applies =
            (normalized >= 0.0 || state.fill_before) && (normalized <= 1.0 || state.fill_after);

        if applies {
            let starting = !state.started;
            if starting {
                trace!("Animation started at {current_time}");
                state.started = true;
            }
            if state.fill_enabled {
                normalized = normalized.clamp(0.0, 1.0);
            }
            if state.cycle_flip {
                normalized = 1.0 - normalized;
            }
            let interpolated = match &state.interpolator {
                Some(interpolator) => interpolator.interpolation(normalized),
                None => Interpolation::default().interpolation(normalized),
            };
            if starting {
                notify(self.as_animation_mut(), |l, a| l.on_animation_start(a));
            }
            self.apply_transformation(interpolated, out);
        }

        let mut ending = false;
        let mut repeating = false;
        let state = self.state_mut();
        if expired {
            let exhausted = match state.repeat_count {
                RepeatCount::Times(n) => state.repeated >= n,
                RepeatCount::Infinite => false,
            };
            if exhausted || canceled {
                if !state.ended {
                    trace!("Animation ended at {current_time}");
                    state.ended = true;
                    ending = true;
                }
            } else {
                if let RepeatCount::Times(_) = state.repeat_count {
                    state.repeated += 1;
                }
                if state.repeat_mode == RepeatMode::Reverse {
                    state.cycle_flip = !state.cycle_flip;
                }
                state.start_time = START_ON_FIRST_FRAME;
                more = true;
                trace!("Animation repeats at {current_time}");
                repeating = true;
            }
        }

        state.more = more;
        let needs_frame = if !more && state.one_more_time {
            state.one_more_time = false;
            true
        } else {
            more
        };

        // Listeners run last, so that they see the final state of this frame and may restart
        // the animation.
        if ending {
            notify(self.as_animation_mut(), |l, a| l.on_animation_end(a));
        }
        if repeating {
            notify(self.as_animation_mut(), |l, a| l.on_animation_repeat(a));
        }
        needs_frame
    }

    /// Like [`transformation_at`](Animation::transformation_at), but with a scale factor that
    /// animations apply to their pivot points.
    fn scaled_transformation_at(
        &mut self,
        current_time: Millis,
        out: &mut Transformation,
        scale: f64,
    ) -> bool {
        self.state_mut().scale_factor = scale;
        self.transformation_at(current_time, out)
    }
}

pub(crate) fn non_negative(duration: Millis) -> Millis {
    if duration < 0 {
        warn!("Animation duration cannot be negative, was: {duration}, set to 0");
        return 0;
    }
    duration
}
