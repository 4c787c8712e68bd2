//! A group of animations that play together.
//!
//! The transformations of the children are composed into a single transformation. Children are
//! applied in the order they were added: the first child transforms the object first.
//!
//! Some properties set on the set itself override the children's values when the set is
//! initialized:
//!
//! - duration, repeat mode, fill before, fill after, and start offset are pushed down to every
//!   child. The start offset is added to the child's own offset and restored on `reset()`.
//! - a shared interpolator replaces the children's interpolators.
//! - repeat count and fill enabled are ignored.

use std::cell::Cell;

use bitflags::bitflags;
use log::{debug, trace};
use motion_geometry::{Size, Transformation};

use crate::{
    Animation, AnimationHandle, AnimationState, Millis, RepeatMode,
    animation::{non_negative, notify},
    shared,
};

/// Upper bound of [`AnimationSet::start_time`]. A set without children reports this.
pub const MAX_SET_START_TIME: Millis = 100_000;

bitflags! {
    /// Properties explicitly set on an [`AnimationSet`], or aggregated from its children.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SetProperties: u8 {
        const FILL_AFTER = 0x01;
        const FILL_BEFORE = 0x02;
        const REPEAT_MODE = 0x04;
        const START_OFFSET = 0x08;
        const SHARE_INTERPOLATOR = 0x10;
        const DURATION = 0x20;
        /// At least one child changes the transformation matrix.
        const MORPH_MATRIX = 0x40;
        /// At least one child changes the bounds.
        const CHANGE_BOUNDS = 0x80;
    }
}

#[derive(Debug)]
pub struct AnimationSet {
    state: AnimationState,
    properties: SetProperties,
    animations: Vec<AnimationHandle>,
    /// The children's own start offsets, stored while the set's offset is added to them.
    stored_offsets: Option<Vec<Millis>>,
    /// The latest end time (start offset + duration) of all children.
    last_end: Millis,
    /// `has_alpha` needs to be recomputed.
    dirty: Cell<bool>,
    has_alpha: Cell<bool>,
    /// Reused for every child on every frame.
    scratch: Transformation,
}

impl AnimationSet {
    /// Creates an empty set.
    ///
    /// If `share_interpolator` is `true`, all children use the interpolator of the set.
    pub fn new(share_interpolator: bool) -> Self {
        let mut properties = SetProperties::empty();
        properties.set(SetProperties::SHARE_INTERPOLATOR, share_interpolator);
        Self {
            state: AnimationState {
                start_time: 0,
                ..AnimationState::default()
            },
            properties,
            animations: Vec::new(),
            stored_offsets: None,
            last_end: 0,
            dirty: Cell::new(false),
            has_alpha: Cell::new(false),
            scratch: Transformation::IDENTITY,
        }
    }

    /// Add a child animation.
    ///
    /// The same handle may be added more than once.
    pub fn add_animation(&mut self, animation: AnimationHandle) {
        {
            let child = animation.lock();

            if child.will_change_transformation_matrix() {
                self.properties.insert(SetProperties::MORPH_MATRIX);
            }
            if child.will_change_bounds() {
                self.properties.insert(SetProperties::CHANGE_BOUNDS);
            }

            let child_end = child.start_offset().saturating_add(child.duration());
            if self.properties.contains(SetProperties::DURATION) {
                self.last_end = self.state.start_offset.saturating_add(self.state.duration);
            } else if self.animations.is_empty() {
                self.state.duration = child_end;
                self.last_end = self.state.start_offset.saturating_add(self.state.duration);
            } else {
                self.last_end = self.last_end.max(child_end);
                self.state.duration = self.last_end.saturating_sub(self.state.start_offset);
            }
        }

        self.animations.push(animation);
        self.dirty.set(true);
    }

    /// Wrap `animation` into a handle, add it, and return the handle.
    pub fn add(&mut self, animation: impl Animation + 'static) -> AnimationHandle {
        let handle = shared(animation);
        self.add_animation(handle.clone());
        handle
    }

    /// The children in the order they were added.
    pub fn animations(&self) -> &[AnimationHandle] {
        &self.animations
    }

    pub fn properties(&self) -> SetProperties {
        self.properties
    }

    pub fn last_end(&self) -> Millis {
        self.last_end
    }

    fn restore_children_start_offset(&mut self) {
        let Some(offsets) = self.stored_offsets.take() else {
            return;
        };

        // Reversed, so that for a child added more than once its first stored offset (its own)
        // is the one that remains.
        for (child, offset) in self.animations.iter().zip(offsets).rev() {
            child.lock().set_start_offset(offset);
        }
    }
}

impl Animation for AnimationSet {
    fn state(&self) -> &AnimationState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    fn initialize(&mut self, size: Size, parent_size: Size) {
        self.reset();
        self.state.mark_initialized();

        let properties = self.properties;
        let share_interpolator = properties.contains(SetProperties::SHARE_INTERPOLATOR);
        if share_interpolator {
            self.ensure_interpolator();
        }

        let state = &self.state;
        let offset_set = properties.contains(SetProperties::START_OFFSET);
        let mut stored_offsets = Vec::new();

        debug!(
            "Initializing {} children, pushing down {properties:?}",
            self.animations.len()
        );

        for child in &self.animations {
            let mut child = child.lock();
            if properties.contains(SetProperties::DURATION) {
                child.set_duration(state.duration);
            }
            if properties.contains(SetProperties::FILL_AFTER) {
                child.set_fill_after(state.fill_after);
            }
            if properties.contains(SetProperties::FILL_BEFORE) {
                child.set_fill_before(state.fill_before);
            }
            if properties.contains(SetProperties::REPEAT_MODE) {
                child.set_repeat_mode(state.repeat_mode);
            }
            if share_interpolator {
                if let Some(interpolator) = &state.interpolator {
                    child.set_interpolator(interpolator.clone());
                }
            }
            if offset_set {
                let offset = child.start_offset();
                child.set_start_offset(offset.saturating_add(state.start_offset));
                stored_offsets.push(offset);
            }
            child.initialize(size, parent_size);
        }

        self.stored_offsets = offset_set.then_some(stored_offsets);
    }

    fn reset(&mut self) {
        self.state.reset();
        self.restore_children_start_offset();
        for child in &self.animations {
            child.lock().reset();
        }
    }

    /// The earliest start time of all children.
    fn start_time(&self) -> Millis {
        self.animations
            .iter()
            .map(|child| child.lock().start_time())
            .fold(MAX_SET_START_TIME, Millis::min)
    }

    /// Set the start time of the set and of all children.
    fn set_start_time(&mut self, start_time: Millis) {
        self.state.restart_at(start_time);
        for child in &self.animations {
            child.lock().set_start_time(start_time);
        }
    }

    /// The explicitly set duration, or the longest duration of all children.
    fn duration(&self) -> Millis {
        if self.properties.contains(SetProperties::DURATION) {
            return self.state.duration;
        }
        self.animations
            .iter()
            .map(|child| child.lock().duration())
            .fold(0, Millis::max)
    }

    fn set_duration(&mut self, duration: Millis) {
        self.properties.insert(SetProperties::DURATION);
        self.state.duration = non_negative(duration);
        self.last_end = self.state.start_offset.saturating_add(self.state.duration);
    }

    fn set_start_offset(&mut self, start_offset: Millis) {
        self.properties.insert(SetProperties::START_OFFSET);
        self.state.start_offset = start_offset;
    }

    fn set_fill_before(&mut self, fill_before: bool) {
        self.properties.insert(SetProperties::FILL_BEFORE);
        self.state.fill_before = fill_before;
    }

    fn set_fill_after(&mut self, fill_after: bool) {
        self.properties.insert(SetProperties::FILL_AFTER);
        self.state.fill_after = fill_after;
    }

    fn set_repeat_mode(&mut self, repeat_mode: RepeatMode) {
        self.properties.insert(SetProperties::REPEAT_MODE);
        self.state.repeat_mode = repeat_mode;
    }

    fn has_alpha(&self) -> bool {
        if self.dirty.get() {
            let has_alpha = self.animations.iter().any(|child| child.lock().has_alpha());
            self.has_alpha.set(has_alpha);
            self.dirty.set(false);
        }
        self.has_alpha.get()
    }

    fn will_change_transformation_matrix(&self) -> bool {
        self.properties.contains(SetProperties::MORPH_MATRIX)
    }

    fn will_change_bounds(&self) -> bool {
        self.properties.contains(SetProperties::CHANGE_BOUNDS)
    }

    fn scale_current_duration(&mut self, scale: f64) {
        for child in &self.animations {
            child.lock().scale_current_duration(scale);
        }
    }

    /// The longest duration hint of all children.
    fn compute_duration_hint(&self) -> Millis {
        self.animations
            .iter()
            .rev()
            .map(|child| child.lock().compute_duration_hint())
            .fold(0, Millis::max)
    }

    /// Compose the transformations of all children.
    ///
    /// Returns `true` as long as one of the children needs more frames.
    fn transformation_at(&mut self, current_time: Millis, out: &mut Transformation) -> bool {
        let scale = self.state.scale_factor;

        let mut more = false;
        let mut started = false;
        let mut ended = true;

        out.clear();

        for child in self.animations.iter().rev() {
            let mut child = child.lock();

            self.scratch.clear();
            more = child.scaled_transformation_at(current_time, &mut self.scratch, scale) || more;
            out.compose(&self.scratch);

            started = started || child.has_started();
            ended = child.has_ended() && ended;
        }

        self.state.more = more;

        if started && !self.state.started {
            trace!("Animation set started at {current_time}");
            self.state.started = true;
            notify(self, |l, a| l.on_animation_start(a));
        }

        if ended != self.state.ended {
            trace!("Animation set ended: {ended} at {current_time}");
            self.state.ended = ended;
            notify(self, |l, a| l.on_animation_end(a));
        }

        more
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use motion_geometry::{Affine2, AffineExt, Point, Vector2};
    use parking_lot::Mutex;

    use super::*;
    use crate::{
        AlphaAnimation, Interpolation, Interpolator, RotateAnimation,
        testing::{CountingListener, Recorder, RestartingListener, init_logging},
    };

    fn recorder_handle(duration: Millis) -> Arc<Mutex<Recorder>> {
        Arc::new(Mutex::new(Recorder::new(duration)))
    }

    fn translation(x: f64, y: f64) -> Transformation {
        Affine2::from_translation(Vector2::new(x, y)).into()
    }

    fn rotation(degrees: f64) -> Transformation {
        Affine2::from_rotation_degrees_about(degrees, Point::ZERO).into()
    }

    #[test]
    fn derived_duration_tracks_the_latest_child_end() {
        // (start offset, duration) pairs, in insertion order.
        let children = [(0, 100), (50, 20), (30, 300), (0, 10), (400, 0), (10, 390)];

        let mut set = AnimationSet::new(false);
        let mut latest_end = 0;
        for (offset, duration) in children {
            set.add(Recorder::new(duration).with_start_offset(offset));
            latest_end = latest_end.max(offset + duration);

            assert_eq!(set.state().duration, latest_end - set.start_offset());
            assert_eq!(set.last_end(), latest_end);
        }
    }

    #[test]
    fn first_child_seeds_the_duration() {
        let mut set = AnimationSet::new(false);
        set.add(Recorder::new(100).with_start_offset(500));
        assert_eq!(set.state().duration, 600);

        // Later children only extend it.
        set.add(Recorder::new(10));
        assert_eq!(set.state().duration, 600);
    }

    #[test]
    fn explicit_duration_overrides_children() {
        let mut set = AnimationSet::new(false);
        set.set_duration(250);
        set.add(Recorder::new(1000));

        assert_eq!(set.duration(), 250);
        assert_eq!(set.state().duration, 250);
        assert_eq!(set.last_end(), 250);
    }

    #[test]
    fn duration_is_the_longest_child_duration() {
        let mut set = AnimationSet::new(false);
        assert_eq!(set.duration(), 0);

        set.add(Recorder::new(100).with_start_offset(500));
        set.add(Recorder::new(300));
        assert_eq!(set.duration(), 300);
    }

    #[test]
    fn duration_hint_is_the_longest_child_hint() {
        let mut set = AnimationSet::new(false);
        assert_eq!(set.compute_duration_hint(), 0);

        set.add(Recorder::new(100).with_start_offset(500));
        set.add(Recorder::new(300));
        assert_eq!(set.compute_duration_hint(), 600);
    }

    #[test]
    fn start_time_is_the_earliest_child_start() {
        let mut set = AnimationSet::new(false);
        assert_eq!(set.start_time(), MAX_SET_START_TIME);

        let a = set.add(Recorder::new(100));
        let b = set.add(Recorder::new(100));
        a.lock().set_start_time(500);
        b.lock().set_start_time(200);
        assert_eq!(set.start_time(), 200);

        a.lock().set_start_time(200_000);
        b.lock().set_start_time(300_000);
        assert_eq!(set.start_time(), MAX_SET_START_TIME);
    }

    #[test]
    fn set_start_time_reaches_every_child() {
        let mut set = AnimationSet::new(false);
        let a = set.add(Recorder::new(100));
        let b = set.add(Recorder::new(100));

        set.set_start_time(42);
        assert_eq!(set.state().start_time, 42);
        assert_eq!(a.lock().start_time(), 42);
        assert_eq!(b.lock().start_time(), 42);
    }

    #[test]
    fn children_are_applied_in_insertion_order() {
        let frame = |children: [Transformation; 2]| {
            let mut set = AnimationSet::new(false);
            for transformation in children {
                set.add(Recorder::new(100).with_transformation(transformation));
            }
            set.set_start_time(0);
            let mut out = Transformation::IDENTITY;
            set.transformation_at(50, &mut out);
            out.transform_point(Point::new(1.0, 0.0))
        };

        // Rotate first, then translate.
        let p = frame([rotation(90.0), translation(10.0, 0.0)]);
        assert_abs_diff_eq!(p.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-9);

        // Translate first, then rotate.
        let p = frame([translation(10.0, 0.0), rotation(90.0)]);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn alpha_of_children_multiplies() {
        let mut set = AnimationSet::new(true);
        set.set_interpolator(Interpolation::Linear.shared());
        set.add(AlphaAnimation::new(1.0, 0.0, 100));
        set.add(AlphaAnimation::new(0.5, 0.5, 100));
        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));
        set.set_start_time(0);

        let mut out = Transformation::IDENTITY;
        set.transformation_at(50, &mut out);
        assert_abs_diff_eq!(out.alpha(), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn more_and_ended_aggregate_the_children() {
        let mut set = AnimationSet::new(false);
        let short = recorder_handle(100);
        let long = recorder_handle(200);
        set.add_animation(short.clone());
        set.add_animation(long.clone());
        set.set_start_time(0);
        let mut out = Transformation::IDENTITY;

        assert!(set.transformation_at(50, &mut out));
        assert!(set.has_started());
        assert!(!set.has_ended());

        // The short child ended; the long one keeps the set alive.
        assert!(set.transformation_at(150, &mut out));
        assert!(set.transformation_at(160, &mut out));
        assert!(short.lock().has_ended());
        assert!(!set.has_ended());

        // Both ended. The long child asks for one final frame.
        assert!(set.transformation_at(200, &mut out));
        assert!(set.has_ended());
        assert!(!set.transformation_at(210, &mut out));
    }

    #[test]
    fn is_running_follows_the_last_frame() {
        let mut set = AnimationSet::new(false);
        set.add(Recorder::new(100));
        set.set_start_time(0);
        let mut out = Transformation::IDENTITY;

        for time in [50, 100, 110, 120] {
            let more = set.transformation_at(time, &mut out);
            assert_eq!(set.is_running(), more, "at {time}");
        }
        assert!(set.has_ended());
        assert!(!set.is_running());
    }

    #[test]
    fn end_times_saturate() {
        let mut set = AnimationSet::new(false);
        set.add(Recorder::new(Millis::MAX).with_start_offset(1));
        assert_eq!(set.last_end(), Millis::MAX);
        assert_eq!(set.state().duration, Millis::MAX);

        set.add(Recorder::new(Millis::MAX).with_start_offset(Millis::MAX));
        assert_eq!(set.last_end(), Millis::MAX);

        set.set_start_offset(10);
        set.set_duration(Millis::MAX);
        assert_eq!(set.last_end(), Millis::MAX);
    }

    #[test]
    fn start_offset_push_down_saturates() {
        let mut set = AnimationSet::new(false);
        let child = set.add(Recorder::new(100).with_start_offset(Millis::MAX - 5));
        set.set_start_offset(10);

        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));
        assert_eq!(child.lock().start_offset(), Millis::MAX);

        set.reset();
        assert_eq!(child.lock().start_offset(), Millis::MAX - 5);
    }

    #[test]
    fn child_listeners_can_restart_their_animation() {
        init_logging();

        let listener = RestartingListener::shared(1);
        let mut set = AnimationSet::new(false);
        let child = set.add(Recorder::new(100));
        child.lock().set_listener(Some(listener.clone()));
        set.set_start_time(0);
        let mut out = Transformation::IDENTITY;

        assert!(set.transformation_at(50, &mut out));
        // The child ends and its listener restarts it while the set holds the child's lock.
        assert!(set.transformation_at(100, &mut out));
        assert_eq!(listener.ends_seen(), 1);
        assert!(!child.lock().has_ended());
        assert!(!set.has_ended());

        assert!(set.transformation_at(110, &mut out));
        assert_eq!(child.lock().start_time(), 110);

        assert!(!set.transformation_at(210, &mut out));
        assert_eq!(listener.ends_seen(), 2);
        assert!(set.has_ended());
        assert!(!set.is_running());
    }

    #[test]
    fn empty_set_needs_no_frames() {
        let mut set = AnimationSet::new(false);
        let mut out = translation(5.0, 5.0);
        assert!(!set.transformation_at(0, &mut out));
        assert_eq!(out, Transformation::IDENTITY);
        assert!(set.has_ended());
    }

    #[test]
    fn start_fires_once_and_end_fires_on_every_transition() {
        init_logging();

        let listener = CountingListener::shared();
        let mut set = AnimationSet::new(false);
        set.set_listener(Some(listener.clone()));
        let a = set.add(Recorder::new(100));
        set.add(Recorder::new(100));
        set.set_start_time(0);
        let mut out = Transformation::IDENTITY;

        set.transformation_at(10, &mut out);
        set.transformation_at(20, &mut out);
        assert_eq!(listener.starts(), 1);
        assert_eq!(listener.ends(), 0);

        set.transformation_at(100, &mut out);
        assert_eq!(listener.ends(), 1);
        set.transformation_at(110, &mut out);
        assert_eq!(listener.ends(), 1);

        // Restarting one child flips the set back to not ended.
        a.lock().set_start_time(110);
        set.transformation_at(120, &mut out);
        assert!(!set.has_ended());
        assert_eq!(listener.ends(), 2);

        set.transformation_at(210, &mut out);
        assert!(set.has_ended());
        assert_eq!(listener.ends(), 3);
        assert_eq!(listener.starts(), 1);
    }

    #[test]
    fn has_alpha_is_recomputed_after_adding() {
        let mut set = AnimationSet::new(false);
        set.add(Recorder::new(100));
        assert!(!set.has_alpha());

        set.add(Recorder::new(100).with_alpha());
        assert!(set.has_alpha());
    }

    #[test]
    fn change_flags_aggregate_the_children() {
        let mut set = AnimationSet::new(false);
        set.add(Recorder::new(100));
        assert!(!set.will_change_transformation_matrix());
        assert!(!set.will_change_bounds());

        set.add(RotateAnimation::new(0.0, 90.0, 100));
        assert!(set.will_change_transformation_matrix());
        assert!(set.will_change_bounds());
    }

    #[test]
    fn scale_factor_reaches_children() {
        let mut set = AnimationSet::new(false);
        let child = set.add(Recorder::new(100));
        set.set_start_time(0);

        let mut out = Transformation::IDENTITY;
        set.scaled_transformation_at(10, &mut out, 2.0);
        assert_eq!(child.lock().scale_factor(), 2.0);
    }

    #[test]
    fn scale_current_duration_reaches_children() {
        let mut set = AnimationSet::new(false);
        let child = set.add(Recorder::new(100).with_start_offset(10));
        set.scale_current_duration(2.0);
        assert_eq!(child.lock().duration(), 200);
        assert_eq!(child.lock().start_offset(), 20);
    }

    #[test]
    fn initialize_pushes_explicit_properties_down() {
        let mut set = AnimationSet::new(true);
        set.set_interpolator(Interpolation::Linear.shared());
        set.set_duration(300);
        set.set_fill_after(true);
        set.set_fill_before(false);
        set.set_repeat_mode(RepeatMode::Reverse);
        set.set_start_offset(100);

        let child = set.add(Recorder::new(50).with_start_offset(20));
        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));

        let child = child.lock();
        assert!(child.is_initialized());
        assert_eq!(child.duration(), 300);
        assert!(child.fill_after());
        assert!(!child.fill_before());
        assert_eq!(child.repeat_mode(), RepeatMode::Reverse);
        assert_eq!(child.start_offset(), 120);
        let interpolator = child.interpolator().unwrap();
        assert_abs_diff_eq!(interpolator.interpolation(0.25), 0.25);
    }

    #[test]
    fn initialize_leaves_unset_properties_alone() {
        let mut set = AnimationSet::new(false);
        let child = set.add(Recorder::new(50).with_start_offset(20));
        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));

        let child = child.lock();
        assert_eq!(child.duration(), 50);
        assert_eq!(child.start_offset(), 20);
        assert!(child.interpolator().is_none());
    }

    #[test]
    fn reset_restores_child_offsets_and_resets_children() {
        let mut set = AnimationSet::new(false);
        set.set_start_offset(100);
        let child = set.add(Recorder::new(50).with_start_offset(20));
        set.add_animation(child.clone());

        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));
        assert_eq!(child.lock().start_offset(), 220);

        set.reset();
        assert_eq!(child.lock().start_offset(), 20);
        assert!(!child.lock().is_initialized());
        assert!(!set.is_initialized());

        // Initializing again does not accumulate offsets.
        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));
        set.initialize(Size::new(10.0, 10.0), Size::new(100.0, 100.0));
        assert_eq!(child.lock().start_offset(), 220);
    }

    #[test]
    fn duplicate_children_are_kept() {
        let mut set = AnimationSet::new(false);
        let child = recorder_handle(100);
        set.add_animation(child.clone());
        set.add_animation(child.clone());
        assert_eq!(set.animations().len(), 2);

        set.set_start_time(0);
        let mut out = Transformation::IDENTITY;
        assert!(set.transformation_at(50, &mut out));
    }

    #[test]
    fn sets_nest() {
        let mut inner = AnimationSet::new(false);
        inner.add(Recorder::new(100).with_transformation(translation(10.0, 0.0)));

        let mut outer = AnimationSet::new(false);
        outer.add(Recorder::new(100).with_transformation(rotation(90.0)));
        outer.add(inner);
        outer.set_start_time(0);

        let mut out = Transformation::IDENTITY;
        assert!(outer.transformation_at(50, &mut out));
        let p = out.transform_point(Point::new(1.0, 0.0));
        assert_abs_diff_eq!(p.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-9);
    }
}
