//! Animation support for the scroll settle-back and the spinner.

mod timing;

pub use timing::TimingFunction;

use std::time::Instant;

/// Configuration for how an animated value moves toward its target
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of the animation in milliseconds
    pub duration_ms: f32,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration_ms: f32, timing: TimingFunction) -> Self {
        Self {
            duration_ms,
            timing,
        }
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(250.0, TimingFunction::EaseOut)
    }
}

/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

/// Result of advancing an animation, indicating whether the value changed
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceResult<T> {
    /// Value did not change (animation not running or same value)
    NoChange,
    /// Value changed to a new value
    Changed(T),
}

impl<T> AdvanceResult<T> {
    /// Returns true if the value changed
    pub fn is_changed(&self) -> bool {
        matches!(self, AdvanceResult::Changed(_))
    }
}

/// Animation state for an animatable value
pub struct AnimationState<T: Animatable> {
    /// Current interpolated value
    current: T,
    /// Target value
    target: T,
    /// Value when the animation started
    start: T,
    /// Progress from 0.0 to 1.0
    progress: f32,
    /// Time when the animation started
    start_time: Instant,
    /// Transition configuration
    transition: Transition,
    /// Previous value for change detection
    prev_value: Option<T>,
}

impl<T: Animatable> AnimationState<T> {
    pub fn new(initial_value: T, transition: Transition) -> Self {
        Self {
            current: initial_value.clone(),
            target: initial_value.clone(),
            start: initial_value,
            progress: 1.0, // Start completed
            start_time: Instant::now(),
            transition,
            prev_value: None,
        }
    }

    /// Start animating to a new target value
    pub fn animate_to(&mut self, new_target: T) {
        if new_target == self.target {
            return;
        }

        self.start = self.current.clone();
        self.target = new_target;
        self.progress = 0.0;
        self.start_time = Instant::now();
    }

    /// Advance the animation and return whether the value changed
    pub fn advance(&mut self) -> AdvanceResult<T> {
        if self.progress >= 1.0 {
            return AdvanceResult::NoChange;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f32() * 1000.0;
        let t = (elapsed_ms / self.transition.duration_ms).min(1.0);
        let eased_t = self.transition.timing.evaluate(t);

        let new_value = T::lerp(&self.start, &self.target, eased_t);
        self.progress = t;

        let changed = self.prev_value.as_ref() != Some(&new_value);
        self.current = new_value.clone();
        self.prev_value = Some(new_value.clone());

        if changed {
            AdvanceResult::Changed(new_value)
        } else {
            AdvanceResult::NoChange
        }
    }

    /// Check if the animation is still running
    pub fn is_animating(&self) -> bool {
        self.progress < 1.0
    }

    /// Get current value
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Get target value
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Set value immediately without animation
    pub fn set_immediate(&mut self, value: T) {
        self.current = value.clone();
        self.target = value.clone();
        self.start = value;
        self.progress = 1.0;
    }
}
