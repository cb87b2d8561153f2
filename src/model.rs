use crate::config::{
    Color, DEFAULT_LOCK_ASPECT_RATIO, DEFAULT_MAXIMUM, DEFAULT_MINIMUM, DEFAULT_PROGRESS_COLOR,
    DEFAULT_STEP, DEFAULT_VALUE,
};

/// How the ring reports progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStyle {
    #[default]
    Continuous,
    /// Indeterminate: a synthetic pointer sweeps back and forth over the range
    Marquee,
    /// Accepted for API parity, drawn exactly like `Continuous`
    Blocks,
}

/// Numeric state of a progress ring.
///
/// Out-of-range values are clamped on assignment, never rejected. Range setters
/// do not re-clamp an already stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressModel {
    minimum: i32,
    maximum: i32,
    value: i32,
    step: i32,
    style: ProgressStyle,
    progress_color: Color,
    lock_aspect_ratio: bool,
}

impl Default for ProgressModel {
    fn default() -> Self {
        Self::with_color(DEFAULT_PROGRESS_COLOR)
    }
}

impl ProgressModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(progress_color: Color) -> Self {
        Self {
            minimum: DEFAULT_MINIMUM,
            maximum: DEFAULT_MAXIMUM,
            value: DEFAULT_VALUE,
            step: DEFAULT_STEP,
            style: ProgressStyle::Continuous,
            progress_color,
            lock_aspect_ratio: DEFAULT_LOCK_ASPECT_RATIO,
        }
    }

    pub fn minimum(&self) -> i32 {
        self.minimum
    }

    pub fn maximum(&self) -> i32 {
        self.maximum
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn style(&self) -> ProgressStyle {
        self.style
    }

    pub fn progress_color(&self) -> Color {
        self.progress_color
    }

    pub fn lock_aspect_ratio(&self) -> bool {
        self.lock_aspect_ratio
    }

    pub fn set_minimum(&mut self, minimum: i32) {
        self.minimum = minimum;
    }

    pub fn set_maximum(&mut self, maximum: i32) {
        self.maximum = maximum;
    }

    pub fn set_value(&mut self, value: i32) {
        self.value = self.clamp(value);
    }

    pub fn set_step(&mut self, step: i32) {
        self.step = step;
    }

    pub fn set_style(&mut self, style: ProgressStyle) {
        self.style = style;
    }

    pub fn set_progress_color(&mut self, color: Color) {
        self.progress_color = color;
    }

    pub fn set_lock_aspect_ratio(&mut self, locked: bool) {
        self.lock_aspect_ratio = locked;
    }

    pub fn increment(&mut self, delta: i32) {
        self.set_value(self.value.saturating_add(delta));
    }

    pub fn decrement(&mut self, delta: i32) {
        self.set_value(self.value.saturating_sub(delta));
    }

    pub fn perform_step(&mut self) {
        self.increment(self.step);
    }

    /// Clamps into `[minimum, maximum]`. With an inverted range the minimum wins,
    /// where `i32::clamp` would panic.
    pub fn clamp(&self, value: i32) -> i32 {
        value.min(self.maximum).max(self.minimum)
    }

    /// `value` normalized over the range, always within `[0, 1]`.
    ///
    /// A zero-width or inverted range reports `1.0`.
    pub fn scaled_fraction(&self, value: i32) -> f32 {
        scaled_fraction(value, self.minimum, self.maximum)
    }
}

pub fn scaled_fraction(value: i32, minimum: i32, maximum: i32) -> f32 {
    if maximum <= minimum {
        return 1.0;
    }
    let span = maximum as f64 - minimum as f64;
    (((value as f64 - minimum as f64) / span) as f32).clamp(0.0, 1.0)
}
