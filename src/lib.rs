// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod animation;
pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod painter;
pub mod window;
pub mod worker;

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

pub use crate::animation::{AnimationDriver, IntervalTimer};
pub use crate::canvas::Canvas;
pub use crate::config::{Color, ProgressRingConfig, DEFAULT_PROGRESS_COLOR};
pub use crate::error::RingError;
pub use crate::geometry::RectF;
pub use crate::model::{ProgressModel, ProgressStyle};
pub use crate::painter::{PaintSnapshot, RingGeometry, Smoothing, Surface, WidgetFont};
pub use crate::window::{ProgressRingWindow, RingController};
pub use crate::worker::{BackgroundWorker, WorkerConfig, WorkerEvent};

// ============================================================================
// PUBLIC API - COMMANDS
// ============================================================================

/// Command enum for updating a ring from another thread through a channel
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressCommand {
    SetValue(i32),
    Increment(i32),
    Decrement(i32),
    PerformStep,
    SetRange(i32, i32), // minimum, maximum
    SetStep(i32),
    SetStyle(ProgressStyle),
    SetProgressColor(Color),
    SetMarqueeAnimationSpeed(Duration),
}

// ============================================================================
// PUBLIC API - WIDGET
// ============================================================================

/// Result of feeding a size change through the aspect-ratio policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Accepted,
    /// The host should resize the widget to this height, keeping the width
    ForceHeight(u32),
}

/// Circular progress widget, independent of any windowing toolkit.
///
/// Every mutation and every animation tick raises the redraw signal, which the
/// host collects with [`ProgressRing::take_redraw_request`].
#[derive(Debug, Clone)]
pub struct ProgressRing {
    model: ProgressModel,
    driver: AnimationDriver,
    font: WidgetFont,
    size: (u32, u32),
    layout: AspectLayout,
    redraw_requested: bool,
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressRing {
    pub fn new() -> Self {
        let model = ProgressModel::new();
        Self {
            driver: AnimationDriver::new(model.minimum(), config::DEFAULT_MARQUEE_ANIMATION_SPEED),
            model,
            font: WidgetFont::new(None, config::DEFAULT_FONT_SIZE),
            size: (0, 0),
            layout: AspectLayout::default(),
            redraw_requested: true,
        }
    }

    pub fn from_config(config: &ProgressRingConfig) -> Result<Self, RingError> {
        let mut ring = Self::new();
        ring.set_font(WidgetFont::new(config.font()?, config.font_size));
        ring.set_progress_color(config.progress_color);
        ring.set_maximum(config.range.1);
        ring.set_minimum(config.range.0);
        ring.set_value(config.value);
        ring.set_step(config.step);
        ring.set_marquee_animation_speed(config.marquee_speed());
        ring.set_lock_aspect_ratio(config.lock_aspect_ratio);
        ring.set_style(config.style);
        ring.on_resize(config.window_width, config.window_height);
        Ok(ring)
    }

    // ------------------------------------------------------------------------
    // properties
    // ------------------------------------------------------------------------

    pub fn value(&self) -> i32 {
        self.model.value()
    }

    /// Out-of-range values are clamped to the nearest bound.
    pub fn set_value(&mut self, value: i32) {
        self.model.set_value(value);
        self.invalidate();
    }

    pub fn minimum(&self) -> i32 {
        self.model.minimum()
    }

    /// Also moves the marquee pointer to the new minimum.
    pub fn set_minimum(&mut self, minimum: i32) {
        self.model.set_minimum(minimum);
        self.driver.reset_to(minimum);
        self.invalidate();
    }

    pub fn maximum(&self) -> i32 {
        self.model.maximum()
    }

    pub fn set_maximum(&mut self, maximum: i32) {
        self.model.set_maximum(maximum);
        self.invalidate();
    }

    pub fn step(&self) -> i32 {
        self.model.step()
    }

    pub fn set_step(&mut self, step: i32) {
        self.model.set_step(step);
        self.invalidate();
    }

    pub fn progress_color(&self) -> Color {
        self.model.progress_color()
    }

    pub fn set_progress_color(&mut self, color: Color) {
        self.model.set_progress_color(color);
        self.invalidate();
    }

    pub fn lock_aspect_ratio(&self) -> bool {
        self.model.lock_aspect_ratio()
    }

    pub fn set_lock_aspect_ratio(&mut self, locked: bool) {
        self.model.set_lock_aspect_ratio(locked);
        self.invalidate();
    }

    pub fn style(&self) -> ProgressStyle {
        self.model.style()
    }

    /// Entering `Marquee` starts the animation from the minimum; leaving it
    /// stops the timer before this returns.
    pub fn set_style(&mut self, style: ProgressStyle) {
        let previous = self.model.style();
        self.model.set_style(style);
        match (previous == ProgressStyle::Marquee, style == ProgressStyle::Marquee) {
            (false, true) => self.driver.start(self.model.minimum()),
            (true, false) => self.driver.stop(),
            _ => {}
        }
        debug!(?previous, ?style, "style changed");
        self.invalidate();
    }

    pub fn marquee_animation_speed(&self) -> Duration {
        self.driver.interval()
    }

    pub fn set_marquee_animation_speed(&mut self, interval: Duration) {
        self.driver.set_interval(interval);
        self.invalidate();
    }

    pub fn font(&self) -> &WidgetFont {
        &self.font
    }

    pub fn set_font(&mut self, font: WidgetFont) {
        self.font = font;
        self.invalidate();
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    // ------------------------------------------------------------------------
    // operations
    // ------------------------------------------------------------------------

    pub fn increment(&mut self, delta: i32) {
        self.model.increment(delta);
        self.invalidate();
    }

    pub fn decrement(&mut self, delta: i32) {
        self.model.decrement(delta);
        self.invalidate();
    }

    pub fn perform_step(&mut self) {
        self.model.perform_step();
        self.invalidate();
    }

    pub fn scaled_fraction(&self, value: i32) -> f32 {
        self.model.scaled_fraction(value)
    }

    pub fn apply(&mut self, command: ProgressCommand) {
        match command {
            ProgressCommand::SetValue(value) => self.set_value(value),
            ProgressCommand::Increment(delta) => self.increment(delta),
            ProgressCommand::Decrement(delta) => self.decrement(delta),
            ProgressCommand::PerformStep => self.perform_step(),
            ProgressCommand::SetRange(minimum, maximum) => {
                self.set_maximum(maximum);
                self.set_minimum(minimum);
            }
            ProgressCommand::SetStep(step) => self.set_step(step),
            ProgressCommand::SetStyle(style) => self.set_style(style),
            ProgressCommand::SetProgressColor(color) => self.set_progress_color(color),
            ProgressCommand::SetMarqueeAnimationSpeed(speed) => {
                self.set_marquee_animation_speed(speed)
            }
        }
    }

    /// Applies every command waiting in `receiver` without blocking.
    pub fn apply_pending(&mut self, receiver: &Receiver<ProgressCommand>) {
        while let Ok(command) = receiver.try_recv() {
            self.apply(command);
        }
    }

    // ------------------------------------------------------------------------
    // marquee
    // ------------------------------------------------------------------------

    pub fn marquee_value(&self) -> i32 {
        self.driver.marquee_value()
    }

    pub fn is_marquee_growing(&self) -> bool {
        self.driver.is_growing()
    }

    pub fn is_marquee_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Runs the animation ticks that fell due by `now`.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let ticks = self
            .driver
            .advance(now, self.model.minimum(), self.model.maximum());
        if ticks > 0 {
            self.invalidate();
        }
        ticks
    }

    /// One timer callback. Ignored, returning `false`, once the marquee stopped.
    pub fn on_animation_tick(&mut self) -> bool {
        let ticked = self.driver.tick(self.model.minimum(), self.model.maximum());
        if ticked {
            self.invalidate();
        }
        ticked
    }

    /// When the host should wake up for the next animation tick.
    pub fn next_tick_deadline(&self) -> Option<Instant> {
        self.driver.next_deadline()
    }

    // ------------------------------------------------------------------------
    // layout + paint
    // ------------------------------------------------------------------------

    /// Feeds a size change through the aspect-ratio policy.
    pub fn on_resize(&mut self, width: u32, height: u32) -> ResizeOutcome {
        let outcome = self
            .layout
            .resize(self.model.lock_aspect_ratio(), width, height);
        self.size = match outcome {
            ResizeOutcome::Accepted => (width, height),
            ResizeOutcome::ForceHeight(forced) => {
                trace!(width, height, forced, "aspect ratio locked, forcing height");
                (width, forced)
            }
        };
        self.invalidate();
        outcome
    }

    pub fn snapshot(&self) -> PaintSnapshot<'_> {
        let active_value = match self.model.style() {
            ProgressStyle::Marquee => self.driver.marquee_value(),
            ProgressStyle::Continuous | ProgressStyle::Blocks => self.model.value(),
        };
        PaintSnapshot {
            active_value,
            value: self.model.value(),
            minimum: self.model.minimum(),
            maximum: self.model.maximum(),
            style: self.model.style(),
            progress_color: self.model.progress_color(),
            font: &self.font,
        }
    }

    /// Paints the ring into its client rectangle.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        painter::paint(
            surface,
            RectF::from_size(self.size.0, self.size.1),
            &self.snapshot(),
        );
    }

    // ------------------------------------------------------------------------
    // redraw signal
    // ------------------------------------------------------------------------

    pub fn invalidate(&mut self) {
        self.redraw_requested = true;
    }

    pub fn is_redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    /// Returns and clears the redraw signal.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

// ============================================================================
// ASPECT RATIO POLICY (INTERNAL)
// ============================================================================

/// Keeps height proportional to width while locked.
///
/// A forced size is remembered as pending. The next resize is taken as the
/// host's answer when it carries the forced height, or as a refusal when it
/// keeps the same width; both are accepted as is. Any other size is a fresh
/// drag and gets forced again, so each distinct width is forced at most once.
#[derive(Debug, Clone)]
struct AspectLayout {
    ratio: f32,
    pending: Option<(u32, u32)>,
}

impl Default for AspectLayout {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            pending: None,
        }
    }
}

impl AspectLayout {
    fn resize(&mut self, locked: bool, width: u32, height: u32) -> ResizeOutcome {
        let pending = self.pending.take();
        if width == 0 {
            return ResizeOutcome::Accepted;
        }
        if !locked {
            self.ratio = height as f32 / width as f32;
            return ResizeOutcome::Accepted;
        }
        if let Some((pending_width, pending_height)) = pending {
            if height == pending_height || width == pending_width {
                return ResizeOutcome::Accepted;
            }
        }
        let forced = (width as f32 * self.ratio) as u32;
        if forced == height {
            return ResizeOutcome::Accepted;
        }
        self.pending = Some((width, forced));
        ResizeOutcome::ForceHeight(forced)
    }
}
