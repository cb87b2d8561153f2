//! winit + pixels host for a single [`ProgressRing`].
//!
//! The adapter only forwards events: resizes go through the ring's aspect
//! policy, redraws paint into the pixel buffer, idle time advances the marquee.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use tracing::{error, info, warn};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::Key;
use winit::window::{Window, WindowBuilder};

use crate::canvas::Canvas;
use crate::config::ProgressRingConfig;
use crate::error::RingError;
use crate::{ProgressCommand, ProgressRing, ResizeOutcome};

const MIN_WINDOW_SIDE: f64 = 64.0;
// a platform that keeps answering with a new width is not chased forever
const MAX_FORCED_RESIZES: usize = 2;

/// Hooks the host calls on the UI thread
pub trait RingController {
    /// A key was pressed (repeats are filtered out).
    fn on_key(&mut self, _ring: &mut ProgressRing, _key: &Key) {}

    /// Runs once per loop iteration, before animation ticks are processed.
    fn on_idle(&mut self, _ring: &mut ProgressRing) {}

    /// Whether updates may arrive from other threads. Those cannot wake the
    /// event loop, so while this holds the host keeps polling at frame rate.
    fn is_busy(&self) -> bool {
        false
    }
}

/// Controller that applies commands arriving from other threads
pub struct CommandFeed {
    receiver: Receiver<ProgressCommand>,
}

impl CommandFeed {
    pub fn new(receiver: Receiver<ProgressCommand>) -> Self {
        Self { receiver }
    }
}

impl RingController for CommandFeed {
    fn on_idle(&mut self, ring: &mut ProgressRing) {
        ring.apply_pending(&self.receiver);
    }

    fn is_busy(&self) -> bool {
        true
    }
}

/// Main window struct - the primary public interface
pub struct ProgressRingWindow {
    config: ProgressRingConfig,
    ring: ProgressRing,
}

impl ProgressRingWindow {
    pub fn new(config: ProgressRingConfig) -> Result<Self, RingError> {
        let ring = ProgressRing::from_config(&config)?;
        Ok(Self { config, ring })
    }

    pub fn show_with_commands(self, receiver: Receiver<ProgressCommand>) -> Result<(), RingError> {
        self.run(CommandFeed::new(receiver))
    }

    /// Opens the window and blocks until it is closed.
    pub fn run<C: RingController>(self, mut controller: C) -> Result<(), RingError> {
        let Self { config, mut ring } = self;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_min_inner_size(LogicalSize::new(MIN_WINDOW_SIDE, MIN_WINDOW_SIDE))
            .build(&event_loop)?;
        let window = Arc::new(window);
        let window_clone = window.clone();

        let size = fit_to_window(&mut ring, &window, window.inner_size());
        let mut fb_width = size.width;
        let mut fb_height = size.height;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate.max(1.0));
        let mut last_frame = Instant::now();
        let background = config.background_color;
        info!(width = size.width, height = size.height, "window opened");

        event_loop.run(move |event, window_target| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    // minimized
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    let size = fit_to_window(&mut ring, &window_clone, new_size);
                    fb_width = size.width;
                    fb_height = size.height;
                    if let Err(err) = pixels.resize_buffer(fb_width, fb_height) {
                        warn!(%err, "failed to resize pixel buffer");
                    }
                    if let Err(err) = pixels.resize_surface(fb_width, fb_height) {
                        warn!(%err, "failed to resize surface");
                    }
                }
                WindowEvent::KeyboardInput { event, .. }
                    if event.state == ElementState::Pressed && !event.repeat =>
                {
                    controller.on_key(&mut ring, &event.logical_key);
                }
                WindowEvent::RedrawRequested => {
                    let mut canvas =
                        Canvas::new(pixels.frame_mut(), fb_width as usize, fb_height as usize);
                    canvas.clear(background);
                    ring.paint(&mut canvas);
                    if let Err(err) = pixels.render() {
                        error!(%err, "render failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                controller.on_idle(&mut ring);
                ring.advance(Instant::now());
                if ring.is_redraw_requested() && last_frame.elapsed() >= frame_duration {
                    ring.take_redraw_request();
                    window_clone.request_redraw();
                    last_frame = Instant::now();
                }
                let frame_deadline = (ring.is_redraw_requested() || controller.is_busy())
                    .then(|| last_frame + frame_duration);
                window_target.set_control_flow(next_wake(frame_deadline, ring.next_tick_deadline()));
            }
            _ => {}
        })?;

        Ok(())
    }
}

/// Runs `size` through the aspect policy and asks the window for any forced
/// height. Returns the size the window ended up with.
///
/// A request the platform applies on the spot produces no `Resized` event, so
/// that answer is fed back here directly.
fn fit_to_window(
    ring: &mut ProgressRing,
    window: &Window,
    mut size: PhysicalSize<u32>,
) -> PhysicalSize<u32> {
    for _ in 0..MAX_FORCED_RESIZES {
        let ResizeOutcome::ForceHeight(height) = ring.on_resize(size.width, size.height) else {
            break;
        };
        match window.request_inner_size(PhysicalSize::new(size.width, height)) {
            Some(applied) => size = applied,
            None => break,
        }
    }
    size
}

/// When the loop should wake next: the earlier of the frame deadline (a redraw
/// is waiting) and the next marquee tick, or only on events when neither exists.
fn next_wake(frame_deadline: Option<Instant>, tick_deadline: Option<Instant>) -> ControlFlow {
    let deadline = match (frame_deadline, tick_deadline) {
        (Some(frame), Some(tick)) => Some(frame.min(tick)),
        (frame, tick) => frame.or(tick),
    };
    deadline.map_or(ControlFlow::Wait, ControlFlow::WaitUntil)
}
