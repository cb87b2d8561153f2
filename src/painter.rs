//! Ring geometry and the layered paint pass.
//!
//! Drawing goes through [`Surface`], so the same pass renders into the pixel
//! [`Canvas`](crate::canvas::Canvas) or into a recording double in tests.

use std::ops::{Deref, DerefMut};

use rusttype::Font;

use crate::config::{Color, BORDER_COLOR, RING_COLOR};
use crate::error::RingError;
use crate::geometry::RectF;
use crate::model::{scaled_fraction, ProgressStyle};

pub const ARC_START_DEGREES: f32 = 270.0;
pub const ARC_PEN_WIDTH: f32 = 3.0;
pub const BORDER_PEN_WIDTH: f32 = 1.0;

// Insets in percent of the client width
const OUTER_RING_1_INSET: i32 = 5;
const OUTER_RING_2_INSET: i32 = 10;
const ARC_RING_INSET: i32 = 4;
const INNER_CIRCLE_INSET: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothing {
    #[default]
    None,
    AntiAlias,
}

/// Font face plus pixel size used for the percentage label
#[derive(Clone)]
pub struct WidgetFont {
    pub face: Option<Font<'static>>,
    pub size: f32,
}

impl WidgetFont {
    pub fn new(face: Option<Font<'static>>, size: f32) -> Self {
        Self { face, size }
    }
}

impl std::fmt::Debug for WidgetFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetFont")
            .field("face", &self.face.is_some())
            .field("size", &self.size)
            .finish()
    }
}

/// Drawing operations the host provides for one paint pass.
///
/// Arc angles are in degrees, measured clockwise from the positive x axis
/// (screen coordinates, y grows downwards).
pub trait Surface {
    fn smoothing(&self) -> Smoothing;
    fn set_smoothing(&mut self, mode: Smoothing);
    fn fill_ellipse(&mut self, bounds: RectF, color: Color);
    fn stroke_ellipse(&mut self, bounds: RectF, pen_width: f32, color: Color);
    fn stroke_arc(
        &mut self,
        bounds: RectF,
        start_degrees: f32,
        sweep_degrees: f32,
        pen_width: f32,
        color: Color,
    ) -> Result<(), RingError>;
    /// Fills the region inside `outer` and outside `inner`.
    fn fill_ring(&mut self, outer: RectF, inner: RectF, color: Color);
    /// Draws `text` centered both ways inside `bounds`.
    fn draw_text(&mut self, bounds: RectF, text: &str, font: &WidgetFont, color: Color);
}

/// Switches a surface to the requested smoothing mode and puts the previous one
/// back when dropped, unwinding included.
pub struct SmoothingGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    previous: Smoothing,
}

impl<'a, S: Surface + ?Sized> SmoothingGuard<'a, S> {
    pub fn new(surface: &'a mut S, mode: Smoothing) -> Self {
        let previous = surface.smoothing();
        surface.set_smoothing(mode);
        Self { surface, previous }
    }
}

impl<S: Surface + ?Sized> Deref for SmoothingGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SmoothingGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SmoothingGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_smoothing(self.previous);
    }
}

/// The four concentric rectangles of the ring, all derived from the client width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub outer_ring_1: RectF,
    pub outer_ring_2: RectF,
    pub arc_ring: RectF,
    pub inner_circle: RectF,
}

impl RingGeometry {
    pub fn new(client: RectF) -> Self {
        let width = client.width as i32;
        // integer percent arithmetic, as the insets are whole pixels
        let inset = |percent: i32| -((width.saturating_mul(percent) / 100) as f32);
        let shrink = |percent: i32| {
            let d = inset(percent);
            client.inflate(d, d)
        };
        Self {
            outer_ring_1: shrink(OUTER_RING_1_INSET),
            outer_ring_2: shrink(OUTER_RING_2_INSET),
            arc_ring: shrink(ARC_RING_INSET),
            inner_circle: shrink(INNER_CIRCLE_INSET),
        }
    }

    /// Bounds of the progress fill: the inner circle grown towards the second
    /// outer ring in proportion to `fraction`.
    pub fn progress_fill(&self, fraction: f32) -> RectF {
        let start = self.inner_circle;
        let end = self.outer_ring_2;
        let dw = (start.width - end.width).abs() * fraction;
        let dh = (start.height - end.height).abs() * fraction;
        start.inflate(dw / 2.0, dh / 2.0)
    }
}

/// Read-only view of the widget state a paint pass needs
#[derive(Debug, Clone, Copy)]
pub struct PaintSnapshot<'a> {
    /// Marquee pointer in marquee style, the value otherwise
    pub active_value: i32,
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub style: ProgressStyle,
    pub progress_color: Color,
    pub font: &'a WidgetFont,
}

impl PaintSnapshot<'_> {
    pub fn fraction(&self) -> f32 {
        scaled_fraction(self.active_value, self.minimum, self.maximum)
    }
}

/// Renders the ring into `client`. Later layers cover earlier ones.
pub fn paint<S: Surface + ?Sized>(surface: &mut S, client: RectF, snapshot: &PaintSnapshot<'_>) {
    if client.is_empty() {
        return;
    }

    let geometry = RingGeometry::new(client);
    let fraction = snapshot.fraction();
    let color = snapshot.progress_color;
    let mut g = SmoothingGuard::new(surface, Smoothing::AntiAlias);

    g.fill_ellipse(geometry.progress_fill(fraction), color);

    // A degenerate arc ring only costs this frame's arc
    let _ = g.stroke_arc(
        geometry.arc_ring,
        ARC_START_DEGREES,
        360.0 * fraction,
        ARC_PEN_WIDTH,
        color,
    );

    g.fill_ring(geometry.outer_ring_1, geometry.outer_ring_2, RING_COLOR);
    g.stroke_ellipse(geometry.outer_ring_1, BORDER_PEN_WIDTH, BORDER_COLOR);
    g.stroke_ellipse(geometry.outer_ring_2, BORDER_PEN_WIDTH, BORDER_COLOR);

    g.fill_ellipse(geometry.inner_circle, RING_COLOR);
    g.stroke_ellipse(geometry.inner_circle, BORDER_PEN_WIDTH, BORDER_COLOR);

    if snapshot.style != ProgressStyle::Marquee {
        g.draw_text(client, &format!("{}%", snapshot.value), snapshot.font, color);
    }
}
