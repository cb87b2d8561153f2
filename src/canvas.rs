//! Software rasterizer over an RGBA8 frame buffer, the `Surface` the window
//! host paints into.

use rusttype::{point, PositionedGlyph, Scale};

use crate::config::Color;
use crate::error::RingError;
use crate::geometry::RectF;
use crate::painter::{Smoothing, Surface, WidgetFont};

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    smoothing: Smoothing,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        let height = height.min(frame.len() / (width * 4).max(1));
        Self {
            frame,
            width,
            height,
            smoothing: Smoothing::None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some(Color::new(self.frame[idx], self.frame[idx + 1], self.frame[idx + 2]))
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let a = alpha.clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        let out = [
            mix(color.r, self.frame[idx]),
            mix(color.g, self.frame[idx + 1]),
            mix(color.b, self.frame[idx + 2]),
            0xff,
        ];
        self.frame[idx..idx + 4].copy_from_slice(&out);
    }

    /// Pixel coverage for a signed distance to a shape edge, negative inside.
    fn coverage(&self, signed_distance: f32) -> f32 {
        match self.smoothing {
            Smoothing::AntiAlias => (0.5 - signed_distance).clamp(0.0, 1.0),
            Smoothing::None if signed_distance <= 0.0 => 1.0,
            Smoothing::None => 0.0,
        }
    }

    /// Visits every pixel center inside `bounds` grown by `margin`, clipped to
    /// the frame.
    fn for_each_pixel(&mut self, bounds: RectF, margin: f32, mut f: impl FnMut(&mut Self, i32, i32, f32, f32)) {
        let min_x = ((bounds.x - margin).floor() as i32).max(0);
        let min_y = ((bounds.y - margin).floor() as i32).max(0);
        let max_x = ((bounds.right() + margin).ceil() as i32).min(self.width as i32 - 1);
        let max_y = ((bounds.bottom() + margin).ceil() as i32).min(self.height as i32 - 1);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                f(self, x, y, x as f32 + 0.5, y as f32 + 0.5);
            }
        }
    }
}

/// Ellipse inscribed in a rectangle
#[derive(Debug, Clone, Copy)]
struct Ellipse {
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
}

impl Ellipse {
    fn inscribed(bounds: RectF) -> Option<Self> {
        if bounds.is_empty() || !bounds.x.is_finite() || !bounds.y.is_finite() {
            return None;
        }
        let (cx, cy) = bounds.center();
        Some(Self {
            cx,
            cy,
            rx: bounds.width / 2.0,
            ry: bounds.height / 2.0,
        })
    }

    /// Approximate distance to the outline in pixels, negative inside. Exact for
    /// circles.
    fn signed_distance(&self, px: f32, py: f32) -> f32 {
        let nx = (px - self.cx) / self.rx;
        let ny = (py - self.cy) / self.ry;
        ((nx * nx + ny * ny).sqrt() - 1.0) * self.rx.min(self.ry)
    }

    /// Parametric angle of a point in degrees, clockwise on screen, in [0, 360).
    fn angle_degrees(&self, px: f32, py: f32) -> f32 {
        let ny = (py - self.cy) / self.ry;
        let nx = (px - self.cx) / self.rx;
        ny.atan2(nx).to_degrees().rem_euclid(360.0)
    }
}

impl Surface for Canvas<'_> {
    fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    fn set_smoothing(&mut self, mode: Smoothing) {
        self.smoothing = mode;
    }

    fn fill_ellipse(&mut self, bounds: RectF, color: Color) {
        let Some(ellipse) = Ellipse::inscribed(bounds) else {
            return;
        };
        self.for_each_pixel(bounds, 1.0, |canvas, x, y, px, py| {
            let aa = canvas.coverage(ellipse.signed_distance(px, py));
            if aa > 0.0 {
                canvas.set_pixel(x, y, color, aa);
            }
        });
    }

    fn stroke_ellipse(&mut self, bounds: RectF, pen_width: f32, color: Color) {
        let Some(ellipse) = Ellipse::inscribed(bounds) else {
            return;
        };
        let half = pen_width / 2.0;
        self.for_each_pixel(bounds, half + 1.0, |canvas, x, y, px, py| {
            let aa = canvas.coverage(ellipse.signed_distance(px, py).abs() - half);
            if aa > 0.0 {
                canvas.set_pixel(x, y, color, aa);
            }
        });
    }

    fn stroke_arc(
        &mut self,
        bounds: RectF,
        start_degrees: f32,
        sweep_degrees: f32,
        pen_width: f32,
        color: Color,
    ) -> Result<(), RingError> {
        let ellipse = Ellipse::inscribed(bounds).ok_or(RingError::DegenerateArc(bounds))?;
        if sweep_degrees == 0.0 || !sweep_degrees.is_finite() {
            return Ok(());
        }
        let (start, sweep) = if sweep_degrees < 0.0 {
            (start_degrees + sweep_degrees, -sweep_degrees)
        } else {
            (start_degrees, sweep_degrees)
        };
        let full_turn = sweep >= 360.0;
        let half = pen_width / 2.0;
        self.for_each_pixel(bounds, half + 1.0, |canvas, x, y, px, py| {
            let aa = canvas.coverage(ellipse.signed_distance(px, py).abs() - half);
            if aa <= 0.0 {
                return;
            }
            if full_turn || (ellipse.angle_degrees(px, py) - start).rem_euclid(360.0) <= sweep {
                canvas.set_pixel(x, y, color, aa);
            }
        });
        Ok(())
    }

    fn fill_ring(&mut self, outer: RectF, inner: RectF, color: Color) {
        let Some(outer_ellipse) = Ellipse::inscribed(outer) else {
            return;
        };
        let inner_ellipse = Ellipse::inscribed(inner);
        self.for_each_pixel(outer, 1.0, |canvas, x, y, px, py| {
            let outside_inner = inner_ellipse
                .map(|e| 1.0 - canvas.coverage(e.signed_distance(px, py)))
                .unwrap_or(1.0);
            let aa = canvas.coverage(outer_ellipse.signed_distance(px, py)) * outside_inner;
            if aa > 0.0 {
                canvas.set_pixel(x, y, color, aa);
            }
        });
    }

    fn draw_text(&mut self, bounds: RectF, text: &str, font: &WidgetFont, color: Color) {
        let Some(face) = font.face.as_ref() else {
            return;
        };
        let scale = Scale::uniform(font.size);
        let v_metrics = face.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = face
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(min_x, max_x, min_y, max_y), bb| {
                (
                    min_x.min(bb.min.x),
                    max_x.max(bb.max.x),
                    min_y.min(bb.min.y),
                    max_y.max(bb.max.y),
                )
            },
        );
        if min_x >= max_x || min_y >= max_y {
            return;
        }
        let (cx, cy) = bounds.center();
        let offset_x = cx.round() as i32 - (max_x - min_x) / 2;
        let offset_y = cy.round() as i32 - (max_y - min_y) / 2;
        let smoothing = self.smoothing;
        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let alpha = match smoothing {
                        Smoothing::AntiAlias => v,
                        Smoothing::None if v >= 0.5 => 1.0,
                        Smoothing::None => 0.0,
                    };
                    if alpha > 0.0 {
                        let px = offset_x + gx as i32 + bb.min.x - min_x;
                        let py = offset_y + gy as i32 + bb.min.y - min_y;
                        self.set_pixel(px, py, color, alpha);
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color::new(0xff, 0xff, 0xff);
    const RED: Color = Color::new(0xff, 0x00, 0x00);

    fn frame(width: usize, height: usize) -> Vec<u8> {
        vec![0xff; width * height * 4]
    }

    #[test]
    fn fill_ellipse_covers_center_not_corners() {
        let mut buf = frame(40, 40);
        let mut canvas = Canvas::new(&mut buf, 40, 40);
        canvas.set_smoothing(Smoothing::AntiAlias);
        canvas.fill_ellipse(RectF::new(5.0, 5.0, 30.0, 30.0), RED);
        assert_eq!(canvas.pixel(20, 20), Some(RED));
        assert_eq!(canvas.pixel(6, 6), Some(WHITE));
        assert_eq!(canvas.pixel(0, 39), Some(WHITE));
    }

    #[test]
    fn aliased_fill_has_no_partial_pixels() {
        let mut buf = frame(30, 30);
        let mut canvas = Canvas::new(&mut buf, 30, 30);
        canvas.fill_ellipse(RectF::new(2.3, 4.1, 25.0, 19.7), RED);
        for y in 0..30 {
            for x in 0..30 {
                let p = canvas.pixel(x, y).unwrap();
                assert!(p == RED || p == WHITE, "partial pixel at {x},{y}: {p:?}");
            }
        }
    }

    #[test]
    fn degenerate_arc_is_an_error() {
        let mut buf = frame(10, 10);
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        let err = canvas
            .stroke_arc(RectF::new(5.0, 5.0, 0.0, 3.0), 270.0, 90.0, 3.0, RED)
            .unwrap_err();
        assert!(matches!(err, RingError::DegenerateArc(_)));
    }

    #[test]
    fn arc_sweeps_clockwise_from_top() {
        let mut buf = frame(100, 100);
        let mut canvas = Canvas::new(&mut buf, 100, 100);
        canvas.set_smoothing(Smoothing::AntiAlias);
        canvas
            .stroke_arc(RectF::new(10.0, 10.0, 80.0, 80.0), 270.0, 90.0, 3.0, RED)
            .unwrap();
        // top-right quadrant is drawn, bottom-left is not
        assert_eq!(canvas.pixel(78, 21), Some(RED));
        assert_eq!(canvas.pixel(21, 78), Some(WHITE));
        assert_eq!(canvas.pixel(50, 50), Some(WHITE));
    }

    #[test]
    fn zero_sweep_draws_nothing() {
        let mut buf = frame(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20);
        canvas
            .stroke_arc(RectF::new(2.0, 2.0, 16.0, 16.0), 270.0, 0.0, 3.0, RED)
            .unwrap();
        assert!(buf.iter().all(|&b| b == 0xff));
    }

    #[test]
    fn ring_leaves_the_hole_empty() {
        let mut buf = frame(100, 100);
        let mut canvas = Canvas::new(&mut buf, 100, 100);
        canvas.set_smoothing(Smoothing::AntiAlias);
        canvas.fill_ring(
            RectF::new(10.0, 10.0, 80.0, 80.0),
            RectF::new(20.0, 20.0, 60.0, 60.0),
            RED,
        );
        assert_eq!(canvas.pixel(50, 15), Some(RED));
        assert_eq!(canvas.pixel(50, 50), Some(WHITE));
        assert_eq!(canvas.pixel(2, 2), Some(WHITE));
    }

    #[test]
    fn shapes_outside_the_frame_are_clipped() {
        let mut buf = frame(10, 10);
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        canvas.fill_ellipse(RectF::new(-50.0, -50.0, 200.0, 200.0), RED);
        assert_eq!(canvas.pixel(9, 9), Some(RED));
        assert_eq!(canvas.pixel(10, 10), None);
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut buf = frame(20, 20);
        let mut canvas = Canvas::new(&mut buf, 20, 20);
        canvas.draw_text(RectF::from_size(20, 20), "50%", &WidgetFont::new(None, 12.0), RED);
        assert!(buf.iter().all(|&b| b == 0xff));
    }

    /// First readable font among `RING_PROGRESS_TEST_FONT` and common system paths
    fn any_system_font() -> Option<rusttype::Font<'static>> {
        let candidates = std::env::var("RING_PROGRESS_TEST_FONT")
            .ok()
            .into_iter()
            .chain(
                [
                    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/TTF/DejaVuSans.ttf",
                    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                    "/System/Library/Fonts/Supplemental/Arial.ttf",
                    "C:\\Windows\\Fonts\\arial.ttf",
                ]
                .map(String::from),
            );
        candidates
            .filter_map(|path| std::fs::read(path).ok())
            .find_map(rusttype::Font::try_from_vec)
    }

    #[test]
    fn label_is_centered_both_ways() {
        let Some(face) = any_system_font() else {
            eprintln!("no system font found, skipping label placement check");
            return;
        };
        let font = WidgetFont::new(Some(face), 24.0);
        let (w, h) = (140usize, 80usize);
        let mut buf = frame(w, h);
        let mut canvas = Canvas::new(&mut buf, w, h);
        let bounds = RectF::new(20.0, 10.0, 100.0, 60.0);
        canvas.draw_text(bounds, "50%", &font, RED);

        let inked: Vec<(usize, usize)> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) != Some(WHITE))
            .collect();
        assert!(!inked.is_empty(), "label drew nothing");
        let min_x = inked.iter().map(|p| p.0).min().unwrap() as f32;
        let max_x = inked.iter().map(|p| p.0).max().unwrap() as f32 + 1.0;
        let min_y = inked.iter().map(|p| p.1).min().unwrap() as f32;
        let max_y = inked.iter().map(|p| p.1).max().unwrap() as f32 + 1.0;

        let (cx, cy) = bounds.center();
        assert!(((min_x + max_x) / 2.0 - cx).abs() <= 2.0, "x span {min_x}..{max_x}, center {cx}");
        assert!(((min_y + max_y) / 2.0 - cy).abs() <= 2.0, "y span {min_y}..{max_y}, center {cy}");
        assert!(min_x >= bounds.x && max_x <= bounds.right());
        assert!(min_y >= bounds.y && max_y <= bounds.bottom());
    }

    #[test]
    fn aliased_label_is_solid() {
        let Some(face) = any_system_font() else {
            return;
        };
        let font = WidgetFont::new(Some(face), 20.0);
        let mut buf = frame(80, 40);
        let mut canvas = Canvas::new(&mut buf, 80, 40);
        canvas.draw_text(RectF::from_size(80, 40), "100%", &font, RED);
        let mut inked = 0;
        for y in 0..40 {
            for x in 0..80 {
                let p = canvas.pixel(x, y).unwrap();
                assert!(p == RED || p == WHITE, "partial pixel at {x},{y}: {p:?}");
                inked += usize::from(p == RED);
            }
        }
        assert!(inked > 0);
    }
}
