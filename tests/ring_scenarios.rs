use std::time::{Duration, Instant};

use ring_progress::config::RING_COLOR;
use ring_progress::{Canvas, Color, ProgressRing, ProgressStyle, DEFAULT_PROGRESS_COLOR};

const WHITE: Color = Color::new(0xff, 0xff, 0xff);

fn marquee_ring() -> ProgressRing {
    let mut ring = ProgressRing::new();
    ring.set_marquee_animation_speed(Duration::from_millis(100));
    ring.set_style(ProgressStyle::Marquee);
    ring
}

#[test]
fn set_value_stays_within_range() {
    let mut ring = ProgressRing::new();
    ring.set_minimum(-10);
    ring.set_maximum(10);
    for v in -50..=50 {
        ring.set_value(v);
        let got = ring.value();
        assert!((-10..=10).contains(&got));
        assert_eq!(got, v.clamp(-10, 10));
    }
}

#[test]
fn perform_step_saturates_at_maximum() {
    let mut ring = ProgressRing::new();
    ring.set_step(10);
    let mut seen = Vec::new();
    for _ in 0..10 {
        ring.perform_step();
        seen.push(ring.value());
    }
    assert_eq!(seen, (1..=10).map(|i| i * 10).collect::<Vec<_>>());
    ring.perform_step();
    assert_eq!(ring.value(), 100);
    ring.perform_step();
    assert_eq!(ring.value(), 100);
}

#[test]
fn perform_step_matches_increment() {
    let mut stepped = ProgressRing::new();
    let mut incremented = ProgressRing::new();
    stepped.set_step(7);
    incremented.set_step(7);
    for _ in 0..20 {
        stepped.perform_step();
        incremented.increment(7);
        assert_eq!(stepped.value(), incremented.value());
    }
}

#[test]
fn marquee_round_trip() {
    let mut ring = marquee_ring();
    for _ in 0..100 {
        ring.on_animation_tick();
    }
    assert_eq!(ring.marquee_value(), 100);
    assert!(ring.is_marquee_growing());

    // the tick at the bound only flips direction
    ring.on_animation_tick();
    assert_eq!(ring.marquee_value(), 100);
    assert!(!ring.is_marquee_growing());

    for _ in 0..100 {
        ring.on_animation_tick();
    }
    assert_eq!(ring.marquee_value(), 0);
    assert!(!ring.is_marquee_growing());

    ring.on_animation_tick();
    assert_eq!(ring.marquee_value(), 0);
    assert!(ring.is_marquee_growing());
}

#[test]
fn marquee_pointer_is_a_triangle_wave() {
    let mut ring = marquee_ring();
    ring.set_maximum(4);
    let values: Vec<i32> = (0..12)
        .map(|_| {
            ring.on_animation_tick();
            ring.marquee_value()
        })
        .collect();
    assert_eq!(values, vec![1, 2, 3, 4, 4, 3, 2, 1, 0, 0, 1, 2]);
}

#[test]
fn elapsed_time_drives_ticks() {
    let mut ring = marquee_ring();
    let t0 = Instant::now();
    ring.advance(t0);
    assert_eq!(ring.advance(t0 + Duration::from_millis(100 * 100)), 100);
    assert_eq!(ring.marquee_value(), 100);
    assert_eq!(ring.next_tick_deadline(), Some(t0 + Duration::from_millis(100 * 100 + 100)));
}

#[test]
fn set_minimum_resets_pointer_in_any_phase() {
    let mut ring = marquee_ring();
    for _ in 0..150 {
        ring.on_animation_tick();
    }
    assert!(!ring.is_marquee_growing());
    ring.set_minimum(20);
    assert_eq!(ring.marquee_value(), 20);

    // also while the marquee is not running
    ring.set_style(ProgressStyle::Continuous);
    ring.set_minimum(5);
    assert_eq!(ring.marquee_value(), 5);
}

#[test]
fn leaving_marquee_freezes_the_pointer() {
    let mut ring = marquee_ring();
    let t0 = Instant::now();
    ring.advance(t0);
    ring.advance(t0 + Duration::from_millis(1_000));
    let frozen = ring.marquee_value();
    assert_eq!(frozen, 10);

    ring.set_style(ProgressStyle::Continuous);
    assert!(!ring.is_marquee_running());
    assert_eq!(ring.advance(t0 + Duration::from_secs(60)), 0);
    assert_eq!(ring.marquee_value(), frozen);
    assert_eq!(ring.next_tick_deadline(), None);
}

#[test]
fn ticks_request_redraws() {
    let mut ring = marquee_ring();
    ring.take_redraw_request();
    ring.on_animation_tick();
    assert!(ring.take_redraw_request());

    // a flip tick changes no value but still redraws
    ring.set_maximum(1);
    ring.take_redraw_request();
    ring.on_animation_tick();
    assert_eq!(ring.marquee_value(), 1);
    assert!(ring.take_redraw_request());
}

#[test]
fn renders_ring_into_pixels() {
    let (w, h) = (100usize, 100usize);
    let mut buf = vec![0xff; w * h * 4];
    let mut ring = ProgressRing::new();
    ring.on_resize(w as u32, h as u32);

    {
        let mut canvas = Canvas::new(&mut buf, w, h);
        ring.paint(&mut canvas);
        // empty progress: no arc at the top, inner face in the middle
        assert_eq!(canvas.pixel(50, 3), Some(WHITE));
        assert_eq!(canvas.pixel(50, 50), Some(RING_COLOR));
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));
    }

    ring.set_value(50);
    let mut canvas = Canvas::new(&mut buf, w, h);
    canvas.clear(WHITE);
    ring.paint(&mut canvas);
    // the arc starts at the top and runs clockwise through the right side
    assert_eq!(canvas.pixel(50, 3), Some(DEFAULT_PROGRESS_COLOR));
    assert_eq!(canvas.pixel(96, 50), Some(DEFAULT_PROGRESS_COLOR));
    assert_eq!(canvas.pixel(3, 50), Some(WHITE));
    // ring band between the two outer ellipses
    assert_eq!(canvas.pixel(50, 7), Some(RING_COLOR));
}

#[test]
fn zero_span_range_paints_without_panicking() {
    let mut buf = vec![0xff; 64 * 64 * 4];
    let mut ring = ProgressRing::new();
    ring.set_maximum(0);
    ring.on_resize(64, 64);
    assert_eq!(ring.scaled_fraction(0), 1.0);
    let mut canvas = Canvas::new(&mut buf, 64, 64);
    ring.paint(&mut canvas);
}
