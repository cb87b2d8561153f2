//! Marquee animation: a pointer bouncing between the range bounds, advanced by
//! an interval timer that only exists while the marquee runs.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed-period tick source polled by the host event loop.
///
/// The first poll establishes the baseline. Every later poll reports how many
/// whole periods have elapsed since the last reported tick.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            last_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
    }

    /// Number of ticks due at `now`.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return 0;
        };
        let elapsed = now.saturating_duration_since(last);
        let due = elapsed.as_nanos() / self.interval.as_nanos();
        if due == 0 {
            return 0;
        }
        let due = u32::try_from(due).unwrap_or(u32::MAX);
        self.last_tick = Some(last + self.interval * due);
        due
    }

    /// When the next tick becomes due, once a baseline exists.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.last_tick.map(|last| last + self.interval)
    }
}

/// Marquee pointer state machine.
///
/// The pointer only moves while a timer is held; ticks delivered after
/// [`AnimationDriver::stop`] are ignored.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    marquee_value: i32,
    growing: bool,
    interval: Duration,
    timer: Option<IntervalTimer>,
}

impl AnimationDriver {
    pub fn new(minimum: i32, interval: Duration) -> Self {
        Self {
            marquee_value: minimum,
            growing: true,
            interval: interval.max(MIN_INTERVAL),
            timer: None,
        }
    }

    pub fn marquee_value(&self) -> i32 {
        self.marquee_value
    }

    pub fn is_growing(&self) -> bool {
        self.growing
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the speed of the running timer as well as later ones.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
        if let Some(timer) = self.timer.as_mut() {
            timer.set_interval(self.interval);
        }
    }

    /// Moves the pointer back to `minimum` without touching the direction.
    pub fn reset_to(&mut self, minimum: i32) {
        self.marquee_value = minimum;
    }

    /// Restarts the sweep from `minimum`, growing. A running timer is replaced,
    /// never stacked.
    pub fn start(&mut self, minimum: i32) {
        self.marquee_value = minimum;
        self.growing = true;
        self.timer = Some(IntervalTimer::new(self.interval));
        debug!(interval_ms = self.interval.as_millis() as u64, "marquee started");
    }

    /// Releases the timer. Idempotent.
    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            debug!(marquee_value = self.marquee_value, "marquee stopped");
        }
    }

    /// Ticks due at `now`, applied to the pointer. Returns how many fell due.
    ///
    /// Once the pointer is inside the range the sweep repeats every
    /// [`cycle_len`] ticks, so whole cycles are skipped rather than replayed.
    pub fn advance(&mut self, now: Instant, minimum: i32, maximum: i32) -> u32 {
        let due = match self.timer.as_mut() {
            Some(timer) => timer.poll(now),
            None => return 0,
        };
        let mut remaining = u64::from(due);
        let top = maximum.max(minimum);
        while remaining > 0 && !(minimum..=top).contains(&self.marquee_value) {
            self.step(minimum, maximum);
            remaining -= 1;
        }
        let cycle = cycle_len(minimum, maximum);
        if remaining > cycle {
            trace!(skipped = remaining - remaining % cycle, "skipping whole marquee cycles");
            remaining %= cycle;
        }
        for _ in 0..remaining {
            self.step(minimum, maximum);
        }
        due
    }

    /// A single timer callback. Returns `false` when the timer has already been
    /// released, in which case nothing changes.
    pub fn tick(&mut self, minimum: i32, maximum: i32) -> bool {
        if self.timer.is_none() {
            trace!("tick after marquee stop ignored");
            return false;
        }
        self.step(minimum, maximum);
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.as_ref().and_then(IntervalTimer::next_deadline)
    }

    fn step(&mut self, minimum: i32, maximum: i32) {
        if self.growing {
            if self.marquee_value < maximum {
                self.marquee_value += 1;
            } else {
                self.growing = false;
            }
        } else if self.marquee_value > minimum {
            self.marquee_value -= 1;
        } else {
            self.growing = true;
        }
        trace!(marquee_value = self.marquee_value, growing = self.growing, "marquee tick");
    }
}

/// Ticks in one full sweep up and back down, the flip tick at each bound
/// included.
pub fn cycle_len(minimum: i32, maximum: i32) -> u64 {
    let span = (i64::from(maximum) - i64::from(minimum)).max(0) as u64;
    2 * span + 2
}
